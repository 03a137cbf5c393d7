//! # Portal Directory Crate
//!
//! Contracts for the two remote collaborators the account workflows talk to:
//! the user-directory service (accounts, preferences, agreements, password
//! reset tokens, email confirmation) and the transactional mailer.
//!
//! ## Architecture
//!
//! - **Client**: `DirectoryClient` and `Mailer` traits consumed by workflows
//! - **Types**: record and delivery-status shapes exchanged with the services
//! - **Http**: reqwest-backed implementations of both traits
//!
//! ## Usage
//!
//! ```rust,no_run
//! use portal_config::DirectoryConfig;
//! use portal_directory::{DirectoryClient, HttpDirectoryClient};
//!
//! # async fn run() -> Result<(), portal_directory::RemoteCallError> {
//! let directory = HttpDirectoryClient::new(&DirectoryConfig::default())?;
//! let user = directory.get_user("42").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{DirectoryClient, Mailer};
pub use error::{RemoteCallError, RemoteResult};
pub use http::{HttpDirectoryClient, HttpMailer};
pub use types::{DeliveryStatus, EmailStatus, JsonObject, RemoteUser, ResetTokenGrant, SendReceipt};
