//! # Portal Accounts Crate
//!
//! Account-management workflows for the portal: registration, email
//! confirmation, forgotten and reset passwords, and profile editing. The
//! directory service owns every account; this crate validates form input,
//! turns it into directory and mailer calls, and reshapes the replies for
//! the client.
//!
//! ## Architecture
//!
//! - **Entities**: `FormRecord`, the request-scoped form state
//! - **Models**: one workflow model per form
//! - **Services**: the shared `AccountServices` context and mock clients
//! - **Types**: `AccountError` and `FieldErrors`
//! - **Utils**: rule-table validation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portal_accounts::{AccountServices, RegisterModel};
//!
//! let mut model = RegisterModel::new(form);
//! model.validate().into_result()?;
//! let account = model.save(&services).await?;
//! ```

pub mod entities;
pub mod models;
pub mod services;
pub mod types;
pub mod utils;

pub use entities::FormRecord;
pub use models::{
    AccountModel, AccountView, ConfirmUserModel, ForgotPasswordModel, RegisterModel,
    ResetUserPasswordModel,
};
pub use services::{AccountServices, TermsOfService};
pub use types::{AccountError, AccountResult, FieldErrors};
pub use utils::ValidationResult;
