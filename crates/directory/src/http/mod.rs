//! JSON-over-HTTP implementations of the service contracts.

mod directory;
mod mailer;
mod transport;

pub use directory::HttpDirectoryClient;
pub use mailer::HttpMailer;
