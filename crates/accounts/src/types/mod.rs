//! Shared types for the account workflows.

pub mod errors;

pub use errors::{AccountError, AccountResult, FieldErrors};
