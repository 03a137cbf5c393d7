//! Request-scoped form state.

pub mod form;

pub use form::FormRecord;
