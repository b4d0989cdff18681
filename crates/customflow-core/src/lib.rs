//! Domain layer of the CustomFlow order backend.
//!
//! Holds the order model and its validation rules, the error taxonomy, and
//! the traits implemented by the infrastructure and interaction crates. This
//! crate performs no I/O.

pub mod ai;
pub mod auth;
pub mod config;
pub mod error;
pub mod image;
pub mod order;
pub mod outcome;

// Re-export common error type
pub use error::{CustomFlowError, ExistingOrder, Result};
