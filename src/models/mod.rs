//! Domain models with validation at construction.
//!
//! Request payloads are validated when these types are built; invalid input
//! returns a [`ValidationError`] before anything reaches the data layer.

pub mod contact;
pub mod validation;

pub use contact::ContactInput;
pub use validation::ValidationError;
