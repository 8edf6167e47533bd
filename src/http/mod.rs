//! HTTP layer: router assembly, error-to-status translation, route handlers.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{run_server, AppState, ServerError};
