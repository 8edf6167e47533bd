//! contacts-server: a minimal contact-management HTTP API.
//!
//! Exposes create, read (with optional substring search), update, and delete
//! over a single `contacts` table in MySQL. The interesting surface is the
//! data access layer: retried connection acquisition, parameterized statement
//! execution, and generic row mapping with guaranteed per-call release.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{Config, DbConfig};
pub use db::{ConnectionProvider, DbError, RecordStore};
pub use http::{run_server, ApiError};
