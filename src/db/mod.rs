//! Data access layer: connection acquisition and statement execution.

pub mod provider;
pub mod store;

pub use provider::{Conn, ConnectionProvider};
pub use store::{ExecResult, RecordStore, RowMap, SqlParam};

/// Errors surfaced by the data access layer.
///
/// Driver failures during execution are deliberately not distinguished from
/// one another; everything that goes wrong while running a statement is a
/// single `Query` kind. Connection acquisition that has used up its retry
/// budget is the one case callers can tell apart.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("could not connect to database after {attempts} attempts")]
    ConnectionExhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}
