//! Connection acquisition with a fixed retry budget.
//!
//! Every call to [`ConnectionProvider::acquire`] yields a connection dedicated
//! to the caller. The default mode opens a fresh connection per call and
//! closes it on drop; the pooled mode checks one out of a shared pool behind
//! the same interface.

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::Connection;

use super::DbError;
use crate::config::DbConfig;

/// Total connection attempts before giving up.
const CONNECT_ATTEMPTS: u32 = 5;

/// Sleep between failed attempts. Fixed, not exponential.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Pool size for the pooled mode.
const POOL_MAX_CONNECTIONS: u32 = 5;

/// Produces database connections, retrying on transient unavailability.
#[derive(Clone)]
pub struct ConnectionProvider {
    mode: Mode,
}

#[derive(Clone)]
enum Mode {
    Direct(MySqlConnectOptions),
    Pooled(MySqlPool),
}

impl ConnectionProvider {
    /// Unpooled provider: every `acquire` opens a new connection.
    pub fn direct(config: &DbConfig) -> Self {
        Self::with_options(config.connect_options())
    }

    /// Unpooled provider from explicit driver options.
    pub fn with_options(options: MySqlConnectOptions) -> Self {
        Self {
            mode: Mode::Direct(options),
        }
    }

    /// Pooled provider behind the same interface. The pool is created lazily;
    /// checkout failures go through the same retry budget as direct connects.
    pub fn pooled(config: &DbConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect_lazy_with(config.connect_options());

        Self {
            mode: Mode::Pooled(pool),
        }
    }

    /// Acquire a connection, retrying up to 5 total attempts with a 2 second
    /// sleep between failures. There is no sleep after the final failure.
    ///
    /// Exhausting the budget is fatal for the current request; no layer above
    /// this one retries.
    pub async fn acquire(&self) -> Result<Conn, DbError> {
        match &self.mode {
            Mode::Direct(options) => {
                let conn = with_retry(|| MySqlConnection::connect_with(options)).await?;
                Ok(Conn::Direct(conn))
            }
            Mode::Pooled(pool) => {
                let conn = with_retry(|| pool.acquire()).await?;
                Ok(Conn::Pooled(conn))
            }
        }
    }
}

async fn with_retry<T, F, Fut>(mut connect: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    for attempt in 1..CONNECT_ATTEMPTS {
        match connect().await {
            Ok(conn) => return Ok(conn),
            Err(err) => {
                tracing::warn!(attempt, error = %err, "database connection failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }

    match connect().await {
        Ok(conn) => Ok(conn),
        Err(err) => {
            tracing::error!(error = %err, "database unreachable, retry budget exhausted");
            Err(DbError::ConnectionExhausted {
                attempts: CONNECT_ATTEMPTS,
                source: err,
            })
        }
    }
}

/// A connection dedicated to one store call. Closing (direct) or returning to
/// the pool (pooled) happens on drop, on every exit path.
#[derive(Debug)]
pub enum Conn {
    Direct(MySqlConnection),
    Pooled(PoolConnection<MySql>),
}

impl Deref for Conn {
    type Target = MySqlConnection;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Direct(conn) => conn,
            Self::Pooled(conn) => conn,
        }
    }
}

impl DerefMut for Conn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Direct(conn) => conn,
            Self::Pooled(conn) => conn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_options() -> MySqlConnectOptions {
        // Port 1 on loopback: connection refused immediately.
        MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("nobody")
            .password("nope")
            .database("missing")
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retry_budget_when_unreachable() {
        let provider = ConnectionProvider::with_options(unreachable_options());

        let start = tokio::time::Instant::now();
        let err = provider.acquire().await.unwrap_err();

        assert!(matches!(
            err,
            DbError::ConnectionExhausted { attempts: 5, .. }
        ));
        // 5 attempts, 4 sleeps of 2s; the final failure does not sleep.
        assert!(start.elapsed() >= Duration::from_secs(8));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn acquires_direct_connection() {
        let config = crate::config::DbConfig::from_env().expect("DB_* environment required");
        let provider = ConnectionProvider::direct(&config);
        provider.acquire().await.expect("connection failed");
    }
}
