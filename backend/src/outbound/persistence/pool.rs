//! Async-safe connection pool for Diesel PostgreSQL connections.
//!
//! This module wraps `diesel-async` and `bb8`. The pool is built explicitly at
//! startup and handed to adapters by value; there is no global pool.
//!
//! # Design
//!
//! - Uses `diesel-async`'s native async support rather than `spawn_blocking`
//! - Checkout waits for a free connection; the wait is unbounded unless an
//!   acquire timeout is configured
//! - A connection whose transaction could not be rolled back is marked broken
//!   by `diesel-async` and discarded by `bb8` on return
//! - All errors are mapped to `PoolError` variants

use std::time::Duration;

use diesel::dsl::sql;
use diesel::sql_types::Integer;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

/// Stand-in for "wait forever"; `bb8` requires a finite checkout timeout.
const UNBOUNDED_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },

    /// The `SELECT 1` connectivity check failed.
    #[error("connectivity check failed: {message}")]
    Ping { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a connectivity-check error with the given message.
    pub fn ping(message: impl Into<String>) -> Self {
        Self::Ping {
            message: message.into(),
        }
    }

    /// Readable message without the variant prefix.
    pub fn into_message(self) -> String {
        match self {
            Self::Checkout { message } | Self::Build { message } | Self::Ping { message } => {
                message
            }
        }
    }
}

/// Configuration for the database connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use listings::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("host=localhost user=postgres")
///     .with_max_size(20)
///     .with_acquire_timeout(Some(Duration::from_secs(5)));
/// assert_eq!(config.max_size(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    acquire_timeout: Option<Duration>,
}

impl PoolConfig {
    /// Create a new configuration with the given connection string.
    ///
    /// Defaults:
    /// - `max_size`: 10 connections
    /// - `min_idle`: none kept warm
    /// - `acquire_timeout`: unbounded
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: None,
            acquire_timeout: None,
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Bound how long a checkout may wait. `None` waits indefinitely.
    pub fn with_acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Get the connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout
    }

    /// `bb8` panics on a zero pool size or checkout timeout.
    fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::build("max_size must be greater than zero"));
        }
        if self.acquire_timeout == Some(Duration::ZERO) {
            return Err(PoolError::build("acquire timeout must be greater than zero"));
        }
        Ok(())
    }

    fn effective_acquire_timeout(&self) -> Duration {
        self.acquire_timeout.unwrap_or(UNBOUNDED_ACQUIRE_TIMEOUT)
    }
}

/// Async connection pool for PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be constructed (e.g.,
    /// a zero pool size or acquire timeout, an invalid connection string or a
    /// connection failure).
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.effective_acquire_timeout())
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Run `SELECT 1 + 1` on a pooled connection and return the result.
    pub async fn ping(&self) -> Result<i32, PoolError> {
        let mut conn = self.get().await?;
        diesel::select(sql::<Integer>("1 + 1"))
            .get_result::<i32>(&mut conn)
            .await
            .map_err(|err| PoolError::ping(err.to_string()))
    }
}
