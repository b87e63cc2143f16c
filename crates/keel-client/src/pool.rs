//! Bounded connection pools.

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::info;

use crate::config::{ConnectionSettings, PoolConfig};
use crate::connection::{Connection, SqlxConnection, install_drivers};
use crate::error::{ClientError, Result};

/// A bounded set of reusable connections.
///
/// `acquire` may suspend until a connection frees up. Every acquired
/// connection must be handed back through `release` exactly once.
#[async_trait]
pub trait ResourcePool: Send + Sync {
    /// Connection type handed out by the pool.
    type Connection: Connection;

    /// Checks a connection out of the pool.
    async fn acquire(&self) -> Result<Self::Connection>;

    /// Returns a connection to the pool.
    fn release(&self, connection: Self::Connection);

    /// Closes every connection. Further acquires fail.
    async fn close(&self) {}
}

/// [`ResourcePool`] over `sqlx::AnyPool`.
#[derive(Debug, Clone)]
pub struct SqlxPool {
    pool: AnyPool,
}

impl SqlxPool {
    /// Builds a lazily-connecting pool; no connection is opened until the
    /// first acquire.
    pub fn new(settings: &ConnectionSettings, config: &PoolConfig) -> Result<Self> {
        install_drivers();
        let mut options = AnyPoolOptions::new()
            .max_connections(config.max)
            .min_connections(config.min)
            .idle_timeout(config.idle_timeout());
        if let Some(timeout) = config.acquire_timeout() {
            options = options.acquire_timeout(timeout);
        }
        let pool = options
            .connect_lazy(&settings.url)
            .map_err(ClientError::Connect)?;

        info!(
            max = config.max,
            min = config.min,
            idle_timeout_ms = config.idle_timeout_millis,
            "Created connection pool"
        );
        Ok(Self { pool })
    }

    /// Underlying sqlx pool.
    #[must_use]
    pub fn inner(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl ResourcePool for SqlxPool {
    type Connection = SqlxConnection;

    async fn acquire(&self) -> Result<SqlxConnection> {
        let connection = self
            .pool
            .acquire()
            .await
            .map_err(ClientError::PoolExhausted)?;
        Ok(SqlxConnection::pooled(connection))
    }

    fn release(&self, connection: SqlxConnection) {
        // Dropping a pooled sqlx connection hands it back.
        drop(connection);
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn single_connection_pool() -> SqlxPool {
        let config = PoolConfig {
            max: 1,
            min: 0,
            acquire_timeout_millis: Some(100),
            ..PoolConfig::default()
        };
        SqlxPool::new(&ConnectionSettings::new("sqlite::memory:"), &config).unwrap()
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let pool = single_connection_pool();

        let mut connection = pool.acquire().await.unwrap();
        let output = connection.query("select 1 as one", &[]).await.unwrap();
        assert_eq!(output.rows, vec![vec![Value::Integer(1)]]);
        let first_id = connection.id();
        pool.release(connection);

        // The single slot is free again; the reused connection gets a new id.
        let again = pool.acquire().await.unwrap();
        assert_ne!(again.id(), first_id);
        pool.release(again);
    }

    #[tokio::test]
    async fn test_exhausted_pool_times_out() {
        let pool = single_connection_pool();
        let held = pool.acquire().await.unwrap();

        let err = pool.acquire().await.unwrap_err();
        assert!(matches!(err, ClientError::PoolExhausted(_)));

        pool.release(held);
        assert!(pool.inner().size() <= 1);
    }
}
