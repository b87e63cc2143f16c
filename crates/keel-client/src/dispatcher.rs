//! Statement dispatch over a pool or a single connection.
//!
//! A call either runs on a connection the caller supplies, or borrows one
//! for exactly the duration of the call. Borrowed connections are held by a
//! [`Lease`] whose `Drop` returns them, so release happens on success, on
//! failure and when the call future is dropped mid-flight (e.g. by a
//! timeout).

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::connection::{Connection, ConnectionId};
use crate::error::{ClientError, Result};
use crate::pool::ResourcePool;
use crate::value::{QueryOutput, Value};

enum Source<P: ResourcePool> {
    Pool(P),
    Single(Mutex<P::Connection>),
}

/// Runs statements against a pool, or serializes them onto one connection.
pub struct QueryDispatcher<P: ResourcePool> {
    source: Source<P>,
    log_statements: bool,
}

impl<P: ResourcePool> std::fmt::Debug for QueryDispatcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDispatcher")
            .field("pooled", &self.is_pooled())
            .field("log_statements", &self.log_statements)
            .finish()
    }
}

impl<P: ResourcePool> QueryDispatcher<P> {
    /// Dispatches through `pool`.
    #[must_use]
    pub fn pooled(pool: P) -> Self {
        Self {
            source: Source::Pool(pool),
            log_statements: false,
        }
    }

    /// Dispatches every call onto `connection`.
    #[must_use]
    pub fn single(connection: P::Connection) -> Self {
        Self {
            source: Source::Single(Mutex::new(connection)),
            log_statements: false,
        }
    }

    /// Logs each statement at `info` instead of `debug`.
    #[must_use]
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Whether calls borrow from a pool.
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        matches!(self.source, Source::Pool(_))
    }

    /// Returns the pool, if dispatching through one.
    #[must_use]
    pub fn pool(&self) -> Option<&P> {
        match &self.source {
            Source::Pool(pool) => Some(pool),
            Source::Single(_) => None,
        }
    }

    /// Runs `sql` with `params`.
    ///
    /// With an explicit `connection` the statement runs on it and the pool is
    /// not touched. Otherwise a connection is acquired for this call only.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        connection: Option<&mut P::Connection>,
    ) -> Result<QueryOutput> {
        if let Some(connection) = connection {
            self.log(sql, connection.id());
            return connection.query(sql, params).await;
        }

        match &self.source {
            Source::Pool(pool) => {
                let mut lease = Lease::new(pool, pool.acquire().await?);
                let connection = lease.connection();
                self.log(sql, connection.id());
                connection.query(sql, params).await
            }
            Source::Single(connection) => {
                let mut connection = connection.lock().await;
                self.log(sql, connection.id());
                connection.query(sql, params).await
            }
        }
    }

    /// Like [`execute`](Self::execute), failing with
    /// [`ClientError::Timeout`] once `limit` elapses. A borrowed connection
    /// is still released.
    pub async fn execute_with_timeout(
        &self,
        sql: &str,
        params: &[Value],
        connection: Option<&mut P::Connection>,
        limit: Duration,
    ) -> Result<QueryOutput> {
        tokio::time::timeout(limit, self.execute(sql, params, connection))
            .await
            .map_err(|_| ClientError::Timeout(limit))?
    }

    /// Closes the pool, or ends the single connection.
    pub async fn close(self) -> Result<()> {
        match self.source {
            Source::Pool(pool) => pool.close().await,
            Source::Single(connection) => connection.into_inner().end().await?,
        }
        info!("Dispatcher closed");
        Ok(())
    }

    fn log(&self, sql: &str, connection: ConnectionId) {
        if self.log_statements {
            info!(%connection, sql, "Dispatching statement");
        } else {
            debug!(%connection, sql, "Dispatching statement");
        }
    }
}

/// A pooled connection checked out for one call.
///
/// The connection is present from `new` until `drop` hands it back.
struct Lease<'a, P: ResourcePool> {
    pool: &'a P,
    connection: Option<P::Connection>,
}

impl<'a, P: ResourcePool> Lease<'a, P> {
    fn new(pool: &'a P, connection: P::Connection) -> Self {
        Self {
            pool,
            connection: Some(connection),
        }
    }

    fn connection(&mut self) -> &mut P::Connection {
        self.connection
            .as_mut()
            .expect("lease holds its connection until dropped")
    }
}

impl<P: ResourcePool> Drop for Lease<'_, P> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
