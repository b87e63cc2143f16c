//! Live connections and the provider that opens them.

use std::fmt;
use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::any::Any;
use sqlx::pool::PoolConnection;
use sqlx::{AnyConnection, Connection as _, Either, Executor};
use tracing::info;

use crate::config::ConnectionSettings;
use crate::error::{ClientError, Result};
use crate::value::{QueryOutput, Value, bind_params};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);
static INSTALL_DRIVERS: Once = Once::new();

/// Registers the sqlite, mysql and postgres drivers with `sqlx::any`.
pub(crate) fn install_drivers() {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
}

/// Process-unique connection identifier, used to correlate log lines.
///
/// Standalone connections get one id when opened. Pooled connections get a
/// fresh id at every checkout, so one physical connection reused by the pool
/// appears under several ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Returns a fresh identifier.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cid-{}", self.0)
    }
}

/// A live session able to run statements.
#[async_trait]
pub trait Connection: Send {
    /// Correlation identifier of this session.
    fn id(&self) -> ConnectionId;

    /// Runs one statement with positional parameters.
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput>;

    /// Closes the session.
    async fn end(self) -> Result<()>;
}

enum Inner {
    Direct(AnyConnection),
    Pooled(PoolConnection<Any>),
}

/// A [`Connection`] backed by `sqlx::any`.
pub struct SqlxConnection {
    id: ConnectionId,
    inner: Inner,
}

impl fmt::Debug for SqlxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner {
            Inner::Direct(_) => "direct",
            Inner::Pooled(_) => "pooled",
        };
        f.debug_struct("SqlxConnection")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}

impl SqlxConnection {
    pub(crate) fn pooled(connection: PoolConnection<Any>) -> Self {
        Self {
            id: ConnectionId::next(),
            inner: Inner::Pooled(connection),
        }
    }

    fn raw(&mut self) -> &mut AnyConnection {
        match &mut self.inner {
            Inner::Direct(connection) => connection,
            Inner::Pooled(connection) => &mut **connection,
        }
    }
}

#[async_trait]
impl Connection for SqlxConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput> {
        let query = bind_params(sqlx::query(sql), params);
        let mut output = QueryOutput::default();
        let mut stream = self.raw().fetch_many(query);
        while let Some(item) = stream.try_next().await.map_err(ClientError::Execution)? {
            match item {
                Either::Left(result) => output.rows_affected += result.rows_affected(),
                Either::Right(row) => output.push_row(&row),
            }
        }
        Ok(output)
    }

    async fn end(self) -> Result<()> {
        match self.inner {
            Inner::Direct(connection) => connection.close().await.map_err(ClientError::Execution),
            // Returned to the pool on drop.
            Inner::Pooled(connection) => {
                drop(connection);
                Ok(())
            }
        }
    }
}

/// Opens standalone connections to one endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    settings: ConnectionSettings,
}

impl ConnectionProvider {
    /// Creates a provider for `settings`.
    #[must_use]
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    /// Endpoint settings.
    #[must_use]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Opens a new connection. Failures are not retried.
    pub async fn open(&self) -> Result<SqlxConnection> {
        install_drivers();
        let connection = AnyConnection::connect(&self.settings.url)
            .await
            .map_err(ClientError::Connect)?;
        let id = ConnectionId::next();
        info!(connection = %id, "Opened connection");
        Ok(SqlxConnection {
            id,
            inner: Inner::Direct(connection),
        })
    }
}
