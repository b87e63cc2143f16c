//! Per-target database context.

use std::time::Duration;

use keel_schema::{Blueprint, Dialect, SchemaCompiler};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConnectionSettings, PoolSetting};
use crate::connection::{ConnectionProvider, SqlxConnection};
use crate::dispatcher::QueryDispatcher;
use crate::error::{ClientError, Result};
use crate::pool::SqlxPool;
use crate::value::{QueryOutput, Value};

/// Everything needed to talk to one configured database: the dialect's
/// compiler, the dispatcher and a provider for caller-managed connections.
#[derive(Debug)]
pub struct Database {
    settings: ConnectionSettings,
    dialect: Dialect,
    compiler: SchemaCompiler,
    dispatcher: QueryDispatcher<SqlxPool>,
    provider: ConnectionProvider,
}

impl Database {
    /// Connects when `config` names an endpoint; returns `None` otherwise.
    pub async fn init(config: ClientConfig) -> Result<Option<Self>> {
        if config.connection.is_none() {
            warn!("No connection settings configured; database initialization skipped");
            return Ok(None);
        }
        Self::connect(config).await.map(Some)
    }

    /// Connects to the endpoint named by `config`.
    ///
    /// With pooling enabled no connection is opened until the first
    /// statement. With `pool: false` one connection is opened now and
    /// reused by every call.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let settings = config.connection.clone().ok_or_else(|| {
            ClientError::Configuration("no connection settings configured".to_string())
        })?;
        let dialect = settings.dialect()?;
        let provider = ConnectionProvider::new(settings.clone());

        let dispatcher = match config.pool {
            PoolSetting::Enabled(pool) => QueryDispatcher::pooled(SqlxPool::new(&settings, &pool)?),
            PoolSetting::Disabled => QueryDispatcher::single(provider.open().await?),
        }
        .with_statement_logging(config.debug);

        info!(
            %dialect,
            pooled = dispatcher.is_pooled(),
            "Database initialized"
        );
        Ok(Self {
            settings,
            dialect,
            compiler: SchemaCompiler::new(dialect),
            dispatcher,
            provider,
        })
    }

    /// Target dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Schema compiler for the target dialect.
    #[must_use]
    pub fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    /// Statement dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &QueryDispatcher<SqlxPool> {
        &self.dispatcher
    }

    /// Runs one statement on a borrowed connection.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryOutput> {
        self.dispatcher.execute(sql, params, None).await
    }

    /// Runs one statement on a connection the caller manages.
    pub async fn execute_on(
        &self,
        connection: &mut SqlxConnection,
        sql: &str,
        params: &[Value],
    ) -> Result<QueryOutput> {
        self.dispatcher.execute(sql, params, Some(connection)).await
    }

    /// Runs one statement, failing once `limit` elapses.
    pub async fn execute_with_timeout(
        &self,
        sql: &str,
        params: &[Value],
        limit: Duration,
    ) -> Result<QueryOutput> {
        self.dispatcher
            .execute_with_timeout(sql, params, None, limit)
            .await
    }

    /// Opens a standalone connection. The caller owns it and must `end` it.
    pub async fn open_connection(&self) -> Result<SqlxConnection> {
        self.provider.open().await
    }

    /// Compiles `blueprint` for the target dialect.
    pub fn compile(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        Ok(self.compiler.compile(blueprint)?)
    }

    /// Compiles `blueprint` and runs its statements in order, stopping at the
    /// first failure. Returns the statements that were run.
    pub async fn run_blueprint(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let statements = self.compile(blueprint)?;
        for statement in &statements {
            self.execute(statement, &[]).await?;
        }
        debug!(
            table = %blueprint.table(),
            statements = statements.len(),
            "Applied blueprint"
        );
        Ok(statements)
    }

    /// Reports whether `table` exists.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = self.compiler.table_exists_sql();
        let params = match self.dialect {
            Dialect::MySql => {
                let schema = self.settings.database_name().ok_or_else(|| {
                    ClientError::Configuration(format!(
                        "connection url '{}' names no database",
                        self.settings.url
                    ))
                })?;
                vec![Value::from(schema), Value::from(table)]
            }
            Dialect::Sqlite | Dialect::Postgres => vec![Value::from(table)],
        };
        let output = self.execute(&sql, &params).await?;
        Ok(!output.rows.is_empty())
    }

    /// Closes the pool or the single connection.
    pub async fn close(self) -> Result<()> {
        self.dispatcher.close().await
    }
}
