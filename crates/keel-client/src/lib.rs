//! Query dispatch for keel.
//!
//! A [`Database`] is created from a [`ClientConfig`] and owns everything
//! needed to reach one target: the dialect's
//! [`SchemaCompiler`](keel_schema::SchemaCompiler), a [`QueryDispatcher`]
//! over a bounded [`SqlxPool`] (or a single connection when pooling is
//! disabled) and a [`ConnectionProvider`] for caller-managed connections.
//!
//! ```no_run
//! use keel_client::{ClientConfig, Database, Value};
//! use keel_schema::{Blueprint, Column};
//!
//! # async fn run() -> keel_client::Result<()> {
//! let db = Database::connect(ClientConfig::new("sqlite:app.db")).await?;
//!
//! let users = Blueprint::new("users")
//!     .column(Column::increments("id"))
//!     .column(Column::string("name"))
//!     .create();
//! db.run_blueprint(&users).await?;
//!
//! db.execute("insert into users (name) values (?)", &[Value::from("alice")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod pool;
pub mod value;

pub use config::{ClientConfig, ConnectionSettings, PoolConfig, PoolSetting};
pub use connection::{Connection, ConnectionId, ConnectionProvider, SqlxConnection};
pub use database::Database;
pub use dispatcher::QueryDispatcher;
pub use error::{ClientError, Result};
pub use pool::{ResourcePool, SqlxPool};
pub use value::{QueryOutput, Value};
