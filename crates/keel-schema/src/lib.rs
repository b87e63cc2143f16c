//! Multi-dialect schema compiler.
//!
//! `keel-schema` turns a structured table description into the exact DDL a
//! database engine expects:
//! - A [`Blueprint`] names a table, its columns and the commands to run.
//! - A [`SchemaGrammar`] per dialect knows the quoting rules and spelling of
//!   every command, plus a [`Capabilities`] table for the structural
//!   differences (inline keys, multi-column `alter table`, dropping columns).
//! - The [`SchemaCompiler`] validates the blueprint and compiles its commands
//!   in order.
//!
//! # Example
//!
//! ```rust
//! use keel_schema::{Blueprint, Column, Dialect, SchemaCompiler};
//!
//! let blueprint = Blueprint::new("users")
//!     .column(Column::increments("id"))
//!     .column(Column::string("name"))
//!     .column(Column::integer("age").nullable())
//!     .create();
//!
//! let sql = SchemaCompiler::new(Dialect::Sqlite).compile(&blueprint).unwrap();
//! assert_eq!(
//!     sql,
//!     vec![
//!         "create table \"users\" (\"id\" integer primary key autoincrement, \
//!          \"name\" varchar not null, \"age\" integer null)"
//!     ]
//! );
//! ```

pub mod blueprint;
pub mod compiler;
pub mod error;
pub mod grammar;

pub use blueprint::{
    Blueprint, Column, ColumnType, Command, DefaultValue, ForeignCommand, ForeignKeyAction,
    IndexCommand, IndexKind,
};
pub use compiler::SchemaCompiler;
pub use error::{Result, SchemaError};
pub use grammar::{
    Capabilities, Dialect, Grammar, Modifier, MySqlGrammar, PostgresGrammar, SchemaGrammar,
    SqliteGrammar,
};
