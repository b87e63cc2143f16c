//! Dialect-specific grammars.
//!
//! A grammar knows how one database engine quotes identifiers and how it
//! spells every schema command. The [`Capabilities`] table returned by each
//! grammar drives the structural differences: whether keys must be inlined
//! into `create table`, whether one `alter table` may add several columns,
//! and whether columns can be dropped at all.

mod mysql;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use crate::blueprint::{Blueprint, Column, Command, DefaultValue, ForeignCommand, IndexCommand};
use crate::error::{Result, SchemaError};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQLite.
    Sqlite,
    /// MySQL / MariaDB.
    #[serde(rename = "mysql")]
    MySql,
    /// PostgreSQL.
    Postgres,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Self; 3] = [Self::Sqlite, Self::MySql, Self::Postgres];

    /// Returns the dialect name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Infers the dialect from a connection URL scheme.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?;
        scheme.parse().ok()
    }

    /// Returns the schema grammar for this dialect.
    #[must_use]
    pub fn grammar(self) -> Box<dyn SchemaGrammar> {
        match self {
            Self::Sqlite => Box::new(SqliteGrammar::new()),
            Self::MySql => Box::new(MySqlGrammar::new()),
            Self::Postgres => Box::new(PostgresGrammar::new()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!("unknown dialect '{other}'")),
        }
    }
}

/// Structural differences between dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Primary and foreign keys can only be declared in `create table`.
    pub inline_keys: bool,
    /// One `alter table` statement may add several columns.
    pub multi_column_add: bool,
    /// `alter table ... drop column` is available.
    pub drop_column: bool,
}

/// Column modifiers, applied after the type fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `null` / `not null`.
    Nullable,
    /// `default <literal>`.
    Default,
    /// Auto-increment (and the implicit primary key it carries).
    Increment,
}

/// Identifier quoting rules of a dialect.
pub trait Grammar {
    /// Returns the identifier quote character.
    fn quote_char(&self) -> char;

    /// Wraps a single identifier in quotes, doubling embedded quote
    /// characters. `*` is returned unwrapped.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let q = self.quote_char();
        let escaped = value.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Wraps a possibly dotted identifier segment by segment.
    fn wrap(&self, value: &str) -> String {
        value
            .split('.')
            .map(|segment| self.wrap_value(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Wraps a table name.
    fn wrap_table(&self, table: &str) -> String {
        self.wrap(table)
    }

    /// Wraps and comma-joins a column list.
    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Schema grammar: one implementation per dialect.
///
/// Commands whose SQL differs between dialects have no default body, so a
/// new dialect has to spell each of them out.
pub trait SchemaGrammar: Grammar + Send + Sync {
    /// Returns the dialect this grammar implements.
    fn dialect(&self) -> Dialect;

    /// Returns the dialect's capability table.
    fn capabilities(&self) -> Capabilities;

    /// Modifiers in the order they are appended to a column definition.
    fn modifiers(&self) -> &'static [Modifier] {
        &[Modifier::Nullable, Modifier::Default, Modifier::Increment]
    }

    /// Returns the SQL type fragment for a column.
    fn type_sql(&self, column: &Column) -> String;

    /// Returns the SQL for one modifier, if it applies to the column.
    fn modify(&self, modifier: Modifier, column: &Column) -> Option<String> {
        match modifier {
            Modifier::Nullable => self.modify_nullable(column),
            Modifier::Default => self.modify_default(column),
            Modifier::Increment => self.modify_increment(column),
        }
    }

    /// Nullable modifier. Auto-increment columns are implicit non-null
    /// primary keys and carry no nullable clause.
    fn modify_nullable(&self, column: &Column) -> Option<String> {
        if column.is_increment() {
            return None;
        }
        Some(if column.nullable { " null" } else { " not null" }.to_string())
    }

    /// Default modifier.
    fn modify_default(&self, column: &Column) -> Option<String> {
        column
            .default
            .as_ref()
            .map(|value| format!(" default {}", self.default_sql(value)))
    }

    /// Increment modifier.
    fn modify_increment(&self, column: &Column) -> Option<String>;

    /// Renders a default value literal.
    fn default_sql(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => quote_literal(s),
        }
    }

    /// Renders a full column definition.
    fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!("{} {}", self.wrap(&column.name), self.type_sql(column));
        for modifier in self.modifiers() {
            if let Some(fragment) = self.modify(*modifier, column) {
                sql.push_str(&fragment);
            }
        }
        sql
    }

    /// Renders every column definition of the blueprint.
    fn column_definitions(&self, blueprint: &Blueprint) -> Vec<String> {
        blueprint
            .columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect()
    }

    /// Returns the parameterized query probing whether a table exists.
    fn compile_table_exists(&self) -> String;

    /// Compiles a `create` command.
    ///
    /// On inline-key dialects every `foreign` command and the `primary`
    /// command of the blueprint are appended to the column list, in that
    /// order.
    fn compile_create_table(&self, blueprint: &Blueprint) -> Result<String> {
        let mut sql = format!(
            "create table {} ({}",
            self.wrap_table(blueprint.table()),
            self.column_definitions(blueprint).join(", ")
        );

        if self.capabilities().inline_keys {
            for command in blueprint.commands_named("foreign") {
                if let Command::Foreign(foreign) = command {
                    sql.push_str(", ");
                    sql.push_str(&self.foreign_key_clause(foreign));
                }
            }
            if let Some(Command::Primary(primary)) = blueprint.commands_named("primary").next() {
                sql.push_str(&format!(", primary key ({})", self.columnize(&primary.columns)));
            }
        }

        sql.push(')');
        Ok(sql)
    }

    /// Compiles an `add` command.
    ///
    /// Dialects limited to single-column `alter table` get one statement per
    /// column.
    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let table = self.wrap_table(blueprint.table());
        let columns = self.column_definitions(blueprint);

        if self.capabilities().multi_column_add {
            let clauses: Vec<String> = columns
                .iter()
                .map(|c| format!("{} {}", self.add_column_keyword(), c))
                .collect();
            Ok(vec![format!("alter table {} {}", table, clauses.join(", "))])
        } else {
            Ok(columns
                .iter()
                .map(|c| format!("alter table {table} add column {c}"))
                .collect())
        }
    }

    /// Keyword introducing each clause of a multi-column add.
    fn add_column_keyword(&self) -> &'static str {
        "add column"
    }

    /// Compiles a `rename` command.
    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> Result<String> {
        Ok(format!(
            "alter table {} rename to {}",
            self.wrap_table(blueprint.table()),
            self.wrap_table(to)
        ))
    }

    /// Compiles a `dropTable` command.
    fn compile_drop_table(&self, blueprint: &Blueprint) -> Result<String> {
        Ok(format!("drop table {}", self.wrap_table(blueprint.table())))
    }

    /// Compiles a `dropTableIfExists` command.
    fn compile_drop_table_if_exists(&self, blueprint: &Blueprint) -> Result<String> {
        Ok(format!(
            "drop table if exists {}",
            self.wrap_table(blueprint.table())
        ))
    }

    /// Compiles a `dropColumn` command.
    fn compile_drop_column(&self, blueprint: &Blueprint, columns: &[String]) -> Result<String> {
        if !self.capabilities().drop_column {
            return Err(self.unsupported("dropColumn"));
        }
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("drop column {}", self.wrap(c)))
            .collect();
        Ok(format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            clauses.join(", ")
        ))
    }

    /// Compiles a `unique` command.
    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String>;

    /// Compiles an `index` command.
    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String>;

    /// Compiles a `dropUnique` command.
    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> Result<String>;

    /// Compiles a `dropIndex` command.
    fn compile_drop_index(&self, blueprint: &Blueprint, index: &str) -> Result<String>;

    /// Compiles a `foreign` command. Returns `None` when the key was already
    /// emitted as part of `create table`.
    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        command: &ForeignCommand,
    ) -> Result<Option<String>>;

    /// Compiles a `primary` command. Returns `None` when the key was already
    /// emitted as part of `create table`.
    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        command: &IndexCommand,
    ) -> Result<Option<String>>;

    /// Compiles a `dropForeign` command.
    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String>;

    /// Compiles a `dropPrimary` command.
    fn compile_drop_primary(&self, blueprint: &Blueprint, index: &str) -> Result<String>;

    /// Renders `foreign key (...) references table (...)` with its actions.
    fn foreign_key_clause(&self, command: &ForeignCommand) -> String {
        let mut sql = format!(
            "foreign key ({}) references {} ({})",
            self.columnize(&command.columns),
            self.wrap_table(&command.on),
            self.columnize(&command.references)
        );
        if let Some(action) = command.on_delete {
            sql.push_str(" on delete ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = command.on_update {
            sql.push_str(" on update ");
            sql.push_str(action.as_sql());
        }
        sql
    }

    /// Builds the error for an operation this dialect cannot express.
    fn unsupported(&self, operation: &'static str) -> SchemaError {
        SchemaError::UnsupportedOperation {
            dialect: self.dialect(),
            operation,
        }
    }
}

/// Quotes a string literal, doubling embedded single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
