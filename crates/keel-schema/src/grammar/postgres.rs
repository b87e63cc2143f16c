//! PostgreSQL schema grammar.

use crate::blueprint::{Blueprint, Column, ColumnType, DefaultValue, ForeignCommand, IndexCommand};
use crate::error::Result;

use super::{Capabilities, Dialect, Grammar, SchemaGrammar};

/// PostgreSQL schema grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresGrammar;

impl PostgresGrammar {
    /// Creates a new PostgreSQL grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn drop_constraint(&self, blueprint: &Blueprint, index: &str) -> String {
        format!(
            "alter table {} drop constraint {}",
            self.wrap_table(blueprint.table()),
            self.wrap_value(index)
        )
    }
}

impl Grammar for PostgresGrammar {
    fn quote_char(&self) -> char {
        '"'
    }
}

impl SchemaGrammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            inline_keys: false,
            multi_column_add: true,
            drop_column: true,
        }
    }

    fn type_sql(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::String { length } => format!("varchar({length})"),
            ColumnType::Text => "text".to_string(),
            // PostgreSQL spells auto-increment as a type.
            ColumnType::Integer if column.auto_increment => "serial".to_string(),
            ColumnType::Integer => "integer".to_string(),
            ColumnType::Float { .. } => "real".to_string(),
            ColumnType::Decimal { precision, scale } => {
                format!("decimal({precision}, {scale})")
            }
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Enum { .. } => "varchar(255)".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime => "timestamp".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Binary => "bytea".to_string(),
        }
    }

    fn modify_increment(&self, column: &Column) -> Option<String> {
        column.is_increment().then(|| " primary key".to_string())
    }

    fn default_sql(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Boolean(b) => b.to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => super::quote_literal(s),
        }
    }

    fn compile_table_exists(&self) -> String {
        "select * from information_schema.tables where table_name = $1".to_string()
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(format!(
            "alter table {} add constraint {} unique ({})",
            self.wrap_table(blueprint.table()),
            self.wrap_value(&command.index),
            self.columnize(&command.columns)
        ))
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(format!(
            "create index {} on {} ({})",
            self.wrap_value(&command.index),
            self.wrap_table(blueprint.table()),
            self.columnize(&command.columns)
        ))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(self.drop_constraint(blueprint, index))
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!("drop index {}", self.wrap_value(index)))
    }

    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        command: &ForeignCommand,
    ) -> Result<Option<String>> {
        Ok(Some(format!(
            "alter table {} add constraint {} {}",
            self.wrap_table(blueprint.table()),
            self.wrap_value(&command.index),
            self.foreign_key_clause(command)
        )))
    }

    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        command: &IndexCommand,
    ) -> Result<Option<String>> {
        Ok(Some(format!(
            "alter table {} add constraint {} primary key ({})",
            self.wrap_table(blueprint.table()),
            self.wrap_value(&command.index),
            self.columnize(&command.columns)
        )))
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(self.drop_constraint(blueprint, index))
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(self.drop_constraint(blueprint, index))
    }
}
