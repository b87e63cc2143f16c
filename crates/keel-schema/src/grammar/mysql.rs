//! MySQL schema grammar.

use crate::blueprint::{Blueprint, Column, ColumnType, ForeignCommand, IndexCommand};
use crate::error::Result;

use super::{Capabilities, Dialect, Grammar, SchemaGrammar, quote_literal};

/// MySQL schema grammar.
///
/// Keys are added with `alter table` after creation, and several columns
/// can be added in one statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlGrammar;

impl MySqlGrammar {
    /// Creates a new MySQL grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_key(&self, blueprint: &Blueprint, command: &IndexCommand, kind: &str) -> String {
        format!(
            "alter table {} add {} {}({})",
            self.wrap_table(blueprint.table()),
            kind,
            self.wrap_value(&command.index),
            self.columnize(&command.columns)
        )
    }
}

impl Grammar for MySqlGrammar {
    fn quote_char(&self) -> char {
        '`'
    }
}

impl SchemaGrammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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
            ColumnType::Integer => "int(11)".to_string(),
            ColumnType::Float { precision, scale } => format!("float({precision}, {scale})"),
            ColumnType::Decimal { precision, scale } => {
                format!("decimal({precision}, {scale})")
            }
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Enum { values } => {
                let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
                format!("enum({})", values.join(", "))
            }
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime => "datetime".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Binary => "blob".to_string(),
        }
    }

    fn modify_increment(&self, column: &Column) -> Option<String> {
        column
            .is_increment()
            .then(|| " auto_increment primary key".to_string())
    }

    fn add_column_keyword(&self) -> &'static str {
        "add"
    }

    fn compile_table_exists(&self) -> String {
        "select * from information_schema.tables where table_schema = ? and table_name = ?"
            .to_string()
    }

    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> Result<String> {
        Ok(format!(
            "rename table {} to {}",
            self.wrap_table(blueprint.table()),
            self.wrap_table(to)
        ))
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(self.add_key(blueprint, command, "unique"))
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(self.add_key(blueprint, command, "index"))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        self.compile_drop_index(blueprint, index)
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!(
            "alter table {} drop index {}",
            self.wrap_table(blueprint.table()),
            self.wrap_value(index)
        ))
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
            "alter table {} add primary key ({})",
            self.wrap_table(blueprint.table()),
            self.columnize(&command.columns)
        )))
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!(
            "alter table {} drop foreign key {}",
            self.wrap_table(blueprint.table()),
            self.wrap_value(index)
        ))
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, _index: &str) -> Result<String> {
        Ok(format!(
            "alter table {} drop primary key",
            self.wrap_table(blueprint.table())
        ))
    }
}
