//! SQLite schema grammar.
//!
//! SQLite cannot add keys to an existing table, so primary and foreign keys
//! are declared inline when the table is created. `alter table` adds a single
//! column per statement and cannot drop columns.

use crate::blueprint::{Blueprint, Column, ColumnType, ForeignCommand, IndexCommand};
use crate::error::Result;

use super::{Capabilities, Dialect, Grammar, SchemaGrammar};

/// SQLite schema grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteGrammar;

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn create_index(&self, blueprint: &Blueprint, command: &IndexCommand, unique: bool) -> String {
        format!(
            "create {}index {} on {} ({})",
            if unique { "unique " } else { "" },
            self.wrap_value(&command.index),
            self.wrap_table(blueprint.table()),
            self.columnize(&command.columns)
        )
    }
}

impl Grammar for SqliteGrammar {
    fn quote_char(&self) -> char {
        '"'
    }
}

impl SchemaGrammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            inline_keys: true,
            multi_column_add: false,
            drop_column: false,
        }
    }

    fn type_sql(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::String { .. } => "varchar",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float { .. } => "float",
            ColumnType::Decimal { .. } => "float",
            ColumnType::Boolean => "tinyint",
            ColumnType::Enum { .. } => "varchar",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "datetime",
            ColumnType::Binary => "blob",
        }
        .to_string()
    }

    fn modify_increment(&self, column: &Column) -> Option<String> {
        column
            .is_increment()
            .then(|| " primary key autoincrement".to_string())
    }

    fn compile_table_exists(&self) -> String {
        "select * from sqlite_master where type = 'table' and name = ?".to_string()
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(self.create_index(blueprint, command, true))
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<String> {
        Ok(self.create_index(blueprint, command, false))
    }

    fn compile_drop_unique(&self, _blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!("drop index {}", self.wrap_value(index)))
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!("drop index {}", self.wrap_value(index)))
    }

    fn compile_foreign(
        &self,
        _blueprint: &Blueprint,
        _command: &ForeignCommand,
    ) -> Result<Option<String>> {
        // Emitted by compile_create_table.
        Ok(None)
    }

    fn compile_primary(
        &self,
        _blueprint: &Blueprint,
        _command: &IndexCommand,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn compile_drop_foreign(&self, _blueprint: &Blueprint, _index: &str) -> Result<String> {
        Err(self.unsupported("dropForeign"))
    }

    fn compile_drop_primary(&self, _blueprint: &Blueprint, _index: &str) -> Result<String> {
        Err(self.unsupported("dropPrimary"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::DefaultValue;
    use crate::error::SchemaError;

    fn grammar() -> SqliteGrammar {
        SqliteGrammar::new()
    }

    #[test]
    fn test_create_table_simple() {
        let blueprint = Blueprint::new("users")
            .column(Column::increments("id"))
            .column(Column::string("name"))
            .column(Column::integer("age").nullable())
            .create();

        let sql = grammar().compile_create_table(&blueprint).unwrap();
        assert_eq!(
            sql,
            "create table \"users\" (\"id\" integer primary key autoincrement, \
             \"name\" varchar not null, \"age\" integer null)"
        );
    }

    #[test]
    fn test_create_table_inlines_keys() {
        let blueprint = Blueprint::new("posts")
            .column(Column::integer("author_id"))
            .column(Column::string("slug"))
            .create()
            .foreign(&["author_id"], "users", &["id"])
            .primary(&["author_id", "slug"]);

        let sql = grammar().compile_create_table(&blueprint).unwrap();
        assert_eq!(
            sql,
            "create table \"posts\" (\"author_id\" integer not null, \"slug\" varchar not null, \
             foreign key (\"author_id\") references \"users\" (\"id\"), \
             primary key (\"author_id\", \"slug\"))"
        );
    }

    #[test]
    fn test_add_one_statement_per_column() {
        let blueprint = Blueprint::new("users")
            .column(Column::string("email"))
            .column(Column::boolean("active").default(true))
            .add();

        let sql = grammar().compile_add(&blueprint).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table \"users\" add column \"email\" varchar not null",
                "alter table \"users\" add column \"active\" tinyint not null default 1",
            ]
        );
    }

    #[test]
    fn test_default_string_is_quoted() {
        let column = Column::string("status").default(DefaultValue::from("it's new"));
        assert_eq!(
            grammar().column_definition(&column),
            "\"status\" varchar not null default 'it''s new'"
        );
    }

    #[test]
    fn test_drop_column_unsupported() {
        let blueprint = Blueprint::new("users").drop_column(&["email"]);
        let err = grammar()
            .compile_drop_column(&blueprint, &["email".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedOperation {
                dialect: Dialect::Sqlite,
                operation: "dropColumn",
            }
        );
        let message = err.to_string();
        assert!(message.contains("dropColumn"));
        assert!(message.contains("sqlite"));
    }

    #[test]
    fn test_indexes() {
        let blueprint = Blueprint::new("users");
        let command = IndexCommand {
            index: "users_email_unique".to_string(),
            columns: vec!["email".to_string()],
        };
        assert_eq!(
            grammar().compile_unique(&blueprint, &command).unwrap(),
            "create unique index \"users_email_unique\" on \"users\" (\"email\")"
        );
        assert_eq!(
            grammar().compile_index(&blueprint, &command).unwrap(),
            "create index \"users_email_unique\" on \"users\" (\"email\")"
        );
        assert_eq!(
            grammar()
                .compile_drop_index(&blueprint, "users_email_unique")
                .unwrap(),
            "drop index \"users_email_unique\""
        );
    }

    #[test]
    fn test_rename_and_drop() {
        let blueprint = Blueprint::new("users");
        assert_eq!(
            grammar().compile_rename(&blueprint, "accounts").unwrap(),
            "alter table \"users\" rename to \"accounts\""
        );
        assert_eq!(
            grammar().compile_drop_table(&blueprint).unwrap(),
            "drop table \"users\""
        );
        assert_eq!(
            grammar().compile_drop_table_if_exists(&blueprint).unwrap(),
            "drop table if exists \"users\""
        );
    }

    #[test]
    fn test_type_names() {
        let g = grammar();
        assert_eq!(g.type_sql(&Column::decimal("d", 10, 2)), "float");
        assert_eq!(g.type_sql(&Column::boolean("b")), "tinyint");
        assert_eq!(g.type_sql(&Column::timestamp("t")), "datetime");
        assert_eq!(g.type_sql(&Column::binary("b")), "blob");
    }
}
