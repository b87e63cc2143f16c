//! Integration tests for blueprint compilation across dialects.

use keel_schema::{
    Blueprint, Column, ColumnType, Command, Dialect, SchemaCompiler, SchemaError, SchemaGrammar,
};

fn users_blueprint() -> Blueprint {
    Blueprint::new("users")
        .column(Column::increments("id"))
        .column(Column::string("name"))
        .column(Column::integer("age").nullable())
}

fn expected_type(dialect: Dialect, type_name: &str) -> &'static str {
    match (dialect, type_name) {
        (Dialect::Sqlite, "string") => "varchar",
        (Dialect::Sqlite, "text") => "text",
        (Dialect::Sqlite, "integer") => "integer",
        (Dialect::Sqlite, "float" | "decimal") => "float",
        (Dialect::Sqlite, "boolean") => "tinyint",
        (Dialect::Sqlite, "enum") => "varchar",
        (Dialect::Sqlite, "date") => "date",
        (Dialect::Sqlite, "datetime" | "timestamp") => "datetime",
        (Dialect::Sqlite, "time") => "time",
        (Dialect::Sqlite, "binary") => "blob",
        (Dialect::MySql, "string") => "varchar(255)",
        (Dialect::MySql, "text") => "text",
        (Dialect::MySql, "integer") => "int(11)",
        (Dialect::MySql, "float") => "float(8, 2)",
        (Dialect::MySql, "decimal") => "decimal(8, 2)",
        (Dialect::MySql, "boolean") => "tinyint(1)",
        (Dialect::MySql, "enum") => "enum('a', 'b')",
        (Dialect::MySql, "date") => "date",
        (Dialect::MySql, "datetime") => "datetime",
        (Dialect::MySql, "time") => "time",
        (Dialect::MySql, "timestamp") => "timestamp",
        (Dialect::MySql, "binary") => "blob",
        (Dialect::Postgres, "string" | "enum") => "varchar(255)",
        (Dialect::Postgres, "text") => "text",
        (Dialect::Postgres, "integer") => "integer",
        (Dialect::Postgres, "float") => "real",
        (Dialect::Postgres, "decimal") => "decimal(8, 2)",
        (Dialect::Postgres, "boolean") => "boolean",
        (Dialect::Postgres, "date") => "date",
        (Dialect::Postgres, "datetime" | "timestamp") => "timestamp",
        (Dialect::Postgres, "time") => "time",
        (Dialect::Postgres, "binary") => "bytea",
        _ => panic!("no expected type for {dialect} {type_name}"),
    }
}

#[test]
fn type_emitters_are_total() {
    for dialect in Dialect::ALL {
        let grammar = dialect.grammar();
        for column_type in ColumnType::all() {
            let column = Column::new("c", column_type.clone());
            assert_eq!(
                grammar.type_sql(&column),
                expected_type(dialect, column_type.name()),
                "{dialect} {}",
                column_type.name()
            );

            // Every type also compiles inside a full create statement.
            let blueprint = Blueprint::new("t")
                .column(column.clone().nullable())
                .column(Column::new("d", column_type.clone()))
                .create();
            let sql = SchemaCompiler::new(dialect).compile(&blueprint).unwrap();
            assert_eq!(sql.len(), 1);
            assert!(
                sql[0].contains(&format!(" {} null", expected_type(dialect, column_type.name()))),
                "{dialect}: {}",
                sql[0]
            );
        }
    }
}

#[test]
fn increment_column_with_explicit_primary_is_rejected() {
    for dialect in Dialect::ALL {
        let blueprint = users_blueprint().create().primary(&["id"]);
        let err = SchemaCompiler::new(dialect).compile(&blueprint).unwrap_err();
        assert!(
            matches!(err, SchemaError::ConflictingPrimaryKey { ref column, .. } if column == "id"),
            "{dialect}: {err}"
        );
    }
}

#[test]
fn empty_enum_is_rejected_before_any_sql() {
    let blueprint = Blueprint::new("t")
        .column(Column::enumeration("role", Vec::<String>::new()))
        .create();
    for dialect in Dialect::ALL {
        let err = SchemaCompiler::new(dialect).compile(&blueprint).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyEnum { .. }), "{dialect}: {err}");
    }
}

#[test]
fn users_scenario_on_sqlite() {
    let blueprint = users_blueprint().create();
    let sql = SchemaCompiler::new(Dialect::Sqlite)
        .compile(&blueprint)
        .unwrap();

    assert_eq!(
        sql,
        vec![
            "create table \"users\" (\"id\" integer primary key autoincrement, \
             \"name\" varchar not null, \"age\" integer null)"
        ]
    );
}

#[test]
fn users_scenario_on_other_dialects() {
    let blueprint = users_blueprint().create();

    let mysql = SchemaCompiler::new(Dialect::MySql)
        .compile(&blueprint)
        .unwrap();
    assert_eq!(
        mysql,
        vec![
            "create table `users` (`id` int(11) auto_increment primary key, \
             `name` varchar(255) not null, `age` int(11) null)"
        ]
    );

    let postgres = SchemaCompiler::new(Dialect::Postgres)
        .compile(&blueprint)
        .unwrap();
    assert_eq!(
        postgres,
        vec![
            "create table \"users\" (\"id\" serial primary key, \
             \"name\" varchar(255) not null, \"age\" integer null)"
        ]
    );
}

#[test]
fn inline_keys_appear_exactly_once() {
    for extra_columns in 0..4 {
        let mut blueprint = Blueprint::new("memberships")
            .column(Column::integer("user_id"))
            .column(Column::integer("team_id"));
        for i in 0..extra_columns {
            blueprint = blueprint.column(Column::string(format!("note_{i}")));
        }
        let blueprint = blueprint
            .create()
            .primary(&["user_id", "team_id"])
            .foreign(&["team_id"], "teams", &["id"]);

        let sql = SchemaCompiler::new(Dialect::Sqlite)
            .compile(&blueprint)
            .unwrap();

        assert_eq!(sql.len(), 1);
        assert_eq!(sql[0].matches("primary key").count(), 1);
        assert_eq!(sql[0].matches("foreign key").count(), 1);
        // Columns, then foreign keys, then the primary key.
        let foreign_at = sql[0].find("foreign key").unwrap();
        let primary_at = sql[0].find("primary key").unwrap();
        assert!(foreign_at < primary_at);
        assert!(sql[0].ends_with("primary key (\"user_id\", \"team_id\"))"));
    }
}

#[test]
fn post_hoc_keys_emit_alter_statements() {
    let blueprint = Blueprint::new("memberships")
        .column(Column::integer("user_id"))
        .column(Column::integer("team_id"))
        .create()
        .foreign(&["team_id"], "teams", &["id"])
        .primary(&["user_id", "team_id"]);

    for dialect in [Dialect::MySql, Dialect::Postgres] {
        let sql = SchemaCompiler::new(dialect).compile(&blueprint).unwrap();
        assert_eq!(sql.len(), 3, "{dialect}: {sql:?}");
        assert!(!sql[0].contains("primary key"));
        assert!(sql[1].contains("foreign key"));
        assert!(sql[2].contains("primary key"));
    }
}

#[test]
fn add_yields_one_statement_per_column_on_sqlite() {
    for n in 1..=5 {
        let mut blueprint = Blueprint::new("users");
        for i in 0..n {
            blueprint = blueprint.column(Column::string(format!("col_{i}")));
        }
        let blueprint = blueprint.add();

        let sql = SchemaCompiler::new(Dialect::Sqlite)
            .compile(&blueprint)
            .unwrap();
        assert_eq!(sql.len(), n);
        for (i, statement) in sql.iter().enumerate() {
            assert_eq!(statement.matches("add column").count(), 1);
            assert!(statement.contains(&format!("\"col_{i}\"")));
        }

        let mysql = SchemaCompiler::new(Dialect::MySql)
            .compile(&blueprint)
            .unwrap();
        assert_eq!(mysql.len(), 1);
    }
}

#[test]
fn drop_column_on_sqlite_names_operation_and_dialect() {
    let blueprint = users_blueprint().drop_column(&["age"]);
    let err = SchemaCompiler::new(Dialect::Sqlite)
        .compile(&blueprint)
        .unwrap_err();

    assert!(matches!(err, SchemaError::UnsupportedOperation { .. }));
    let message = err.to_string();
    assert!(message.contains("dropColumn"), "{message}");
    assert!(message.contains("sqlite"), "{message}");
}

#[test]
fn drop_column_on_postgres() {
    let blueprint = users_blueprint().drop_column(&["age", "name"]);
    let sql = SchemaCompiler::new(Dialect::Postgres)
        .compile(&blueprint)
        .unwrap();
    assert_eq!(
        sql,
        vec!["alter table \"users\" drop column \"age\", drop column \"name\""]
    );
}

#[test]
fn blueprint_from_json_compiles() {
    let json = r#"{
        "table": "posts",
        "columns": [
            {"name": "id", "type": "integer", "autoIncrement": true},
            {"name": "title", "type": "string"},
            {"name": "published", "type": "boolean", "defaultValue": false}
        ],
        "commands": [
            {"name": "create"},
            {"name": "index", "index": "posts_title_index", "columns": ["title"]},
            {"name": "rename", "to": "articles"}
        ]
    }"#;
    let blueprint: Blueprint = serde_json::from_str(json).unwrap();
    assert!(matches!(blueprint.commands()[2], Command::Rename { .. }));

    let sql = SchemaCompiler::new(Dialect::Sqlite)
        .compile(&blueprint)
        .unwrap();
    assert_eq!(
        sql,
        vec![
            "create table \"posts\" (\"id\" integer primary key autoincrement, \
             \"title\" varchar not null, \"published\" tinyint not null default 0)",
            "create index \"posts_title_index\" on \"posts\" (\"title\")",
            "alter table \"posts\" rename to \"articles\"",
        ]
    );
}
