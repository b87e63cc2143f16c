//! End-to-end runs against in-memory SQLite.

use std::time::Duration;

use keel_client::{
    ClientConfig, ClientError, Connection, Database, PoolConfig, PoolSetting, Value,
};
use keel_schema::{Blueprint, Column, Dialect};

/// Every in-memory SQLite connection is its own database, so the pool is
/// capped at one connection.
fn memory_config() -> ClientConfig {
    ClientConfig::new("sqlite::memory:").with_pool(PoolSetting::Enabled(PoolConfig {
        max: 1,
        min: 1,
        ..PoolConfig::default()
    }))
}

fn users() -> Blueprint {
    Blueprint::new("users")
        .column(Column::increments("id"))
        .column(Column::string("name"))
        .column(Column::integer("age").nullable())
}

#[tokio::test]
async fn run_blueprint_then_query() {
    let db = Database::connect(memory_config()).await.unwrap();
    assert_eq!(db.dialect(), Dialect::Sqlite);

    let statements = db.run_blueprint(&users().create()).await.unwrap();
    assert_eq!(statements.len(), 1);

    let inserted = db
        .execute(
            "insert into users (name, age) values (?, ?)",
            &[Value::from("alice"), Value::Integer(31)],
        )
        .await
        .unwrap();
    assert_eq!(inserted.rows_affected, 1);
    db.execute(
        "insert into users (name, age) values (?, ?)",
        &[Value::from("bob"), Value::Null],
    )
    .await
    .unwrap();

    let output = db
        .execute("select id, name, age from users order by id", &[])
        .await
        .unwrap();
    assert_eq!(output.columns, vec!["id", "name", "age"]);
    assert_eq!(
        output.rows,
        vec![
            vec![Value::Integer(1), Value::from("alice"), Value::Integer(31)],
            vec![Value::Integer(2), Value::from("bob"), Value::Null],
        ]
    );

    db.close().await.unwrap();
}

#[tokio::test]
async fn table_exists_probe() {
    let db = Database::connect(memory_config()).await.unwrap();

    assert!(!db.table_exists("users").await.unwrap());
    db.run_blueprint(&users().create()).await.unwrap();
    assert!(db.table_exists("users").await.unwrap());

    db.run_blueprint(&Blueprint::new("users").drop_table())
        .await
        .unwrap();
    assert!(!db.table_exists("users").await.unwrap());
}

#[tokio::test]
async fn unpooled_database_uses_one_connection() {
    let config = ClientConfig::new("sqlite::memory:").with_pool(PoolSetting::Disabled);
    let db = Database::connect(config).await.unwrap();
    assert!(!db.dispatcher().is_pooled());

    db.run_blueprint(&users().create()).await.unwrap();
    db.execute("insert into users (name) values ('carol')", &[])
        .await
        .unwrap();
    let output = db
        .execute_with_timeout(
            "select count(*) as total from users",
            &[],
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(output.rows, vec![vec![Value::Integer(1)]]);

    db.close().await.unwrap();
}

#[tokio::test]
async fn caller_managed_connection() {
    let db = Database::connect(memory_config()).await.unwrap();

    // A standalone in-memory connection sees its own database.
    let mut connection = db.open_connection().await.unwrap();
    db.execute_on(&mut connection, "create table scratch (v integer)", &[])
        .await
        .unwrap();
    assert!(!db.table_exists("scratch").await.unwrap());

    let output = db
        .execute_on(&mut connection, "select count(*) as n from scratch", &[])
        .await
        .unwrap();
    assert_eq!(output.rows, vec![vec![Value::Integer(0)]]);
    connection.end().await.unwrap();
}

#[tokio::test]
async fn failed_statement_surfaces_execution_error() {
    let db = Database::connect(memory_config()).await.unwrap();

    let err = db.execute("select * from missing", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Execution(_)));

    // The connection went back to the pool.
    let output = db.execute("select 1 as one", &[]).await.unwrap();
    assert_eq!(output.rows.len(), 1);
}

#[tokio::test]
async fn unsupported_blueprint_runs_nothing() {
    let db = Database::connect(memory_config()).await.unwrap();
    db.run_blueprint(&users().create()).await.unwrap();

    let err = db
        .run_blueprint(&users().drop_column(&["age"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Schema(_)));
    assert!(db.table_exists("users").await.unwrap());
}

#[tokio::test]
async fn init_without_connection_is_a_no_op() {
    let db = Database::init(ClientConfig::default()).await.unwrap();
    assert!(db.is_none());

    let err = Database::connect(ClientConfig::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Configuration(_)));
}
