#![cfg(feature = "sqlite")]

use dorm::executor::Session;
use dorm::udbc::sqlite::SqliteConnection;
use dorm::{DbError, Dialect, Model, Record, Registry, params};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq, Record, Model)]
#[model(table = "users")]
struct User {
    #[column(name = "user_id", primary, autoincrement)]
    id: i64,
    #[column("user_name")]
    name: String,
    balance: f64,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Summary {
    user_name: String,
    balance: f64,
    active: bool,
}

async fn setup() -> Session {
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = Arc::new(Registry::builder().model::<User>().build().unwrap());
    let conn = SqliteConnection::open("sqlite::memory:").await.unwrap();
    let session = Session::new(Box::new(conn), registry);

    session
        .execute(
            "CREATE TABLE [User] ([User.id] INTEGER PRIMARY KEY AUTOINCREMENT, \
             [User.name] TEXT NOT NULL, [User.balance] REAL NOT NULL)",
            &[],
        )
        .await
        .unwrap();

    for (name, balance) in [("alice", 12.5), ("bob", -3.0), ("carol", 40.0)] {
        let affected = session
            .execute(
                "INSERT INTO [User] ([User.name], [User.balance]) VALUES (?, ?)",
                &params![name, balance],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }
    session
}

#[tokio::test(flavor = "current_thread")]
async fn test_insert_and_last_insert_id() {
    let session = setup().await;
    assert_eq!(session.dialect().await, Dialect::Positional);
    assert_eq!(session.last_insert_id().await.unwrap(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn test_query_model() {
    let session = setup().await;
    let users: Vec<User> = session
        .query_model(
            "FROM [User] WHERE [!User.balance] > ? ORDER BY [!User.id]",
            &params![0],
        )
        .await
        .unwrap();

    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "alice".into(),
                balance: 12.5
            },
            User {
                id: 3,
                name: "carol".into(),
                balance: 40.0
            },
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_query_by_column_name_with_macros() {
    let session = setup().await;
    let rows: Vec<Summary> = session
        .query(
            "SELECT [User.name], GT0!([User.balance], 0) AS balance, \
             IF!([User.balance] > ?, 1, 0) AS active \
             FROM [User] ORDER BY [User.id]",
            &params![20],
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].user_name, "alice");
    assert_eq!(rows[0].balance, 12.5);
    assert!(!rows[0].active);
    assert_eq!(rows[1].balance, 0.0);
    assert!(rows[2].active);
}

#[tokio::test(flavor = "current_thread")]
async fn test_min_max_evaluate() {
    let session = setup().await;

    let min: i64 = session
        .query_scalar("SELECT MIN!(?, ?, ?)", &params![5, 2, 9])
        .await
        .unwrap();
    assert_eq!(min, 2);

    let max: i64 = session
        .query_scalar("SELECT MAX!(7, -1, 3)", &[])
        .await
        .unwrap();
    assert_eq!(max, 7);

    let richest: f64 = session
        .query_scalar(
            "SELECT MAX!((SELECT MAX([User.balance]) FROM [User]), 0)",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(richest, 40.0);
}

#[tokio::test(flavor = "current_thread")]
async fn test_repeated_parameter_reference() {
    let session = setup().await;

    let v: i64 = session
        .query_scalar("SELECT GT0!(?, ?)", &params![-4, 7])
        .await
        .unwrap();
    assert_eq!(v, 7);

    let v: i64 = session
        .query_scalar("SELECT GT0!(?, ?)", &params![4, 7])
        .await
        .unwrap();
    assert_eq!(v, 4);
}

#[tokio::test(flavor = "current_thread")]
async fn test_query_first_and_empty_result() {
    let session = setup().await;

    let bob: User = session
        .query_first(
            "SELECT [User.id] AS id, [User.name] AS name, [User.balance] AS balance \
             FROM [User] WHERE [User.name] = ?",
            &params!["bob"],
        )
        .await
        .unwrap();
    assert_eq!(bob.id, 2);
    assert_eq!(bob.balance, -3.0);

    let err = session
        .query_first::<User>("SELECT * FROM [User] WHERE [User.id] = ?", &params![99])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::EmptyResult));
}

#[tokio::test(flavor = "current_thread")]
async fn test_coercion_error_names_the_field() {
    let session = setup().await;
    let err = session
        .query::<Summary>("SELECT 'plenty' AS balance", &[])
        .await
        .unwrap_err();

    match err {
        DbError::Field { field, source } => {
            assert_eq!(field, "Summary.balance");
            assert!(matches!(
                *source,
                DbError::TypeMismatch {
                    source_type: "string",
                    target_type: "f64"
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_template_errors_reach_no_database() {
    let session = setup().await;
    let err = session
        .execute("DELETE FROM [User] WHERE [User.id] = NOPE!(1)", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UnknownMacro { .. }));

    let count: i64 = session
        .query_scalar("SELECT COUNT(*) FROM [User]", &[])
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_by_url() {
    let registry = Arc::new(Registry::default());
    let session = Session::connect("sqlite::memory:", registry.clone())
        .await
        .unwrap();
    let one: bool = session.query_scalar("SELECT 1", &[]).await.unwrap();
    assert!(one);

    let err = Session::connect("oracle://db", registry).await.err().unwrap();
    assert!(matches!(err, DbError::InvalidDatabaseUrl(_)));
}
