use super::*;
use crate::client::CqlClient;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::row::{FieldBinding, FromRow, Row, assign};
use crate::statement::Statement;
use crate::value::Value;
use std::sync::Mutex;

// ── Recording client shared by the async tests ──

#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Vec<Row>,
    fail_with: Option<String>,
}

impl RecordingClient {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, cql: &str, params: &[Value]) -> OrmResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((cql.to_string(), params.to_vec()));
        match &self.fail_with {
            Some(msg) => Err(OrmError::store(msg.clone())),
            None => Ok(()),
        }
    }
}

impl CqlClient for RecordingClient {
    async fn execute(&self, cql: &str, params: &[Value]) -> OrmResult<()> {
        self.record(cql, params)
    }

    async fn query(&self, cql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.record(cql, params)?;
        Ok(self.rows.clone())
    }

    async fn batch(&self, statements: &[Statement]) -> OrmResult<()> {
        for stmt in statements {
            self.record(&stmt.cql, &stmt.params)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i32,
}

impl FromRow for User {
    const FIELDS: &'static [FieldBinding<Self>] = &[
        FieldBinding::new("id", "id", |u: &mut Self, v: &Value| assign(&mut u.id, v)),
        FieldBinding::new("name", "name", |u: &mut Self, v: &Value| {
            assign(&mut u.name, v)
        }),
        FieldBinding::new("age", "age", |u: &mut Self, v: &Value| assign(&mut u.age, v)),
    ];
}

fn user_row(id: i64, name: &str, age: i32) -> Row {
    Row::new(vec![
        ("id".to_string(), Value::BigInt(id)),
        ("name".to_string(), Value::Text(name.to_string())),
        ("age".to_string(), Value::Int(age)),
    ])
}

// ── Rendering ──

#[test]
fn test_simple_select() {
    let qb = QueryBuilder::new("users");
    assert_eq!(qb.to_cql(), "SELECT * FROM users");
    assert!(qb.params().is_empty());
}

#[test]
fn test_where_conditions_join_with_and() {
    let mut qb = table("users");
    qb.filter("id = ?", (7i64,)).filter("age > ?", [18]);
    assert_eq!(qb.to_cql(), "SELECT * FROM users WHERE id = ? AND age > ?");
    assert_eq!(qb.params(), &[Value::BigInt(7), Value::Int(18)]);
}

#[test]
fn test_and_prefixes_condition() {
    let mut qb = table("users");
    qb.filter("name = ?", ["Alice"]).and("age = ?", [30]);
    assert_eq!(qb.to_cql(), "SELECT * FROM users WHERE name = ? AND age = ?");

    let mut first = table("users");
    first.and("age = ?", [30]);
    assert_eq!(first.to_cql(), "SELECT * FROM users WHERE AND age = ?");
}

#[test]
fn test_or_condition() {
    let mut qb = table("users");
    qb.filter("age = ?", [30]).or("age = ?", [40]);
    assert_eq!(qb.to_cql(), "SELECT * FROM users WHERE age = ? OR age = ?");
}

#[test]
fn test_in_list_placeholders_match_values() {
    let mut qb = table("users");
    qb.in_list("age", [25, 30, 35]);
    assert_eq!(qb.to_cql(), "SELECT * FROM users WHERE age IN (?, ?, ?)");
    assert_eq!(
        qb.params(),
        &[Value::Int(25), Value::Int(30), Value::Int(35)]
    );
}

#[test]
fn test_params_follow_predicate_order() {
    let mut qb = table("users");
    qb.filter("a = ?", [1])
        .in_list("b", [2, 3])
        .and("c > ? AND c < ?", (4, 5));
    let stmt = qb.build_select().unwrap();
    assert_eq!(stmt.placeholder_count(), stmt.params.len());
    assert_eq!(
        stmt.params,
        (1..=5).map(Value::Int).collect::<Vec<_>>()
    );
}

#[test]
fn test_limit_and_allow_filtering() {
    let mut qb = table("users");
    qb.filter("age > ?", [20]).limit(10).allow_filtering();
    assert_eq!(
        qb.to_cql(),
        "SELECT * FROM users WHERE age > ? LIMIT 10 ALLOW FILTERING"
    );

    qb.limit(0);
    assert_eq!(qb.current_limit(), None);
    assert!(!qb.to_cql().contains("LIMIT"));
}

#[test]
fn test_clear_where_restores_fresh_state() {
    let mut qb = table("users");
    qb.filter("age > ?", [20]).limit(5).allow_filtering();
    qb.clear_where();
    assert_eq!(qb, QueryBuilder::new("users"));
    assert_eq!(qb.to_cql(), "SELECT * FROM users");

    qb.filter("id = ?", [1]);
    assert_eq!(qb.params(), &[Value::Int(1)]);
}

#[test]
fn test_clear_where_drops_pending_error() {
    let mut qb = table("users");
    qb.filter("id = ?", ());
    assert!(qb.validate().is_err());
    qb.clear_where();
    assert!(qb.validate().is_ok());
}

#[test]
fn test_param_mismatch_is_validation_error() {
    let mut qb = table("users");
    qb.filter("a = ? AND b = ?", [1]);
    assert_eq!(qb.predicate_count(), 0);
    let err = qb.build_select().unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("2 '?'"));
}

#[test]
fn test_question_mark_in_literal_is_not_a_placeholder() {
    let mut qb = table("notes");
    qb.filter("title = 'why?'", ()).and("author = ?", ["it''s me?"]);
    assert!(qb.validate().is_ok());
    assert_eq!(
        qb.to_cql(),
        "SELECT * FROM notes WHERE title = 'why?' AND author = ?"
    );
    assert_eq!(qb.params(), &[Value::Text("it''s me?".into())]);

    let mut escaped = table("notes");
    escaped.filter("title = 'it''s ?' AND id = ?", [1]);
    assert_eq!(escaped.predicate_count(), 1);
    assert_eq!(escaped.params(), &[Value::Int(1)]);
}

#[tokio::test]
async fn test_literal_question_mark_reaches_store() {
    let client = RecordingClient::default();
    let mut qb = table("notes");
    qb.filter("title = 'why?'", ());
    let notes: Vec<User> = qb.select(&client).await.unwrap();
    assert!(notes.is_empty());
    assert_eq!(
        client.calls(),
        vec![("SELECT * FROM notes WHERE title = 'why?'".to_string(), vec![])]
    );
}

#[test]
fn test_empty_in_list_is_validation_error() {
    let mut qb = table("users");
    qb.in_list("age", Vec::<i32>::new());
    assert!(qb.build_select().unwrap_err().is_validation());
}

#[test]
fn test_update_params_set_first() {
    let mut qb = table("users");
    qb.filter("id = ?", [7i64]);
    let stmt = qb
        .build_update(&Record::new().set("name", "Bob").set("age", 31), 0)
        .unwrap();
    assert_eq!(
        stmt.cql,
        "UPDATE users SET name = ?, age = ? WHERE id = ?"
    );
    assert_eq!(
        stmt.params,
        vec![Value::Text("Bob".into()), Value::Int(31), Value::BigInt(7)]
    );
}

#[test]
fn test_insert_ignores_predicates() {
    let mut qb = table("users");
    qb.filter("id = ?", [1]);
    let stmt = qb
        .build_insert(&Record::new().set("id", 1).set("name", "A"), 60)
        .unwrap();
    assert_eq!(
        stmt.cql,
        "INSERT INTO users (id, name) VALUES (?, ?) USING TTL 60"
    );
    assert_eq!(stmt.params.len(), 2);
}

#[test]
fn test_empty_record_is_rejected() {
    let qb = table("users");
    assert!(qb.build_insert(&Record::new(), 0).unwrap_err().is_validation());
}

// ── Execution ──

#[tokio::test]
async fn test_update_without_where_never_calls_store() {
    let client = RecordingClient::default();
    let err = table("users")
        .update(&client, &Record::new().set("age", 1), 0)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_delete_without_where_never_calls_store() {
    let client = RecordingClient::default();
    let err = table("users").delete(&client).await.unwrap_err();
    assert!(err.is_validation());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_delete_executes_rendered_statement() {
    let client = RecordingClient::default();
    let mut qb = table("users");
    qb.filter("id = ?", [9i64]);
    qb.delete(&client).await.unwrap();
    assert_eq!(
        client.calls(),
        vec![(
            "DELETE FROM users WHERE id = ?".to_string(),
            vec![Value::BigInt(9)]
        )]
    );
}

#[tokio::test]
async fn test_insert_with_ttl() {
    let client = RecordingClient::default();
    table("users")
        .insert(&client, &Record::new().set("id", 1i64), 10)
        .await
        .unwrap();
    assert_eq!(
        client.calls()[0].0,
        "INSERT INTO users (id) VALUES (?) USING TTL 10"
    );
}

#[tokio::test]
async fn test_select_maps_rows_in_order() {
    let client = RecordingClient::with_rows(vec![user_row(1, "Alice", 30), user_row(2, "Bob", 40)]);
    let mut qb = table("users");
    qb.in_list("id", [1i64, 2]);
    let users: Vec<User> = qb.select(&client).await.unwrap();
    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "Alice".into(),
                age: 30
            },
            User {
                id: 2,
                name: "Bob".into(),
                age: 40
            },
        ]
    );
}

#[tokio::test]
async fn test_select_into_appends_and_zero_rows_is_ok() {
    let client = RecordingClient::default();
    let mut dest = vec![User::default()];
    table("users").select_into(&client, &mut dest).await.unwrap();
    assert_eq!(dest.len(), 1);
}

#[tokio::test]
async fn test_store_error_is_surfaced_and_dest_untouched() {
    let client = RecordingClient::failing("node down");
    let mut dest: Vec<User> = Vec::new();
    let err = table("users")
        .select_into(&client, &mut dest)
        .await
        .unwrap_err();
    assert!(err.is_store());
    assert!(err.to_string().contains("node down"));
    assert!(dest.is_empty());
    assert_eq!(client.calls().len(), 1);
}
