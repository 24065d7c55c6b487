//! End-to-end walkthrough against a local node.
//!
//! ```text
//! docker run --rm -p 9042:9042 scylladb/scylla --smp 1
//! RUST_LOG=cqlorm=info cargo run -p cqlorm --example crud
//! ```

use chrono::{DateTime, Utc};
use cqlorm::prelude::*;
use cqlorm::Migrator;
use uuid::Uuid;

#[derive(Debug, Default, FromRow)]
struct User {
    id: Uuid,
    name: String,
    age: i32,
    created_at: Option<DateTime<Utc>>,
}

fn user(name: &str, age: i32) -> Record {
    Record::new()
        .set("id", Uuid::new_v4())
        .set("name", name)
        .set("age", age)
        .set("created_at", Utc::now())
}

#[tokio::main]
async fn main() -> OrmResult<()> {
    let config = SessionConfig::new(["127.0.0.1:9042"], "example_keyspace");
    let session = connect_logged(&config).await?;

    Migrator::new()
        .statement(
            "CREATE TABLE IF NOT EXISTS users (
                age INT, id UUID, name TEXT, created_at TIMESTAMP, PRIMARY KEY (id))",
        )
        .statement(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS users_by_age AS
                SELECT * FROM users WHERE age IS NOT NULL AND id IS NOT NULL
                PRIMARY KEY (age, id)",
        )
        .run(&session)
        .await?;

    let users = table("users");
    for (name, age) in [("Alice", 30), ("Bob", 25), ("Charlie", 35)] {
        users.insert(&session, &user(name, age), 0).await?;
    }
    for i in 0..10 {
        users
            .insert(&session, &user(&format!("User {}", i + 1), 20 + i), 0)
            .await?;
    }

    // Paged read from the view.
    let mut by_age = table("users_by_age");
    let page: Vec<User> = by_age
        .filter("age > ?", [20])
        .limit(3)
        .allow_filtering()
        .select(&session)
        .await?;
    for u in &page {
        println!("User (paginated): {u:?}");
    }

    // TTL on insert and update.
    let eve = user("Eve", 22);
    users.insert(&session, &eve, 10).await?;
    if let Some(id) = eve.get("id").cloned() {
        let mut q = table("users");
        q.filter("id = ?", [id]);
        q.update(&session, &Record::new().set("age", 30), 5).await?;
    }

    // WHERE + AND
    let found: Vec<User> = by_age
        .clear_where()
        .filter("age > ?", [25])
        .and("name = ?", ["Alice"])
        .allow_filtering()
        .select(&session)
        .await?;
    println!("WHERE + AND: {found:?}");

    // IN
    let found: Vec<User> = by_age
        .clear_where()
        .in_list("age", [25, 30, 35])
        .allow_filtering()
        .select(&session)
        .await?;
    println!("IN: {found:?}");

    // Literal IN inside a raw condition.
    let found: Vec<User> = by_age
        .clear_where()
        .filter("name = ?", ["Alice"])
        .and("age IN (25, 30, 35)", ())
        .allow_filtering()
        .select(&session)
        .await?;
    println!("complex: {found:?}");

    // One logged batch: two inserts and a delete.
    let doomed = user("Temp", 40);
    users.insert(&session, &doomed, 0).await?;
    let mut b = batch();
    b.insert("users", &user("Frank", 41))
        .insert_with_ttl("users", &user("Grace", 42), 60);
    if let Some(id) = doomed.get("id").cloned() {
        b.delete("users", "id = ?", [id]);
    }
    b.execute(&session).await?;

    if let Some(id) = eve.get("id").cloned() {
        let mut q = table("users");
        q.filter("id = ?", [id]);
        q.delete(&session).await?;
    }

    println!("done");
    Ok(())
}
