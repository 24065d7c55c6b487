//! # cqlorm
//!
//! A small query-builder ORM for ScyllaDB / Apache Cassandra.
//!
//! ## Features
//!
//! - **CQL explicit**: conditions are CQL fragments with `?` placeholders
//! - **Chainable builder**: `filter` / `and` / `in_list` / `limit` / `allow_filtering` on one table
//! - **Safe defaults**: UPDATE and DELETE require a WHERE condition; misuse is reported before
//!   anything reaches the cluster
//! - **Logged batches**: queue inserts, updates and deletes and apply them atomically
//! - **Row mapping**: Row → struct via `#[derive(FromRow)]`, matching column names loosely
//!   (`created_at` fills `created_at`, `createdAt` or `CreatedAt`)
//! - **Query logging**: every statement can be reported to a [`QueryLogger`] via
//!   [`InstrumentedClient`]
//!
//! ## Example
//!
//! ```ignore
//! use cqlorm::prelude::*;
//!
//! #[derive(Debug, Default, FromRow)]
//! struct User {
//!     id: uuid::Uuid,
//!     name: String,
//!     age: i32,
//! }
//!
//! let client = cqlorm::connect_logged(&SessionConfig::from_file("cqlorm.toml")?).await?;
//!
//! // INSERT ... USING TTL 3600
//! cqlorm::table("users")
//!     .insert(&client, &Record::new().set("id", id).set("name", "Alice").set("age", 30), 3600)
//!     .await?;
//!
//! // SELECT
//! let users: Vec<User> = cqlorm::table("users")
//!     .filter("age > ?", [25])
//!     .limit(10)
//!     .allow_filtering()
//!     .select(&client)
//!     .await?;
//!
//! // UPDATE / DELETE
//! let mut q = cqlorm::table("users");
//! q.filter("id = ?", [id]);
//! q.update(&client, &Record::new().set("age", 31), 0).await?;
//! q.delete(&client).await?;
//! ```

pub mod batch;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod migrate;
pub mod monitor;
pub mod prelude;
pub mod record;
pub mod row;
pub mod statement;
pub mod value;

#[cfg(feature = "scylla")]
pub mod session;

pub use batch::{Batch, batch};
pub use builder::{QueryBuilder, WhereClause, table};
pub use client::CqlClient;
pub use config::{LoggingConfig, ReplicationConfig, SessionConfig};
pub use error::{OrmError, OrmResult};
pub use migrate::{MigrationReport, Migrator, split_statements};
pub use monitor::{
    CompositeMonitor, InstrumentedClient, MonitorConfig, NoopMonitor, QueryContext, QueryLogger,
    QueryMonitor, QueryResult, QueryStats, QueryType, StatsMonitor, logged, logged_with_config,
};
pub use record::Record;
pub use row::{BindingReport, FieldBinding, FromRow, Row, RowExt, RowMapper};
pub use statement::{Statement, StatementKind};
pub use value::{FromValue, IntoParams, Value};

#[cfg(feature = "scylla")]
pub use session::{ScyllaClient, connect, connect_logged};

#[cfg(feature = "derive")]
pub use cqlorm_derive::FromRow;
