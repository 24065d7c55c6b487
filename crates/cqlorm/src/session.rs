//! Cluster session bootstrap and the `scylla`-driver backed client.

use crate::client::CqlClient;
use crate::config::SessionConfig;
use crate::error::{OrmError, OrmResult};
use crate::monitor::{InstrumentedClient, logged_with_config};
use crate::row::Row;
use crate::statement::Statement;
use crate::value::Value;
use chrono::DateTime;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::batch::{Batch, BatchType};
use scylla::value::{CqlTimestamp, CqlTimeuuid, CqlValue};
use uuid::Uuid;

/// [`CqlClient`] over a live driver [`Session`].
///
/// Statements run unpaged; bound values are converted to driver values per call.
pub struct ScyllaClient {
    session: Session,
}

impl ScyllaClient {
    /// Wrap an already connected session.
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// Underlying driver session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

/// Connect to the cluster, ensure the configured keyspace exists and switch to it.
pub async fn connect(config: &SessionConfig) -> OrmResult<ScyllaClient> {
    config.validate()?;

    let mut builder = SessionBuilder::new().known_nodes(&config.hosts);
    match (&config.username, &config.password) {
        (Some(user), Some(pass)) => {
            builder = builder.user(user, pass);
            tracing::info!(target: "cqlorm.session", "authentication enabled");
        }
        _ => tracing::info!(target: "cqlorm.session", "no authentication"),
    }

    let session = builder
        .build()
        .await
        .map_err(|e| OrmError::Connection(e.to_string()))?;

    session
        .query_unpaged(config.create_keyspace_cql(), ())
        .await
        .map_err(|e| {
            OrmError::Connection(format!(
                "failed to create keyspace '{}': {e}",
                config.keyspace
            ))
        })?;
    tracing::info!(
        target: "cqlorm.session",
        keyspace = %config.keyspace,
        strategy = %config.replication.strategy,
        "keyspace ensured"
    );

    session
        .use_keyspace(&config.keyspace, false)
        .await
        .map_err(|e| {
            OrmError::Connection(format!(
                "failed to use keyspace '{}': {e}",
                config.keyspace
            ))
        })?;
    tracing::info!(target: "cqlorm.session", keyspace = %config.keyspace, "connected");

    Ok(ScyllaClient::from_session(session))
}

/// [`connect`], then install the query log sink per the config's `[logging]` section.
///
/// The sink stays reachable through [`InstrumentedClient::logger`] for runtime toggling.
pub async fn connect_logged(config: &SessionConfig) -> OrmResult<InstrumentedClient<ScyllaClient>> {
    let client = connect(config).await?;
    Ok(logged_with_config(client, config))
}

fn bind(params: &[Value]) -> Vec<Option<CqlValue>> {
    params.iter().map(to_cql).collect()
}

/// Convert a bound value. `Null` becomes an unset (null) driver value.
pub(crate) fn to_cql(value: &Value) -> Option<CqlValue> {
    let v = match value {
        Value::Null => return None,
        Value::Boolean(b) => CqlValue::Boolean(*b),
        Value::TinyInt(n) => CqlValue::TinyInt(*n),
        Value::SmallInt(n) => CqlValue::SmallInt(*n),
        Value::Int(n) => CqlValue::Int(*n),
        Value::BigInt(n) => CqlValue::BigInt(*n),
        Value::Float(n) => CqlValue::Float(*n),
        Value::Double(n) => CqlValue::Double(*n),
        Value::Text(s) => CqlValue::Text(s.clone()),
        Value::Blob(b) => CqlValue::Blob(b.clone()),
        Value::Uuid(u) => CqlValue::Uuid(*u),
        Value::Timeuuid(u) => CqlValue::Timeuuid(CqlTimeuuid::from(*u)),
        Value::Timestamp(t) => CqlValue::Timestamp(CqlTimestamp(t.timestamp_millis())),
        Value::Inet(ip) => CqlValue::Inet(*ip),
        // Collections cannot hold nulls.
        Value::List(items) => CqlValue::List(items.iter().filter_map(to_cql).collect()),
        Value::Set(items) => CqlValue::Set(items.iter().filter_map(to_cql).collect()),
        Value::Map(entries) => CqlValue::Map(
            entries
                .iter()
                .filter_map(|(k, v)| Some((to_cql(k)?, to_cql(v)?)))
                .collect(),
        ),
    };
    Some(v)
}

/// Convert a driver value; types without a [`Value`] counterpart read as `Null`.
pub(crate) fn from_cql(value: CqlValue) -> Value {
    match value {
        CqlValue::Boolean(b) => Value::Boolean(b),
        CqlValue::TinyInt(n) => Value::TinyInt(n),
        CqlValue::SmallInt(n) => Value::SmallInt(n),
        CqlValue::Int(n) => Value::Int(n),
        CqlValue::BigInt(n) => Value::BigInt(n),
        CqlValue::Counter(c) => Value::BigInt(c.0),
        CqlValue::Float(n) => Value::Float(n),
        CqlValue::Double(n) => Value::Double(n),
        CqlValue::Text(s) | CqlValue::Ascii(s) => Value::Text(s),
        CqlValue::Blob(b) => Value::Blob(b),
        CqlValue::Uuid(u) => Value::Uuid(u),
        CqlValue::Timeuuid(t) => Value::Timeuuid(Uuid::from(t)),
        CqlValue::Timestamp(CqlTimestamp(ms)) => DateTime::from_timestamp_millis(ms)
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),
        CqlValue::Inet(ip) => Value::Inet(ip),
        CqlValue::List(items) => Value::List(items.into_iter().map(from_cql).collect()),
        CqlValue::Set(items) => Value::Set(items.into_iter().map(from_cql).collect()),
        CqlValue::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (from_cql(k), from_cql(v)))
                .collect(),
        ),
        CqlValue::Empty => Value::Null,
        other => {
            tracing::debug!(target: "cqlorm.query", value = ?other, "unsupported CQL type read as null");
            Value::Null
        }
    }
}

impl CqlClient for ScyllaClient {
    async fn execute(&self, cql: &str, params: &[Value]) -> OrmResult<()> {
        self.session
            .query_unpaged(cql, bind(params))
            .await
            .map_err(|e| OrmError::Store(e.to_string()))?;
        Ok(())
    }

    async fn query(&self, cql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let result = self
            .session
            .query_unpaged(cql, bind(params))
            .await
            .map_err(|e| OrmError::Store(e.to_string()))?;
        let rows_result = result
            .into_rows_result()
            .map_err(|e| OrmError::Store(e.to_string()))?;

        let names: Vec<String> = rows_result
            .column_specs()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect();

        let mut rows = Vec::new();
        for row in rows_result
            .rows::<scylla::value::Row>()
            .map_err(|e| OrmError::Store(e.to_string()))?
        {
            let row = row.map_err(|e| OrmError::Store(e.to_string()))?;
            rows.push(Row::new(
                names
                    .iter()
                    .cloned()
                    .zip(row.columns)
                    .map(|(name, value)| (name, value.map(from_cql).unwrap_or(Value::Null)))
                    .collect(),
            ));
        }
        Ok(rows)
    }

    async fn batch(&self, statements: &[Statement]) -> OrmResult<()> {
        let mut batch = Batch::new(BatchType::Logged);
        for stmt in statements {
            batch.append_statement(stmt.cql.as_str());
        }
        let values: Vec<Vec<Option<CqlValue>>> =
            statements.iter().map(|stmt| bind(&stmt.params)).collect();
        self.session
            .batch(&batch, values)
            .await
            .map_err(|e| OrmError::Store(e.to_string()))?;
        Ok(())
    }
}
