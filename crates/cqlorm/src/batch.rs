//! Logged batches of independent mutations.

use crate::builder::{WhereClause, require_columns};
use crate::client::CqlClient;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::statement::{self, Statement};
use crate::value::IntoParams;

/// Accumulates INSERT/UPDATE/DELETE statements and submits them as one logged batch.
///
/// Entries are rendered when added and kept in order. Like the query builder, adding an entry
/// never fails: the first misuse is recorded and returned by [`Batch::execute`] without
/// contacting the store.
///
/// # Example
///
/// ```ignore
/// let mut batch = Batch::new();
/// batch
///     .insert("users", &Record::new().set("id", a).set("name", "Eve"))
///     .insert("users", &Record::new().set("id", b).set("name", "Frank"))
///     .delete("users", "id = ?", (c,));
/// batch.execute(&client).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Batch {
    statements: Vec<Statement>,
    build_error: Option<String>,
}

/// Start an empty batch.
pub fn batch() -> Batch {
    Batch::new()
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_error(&mut self, err: OrmError) {
        if self.build_error.is_none() {
            self.build_error = Some(err.to_string());
        }
    }

    /// Queue an INSERT of `record` into `table`.
    pub fn insert(&mut self, table: &str, record: &Record) -> &mut Self {
        self.insert_with_ttl(table, record, 0)
    }

    /// Queue an INSERT with a time-to-live in seconds (`0` = none).
    pub fn insert_with_ttl(&mut self, table: &str, record: &Record, ttl: u32) -> &mut Self {
        match require_columns("INSERT", table, record) {
            Ok(()) => self
                .statements
                .push(statement::render_insert(table, record, ttl)),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Queue an UPDATE of `record` rows matching `condition`.
    pub fn update<P: IntoParams>(
        &mut self,
        table: &str,
        record: &Record,
        condition: &str,
        params: P,
    ) -> &mut Self {
        let mut where_clause = WhereClause::new();
        if !condition.trim().is_empty() {
            where_clause.push(None, condition, params.into_params());
        }
        let rendered = where_clause
            .require("UPDATE", table)
            .and_then(|()| require_columns("UPDATE", table, record))
            .map(|()| {
                statement::render_update(
                    table,
                    record,
                    &where_clause.build_clause(),
                    where_clause.params(),
                    0,
                )
            });
        match rendered {
            Ok(stmt) => self.statements.push(stmt),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Queue a DELETE of rows matching `condition`.
    pub fn delete<P: IntoParams>(&mut self, table: &str, condition: &str, params: P) -> &mut Self {
        let mut where_clause = WhereClause::new();
        if !condition.trim().is_empty() {
            where_clause.push(None, condition, params.into_params());
        }
        match where_clause.require("DELETE", table) {
            Ok(()) => self.statements.push(statement::render_delete(
                table,
                &where_clause.build_clause(),
                where_clause.params(),
            )),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Queued statements in submission order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Validate batch state.
    pub fn validate(&self) -> OrmResult<()> {
        match &self.build_error {
            Some(err) => Err(OrmError::Validation(err.clone())),
            None => Ok(()),
        }
    }

    /// Submit every queued statement as one atomic request.
    ///
    /// The queue is kept, so executing twice submits the same statements again. An empty batch
    /// is a no-op.
    pub async fn execute(&self, conn: &impl CqlClient) -> OrmResult<()> {
        self.validate()?;
        if self.statements.is_empty() {
            tracing::debug!(target: "cqlorm.query", "empty batch skipped");
            return Ok(());
        }
        conn.batch(&self.statements).await?;
        tracing::debug!(
            target: "cqlorm.query",
            statements = self.statements.len(),
            "batch executed"
        );
        Ok(())
    }
}
