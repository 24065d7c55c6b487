//! Store client trait for unified cluster access.

use crate::error::OrmResult;
use crate::row::Row;
use crate::statement::Statement;
use crate::value::Value;

/// A trait over anything that can run CQL.
///
/// Builders and batches are written against this trait, so the same code runs on a live
/// [`ScyllaClient`](crate::ScyllaClient), an [`InstrumentedClient`](crate::InstrumentedClient)
/// wrapping one, or an in-memory fake in tests.
pub trait CqlClient: Send + Sync {
    /// Execute a statement and discard any result rows.
    fn execute(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send;

    /// Execute a statement and return all rows.
    fn query(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Submit statements as one logged (atomic) batch.
    ///
    /// Either every statement is applied or none is; failures carry no per-statement detail.
    fn batch(
        &self,
        statements: &[Statement],
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send;
}

impl<C: CqlClient> CqlClient for &C {
    fn execute(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        (**self).execute(cql, params)
    }

    fn query(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(cql, params)
    }

    fn batch(
        &self,
        statements: &[Statement],
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        (**self).batch(statements)
    }
}
