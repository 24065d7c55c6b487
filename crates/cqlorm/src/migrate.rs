//! Ordered schema statements (keyspace tables, indexes, views).
//!
//! A [`Migrator`] holds a fixed list of CQL statements and runs them in order through any
//! [`CqlClient`]. Statements are expected to be idempotent (`IF NOT EXISTS`); there is no
//! version table.
//!
//! ```ignore
//! let migrator = Migrator::new()
//!     .statement("CREATE TABLE IF NOT EXISTS users (id uuid PRIMARY KEY, name text, age int)")
//!     .statement("CREATE INDEX IF NOT EXISTS ON users (age)");
//! migrator.run(&client).await?;
//! ```

use crate::client::CqlClient;
use crate::error::{OrmError, OrmResult};
use crate::statement::CqlChars;
use std::path::Path;

/// Ordered list of schema statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migrator {
    statements: Vec<String>,
}

/// Outcome of a successful [`Migrator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: usize,
}

impl Migrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an explicit statement list.
    pub fn from_statements<S: Into<String>>(statements: impl IntoIterator<Item = S>) -> Self {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a `.cql` script, see [`split_statements`].
    pub fn from_script(script: &str) -> Self {
        Self::from_statements(split_statements(script))
    }

    /// Append one statement.
    pub fn statement(mut self, cql: impl Into<String>) -> Self {
        self.statements.push(cql.into());
        self
    }

    /// Append every statement of a script file.
    pub fn add_file(mut self, path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Migration(format!("failed to read {}: {e}", path.display()))
        })?;
        self.statements.extend(split_statements(&script));
        Ok(self)
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Run every statement in order, stopping at the first failure.
    pub async fn run(&self, conn: &impl CqlClient) -> OrmResult<MigrationReport> {
        for (i, cql) in self.statements.iter().enumerate() {
            if let Err(e) = conn.execute(cql, &[]).await {
                tracing::error!(
                    target: "cqlorm.migrate",
                    index = i,
                    statement = %cql,
                    error = %e,
                    "migration failed"
                );
                return Err(OrmError::Migration(format!(
                    "statement {} failed: {e}\n{cql}",
                    i + 1
                )));
            }
            tracing::info!(target: "cqlorm.migrate", statement = %cql, "migration executed");
        }
        Ok(MigrationReport {
            applied: self.statements.len(),
        })
    }
}

/// Split a CQL script into statements.
///
/// Statements end at `;`. Line comments (`--` or `//`) and blank lines are dropped; a `;` or
/// comment marker inside a single-quoted string literal is kept. A trailing statement without
/// `;` is included.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = CqlChars::new(script);

    while let Some((c, quoted)) = chars.next() {
        if quoted {
            current.push(c);
            continue;
        }
        match c {
            '-' | '/' if chars.peek() == Some(c) => {
                if chars.skip_line() {
                    current.push('\n');
                }
            }
            ';' => push_statement(&mut statements, &mut current),
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let joined = current
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.is_empty() {
        statements.push(joined);
    }
    current.clear();
}
