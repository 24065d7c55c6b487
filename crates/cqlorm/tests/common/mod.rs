//! In-memory stand-in for a cluster, understanding the CQL shapes the builder renders.
//!
//! Supports `INSERT`, `SELECT *`, `UPDATE` and `DELETE` with `col = ?`, `col > ?`, `col < ?`,
//! `col >= ?`, `col <= ?` and `col IN (?, …)` predicates joined by `AND`. The first column of an
//! INSERT is treated as the primary key, so re-inserting a key overwrites (upsert).

#![allow(dead_code)]

use cqlorm::statement::count_placeholders;
use cqlorm::{CqlClient, OrmError, OrmResult, Row, Statement, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

type StoredRow = Vec<(String, Value)>;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Vec<StoredRow>>>,
    executed: Mutex<Vec<(String, Vec<Value>)>>,
    batch_calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with `OrmError::Store`.
    pub fn fail_next(&self) {
        self.fail_next.store(true, AtomicOrdering::SeqCst);
    }

    /// Every statement seen, in order (batch entries included).
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, Vec::len)
    }

    fn check_failure(&self) -> OrmResult<()> {
        if self.fail_next.swap(false, AtomicOrdering::SeqCst) {
            return Err(OrmError::store("injected failure"));
        }
        Ok(())
    }

    fn apply(
        &self,
        tables: &mut BTreeMap<String, Vec<StoredRow>>,
        cql: &str,
        params: &[Value],
    ) -> OrmResult<Vec<Row>> {
        self.executed
            .lock()
            .unwrap()
            .push((cql.to_string(), params.to_vec()));
        let expected = count_placeholders(cql);
        if expected != params.len() {
            return Err(OrmError::store(format!(
                "expected {expected} values, got {}",
                params.len()
            )));
        }

        if let Some(rest) = cql.strip_prefix("INSERT INTO ") {
            insert(tables, rest, params)?;
            Ok(Vec::new())
        } else if let Some(rest) = cql.strip_prefix("SELECT * FROM ") {
            select(tables, rest, params)
        } else if let Some(rest) = cql.strip_prefix("UPDATE ") {
            update(tables, rest, params)?;
            Ok(Vec::new())
        } else if let Some(rest) = cql.strip_prefix("DELETE FROM ") {
            delete(tables, rest, params)?;
            Ok(Vec::new())
        } else {
            // DDL and anything else is accepted and ignored.
            Ok(Vec::new())
        }
    }
}

impl CqlClient for MemoryStore {
    async fn execute(&self, cql: &str, params: &[Value]) -> OrmResult<()> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        self.apply(&mut tables, cql, params).map(|_| ())
    }

    async fn query(&self, cql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        self.apply(&mut tables, cql, params)
    }

    async fn batch(&self, statements: &[Statement]) -> OrmResult<()> {
        self.batch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        // All or nothing: apply to a copy and commit at the end.
        let mut staged = tables.clone();
        for stmt in statements {
            self.apply(&mut staged, &stmt.cql, &stmt.params)?;
        }
        *tables = staged;
        Ok(())
    }
}

fn bad(cql: &str) -> OrmError {
    OrmError::store(format!("unsupported statement: {cql}"))
}

fn strip_ttl(s: &str) -> &str {
    match s.find(" USING TTL ") {
        Some(i) => &s[..i],
        None => s,
    }
}

fn insert(
    tables: &mut BTreeMap<String, Vec<StoredRow>>,
    rest: &str,
    params: &[Value],
) -> OrmResult<()> {
    let rest = strip_ttl(rest);
    let (table, rest) = rest.split_once(" (").ok_or_else(|| bad(rest))?;
    let (cols, _) = rest.split_once(") VALUES").ok_or_else(|| bad(rest))?;
    let row: StoredRow = cols
        .split(", ")
        .map(str::to_string)
        .zip(params.iter().cloned())
        .collect();

    let rows = tables.entry(table.to_string()).or_default();
    let key = row[0].clone();
    match rows.iter_mut().find(|r| r.contains(&key)) {
        Some(existing) => {
            for (col, value) in row {
                match existing.iter_mut().find(|(c, _)| *c == col) {
                    Some((_, v)) => *v = value,
                    None => existing.push((col, value)),
                }
            }
        }
        None => rows.push(row),
    }
    Ok(())
}

fn select(
    tables: &mut BTreeMap<String, Vec<StoredRow>>,
    rest: &str,
    params: &[Value],
) -> OrmResult<Vec<Row>> {
    let rest = rest.trim_end_matches(" ALLOW FILTERING");
    let (rest, limit) = match rest.split_once(" LIMIT ") {
        Some((head, n)) => (head, n.trim().parse::<usize>().ok()),
        None => (rest, None),
    };
    let (table, where_clause) = match rest.split_once(" WHERE ") {
        Some((t, w)) => (t, Some(w)),
        None => (rest, None),
    };

    let rows = tables.get(table).cloned().unwrap_or_default();
    let mut out = Vec::new();
    for row in rows {
        let keep = match where_clause {
            Some(w) => matches(&row, w, params)?,
            None => true,
        };
        if keep {
            out.push(Row::new(row));
        }
        if limit.is_some_and(|n| out.len() >= n) {
            break;
        }
    }
    Ok(out)
}

fn update(
    tables: &mut BTreeMap<String, Vec<StoredRow>>,
    rest: &str,
    params: &[Value],
) -> OrmResult<()> {
    let (table, rest) = rest.split_once(' ').ok_or_else(|| bad(rest))?;
    let rest = rest.split_once("SET ").map(|(_, r)| r).ok_or_else(|| bad(rest))?;
    let (set_clause, where_clause) = rest.split_once(" WHERE ").ok_or_else(|| bad(rest))?;

    let set_cols: Vec<&str> = set_clause
        .split(", ")
        .map(|a| a.trim_end_matches(" = ?"))
        .collect();
    let (set_values, where_params) = params.split_at(set_cols.len());

    let rows = tables.entry(table.to_string()).or_default();
    for row in rows.iter_mut() {
        if matches(row, where_clause, where_params)? {
            for (col, value) in set_cols.iter().zip(set_values) {
                match row.iter_mut().find(|(c, _)| c == col) {
                    Some((_, v)) => *v = value.clone(),
                    None => row.push((col.to_string(), value.clone())),
                }
            }
        }
    }
    Ok(())
}

fn delete(
    tables: &mut BTreeMap<String, Vec<StoredRow>>,
    rest: &str,
    params: &[Value],
) -> OrmResult<()> {
    let (table, where_clause) = rest.split_once(" WHERE ").ok_or_else(|| bad(rest))?;
    let rows = tables.entry(table.to_string()).or_default();
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        if !matches(&row, where_clause, params)? {
            kept.push(row);
        }
    }
    *rows = kept;
    Ok(())
}

fn matches(row: &StoredRow, where_clause: &str, params: &[Value]) -> OrmResult<bool> {
    let mut params = params.iter();
    let mut all = true;
    for pred in where_clause.split(" AND ") {
        let pred = pred.trim();
        if let Some((col, list)) = pred.split_once(" IN (") {
            let n = list.matches('?').count();
            let candidates: Vec<&Value> = params.by_ref().take(n).collect();
            let hit = lookup(row, col).is_some_and(|v| candidates.contains(&v));
            all &= hit;
            continue;
        }

        let mut parts = pred.split_whitespace();
        let (Some(col), Some(op), Some("?")) = (parts.next(), parts.next(), parts.next()) else {
            return Err(bad(pred));
        };
        let expected = params.next().ok_or_else(|| bad(pred))?;
        let hit = lookup(row, col).is_some_and(|actual| {
            let ord = compare(actual, expected);
            match op {
                "=" => ord == Some(Ordering::Equal),
                ">" => ord == Some(Ordering::Greater),
                "<" => ord == Some(Ordering::Less),
                ">=" => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
                "<=" => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
                _ => false,
            }
        });
        all &= hit;
    }
    Ok(all)
}

fn lookup<'a>(row: &'a StoredRow, col: &str) -> Option<&'a Value> {
    row.iter().find(|(c, _)| c == col).map(|(_, v)| v)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.get::<i64>(), b.get::<i64>()) {
        return Some(x.cmp(&y));
    }
    if let (Value::Text(x), Value::Text(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    (a == b).then_some(Ordering::Equal)
}
