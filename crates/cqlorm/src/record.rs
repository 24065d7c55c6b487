//! Column/value records passed to INSERT and UPDATE.

use crate::value::Value;

/// An ordered set of `(column, value)` pairs.
///
/// Order is preserved exactly as the columns were added, so the rendered column list,
/// placeholder list and parameter list always line up and render the same way every time.
///
/// # Example
///
/// ```ignore
/// let user = Record::new()
///     .set("id", id)
///     .set("name", "Alice")
///     .set("age", 30);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value (builder style).
    ///
    /// Setting the same column twice replaces the earlier value in place.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Add an optional column value (None => skip).
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Add a column value in place.
    pub fn push(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column.to_string(), value)),
        }
        self
    }

    /// Get the value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.push(k.as_ref(), v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let record = Record::new().set("b", 1).set("a", 2).set("c", 3);
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_column_replaces_in_place() {
        let record = Record::new().set("a", 1).set("b", 2).set("a", 9);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Value::Int(9)));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn set_opt_skips_none() {
        let record = Record::new().set_opt("a", None::<i32>).set_opt("b", Some("x"));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn collects_from_pairs() {
        let record: Record = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(record.values().cloned().collect::<Vec<_>>(), vec![Value::Int(1), Value::Int(2)]);
    }
}
