//! Rows and columns of a snapshot. Both are immutable after construction.

use std::sync::Arc;

use crate::value::Value;

/// One row of a snapshot: the ordered column names (shared with the owning
/// snapshot) and one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Number of values in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names, upper-cased.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// All values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// The value of the named column. The lookup is case-insensitive.
    pub fn value_named(&self, name: &str) -> Option<&Value> {
        self.column_index(name).map(|i| &self.values[i])
    }

    /// Position of the named column. The lookup is case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        self.columns.iter().position(|c| *c == upper)
    }
}

/// One column of a snapshot: its name and the value it takes in every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub(crate) fn new(name: String, values: Vec<Value>) -> Self {
        Self { name, values }
    }

    /// The column name, upper-cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values (one per row).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value at row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }
}
