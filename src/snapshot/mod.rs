//! Point-in-time snapshots of database data.
//!
//! A snapshot is the set of rows and columns read from a table or an ad-hoc
//! query at one instant. [`Table`] and [`Request`] share the same underlying
//! [`Snapshot`] shape; [`Changes`] diffs two snapshots of the same sources.

mod changes;
mod request;
mod row;
mod table;

pub use changes::{Change, ChangeKind, Changes};
pub use request::{request, Request, RequestBuilder};
pub use row::{Column, Row};
pub use table::{table, Table, TableBuilder};

use std::sync::Arc;

use crate::value::Value;

/// The data behind a [`Table`] or [`Request`]: a description, the upper-cased
/// column names, the primary-key names and the buffered rows. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct Snapshot {
    description: String,
    columns: Arc<Vec<String>>,
    pks: Vec<String>,
    rows: Vec<Row>,
}

impl Snapshot {
    pub(crate) fn new(
        description: String,
        columns: Arc<Vec<String>>,
        pks: Vec<String>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            description,
            columns,
            pks,
            rows,
        }
    }

    /// Human-readable description of the data source, used in failure
    /// messages (for example `members table`).
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Column names, upper-cased.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Primary-key column names, upper-cased, in key order.
    pub fn pks_names(&self) -> &[String] {
        &self.pks
    }

    /// All buffered rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    /// Materialize the column at `index` across all rows.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn column(&self, index: usize) -> Column {
        Column::new(
            self.columns[index].clone(),
            self.rows.iter().map(|r| r.value_at(index).clone()).collect(),
        )
    }

    /// Position of the named column. The lookup is case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        self.columns.iter().position(|c| *c == upper)
    }

    pub(crate) fn columns_arc(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.columns)
    }

    /// Extract the primary-key values of a row, falling back to the whole
    /// row when no primary key is declared.
    pub(crate) fn key_of(&self, row: &Row) -> Vec<Value> {
        let indexes: Vec<usize> = self
            .pks
            .iter()
            .filter_map(|p| self.column_index(p))
            .collect();
        if indexes.is_empty() {
            row.values().to_vec()
        } else {
            indexes.iter().map(|&i| row.value_at(i).clone()).collect()
        }
    }
}

/// Data sources that can be asserted on as a snapshot.
pub trait AsSnapshot {
    /// The underlying snapshot.
    fn as_snapshot(&self) -> &Snapshot;
}

impl AsSnapshot for Snapshot {
    fn as_snapshot(&self) -> &Snapshot {
        self
    }
}
