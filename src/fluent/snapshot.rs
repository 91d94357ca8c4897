//! Fluent assertions on table and request snapshots.
//!
//! This module provides the navigation layer for snapshots:
//! - `expect()` - Entry point for creating assertions from a table or request
//! - `SnapshotAssert` - Holds the snapshot and the row/column cursors
//! - `RowAssert` / `ColumnAssert` - Assertions scoped to one row or column

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::messages;
use super::value::ValueAssert;
use crate::snapshot::{AsSnapshot, Column, Row, Snapshot};
use crate::value::{self, Value};

/// Create an expectation on a table or request snapshot.
///
/// This is the entry point of the fluent assertion API for snapshots.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{expect, table};
///
/// let members = table("members").build(&conn)?;
/// expect(&members)
///     .has_rows_size(4)
///     .row()
///     .value_named("name")
///     .is_equal_to("Hewson");
/// ```
pub fn expect<S: AsSnapshot>(source: &S) -> SnapshotAssert<'_> {
    SnapshotAssert::new(source.as_snapshot())
}

struct SnapshotState<'a> {
    snapshot: &'a Snapshot,
    description: String,
    index_next_row: usize,
    index_next_column: usize,
    rows: HashMap<usize, RowAssert<'a>>,
    columns: HashMap<usize, ColumnAssert>,
}

/// Assertion handle on a snapshot, tracking the next-row and next-column
/// cursors and memoizing the child handles it creates.
#[derive(Clone)]
pub struct SnapshotAssert<'a> {
    state: Rc<RefCell<SnapshotState<'a>>>,
}

impl<'a> SnapshotAssert<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            state: Rc::new(RefCell::new(SnapshotState {
                snapshot,
                description: snapshot.description().to_string(),
                index_next_row: 0,
                index_next_column: 0,
                rows: HashMap::new(),
                columns: HashMap::new(),
            })),
        }
    }

    /// Whether two handles come from the same expectation.
    pub fn is_same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // =========================================================================
    // Size assertions
    // =========================================================================

    /// Assert the number of rows.
    pub fn has_rows_size(&self, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.snapshot.rows().len();
        if size != expected {
            super::fail(&state.description, &messages::should_have_rows_size(size, expected));
        }
        self
    }

    /// Assert the number of columns.
    pub fn has_columns_size(&self, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.snapshot.column_names().len();
        if size != expected {
            super::fail(
                &state.description,
                &messages::should_have_columns_size(size, expected),
            );
        }
        self
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The next unseen row; advances the row cursor.
    pub fn row(&self) -> RowAssert<'a> {
        let index = self.state.borrow().index_next_row;
        self.row_at(index)
    }

    /// The row at `index`; sets the row cursor to `index + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn row_at(&self, index: usize) -> RowAssert<'a> {
        let mut state = self.state.borrow_mut();
        let snapshot = state.snapshot;
        let size = snapshot.rows().len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_row = index + 1;
        if let Some(existing) = state.rows.get(&index) {
            return existing.clone();
        }
        let description = format!("Row at index {} of {}", index, state.description);
        let child = RowAssert::new(snapshot.row(index), description);
        state.rows.insert(index, child.clone());
        child
    }

    /// The next unseen column; advances the column cursor.
    pub fn column(&self) -> ColumnAssert {
        let index = self.state.borrow().index_next_column;
        self.column_at(index)
    }

    /// The column at `index`; sets the column cursor to `index + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn column_at(&self, index: usize) -> ColumnAssert {
        let mut state = self.state.borrow_mut();
        let snapshot = state.snapshot;
        let size = snapshot.column_names().len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_column = index + 1;
        if let Some(existing) = state.columns.get(&index) {
            return existing.clone();
        }
        let column = snapshot.column(index);
        let description = format!(
            "Column at index {} (column name : {}) of {}",
            index,
            column.name(),
            state.description
        );
        let child = ColumnAssert::new(column, description);
        state.columns.insert(index, child.clone());
        child
    }

    /// The column with the given name; the lookup is case-insensitive.
    ///
    /// # Panics
    ///
    /// Panics if no column has that name.
    pub fn column_named(&self, name: &str) -> ColumnAssert {
        let index = self.state.borrow().snapshot.column_index(name);
        match index {
            Some(index) => self.column_at(index),
            None => panic!("Column <{}> does not exist", name),
        }
    }
}

struct RowState<'a> {
    row: &'a Row,
    description: String,
    index_next_value: usize,
    values: HashMap<usize, ValueAssert>,
}

/// Assertion handle on one row, tracking the next-value cursor.
#[derive(Clone)]
pub struct RowAssert<'a> {
    state: Rc<RefCell<RowState<'a>>>,
}

impl<'a> RowAssert<'a> {
    fn new(row: &'a Row, description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(RowState {
                row,
                description,
                index_next_value: 0,
                values: HashMap::new(),
            })),
        }
    }

    /// Whether two handles come from the same memoized navigation.
    pub fn is_same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Assert the number of values in the row.
    pub fn has_size(&self, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.row.len();
        if size != expected {
            super::fail(&state.description, &messages::should_have_values_size(size, expected));
        }
        self
    }

    /// Assert the row holds exactly these values, in column order.
    pub fn has_values<I, V>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let state = self.state.borrow();
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        check_values(&state.description, state.row.values(), &expected);
        self
    }

    /// The next unseen value; advances the value cursor.
    pub fn value(&self) -> ValueAssert {
        let index = self.state.borrow().index_next_value;
        self.value_at(index)
    }

    /// The value at `index`; sets the value cursor to `index + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn value_at(&self, index: usize) -> ValueAssert {
        let mut state = self.state.borrow_mut();
        let size = state.row.len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_value = index + 1;
        if let Some(existing) = state.values.get(&index) {
            return existing.clone();
        }
        let description = format!("Value at index {} of {}", index, state.description);
        let child = ValueAssert::new(state.row.value_at(index).clone(), description);
        state.values.insert(index, child.clone());
        child
    }

    /// The value of the named column; the lookup is case-insensitive.
    ///
    /// # Panics
    ///
    /// Panics if no column has that name.
    pub fn value_named(&self, name: &str) -> ValueAssert {
        let index = self.state.borrow().row.column_index(name);
        match index {
            Some(index) => self.value_at(index),
            None => panic!("Column <{}> does not exist", name),
        }
    }
}

struct ColumnState {
    column: Column,
    description: String,
    index_next_value: usize,
    values: HashMap<usize, ValueAssert>,
}

/// Assertion handle on one column, tracking the next-value cursor.
#[derive(Clone)]
pub struct ColumnAssert {
    state: Rc<RefCell<ColumnState>>,
}

impl ColumnAssert {
    fn new(column: Column, description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(ColumnState {
                column,
                description,
                index_next_value: 0,
                values: HashMap::new(),
            })),
        }
    }

    /// Whether two handles come from the same memoized navigation.
    pub fn is_same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Assert the column's name; the comparison is case-insensitive.
    pub fn has_column_name(&self, expected: &str) -> &Self {
        let state = self.state.borrow();
        if !state.column.name().eq_ignore_ascii_case(expected) {
            super::fail(
                &state.description,
                &messages::should_have_column_name(state.column.name(), expected),
            );
        }
        self
    }

    /// Assert the number of values in the column (one per row).
    pub fn has_size(&self, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.column.len();
        if size != expected {
            super::fail(&state.description, &messages::should_have_values_size(size, expected));
        }
        self
    }

    /// Assert the column holds exactly these values, in row order.
    pub fn has_values<I, V>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let state = self.state.borrow();
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        check_values(&state.description, state.column.values(), &expected);
        self
    }

    /// Assert every value of the column is null.
    pub fn has_only_null_values(&self) -> &Self {
        let state = self.state.borrow();
        if let Some(index) = state.column.values().iter().position(|v| *v != Value::Null) {
            super::fail(&state.description, &messages::should_contain_only_null(index));
        }
        self
    }

    /// The next unseen value; advances the value cursor.
    pub fn value(&self) -> ValueAssert {
        let index = self.state.borrow().index_next_value;
        self.value_at(index)
    }

    /// The value at row `index`; sets the value cursor to `index + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn value_at(&self, index: usize) -> ValueAssert {
        let mut state = self.state.borrow_mut();
        let size = state.column.len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_value = index + 1;
        if let Some(existing) = state.values.get(&index) {
            return existing.clone();
        }
        let description = format!("Value at index {} of {}", index, state.description);
        let child = ValueAssert::new(state.column.value_at(index).clone(), description);
        state.values.insert(index, child.clone());
        child
    }
}

/// Compare actual values against expected ones, coercing text expected
/// values against typed actuals the same way single-value equality does.
pub(crate) fn check_values(description: &str, actual: &[Value], expected: &[Value]) {
    if actual.len() != expected.len() {
        super::fail(
            description,
            &messages::should_have_values_size(actual.len(), expected.len()),
        );
    }
    for (index, (actual, expected)) in actual.iter().zip(expected.iter()).enumerate() {
        let expected = match value::coerce_expected(actual, expected.clone()) {
            Ok(v) => v,
            Err(text) => panic!(
                "Expected <{}> is not correct to compare to a value of type {}",
                text,
                actual.value_type()
            ),
        };
        if actual != &expected {
            super::fail(
                description,
                &messages::should_be_equal_at_index(index, actual, &expected),
            );
        }
    }
}
