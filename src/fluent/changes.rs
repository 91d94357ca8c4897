//! Fluent assertions on captured changes.
//!
//! Navigation on changes is richer than on snapshots: the next-change cursor
//! is kept per (change kind, table name) pair, so `change_of_creation()` and
//! `change_on_table("members")` each walk their own filtered sequence while
//! `change_at(i)` addresses the full list directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::messages;
use super::snapshot::check_values;
use super::value::ValueAssert;
use crate::snapshot::{Change, ChangeKind, Changes, Row};
use crate::value::{self, Value};

/// Create an expectation on captured changes.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{expect_changes, Changes};
///
/// expect_changes(&changes)
///     .has_size(1)
///     .change_at(0)
///     .is_modification()
///     .column_named("points")
///     .value_at_end_point()
///     .is_equal_to(12);
/// ```
///
/// # Panics
///
/// Panics if the start and end points have not both been captured.
pub fn expect_changes(changes: &Changes) -> ChangesAssert<'_> {
    let list = match changes.changes() {
        Ok(list) => list,
        Err(e) => panic!("{}", e),
    };
    ChangesAssert::new(list, changes.description())
}

type CursorKey = (Option<ChangeKind>, Option<String>);

struct ChangesState<'a> {
    changes: &'a [Change],
    description: String,
    index_next: HashMap<CursorKey, usize>,
    cache: HashMap<usize, ChangeAssert<'a>>,
}

/// Assertion handle on a change list, with one next-change cursor per
/// (kind, table) filter and memoized change handles.
#[derive(Clone)]
pub struct ChangesAssert<'a> {
    state: Rc<RefCell<ChangesState<'a>>>,
}

impl<'a> ChangesAssert<'a> {
    fn new(changes: &'a [Change], description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChangesState {
                changes,
                description,
                index_next: HashMap::new(),
                cache: HashMap::new(),
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

    /// Assert the total number of changes.
    pub fn has_size(&self, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.changes.len();
        if size != expected {
            super::fail(&state.description, &messages::should_have_changes_size(size, expected));
        }
        self
    }

    /// Assert the number of creations.
    pub fn has_number_of_creations(&self, expected: usize) -> &Self {
        self.has_number_of_kind(ChangeKind::Creation, expected)
    }

    /// Assert the number of modifications.
    pub fn has_number_of_modifications(&self, expected: usize) -> &Self {
        self.has_number_of_kind(ChangeKind::Modification, expected)
    }

    /// Assert the number of deletions.
    pub fn has_number_of_deletions(&self, expected: usize) -> &Self {
        self.has_number_of_kind(ChangeKind::Deletion, expected)
    }

    fn has_number_of_kind(&self, kind: ChangeKind, expected: usize) -> &Self {
        let state = self.state.borrow();
        let size = state.changes.iter().filter(|c| c.kind() == kind).count();
        if size != expected {
            super::fail(
                &state.description,
                &messages::should_have_changes_size_of_kind(kind, size, expected),
            );
        }
        self
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The next unseen change; advances the unfiltered cursor.
    pub fn change(&self) -> ChangeAssert<'a> {
        self.nav(None, None)
    }

    /// The change at `index` in the full list; sets the unfiltered cursor to
    /// `index + 1`.
    pub fn change_at(&self, index: usize) -> ChangeAssert<'a> {
        self.nav_at(None, None, index)
    }

    /// The next unseen creation.
    pub fn change_of_creation(&self) -> ChangeAssert<'a> {
        self.nav(Some(ChangeKind::Creation), None)
    }

    /// The creation at `index` among creations.
    pub fn change_of_creation_at(&self, index: usize) -> ChangeAssert<'a> {
        self.nav_at(Some(ChangeKind::Creation), None, index)
    }

    /// The next unseen modification.
    pub fn change_of_modification(&self) -> ChangeAssert<'a> {
        self.nav(Some(ChangeKind::Modification), None)
    }

    /// The modification at `index` among modifications.
    pub fn change_of_modification_at(&self, index: usize) -> ChangeAssert<'a> {
        self.nav_at(Some(ChangeKind::Modification), None, index)
    }

    /// The next unseen deletion.
    pub fn change_of_deletion(&self) -> ChangeAssert<'a> {
        self.nav(Some(ChangeKind::Deletion), None)
    }

    /// The deletion at `index` among deletions.
    pub fn change_of_deletion_at(&self, index: usize) -> ChangeAssert<'a> {
        self.nav_at(Some(ChangeKind::Deletion), None, index)
    }

    /// The next unseen change on the named table.
    pub fn change_on_table(&self, table: &str) -> ChangeAssert<'a> {
        self.nav(None, Some(table))
    }

    /// The change at `index` among changes on the named table.
    pub fn change_on_table_at(&self, table: &str, index: usize) -> ChangeAssert<'a> {
        self.nav_at(None, Some(table), index)
    }

    /// The next unseen change of the given kind on the named table.
    pub fn change_of_on_table(&self, kind: ChangeKind, table: &str) -> ChangeAssert<'a> {
        self.nav(Some(kind), Some(table))
    }

    /// The change at `index` among changes of the given kind on the named
    /// table.
    pub fn change_of_on_table_at(&self, kind: ChangeKind, table: &str, index: usize) -> ChangeAssert<'a> {
        self.nav_at(Some(kind), Some(table), index)
    }

    // =========================================================================
    // Internal navigation
    // =========================================================================

    fn cursor_key(kind: Option<ChangeKind>, table: Option<&str>) -> CursorKey {
        (kind, table.map(str::to_lowercase))
    }

    fn nav(&self, kind: Option<ChangeKind>, table: Option<&str>) -> ChangeAssert<'a> {
        let key = Self::cursor_key(kind, table);
        let index = *self.state.borrow().index_next.get(&key).unwrap_or(&0);
        self.nav_at(kind, table, index)
    }

    fn nav_at(&self, kind: Option<ChangeKind>, table: Option<&str>, index: usize) -> ChangeAssert<'a> {
        let mut state = self.state.borrow_mut();
        let changes: &'a [Change] = state.changes;
        let filtered: Vec<usize> = changes
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                kind.map_or(true, |k| c.kind() == k)
                    && table.map_or(true, |t| c.table_name().eq_ignore_ascii_case(t))
            })
            .map(|(i, _)| i)
            .collect();
        if index >= filtered.len() {
            panic!("Index {} out of the limits [0, {}[", index, filtered.len());
        }
        state.index_next.insert(Self::cursor_key(kind, table), index + 1);

        let absolute = filtered[index];
        if let Some(existing) = state.cache.get(&absolute) {
            return existing.clone();
        }
        let change = &changes[absolute];
        let description = format!(
            "Change at index {} (on table : {}) of {}",
            absolute,
            change.table_name(),
            state.description
        );
        let child = ChangeAssert::new(change, description);
        state.cache.insert(absolute, child.clone());
        child
    }
}

struct ChangeState<'a> {
    change: &'a Change,
    description: String,
    index_next_column: usize,
    columns: HashMap<usize, ChangeColumnAssert>,
    row_at_start: Option<ChangeRowAssert<'a>>,
    row_at_end: Option<ChangeRowAssert<'a>>,
}

/// Assertion handle on one change, with a next-column cursor and memoized
/// row and column handles.
#[derive(Clone)]
pub struct ChangeAssert<'a> {
    state: Rc<RefCell<ChangeState<'a>>>,
}

impl<'a> ChangeAssert<'a> {
    fn new(change: &'a Change, description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChangeState {
                change,
                description,
                index_next_column: 0,
                columns: HashMap::new(),
                row_at_start: None,
                row_at_end: None,
            })),
        }
    }

    /// Whether two handles come from the same memoized navigation.
    pub fn is_same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // =========================================================================
    // Change-level assertions
    // =========================================================================

    /// Assert the change is a creation.
    pub fn is_creation(&self) -> &Self {
        self.has_kind(ChangeKind::Creation)
    }

    /// Assert the change is a modification.
    pub fn is_modification(&self) -> &Self {
        self.has_kind(ChangeKind::Modification)
    }

    /// Assert the change is a deletion.
    pub fn is_deletion(&self) -> &Self {
        self.has_kind(ChangeKind::Deletion)
    }

    fn has_kind(&self, expected: ChangeKind) -> &Self {
        let state = self.state.borrow();
        if state.change.kind() != expected {
            super::fail(
                &state.description,
                &messages::should_be_change_kind(expected, state.change.kind()),
            );
        }
        self
    }

    /// Assert the change was observed on the named table; the comparison is
    /// case-insensitive.
    pub fn is_on_table(&self, expected: &str) -> &Self {
        let state = self.state.borrow();
        if !state.change.table_name().eq_ignore_ascii_case(expected) {
            super::fail(
                &state.description,
                &messages::should_be_on_table(expected, state.change.table_name()),
            );
        }
        self
    }

    /// Assert the names of the primary-key columns, in key order; the
    /// comparison is case-insensitive.
    pub fn has_pks_names<I, S>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = self.state.borrow();
        let expected: Vec<String> = expected
            .into_iter()
            .map(|s| s.into().to_uppercase())
            .collect();
        if state.change.pks_names() != expected.as_slice() {
            super::fail(
                &state.description,
                &messages::should_have_pks_names(state.change.pks_names(), &expected),
            );
        }
        self
    }

    /// Assert the primary-key values identifying the changed row.
    pub fn has_pks_values<I, V>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let state = self.state.borrow();
        let actual = state.change.pks_values();
        let expected: Vec<Value> = expected
            .into_iter()
            .map(Into::into)
            .zip(actual.iter().map(Some).chain(std::iter::repeat(None)))
            .map(|(e, a)| match a {
                Some(a) => value::coerce_expected(a, e).unwrap_or_else(|text| {
                    panic!(
                        "Expected <{}> is not correct to compare to a value of type {}",
                        text,
                        a.value_type()
                    )
                }),
                None => e,
            })
            .collect();
        if actual != expected.as_slice() {
            super::fail(
                &state.description,
                &messages::should_have_pks_values(actual, &expected),
            );
        }
        self
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The row at the start point (absent for a creation).
    pub fn row_at_start_point(&self) -> ChangeRowAssert<'a> {
        let mut state = self.state.borrow_mut();
        if let Some(existing) = &state.row_at_start {
            return existing.clone();
        }
        let description = format!("Row at start point of {}", state.description);
        let child = ChangeRowAssert::new(state.change.row_at_start_point(), description);
        state.row_at_start = Some(child.clone());
        child
    }

    /// The row at the end point (absent for a deletion).
    pub fn row_at_end_point(&self) -> ChangeRowAssert<'a> {
        let mut state = self.state.borrow_mut();
        if let Some(existing) = &state.row_at_end {
            return existing.clone();
        }
        let description = format!("Row at end point of {}", state.description);
        let child = ChangeRowAssert::new(state.change.row_at_end_point(), description);
        state.row_at_end = Some(child.clone());
        child
    }

    /// The next unseen column; advances the column cursor.
    pub fn column(&self) -> ChangeColumnAssert {
        let index = self.state.borrow().index_next_column;
        self.column_at(index)
    }

    /// The column at `index`; sets the column cursor to `index + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn column_at(&self, index: usize) -> ChangeColumnAssert {
        let mut state = self.state.borrow_mut();
        let size = state.change.column_names().len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_column = index + 1;
        if let Some(existing) = state.columns.get(&index) {
            return existing.clone();
        }
        let name = state.change.column_names()[index].clone();
        let description = format!(
            "Column at index {} (column name : {}) of {}",
            index, name, state.description
        );
        let child = ChangeColumnAssert::new(
            name,
            state.change.value_at_start_point(index),
            state.change.value_at_end_point(index),
            description,
        );
        state.columns.insert(index, child.clone());
        child
    }

    /// The column with the given name; the lookup is case-insensitive.
    ///
    /// # Panics
    ///
    /// Panics if no column has that name.
    pub fn column_named(&self, name: &str) -> ChangeColumnAssert {
        let index = self.state.borrow().change.column_index(name);
        match index {
            Some(index) => self.column_at(index),
            None => panic!("Column <{}> does not exist", name),
        }
    }
}

struct ChangeRowState<'a> {
    row: Option<&'a Row>,
    description: String,
    index_next_value: usize,
    values: HashMap<usize, ValueAssert>,
}

/// Assertion handle on the row at one point of a change. The row may be
/// absent (start point of a creation, end point of a deletion).
#[derive(Clone)]
pub struct ChangeRowAssert<'a> {
    state: Rc<RefCell<ChangeRowState<'a>>>,
}

impl<'a> ChangeRowAssert<'a> {
    fn new(row: Option<&'a Row>, description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChangeRowState {
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

    /// Assert the row exists at this point.
    pub fn exists(&self) -> &Self {
        let state = self.state.borrow();
        if state.row.is_none() {
            super::fail(&state.description, &messages::should_exist());
        }
        self
    }

    /// Assert the row does not exist at this point.
    pub fn does_not_exist(&self) -> &Self {
        let state = self.state.borrow();
        if state.row.is_some() {
            super::fail(&state.description, &messages::should_not_exist());
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
        let row = match state.row {
            Some(row) => row,
            None => super::fail(&state.description, &messages::should_exist()),
        };
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        check_values(&state.description, row.values(), &expected);
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
    /// Panics if the row does not exist at this point or `index` is out of
    /// bounds.
    pub fn value_at(&self, index: usize) -> ValueAssert {
        let mut state = self.state.borrow_mut();
        let row = match state.row {
            Some(row) => row,
            None => panic!("Row does not exist"),
        };
        let size = row.len();
        if index >= size {
            panic!("Index {} out of the limits [0, {}[", index, size);
        }
        state.index_next_value = index + 1;
        if let Some(existing) = state.values.get(&index) {
            return existing.clone();
        }
        let description = format!("Value at index {} of {}", index, state.description);
        let child = ValueAssert::new(row.value_at(index).clone(), description);
        state.values.insert(index, child.clone());
        child
    }

    /// The value of the named column; the lookup is case-insensitive.
    ///
    /// # Panics
    ///
    /// Panics if the row does not exist at this point or no column has that
    /// name.
    pub fn value_named(&self, name: &str) -> ValueAssert {
        let index = {
            let state = self.state.borrow();
            let row = match state.row {
                Some(row) => row,
                None => panic!("Row does not exist"),
            };
            row.column_index(name)
        };
        match index {
            Some(index) => self.value_at(index),
            None => panic!("Column <{}> does not exist", name),
        }
    }
}

struct ChangeColumnState {
    column_name: String,
    value_at_start: Value,
    value_at_end: Value,
    description: String,
    at_start: Option<ValueAssert>,
    at_end: Option<ValueAssert>,
}

/// Assertion handle on one column of a change, holding the value at each
/// point.
#[derive(Clone)]
pub struct ChangeColumnAssert {
    state: Rc<RefCell<ChangeColumnState>>,
}

impl ChangeColumnAssert {
    fn new(column_name: String, value_at_start: Value, value_at_end: Value, description: String) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChangeColumnState {
                column_name,
                value_at_start,
                value_at_end,
                description,
                at_start: None,
                at_end: None,
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
        if !state.column_name.eq_ignore_ascii_case(expected) {
            super::fail(
                &state.description,
                &messages::should_have_column_name(&state.column_name, expected),
            );
        }
        self
    }

    /// Assert the column value changed between the two points. Absent rows
    /// count as null, and null-to-null is not a modification.
    pub fn is_modified(&self) -> &Self {
        let state = self.state.borrow();
        if state.value_at_start == state.value_at_end {
            super::fail(
                &state.description,
                &messages::should_be_modified(&state.value_at_start, &state.value_at_end),
            );
        }
        self
    }

    /// Assert the column value is the same at both points.
    pub fn is_not_modified(&self) -> &Self {
        let state = self.state.borrow();
        if state.value_at_start != state.value_at_end {
            super::fail(
                &state.description,
                &messages::should_not_be_modified(&state.value_at_start, &state.value_at_end),
            );
        }
        self
    }

    /// Assertions on the value at the start point.
    pub fn value_at_start_point(&self) -> ValueAssert {
        let mut state = self.state.borrow_mut();
        if let Some(existing) = &state.at_start {
            return existing.clone();
        }
        let description = format!("Value at start point of {}", state.description);
        let child = ValueAssert::new(state.value_at_start.clone(), description);
        state.at_start = Some(child.clone());
        child
    }

    /// Assertions on the value at the end point.
    pub fn value_at_end_point(&self) -> ValueAssert {
        let mut state = self.state.borrow_mut();
        if let Some(existing) = &state.at_end {
            return existing.clone();
        }
        let description = format!("Value at end point of {}", state.description);
        let child = ValueAssert::new(state.value_at_end.clone(), description);
        state.at_end = Some(child.clone());
        child
    }
}
