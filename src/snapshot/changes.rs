//! Row-level changes between two snapshots.
//!
//! A [`Changes`] watches a set of tables (or one request), captures a start
//! point and an end point, and diffs the two captures row-by-row, matched by
//! primary key. Rows present only at the end point are creations, rows only
//! at the start point are deletions, rows present at both with differing
//! values are modifications.

use std::fmt;
use std::sync::Arc;

use rusqlite::Connection;

use super::request::{read_request_snapshot, short_sql, RequestBuilder};
use super::table::read_table_snapshot;
use super::{Row, Snapshot};
use crate::error::{Error, Result};
use crate::value::Value;

/// The kind of a [`Change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The row exists only at the end point.
    Creation,
    /// The row exists at both points with differing values.
    Modification,
    /// The row exists only at the start point.
    Deletion,
}

impl ChangeKind {
    /// The canonical name used in failure messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Creation => "CREATION",
            ChangeKind::Modification => "MODIFICATION",
            ChangeKind::Deletion => "DELETION",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row-level diff, identified by its primary key and carrying the row at
/// each point (absent on one side for creations and deletions).
#[derive(Debug, Clone)]
pub struct Change {
    kind: ChangeKind,
    table_name: String,
    columns: Arc<Vec<String>>,
    pks: Vec<String>,
    pk_values: Vec<Value>,
    row_at_start: Option<Row>,
    row_at_end: Option<Row>,
}

impl Change {
    /// The change kind.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Name of the data source the change was observed on.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Column names, upper-cased.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Primary-key column names, upper-cased.
    pub fn pks_names(&self) -> &[String] {
        &self.pks
    }

    /// Primary-key values identifying the changed row.
    pub fn pks_values(&self) -> &[Value] {
        &self.pk_values
    }

    /// The row at the start point, absent for a creation.
    pub fn row_at_start_point(&self) -> Option<&Row> {
        self.row_at_start.as_ref()
    }

    /// The row at the end point, absent for a deletion.
    pub fn row_at_end_point(&self) -> Option<&Row> {
        self.row_at_end.as_ref()
    }

    /// The value of column `index` at the start point, `Null` when the row
    /// is absent there.
    pub fn value_at_start_point(&self, index: usize) -> Value {
        self.row_at_start
            .as_ref()
            .map(|r| r.value_at(index).clone())
            .unwrap_or(Value::Null)
    }

    /// The value of column `index` at the end point, `Null` when the row is
    /// absent there.
    pub fn value_at_end_point(&self, index: usize) -> Value {
        self.row_at_end
            .as_ref()
            .map(|r| r.value_at(index).clone())
            .unwrap_or(Value::Null)
    }

    /// Position of the named column. The lookup is case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        self.columns.iter().position(|c| *c == upper)
    }
}

#[derive(Debug, Clone)]
enum Source {
    Tables(Vec<String>),
    AllTables,
    Request(RequestBuilder),
}

/// Captures two point-in-time snapshots of a set of data sources and exposes
/// their row-level diff.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{expect_changes, Changes};
///
/// let mut changes = Changes::on_tables(["members"]);
/// changes.set_start_point_now(&conn)?;
/// conn.execute("UPDATE members SET name = 'X' WHERE id = 1", [])?;
/// changes.set_end_point_now(&conn)?;
///
/// expect_changes(&changes).has_size(1);
/// ```
#[derive(Debug, Clone)]
pub struct Changes {
    source: Source,
    start: Option<Vec<(String, Snapshot)>>,
    changes: Option<Vec<Change>>,
}

impl Changes {
    /// Watch the named tables.
    pub fn on_tables<I, S>(names: I) -> Changes
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Changes {
            source: Source::Tables(names.into_iter().map(Into::into).collect()),
            start: None,
            changes: None,
        }
    }

    /// Watch every user table of the database.
    pub fn on_all_tables() -> Changes {
        Changes {
            source: Source::AllTables,
            start: None,
            changes: None,
        }
    }

    /// Watch the result of a request. Declare the result's primary keys with
    /// [`RequestBuilder::with_pks`] so rows can be matched between points.
    pub fn on_request(request: RequestBuilder) -> Changes {
        Changes {
            source: Source::Request(request),
            start: None,
            changes: None,
        }
    }

    /// Capture the start point. Clears any previously computed changes.
    pub fn set_start_point_now(&mut self, conn: &Connection) -> Result<()> {
        self.start = Some(self.capture(conn)?);
        self.changes = None;
        Ok(())
    }

    /// Capture the end point and compute the diff against the start point.
    pub fn set_end_point_now(&mut self, conn: &Connection) -> Result<()> {
        let start = self.start.as_ref().ok_or(Error::StartPointNotSet)?;
        let end = self.capture(conn)?;

        let mut all = Vec::new();
        for (name, start_snapshot) in start {
            match end.iter().find(|(n, _)| n == name) {
                Some((_, end_snapshot)) => all.extend(diff(name, start_snapshot, end_snapshot)),
                // Table dropped between the points: everything was deleted.
                None => all.extend(diff_against_empty(name, start_snapshot)),
            }
        }
        for (name, end_snapshot) in &end {
            if !start.iter().any(|(n, _)| n == name) {
                all.extend(diff_from_empty(name, end_snapshot));
            }
        }
        self.changes = Some(all);
        Ok(())
    }

    /// The computed change list, in per-source order: creations, then
    /// modifications, then deletions, each in source row order.
    pub fn changes(&self) -> Result<&[Change]> {
        self.changes.as_deref().ok_or(Error::EndPointNotSet)
    }

    /// Description of the watched sources, used in failure messages.
    pub fn description(&self) -> String {
        match &self.source {
            Source::Tables(names) if names.len() == 1 => {
                format!("Changes on {} table", names[0])
            }
            Source::Tables(names) => format!("Changes on tables {}", names.join(", ")),
            Source::AllTables => "Changes on all tables".to_string(),
            Source::Request(request) => {
                format!("Changes on '{}' request", short_sql(&request.sql))
            }
        }
    }

    fn capture(&self, conn: &Connection) -> Result<Vec<(String, Snapshot)>> {
        match &self.source {
            Source::Tables(names) => names
                .iter()
                .map(|n| Ok((n.clone(), read_table_snapshot(conn, n, &[], &[])?)))
                .collect(),
            Source::AllTables => {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )?;
                let names: Vec<String> = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<_>>()?;
                names
                    .into_iter()
                    .map(|n| {
                        let snapshot = read_table_snapshot(conn, &n, &[], &[])?;
                        Ok((n, snapshot))
                    })
                    .collect()
            }
            Source::Request(request) => {
                let snapshot =
                    read_request_snapshot(conn, &request.sql, &request.params, &request.pks)?;
                Ok(vec![(format!("'{}' request", short_sql(&request.sql)), snapshot)])
            }
        }
    }
}

fn new_change(
    kind: ChangeKind,
    table: &str,
    snapshot: &Snapshot,
    row_at_start: Option<Row>,
    row_at_end: Option<Row>,
) -> Change {
    let keyed_row = row_at_end.as_ref().or(row_at_start.as_ref());
    let pk_values = keyed_row
        .map(|r| snapshot.key_of(r))
        .unwrap_or_default();
    Change {
        kind,
        table_name: table.to_string(),
        columns: snapshot.columns_arc(),
        pks: snapshot.pks_names().to_vec(),
        pk_values,
        row_at_start,
        row_at_end,
    }
}

/// Diff two captures of the same source. The output lists creations first in
/// end-point row order, then modifications and deletions in start-point row
/// order; rows are never sorted by key.
fn diff(table: &str, start: &Snapshot, end: &Snapshot) -> Vec<Change> {
    let mut used_end = vec![false; end.rows().len()];
    let mut matched: Vec<(usize, usize)> = Vec::new();
    let mut deleted: Vec<usize> = Vec::new();

    for (si, start_row) in start.rows().iter().enumerate() {
        let key = start.key_of(start_row);
        let hit = end
            .rows()
            .iter()
            .enumerate()
            .find(|(ei, end_row)| !used_end[*ei] && end.key_of(end_row) == key);
        match hit {
            Some((ei, _)) => {
                used_end[ei] = true;
                matched.push((si, ei));
            }
            None => deleted.push(si),
        }
    }

    let mut out = Vec::new();
    for (ei, end_row) in end.rows().iter().enumerate() {
        if !used_end[ei] {
            out.push(new_change(
                ChangeKind::Creation,
                table,
                end,
                None,
                Some(end_row.clone()),
            ));
        }
    }
    for (si, ei) in matched {
        let start_row = &start.rows()[si];
        let end_row = &end.rows()[ei];
        if start_row.values() != end_row.values() {
            out.push(new_change(
                ChangeKind::Modification,
                table,
                start,
                Some(start_row.clone()),
                Some(end_row.clone()),
            ));
        }
    }
    for si in deleted {
        let start_row = &start.rows()[si];
        out.push(new_change(
            ChangeKind::Deletion,
            table,
            start,
            Some(start_row.clone()),
            None,
        ));
    }
    out
}

fn diff_against_empty(table: &str, start: &Snapshot) -> Vec<Change> {
    start
        .rows()
        .iter()
        .map(|row| new_change(ChangeKind::Deletion, table, start, Some(row.clone()), None))
        .collect()
}

fn diff_from_empty(table: &str, end: &Snapshot) -> Vec<Change> {
    end.rows()
        .iter()
        .map(|row| new_change(ChangeKind::Creation, table, end, None, Some(row.clone())))
        .collect()
}
