//! Table snapshots.
//!
//! A [`Table`] buffers the full content of one database table at the moment
//! `build` runs: column names and declared types from `PRAGMA table_info`,
//! primary keys from the same pragma, and every row of the table.

use std::sync::Arc;

use rusqlite::Connection;

use super::{AsSnapshot, Row, Snapshot};
use crate::error::{Error, Result};
use crate::value::Value;

/// Start building a table snapshot.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{expect, table};
///
/// let members = table("members").build(&conn)?;
/// expect(&members).has_rows_size(4);
/// ```
pub fn table(name: impl Into<String>) -> TableBuilder {
    TableBuilder {
        name: name.into(),
        including: Vec::new(),
        excluding: Vec::new(),
    }
}

/// Builder for a [`Table`] snapshot.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    including: Vec<String>,
    excluding: Vec<String>,
}

impl TableBuilder {
    /// Restrict the snapshot to the named columns, keeping table order.
    /// Names are matched case-insensitively.
    pub fn including<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.including.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Drop the named columns from the snapshot. Names are matched
    /// case-insensitively.
    pub fn excluding<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluding.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Read the table content and build the snapshot.
    pub fn build(self, conn: &Connection) -> Result<Table> {
        let snapshot = read_table_snapshot(conn, &self.name, &self.including, &self.excluding)?;
        Ok(Table {
            name: self.name,
            snapshot,
        })
    }
}

/// A point-in-time snapshot of one database table.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    snapshot: Snapshot,
}

impl Table {
    /// Snapshot the whole table, all columns included.
    pub fn new(conn: &Connection, name: impl Into<String>) -> Result<Table> {
        table(name).build(conn)
    }

    /// The table name as given.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AsSnapshot for Table {
    fn as_snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Quote an identifier for interpolation into SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn read_table_snapshot(
    conn: &Connection,
    name: &str,
    including: &[String],
    excluding: &[String],
) -> Result<Snapshot> {
    struct TableColumn {
        name: String,
        decl_type: String,
        pk: i64,
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(name)))?;
    let mut columns: Vec<TableColumn> = Vec::new();
    let mut pragma_rows = stmt.query([])?;
    while let Some(row) = pragma_rows.next()? {
        columns.push(TableColumn {
            name: row.get(1)?,
            decl_type: row.get(2)?,
            pk: row.get(5)?,
        });
    }
    if columns.is_empty() {
        return Err(Error::TableNotFound(name.to_string()));
    }

    for wanted in including.iter().chain(excluding.iter()) {
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(wanted)) {
            return Err(Error::UnknownColumn(wanted.clone()));
        }
    }
    let selected: Vec<&TableColumn> = columns
        .iter()
        .filter(|c| {
            (including.is_empty() || including.iter().any(|i| c.name.eq_ignore_ascii_case(i)))
                && !excluding.iter().any(|e| c.name.eq_ignore_ascii_case(e))
        })
        .collect();

    // Primary keys come from the full table definition, ordered by their
    // position in the key.
    let mut pk_columns: Vec<(&TableColumn, i64)> = columns
        .iter()
        .filter(|c| c.pk > 0)
        .map(|c| (c, c.pk))
        .collect();
    pk_columns.sort_by_key(|(_, order)| *order);
    let pks: Vec<String> = pk_columns
        .into_iter()
        .map(|(c, _)| c.name.to_uppercase())
        .collect();

    let sql = format!(
        "SELECT {} FROM {}",
        selected
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", "),
        quote_ident(name)
    );
    let names = Arc::new(
        selected
            .iter()
            .map(|c| c.name.to_uppercase())
            .collect::<Vec<_>>(),
    );
    let decl_types: Vec<String> = selected.iter().map(|c| c.decl_type.clone()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let mut rows_out = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(names.len());
        for (i, decl) in decl_types.iter().enumerate() {
            values.push(Value::from_sql(Some(decl), row.get_ref(i)?));
        }
        rows_out.push(Row::new(Arc::clone(&names), values));
    }

    Ok(Snapshot::new(
        format!("{} table", name),
        names,
        pks,
        rows_out,
    ))
}
