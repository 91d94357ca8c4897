//! Ad-hoc query snapshots.
//!
//! A [`Request`] buffers the full result of an arbitrary SQL query. Unlike a
//! table, a query has no intrinsic primary key, so one can be declared by
//! hand when the request feeds a change capture.

use std::sync::Arc;

use rusqlite::{params_from_iter, Connection};

use super::{AsSnapshot, Row, Snapshot};
use crate::error::{Error, Result};
use crate::value::Value;

/// Start building a request snapshot.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{expect, request};
///
/// let winners = request("SELECT name FROM members WHERE points > ?1")
///     .with_param(10)
///     .build(&conn)?;
/// expect(&winners).has_rows_size(2);
/// ```
pub fn request(sql: impl Into<String>) -> RequestBuilder {
    RequestBuilder {
        sql: sql.into(),
        params: Vec::new(),
        pks: Vec::new(),
    }
}

/// Builder for a [`Request`] snapshot.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
    pub(crate) pks: Vec<String>,
}

impl RequestBuilder {
    /// Bind one positional parameter.
    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Bind several positional parameters at once.
    pub fn with_params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Declare the primary-key columns of the result, for change captures
    /// built on this request. Names are matched case-insensitively.
    pub fn with_pks<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pks.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Run the query and build the snapshot.
    pub fn build(self, conn: &Connection) -> Result<Request> {
        let snapshot = read_request_snapshot(conn, &self.sql, &self.params, &self.pks)?;
        Ok(Request {
            sql: self.sql,
            snapshot,
        })
    }
}

/// A point-in-time snapshot of an ad-hoc query result.
#[derive(Debug, Clone)]
pub struct Request {
    sql: String,
    snapshot: Snapshot,
}

impl Request {
    /// Snapshot a parameterless query.
    pub fn new(conn: &Connection, sql: impl Into<String>) -> Result<Request> {
        request(sql).build(conn)
    }

    /// The SQL text of the query.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl AsSnapshot for Request {
    fn as_snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Abbreviate a SQL text for use in descriptions.
pub(crate) fn short_sql(sql: &str) -> String {
    if sql.chars().count() > 30 {
        let head: String = sql.chars().take(30).collect();
        format!("{}...", head)
    } else {
        sql.to_string()
    }
}

pub(crate) fn read_request_snapshot(
    conn: &Connection,
    sql: &str,
    params: &[Value],
    pks: &[String],
) -> Result<Snapshot> {
    let mut stmt = conn.prepare(sql)?;
    let decl_types: Vec<Option<String>> = stmt
        .columns()
        .iter()
        .map(|c| c.decl_type().map(str::to_string))
        .collect();
    let names = Arc::new(
        stmt.column_names()
            .iter()
            .map(|n| n.to_uppercase())
            .collect::<Vec<_>>(),
    );
    for pk in pks {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(pk)) {
            return Err(Error::UnknownColumn(pk.clone()));
        }
    }
    let pks: Vec<String> = pks.iter().map(|p| p.to_uppercase()).collect();

    let mut rows_out = Vec::new();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(names.len());
        for (i, decl) in decl_types.iter().enumerate() {
            values.push(Value::from_sql(decl.as_deref(), row.get_ref(i)?));
        }
        rows_out.push(Row::new(Arc::clone(&names), values));
    }

    Ok(Snapshot::new(
        format!("'{}' request", short_sql(sql)),
        names,
        pks,
        rows_out,
    ))
}
