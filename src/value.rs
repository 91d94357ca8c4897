//! Typed column values.
//!
//! SQLite only stores five storage classes (null, integer, real, text, blob),
//! so dates, times, booleans and UUIDs arrive as plain text or integers. The
//! declared column type is used to lift raw values into their logical type,
//! the same way a driver surfaces typed accessors.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use uuid::Uuid;

use crate::error::Result;

/// A single column value read from a snapshot.
#[derive(Debug, Clone)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean (stored as an integer, lifted via a BOOLEAN declared type).
    Boolean(bool),
    /// An integer number.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A text value.
    Text(String),
    /// A binary value.
    Bytes(Vec<u8>),
    /// A calendar date (DATE declared type).
    Date(NaiveDate),
    /// A time of day (TIME declared type).
    Time(NaiveTime),
    /// A date and time (DATETIME or TIMESTAMP declared type).
    DateTime(NaiveDateTime),
    /// A UUID (UUID declared type, stored as text or a 16-byte blob).
    Uuid(Uuid),
}

/// The logical kind of a [`Value`], used by type-predicate assertions and
/// type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    Text,
    Bytes,
    Date,
    Time,
    DateTime,
    Uuid,
}

impl ValueType {
    /// The canonical name used in failure messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "NULL",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Number => "NUMBER",
            ValueType::Text => "TEXT",
            ValueType::Bytes => "BYTES",
            ValueType::Date => "DATE",
            ValueType::Time => "TIME",
            ValueType::DateTime => "DATE_TIME",
            ValueType::Uuid => "UUID",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    /// The logical kind of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) | Value::Float(_) => ValueType::Number,
            Value::Text(_) => ValueType::Text,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Date(_) => ValueType::Date,
            Value::Time(_) => ValueType::Time,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Uuid(_) => ValueType::Uuid,
        }
    }

    /// Lift a raw SQLite value into its logical type using the column's
    /// declared type. Falls back to the storage class when the declared type
    /// is absent or the stored text does not parse.
    pub(crate) fn from_sql(decl_type: Option<&str>, raw: ValueRef<'_>) -> Value {
        if let ValueRef::Null = raw {
            return Value::Null;
        }
        let decl = decl_type.map(str::to_ascii_uppercase);
        if let Some(decl) = decl.as_deref() {
            if decl.contains("BOOL") {
                if let ValueRef::Integer(i) = raw {
                    return Value::Boolean(i != 0);
                }
            } else if decl.contains("UUID") {
                match raw {
                    ValueRef::Text(t) => {
                        if let Some(u) = std::str::from_utf8(t).ok().and_then(|s| Uuid::parse_str(s).ok()) {
                            return Value::Uuid(u);
                        }
                    }
                    ValueRef::Blob(b) => {
                        if let Ok(u) = Uuid::from_slice(b) {
                            return Value::Uuid(u);
                        }
                    }
                    _ => {}
                }
            } else if decl.contains("DATETIME") || decl.contains("TIMESTAMP") {
                match raw {
                    ValueRef::Text(t) => {
                        if let Some(dt) = std::str::from_utf8(t).ok().and_then(parse_date_time) {
                            return Value::DateTime(dt);
                        }
                    }
                    ValueRef::Integer(i) => {
                        if let Some(dt) = chrono::DateTime::from_timestamp(i, 0) {
                            return Value::DateTime(dt.naive_utc());
                        }
                    }
                    _ => {}
                }
            } else if decl.contains("DATE") {
                if let ValueRef::Text(t) = raw {
                    if let Some(d) = std::str::from_utf8(t).ok().and_then(parse_date) {
                        return Value::Date(d);
                    }
                }
            } else if decl.contains("TIME") {
                if let ValueRef::Text(t) = raw {
                    if let Some(tm) = std::str::from_utf8(t).ok().and_then(parse_time) {
                        return Value::Time(tm);
                    }
                }
            }
        }
        match raw {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        }
    }
}

// Binding support so snapshot queries can take typed parameters.
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Date(d) => ToSqlOutput::Owned(SqlValue::Text(d.format("%Y-%m-%d").to_string())),
            Value::Time(t) => ToSqlOutput::Owned(SqlValue::Text(t.format("%H:%M:%S%.f").to_string())),
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            }
            Value::Uuid(u) => ToSqlOutput::Owned(SqlValue::Text(u.to_string())),
        })
    }
}

// Equality is type-aware: integers and floats compare numerically, and a date
// compares equal to the datetime at its midnight. Everything else requires
// the same logical type.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
            (Text(a), Text(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Date(a), DateTime(b)) | (DateTime(b), Date(a)) => a.and_hms_opt(0, 0, 0) == Some(*b),
            (Uuid(a), Uuid(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => {
                write!(f, "0x")?;
                for byte in b.iter().take(16) {
                    write!(f, "{:02x}", byte)?;
                }
                if b.len() > 16 {
                    write!(f, "... ({} bytes)", b.len())?;
                }
                Ok(())
            }
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

// =========================================================================
// Conversions for expected values
// =========================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Expected values can be written with `serde_json::json!`; arrays and
/// objects compare as their serialized text, matching how JSON columns are
/// stored.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            Json::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

// =========================================================================
// Comparison helpers used by the fluent layer
// =========================================================================

/// Whether two values are of comparable kinds for an equality check. A type
/// mismatch must fail differently from a value mismatch.
pub(crate) fn comparable_kinds(a: &Value, b: &Value) -> bool {
    use Value::*;
    matches!(
        (a, b),
        (Null, _)
            | (_, Null)
            | (Boolean(_), Boolean(_))
            | (Integer(_) | Float(_), Integer(_) | Float(_))
            | (Text(_), Text(_))
            | (Bytes(_), Bytes(_))
            | (Date(_) | DateTime(_), Date(_) | DateTime(_))
            | (Time(_), Time(_))
            | (Uuid(_), Uuid(_))
    )
}

/// Temporal ordering over dates, times and datetimes. A date compared to a
/// datetime is promoted to its midnight. `None` when the kinds do not form a
/// chronology pair.
pub(crate) fn chronology_ordering(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Date(x), Date(y)) => Some(x.cmp(y)),
        (Time(x), Time(y)) => Some(x.cmp(y)),
        (DateTime(x), DateTime(y)) => Some(x.cmp(y)),
        (Date(x), DateTime(y)) => Some(x.and_hms_opt(0, 0, 0)?.cmp(y)),
        (DateTime(x), Date(y)) => Some(x.cmp(&y.and_hms_opt(0, 0, 0)?)),
        _ => None,
    }
}

/// Numeric ordering across integers and floats. `None` when either side is
/// not a number.
pub(crate) fn numeric_ordering(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Integer(x), Integer(y)) => Some(x.cmp(y)),
        (Float(x), Float(y)) => x.partial_cmp(y),
        (Integer(x), Float(y)) => (*x as f64).partial_cmp(y),
        (Float(x), Integer(y)) => x.partial_cmp(&(*y as f64)),
        _ => None,
    }
}

/// Parse a text expected value into the actual value's kind, so assertions
/// can be written with ISO strings against date, time, datetime and UUID
/// columns. Returns the unparseable text on failure.
pub(crate) fn coerce_expected(actual: &Value, expected: Value) -> std::result::Result<Value, String> {
    let text = match (&actual, &expected) {
        (Value::Date(_) | Value::Time(_) | Value::DateTime(_) | Value::Uuid(_), Value::Text(s)) => {
            s.clone()
        }
        _ => return Ok(expected),
    };
    let parsed = match actual {
        Value::Date(_) => parse_date(&text)
            .map(Value::Date)
            .or_else(|| parse_date_time(&text).map(Value::DateTime)),
        Value::Time(_) => parse_time(&text).map(Value::Time),
        Value::DateTime(_) => parse_date_time(&text).map(Value::DateTime),
        Value::Uuid(_) => Uuid::parse_str(&text).ok().map(Value::Uuid),
        _ => unreachable!("guarded by the match above"),
    };
    parsed.ok_or(text)
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

pub(crate) fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Load the content of a file as bytes, for comparisons against BLOB columns.
///
/// # Example
///
/// ```rust,ignore
/// use dbexpect::{bytes_content, expect, table};
///
/// let avatar = bytes_content("fixtures/avatar.png")?;
/// expect(&members).row_at(0).value_named("avatar").is_equal_to(avatar);
/// ```
pub fn bytes_content(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
