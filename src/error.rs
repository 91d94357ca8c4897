//! Error types for snapshot construction.
//!
//! These cover loading failures only (SQL errors, missing tables, misuse of
//! the change-capture lifecycle). Assertion failures and fluent-API misuse
//! panic instead, so they surface through the test framework directly.

use thiserror::Error;

/// Errors raised while reading a snapshot from the database.
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying SQLite error (bad SQL, locked database, ...).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// An I/O error while reading file content for a comparison.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The named table does not exist in the database.
    #[error("table `{0}` does not exist")]
    TableNotFound(String),

    /// A column named in an include/exclude list or primary-key declaration
    /// does not exist in the result.
    #[error("column `{0}` does not exist")]
    UnknownColumn(String),

    /// `set_end_point_now` was called before `set_start_point_now`.
    #[error("start point is not set: call set_start_point_now before set_end_point_now")]
    StartPointNotSet,

    /// The changes were read before `set_end_point_now` was called.
    #[error("end point is not set: call set_start_point_now and set_end_point_now before asserting on changes")]
    EndPointNotSet,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
