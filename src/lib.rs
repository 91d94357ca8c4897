//! # dbexpect
//!
//! A fluent assertion library for testing database contents.
//!
//! Expectations read a table or an arbitrary query into an in-memory
//! snapshot, then chain through rows, columns and values with assertions
//! that panic on failure. It plugs straight into Rust's native `#[test]`
//! framework.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dbexpect::{expect, table};
//!
//! #[test]
//! fn members_are_seeded() -> dbexpect::Result<()> {
//!     let conn = open_test_db();
//!     let members = table("members").build(&conn)?;
//!
//!     expect(&members)
//!         .has_rows_size(4)
//!         .row()
//!         .value_named("name")
//!         .is_equal_to("Hewson")
//!         .is_text();
//!     Ok(())
//! }
//! ```
//!
//! ## Queries
//!
//! ```rust,ignore
//! use dbexpect::{expect, request};
//!
//! let adults = request("SELECT name FROM members WHERE age >= ?")
//!     .with_param(18)
//!     .build(&conn)?;
//!
//! expect(&adults).column_named("name").has_size(3);
//! ```
//!
//! ## Changes
//!
//! Capture a start point, run the code under test, capture an end point, and
//! assert on the row-level diff:
//!
//! ```rust,ignore
//! use dbexpect::{expect_changes, Changes};
//!
//! let mut changes = Changes::on_tables(["members"]);
//! changes.set_start_point_now(&conn)?;
//! promote_member(&conn, 1)?;
//! changes.set_end_point_now(&conn)?;
//!
//! expect_changes(&changes)
//!     .has_size(1)
//!     .change()
//!     .is_modification()
//!     .has_pks_values([1])
//!     .column_named("rank")
//!     .is_modified()
//!     .value_at_end_point()
//!     .is_equal_to("captain");
//! ```

pub mod error;
pub mod fluent;
pub mod snapshot;
pub mod value;

// Entry points
pub use fluent::{expect, expect_changes};
pub use snapshot::{request, table};

// Assertion handles
pub use fluent::{
    ChangeAssert, ChangeColumnAssert, ChangeRowAssert, ChangesAssert, ColumnAssert, RowAssert,
    SnapshotAssert, ValueAssert,
};

// Data model
pub use snapshot::{
    AsSnapshot, Change, ChangeKind, Changes, Column, Request, RequestBuilder, Row, Snapshot, Table,
    TableBuilder,
};
pub use value::{bytes_content, Value, ValueType};

// Errors
pub use error::{Error, Result};
