//! Fluent assertion API over database snapshots and changes.
//!
//! Expectations start from [`expect`] (on a table or request snapshot) or
//! [`expect_changes`] (on captured changes) and chain into narrower handles:
//! rows, columns, single values. Assertions evaluate immediately and panic on
//! failure, so they slot straight into `#[test]` functions.
//!
//! Navigation keeps a cursor per handle: `row()` yields the next unseen row,
//! `row_at(2)` jumps and moves the cursor past index 2. Navigating to the
//! same position twice returns the same handle, so a chain can fan out and
//! come back without losing state.
//!
//! # Example
//!
//! ```rust,ignore
//! use dbexpect::{expect, table};
//!
//! let members = table("members").build(&conn)?;
//!
//! expect(&members)
//!     .has_rows_size(4)
//!     .row()
//!     .value_named("name")
//!     .is_equal_to("Hewson");
//! ```

mod changes;
mod messages;
mod snapshot;
mod value;

pub use changes::{expect_changes, ChangeAssert, ChangeColumnAssert, ChangeRowAssert, ChangesAssert};
pub use snapshot::{expect, ColumnAssert, RowAssert, SnapshotAssert};
pub use value::ValueAssert;

/// Panic with the uniform failure layout: the description path on the first
/// line, the message body after it.
pub(crate) fn fail(description: &str, message: &str) -> ! {
    panic!("assertion failed: [{}]\n{}", description, message)
}

#[cfg(test)]
mod tests;
