//! Failure-message factories.
//!
//! Each factory is a pure function from actual/expected values to the body of
//! an assertion-failure message. The fluent layer prepends the assertion's
//! description path before panicking.

use crate::snapshot::ChangeKind;
use crate::value::Value;

pub(crate) fn should_be_equal(actual: &Value, expected: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be equal to:\n  <{}>", actual, expected)
}

pub(crate) fn should_not_be_equal(actual: &Value) -> String {
    format!("Expecting:\n  <{}>\nnot to be equal to:\n  <{}>", actual, actual)
}

pub(crate) fn should_be_equal_at_index(index: usize, actual: &Value, expected: &Value) -> String {
    format!(
        "Expecting that the value at index {}:\n  <{}>\nto be equal to:\n  <{}>",
        index, actual, expected
    )
}

pub(crate) fn should_be_before(actual: &Value, expected: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be before\n  <{}>", actual, expected)
}

pub(crate) fn should_be_before_or_equal(actual: &Value, expected: &Value) -> String {
    format!(
        "Expecting:\n  <{}>\nto be before or equal to\n  <{}>",
        actual, expected
    )
}

pub(crate) fn should_be_after(actual: &Value, expected: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be after\n  <{}>", actual, expected)
}

pub(crate) fn should_be_after_or_equal(actual: &Value, expected: &Value) -> String {
    format!(
        "Expecting:\n  <{}>\nto be after or equal to\n  <{}>",
        actual, expected
    )
}

pub(crate) fn should_be_greater(actual: &Value, expected: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be greater than\n  <{}>", actual, expected)
}

pub(crate) fn should_be_greater_or_equal(actual: &Value, expected: &Value) -> String {
    format!(
        "Expecting:\n  <{}>\nto be greater than or equal to\n  <{}>",
        actual, expected
    )
}

pub(crate) fn should_be_less(actual: &Value, expected: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be less than\n  <{}>", actual, expected)
}

pub(crate) fn should_be_less_or_equal(actual: &Value, expected: &Value) -> String {
    format!(
        "Expecting:\n  <{}>\nto be less than or equal to\n  <{}>",
        actual, expected
    )
}

pub(crate) fn should_be_null(actual: &Value) -> String {
    format!("Expecting:\n  <{}>\nto be null", actual)
}

pub(crate) fn should_be_not_null() -> String {
    "Expecting actual not to be null".to_string()
}

pub(crate) fn should_be_value_type(actual: &Value, expected: &str) -> String {
    format!(
        "Expecting:\n  <{}>\nto be of type\n  <{}>\nbut was of type\n  <{}>",
        actual,
        expected,
        actual.value_type()
    )
}

pub(crate) fn should_match(actual: &Value, pattern: &str) -> String {
    format!("Expecting:\n  <{}>\nto match pattern:\n  <{}>", actual, pattern)
}

pub(crate) fn should_have_rows_size(actual: usize, expected: usize) -> String {
    format!(
        "Expecting size (number of rows) to be equal to :\n   <{}>\nbut was:\n   <{}>",
        expected, actual
    )
}

pub(crate) fn should_have_columns_size(actual: usize, expected: usize) -> String {
    format!(
        "Expecting size (number of columns) to be equal to :\n   <{}>\nbut was:\n   <{}>",
        expected, actual
    )
}

pub(crate) fn should_have_values_size(actual: usize, expected: usize) -> String {
    format!(
        "Expecting size (number of values) to be equal to :\n   <{}>\nbut was:\n   <{}>",
        expected, actual
    )
}

pub(crate) fn should_have_changes_size(actual: usize, expected: usize) -> String {
    format!(
        "Expecting size (number of changes) to be equal to :\n   <{}>\nbut was:\n   <{}>",
        expected, actual
    )
}

pub(crate) fn should_have_changes_size_of_kind(
    kind: ChangeKind,
    actual: usize,
    expected: usize,
) -> String {
    format!(
        "Expecting size (number of changes of type {}) to be equal to :\n   <{}>\nbut was:\n   <{}>",
        kind, expected, actual
    )
}

pub(crate) fn should_have_column_name(actual: &str, expected: &str) -> String {
    format!(
        "Expecting :\n  \"{}\"\nto be the name of the column but was:\n  \"{}\"",
        expected, actual
    )
}

pub(crate) fn should_be_change_kind(expected: ChangeKind, actual: ChangeKind) -> String {
    format!(
        "Expecting:\nto be of type\n  <{}>\nbut was of type\n  <{}>",
        expected, actual
    )
}

pub(crate) fn should_be_on_table(expected: &str, actual: &str) -> String {
    format!(
        "Expecting to be on table:\n  <{}>\nbut was on table:\n  <{}>",
        expected, actual
    )
}

pub(crate) fn should_have_pks_names(actual: &[String], expected: &[String]) -> String {
    format!(
        "Expecting :\n  [{}]\nto be the name of the columns of the primary keys but was:\n  [{}]",
        expected.join(", "),
        actual.join(", ")
    )
}

pub(crate) fn should_have_pks_values(actual: &[Value], expected: &[Value]) -> String {
    format!(
        "Expecting :\n  [{}]\nto be the values of the columns of the primary keys but was:\n  [{}]",
        join_values(expected),
        join_values(actual)
    )
}

pub(crate) fn should_be_modified(start: &Value, end: &Value) -> String {
    format!(
        "Expecting :\n  <{}>\nis modified but is still:\n  <{}>",
        start, end
    )
}

pub(crate) fn should_not_be_modified(start: &Value, end: &Value) -> String {
    format!(
        "Expecting :\n  <{}>\nis not modified but is :\n  <{}>",
        start, end
    )
}

pub(crate) fn should_contain_only_null(index: usize) -> String {
    format!(
        "Expecting to contain only null:\nbut contains not null at index: {}",
        index
    )
}

pub(crate) fn should_exist() -> String {
    "Expecting the row to exist but it does not".to_string()
}

pub(crate) fn should_not_exist() -> String {
    "Expecting the row not to exist but it does".to_string()
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
