//! Tests for the fluent assertion API.

use super::*;
use crate::snapshot::{table, ChangeKind, Changes};
use crate::value::Value;
use rusqlite::Connection;

fn fixture() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE members (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             surname TEXT,
             age INTEGER
         );
         INSERT INTO members VALUES (1, 'Hewson', 'Bono', 45);
         INSERT INTO members VALUES (2, 'Evans', 'The Edge', 44);
         INSERT INTO members VALUES (3, 'Clayton', NULL, 45);
         INSERT INTO members VALUES (4, 'Mullen', NULL, 44);",
    )
    .unwrap();
    conn
}

// =============================================================================
// Row navigation
// =============================================================================

#[test]
fn test_row_cursor_walks_in_order() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);

    assert.row().value_named("name").is_equal_to("Hewson");
    assert.row().value_named("name").is_equal_to("Evans");
    assert.row().value_named("name").is_equal_to("Clayton");
    assert.row().value_named("name").is_equal_to("Mullen");
}

#[test]
fn test_row_at_moves_cursor_past_index() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);

    assert.row_at(2).value_named("name").is_equal_to("Clayton");
    assert.row().value_named("name").is_equal_to("Mullen");
}

#[test]
fn test_row_handles_are_memoized() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);

    let first = assert.row();
    let again = assert.row_at(0);
    assert!(first.is_same_as(&again));
    assert!(!first.is_same_as(&assert.row_at(1)));
}

#[test]
fn test_cursor_is_shared_across_cloned_handles() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);
    let alias = assert.clone();

    assert.row().value_named("name").is_equal_to("Hewson");
    alias.row().value_named("name").is_equal_to("Evans");
}

#[test]
#[should_panic(expected = "Index 4 out of the limits [0, 4[")]
fn test_row_at_out_of_bounds() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    expect(&members).row_at(4);
}

// =============================================================================
// Column navigation
// =============================================================================

#[test]
fn test_column_cursor_and_lookup_agree() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);

    let by_cursor = assert.column();
    let by_name = assert.column_named("id");
    assert!(by_cursor.is_same_as(&by_name));
}

#[test]
fn test_column_named_is_case_insensitive() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();

    expect(&members)
        .column_named("NaMe")
        .has_column_name("NAME")
        .has_values(["Hewson", "Evans", "Clayton", "Mullen"]);
}

#[test]
fn test_column_named_moves_cursor() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let assert = expect(&members);

    assert.column_named("surname");
    assert.column().has_column_name("age");
}

#[test]
#[should_panic(expected = "Column <nickname> does not exist")]
fn test_unknown_column_panics() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    expect(&members).column_named("nickname");
}

#[test]
#[should_panic(expected = "assertion failed")]
fn test_has_only_null_values_fails_on_mixed_column() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    expect(&members).column_named("surname").has_only_null_values();
}

// =============================================================================
// Value assertions
// =============================================================================

#[test]
fn test_value_cursor_inside_row() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let row = expect(&members).row();

    row.value().is_equal_to(1);
    row.value().is_equal_to("Hewson");
    row.value_at(3).is_equal_to(45).is_greater_than(40);
}

#[test]
fn test_value_handles_are_memoized() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    let row = expect(&members).row();

    let v = row.value_at(1);
    assert!(v.is_same_as(&row.value_named("name")));
}

#[test]
#[should_panic(expected = "to be of type")]
fn test_type_mismatch_fails_distinctly() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    expect(&members).row().value_named("age").is_text();
}

#[test]
#[should_panic(expected = "assertion failed")]
fn test_null_surname_fails_equality() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();
    expect(&members).row_at(2).value_named("surname").is_equal_to("Clayton");
}

// =============================================================================
// Changes navigation
// =============================================================================

fn captured_changes(conn: &Connection) -> Changes {
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(conn).unwrap();
    conn.execute("INSERT INTO members VALUES (5, 'Lanois', NULL, 70)", [])
        .unwrap();
    conn.execute("UPDATE members SET age = 46 WHERE id = 1", [])
        .unwrap();
    conn.execute("DELETE FROM members WHERE id = 4", []).unwrap();
    changes.set_end_point_now(conn).unwrap();
    changes
}

#[test]
fn test_change_cursors_are_kept_per_filter() {
    let conn = fixture();
    let changes = captured_changes(&conn);
    let assert = expect_changes(&changes);

    // The unfiltered cursor and the per-kind cursors advance independently.
    assert.change().is_creation();
    assert.change_of_modification().has_pks_values([1]);
    assert.change().is_modification();
    assert.change_of_deletion().has_pks_values([4]);
    assert.change().is_deletion();
}

#[test]
fn test_change_handles_are_memoized_across_filters() {
    let conn = fixture();
    let changes = captured_changes(&conn);
    let assert = expect_changes(&changes);

    let by_index = assert.change_at(1);
    let by_kind = assert.change_of_modification_at(0);
    let by_table = assert.change_on_table_at("MEMBERS", 1);
    assert!(by_index.is_same_as(&by_kind));
    assert!(by_index.is_same_as(&by_table));
}

#[test]
fn test_change_counts() {
    let conn = fixture();
    let changes = captured_changes(&conn);

    expect_changes(&changes)
        .has_size(3)
        .has_number_of_creations(1)
        .has_number_of_modifications(1)
        .has_number_of_deletions(1);
}

#[test]
fn test_change_of_on_table() {
    let conn = fixture();
    let changes = captured_changes(&conn);

    expect_changes(&changes)
        .change_of_on_table(ChangeKind::Creation, "members")
        .has_pks_values([5])
        .row_at_start_point()
        .does_not_exist();
}

#[test]
fn test_modified_column_at_both_points() {
    let conn = fixture();
    let changes = captured_changes(&conn);

    let column = expect_changes(&changes)
        .change_of_modification()
        .column_named("age");
    column.is_modified();
    column.value_at_start_point().is_equal_to(45);
    column.value_at_end_point().is_equal_to(46);
    expect_changes(&changes)
        .change_of_modification()
        .column_named("name")
        .is_not_modified();
}

#[test]
#[should_panic(expected = "Index 1 out of the limits [0, 1[")]
fn test_filtered_bounds_use_filtered_size() {
    let conn = fixture();
    let changes = captured_changes(&conn);
    expect_changes(&changes).change_of_creation_at(1);
}

#[test]
#[should_panic(expected = "Row does not exist")]
fn test_absent_row_has_no_values() {
    let conn = fixture();
    let changes = captured_changes(&conn);
    expect_changes(&changes)
        .change_of_deletion()
        .row_at_end_point()
        .value_at(0);
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn wide_fixture(rows: usize) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE seq (id INTEGER PRIMARY KEY, n INTEGER)", [])
            .unwrap();
        for i in 0..rows {
            conn.execute(
                "INSERT INTO seq VALUES (?1, ?2)",
                rusqlite::params![i as i64 + 1, (i as i64) * 10],
            )
            .unwrap();
        }
        conn
    }

    proptest! {
        // After row_at(k), the cursor-driven row() must yield row k + 1.
        #[test]
        fn cursor_follows_explicit_index(rows in 2usize..20, jump in 0usize..18) {
            prop_assume!(jump + 1 < rows);
            let conn = wide_fixture(rows);
            let seq = table("seq").build(&conn).unwrap();
            let assert = expect(&seq);

            assert.row_at(jump).value_named("id").is_equal_to(jump as i64 + 1);
            assert.row().value_named("id").is_equal_to(jump as i64 + 2);
        }

        // Navigating to the same index always returns the memoized handle.
        #[test]
        fn navigation_is_memoized(rows in 1usize..10, index in 0usize..10) {
            prop_assume!(index < rows);
            let conn = wide_fixture(rows);
            let seq = table("seq").build(&conn).unwrap();
            let assert = expect(&seq);

            let first = assert.row_at(index);
            prop_assert!(first.is_same_as(&assert.row_at(index)));
        }
    }
}

#[test]
fn test_has_values_with_explicit_values() {
    let conn = fixture();
    let members = table("members").build(&conn).unwrap();

    expect(&members)
        .row_at(2)
        .has_values([
            Value::from(3),
            Value::from("Clayton"),
            Value::Null,
            Value::from(45),
        ]);
}
