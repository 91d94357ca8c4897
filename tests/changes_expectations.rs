//! Integration tests for change capture and change expectations.

use anyhow::Result;
use dbexpect::{expect_changes, request, Changes, Value};
use rusqlite::Connection;

fn seeded() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE members (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             rank TEXT
         );
         INSERT INTO members VALUES (1, 'Hewson',  'singer');
         INSERT INTO members VALUES (2, 'Evans',   'guitar');
         INSERT INTO members VALUES (3, 'Clayton', 'bass');
         CREATE TABLE albums (
             id INTEGER PRIMARY KEY,
             title TEXT NOT NULL
         );
         INSERT INTO albums VALUES (1, 'Boy');",
    )?;
    Ok(conn)
}

#[test]
fn single_update_is_one_modification() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("UPDATE members SET rank = 'frontman' WHERE id = 1", [])?;
    changes.set_end_point_now(&conn)?;

    expect_changes(&changes)
        .has_size(1)
        .change()
        .is_modification()
        .is_on_table("members")
        .has_pks_names(["id"])
        .has_pks_values([1])
        .column_named("rank")
        .is_modified()
        .value_at_start_point()
        .is_equal_to("singer");
    Ok(())
}

#[test]
fn update_of_one_row_among_eight() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    conn.execute("CREATE TABLE scores (id INTEGER PRIMARY KEY, points INTEGER)", [])?;
    for id in 1..=8 {
        conn.execute("INSERT INTO scores VALUES (?1, 0)", [id])?;
    }
    let mut changes = Changes::on_tables(["scores"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("UPDATE scores SET points = 12 WHERE id = 1", [])?;
    changes.set_end_point_now(&conn)?;

    let assert = expect_changes(&changes);
    assert.has_size(1);
    let change = assert.change_at(0);
    change.has_pks_values([1]);
    change.column_named("id").is_not_modified();
    change.column_named("points").is_modified();
    Ok(())
}

#[test]
fn null_at_both_points_is_not_a_modification() -> Result<()> {
    let conn = seeded()?;
    conn.execute("INSERT INTO members VALUES (4, 'Mullen', NULL)", [])?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("UPDATE members SET name = 'Mullen Jr' WHERE id = 4", [])?;
    changes.set_end_point_now(&conn)?;

    let change = expect_changes(&changes).change_of_modification();
    change.column_named("rank").is_not_modified();
    change.column_named("name").is_modified();
    Ok(())
}

#[test]
fn changes_are_ordered_by_kind_then_row() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("DELETE FROM members WHERE id = 3", [])?;
    conn.execute("INSERT INTO members VALUES (4, 'Mullen', 'drums')", [])?;
    conn.execute("UPDATE members SET rank = 'lead' WHERE id = 2", [])?;
    changes.set_end_point_now(&conn)?;

    let assert = expect_changes(&changes);
    assert.has_size(3);
    assert.change_at(0).is_creation().has_pks_values([4]);
    assert.change_at(1).is_modification().has_pks_values([2]);
    assert.change_at(2).is_deletion().has_pks_values([3]);
    Ok(())
}

#[test]
fn all_tables_capture_spans_every_table() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_all_tables();
    changes.set_start_point_now(&conn)?;
    conn.execute("INSERT INTO albums VALUES (2, 'October')", [])?;
    conn.execute("DELETE FROM members WHERE id = 3", [])?;
    changes.set_end_point_now(&conn)?;

    let assert = expect_changes(&changes);
    assert.has_size(2);
    assert.change_on_table("albums").is_creation();
    assert.change_on_table("members").is_deletion();
    Ok(())
}

#[test]
fn creation_rows_exist_only_at_end_point() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("INSERT INTO members VALUES (4, 'Mullen', 'drums')", [])?;
    changes.set_end_point_now(&conn)?;

    let change = expect_changes(&changes).change_of_creation();
    change.row_at_start_point().does_not_exist();
    change
        .row_at_end_point()
        .exists()
        .has_values([Value::from(4), Value::from("Mullen"), Value::from("drums")]);
    Ok(())
}

#[test]
fn absent_row_values_count_as_null_for_modification() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("DELETE FROM members WHERE id = 3", [])?;
    changes.set_end_point_now(&conn)?;

    let column = expect_changes(&changes).change_of_deletion().column_named("name");
    column.is_modified();
    column.value_at_end_point().is_null();
    column.value_at_start_point().is_equal_to("Clayton");
    Ok(())
}

#[test]
fn request_changes_use_declared_pks() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_request(
        request("SELECT id, rank FROM members ORDER BY id").with_pks(["id"]),
    );
    changes.set_start_point_now(&conn)?;
    conn.execute("UPDATE members SET rank = 'frontman' WHERE id = 1", [])?;
    changes.set_end_point_now(&conn)?;

    expect_changes(&changes)
        .has_size(1)
        .change()
        .is_modification()
        .has_pks_values([1]);
    Ok(())
}

#[test]
fn update_without_pks_splits_into_creation_and_deletion() -> Result<()> {
    let conn = seeded()?;
    conn.execute_batch(
        "CREATE TABLE notes (body TEXT);
         INSERT INTO notes VALUES ('draft');",
    )?;
    let mut changes = Changes::on_tables(["notes"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("UPDATE notes SET body = 'final'", [])?;
    changes.set_end_point_now(&conn)?;

    expect_changes(&changes)
        .has_size(2)
        .has_number_of_creations(1)
        .has_number_of_deletions(1);
    Ok(())
}

#[test]
fn per_kind_cursors_walk_independently() -> Result<()> {
    let conn = seeded()?;
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn)?;
    conn.execute("INSERT INTO members VALUES (4, 'Mullen', 'drums')", [])?;
    conn.execute("INSERT INTO members VALUES (5, 'Lanois', 'producer')", [])?;
    conn.execute("DELETE FROM members WHERE id = 1", [])?;
    changes.set_end_point_now(&conn)?;

    let assert = expect_changes(&changes);
    assert.change_of_creation().has_pks_values([4]);
    assert.change_of_deletion().has_pks_values([1]);
    assert.change_of_creation().has_pks_values([5]);
    Ok(())
}

#[test]
#[should_panic(expected = "StartPointNotSet")]
fn end_point_requires_start_point() {
    let conn = seeded().unwrap();
    let mut changes = Changes::on_tables(["members"]);
    changes.set_end_point_now(&conn).unwrap();
}

#[test]
#[should_panic(expected = "end point is not set")]
fn expectations_require_both_points() {
    let conn = seeded().unwrap();
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn).unwrap();
    expect_changes(&changes);
}

#[test]
#[should_panic(expected = "assertion failed: [Change at index 0 (on table : members) of Changes on members table]")]
fn failure_message_names_the_change() {
    let conn = seeded().unwrap();
    let mut changes = Changes::on_tables(["members"]);
    changes.set_start_point_now(&conn).unwrap();
    conn.execute("UPDATE members SET rank = 'frontman' WHERE id = 1", [])
        .unwrap();
    changes.set_end_point_now(&conn).unwrap();

    expect_changes(&changes).change().is_creation();
}
