//! Integration tests for table and request expectations against a real
//! SQLite database.

use anyhow::Result;
use chrono::NaiveDate;
use dbexpect::{expect, request, table, Error, ValueType};
use rusqlite::Connection;

fn seeded() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE members (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             surname TEXT,
             birthdate DATE,
             size REAL,
             active BOOLEAN
         );
         INSERT INTO members VALUES (1, 'Hewson',  'Bono',     '1960-05-10', 1.75, 1);
         INSERT INTO members VALUES (2, 'Evans',   'The Edge', '1961-08-08', 1.77, 1);
         INSERT INTO members VALUES (3, 'Clayton', NULL,       '1960-03-13', 1.78, 0);
         INSERT INTO members VALUES (4, 'Mullen',  NULL,       '1961-10-31', 1.70, 0);
         CREATE TABLE albums (
             id INTEGER PRIMARY KEY,
             title TEXT NOT NULL,
             release DATE
         );
         INSERT INTO albums VALUES (1, 'Boy',     '1980-10-20');
         INSERT INTO albums VALUES (2, 'October', '1981-10-12');",
    )?;
    Ok(conn)
}

#[test]
fn table_shape_and_values() -> Result<()> {
    let conn = seeded()?;
    let members = table("members").build(&conn)?;

    expect(&members)
        .has_rows_size(4)
        .has_columns_size(6)
        .row()
        .has_size(6)
        .value_named("name")
        .is_equal_to("Hewson")
        .is_text();
    Ok(())
}

#[test]
fn declared_types_lift_storage_classes() -> Result<()> {
    let conn = seeded()?;
    let members = table("members").build(&conn)?;
    let row = expect(&members).row();

    row.value_named("birthdate")
        .is_date()
        .is_equal_to(NaiveDate::from_ymd_opt(1960, 5, 10).unwrap())
        .is_equal_to("1960-05-10");
    row.value_named("active").is_boolean().is_true();
    row.value_named("size").is_number().is_greater_than(1.7);
    Ok(())
}

#[test]
fn chronology_assertions() -> Result<()> {
    let conn = seeded()?;
    let albums = table("albums").build(&conn)?;

    expect(&albums)
        .row()
        .value_named("release")
        .is_before("1981-01-01")
        .is_after("1980-01-01")
        .is_before_or_equal_to("1980-10-20");
    Ok(())
}

#[test]
fn including_and_excluding_columns() -> Result<()> {
    let conn = seeded()?;
    let narrow = table("members")
        .including(["id", "name"])
        .build(&conn)?;
    expect(&narrow).has_columns_size(2).column_at(1).has_column_name("name");

    let trimmed = table("members").excluding(["surname"]).build(&conn)?;
    expect(&trimmed).has_columns_size(5);
    Ok(())
}

#[test]
fn request_with_params_and_pks() -> Result<()> {
    let conn = seeded()?;
    let adults = request("SELECT id, name FROM members WHERE size >= ? ORDER BY id")
        .with_param(1.75)
        .with_pks(["id"])
        .build(&conn)?;

    expect(&adults)
        .has_rows_size(3)
        .column_named("name")
        .has_values(["Hewson", "Evans", "Clayton"]);
    Ok(())
}

#[test]
fn column_with_nulls() -> Result<()> {
    let conn = seeded()?;
    let members = table("members").build(&conn)?;
    let assert = expect(&members);

    assert.column_named("surname").value_at(2).is_null();
    assert.column_named("surname").value_at(0).is_not_null();
    Ok(())
}

#[test]
fn matches_applies_to_text() -> Result<()> {
    let conn = seeded()?;
    let members = table("members").build(&conn)?;

    expect(&members)
        .row_at(1)
        .value_named("surname")
        .matches(r"^The\s\w+$");
    Ok(())
}

#[test]
fn missing_table_is_a_load_error() -> Result<()> {
    let conn = seeded()?;
    match table("ghosts").build(&conn) {
        Err(Error::TableNotFound(name)) => assert_eq!(name, "ghosts"),
        other => panic!("expected TableNotFound, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[test]
fn unknown_included_column_is_a_load_error() -> Result<()> {
    let conn = seeded()?;
    match table("members").including(["nickname"]).build(&conn) {
        Err(Error::UnknownColumn(name)) => assert_eq!(name, "nickname"),
        other => panic!("expected UnknownColumn, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[test]
fn file_backed_database() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("band.db");
    {
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE tours (id INTEGER PRIMARY KEY, city TEXT);
             INSERT INTO tours VALUES (1, 'Dublin');",
        )?;
    }
    let conn = Connection::open(&path)?;
    let tours = table("tours").build(&conn)?;

    expect(&tours)
        .has_rows_size(1)
        .row()
        .value_named("city")
        .is_equal_to("Dublin")
        .is_of_type(ValueType::Text);
    Ok(())
}

#[test]
#[should_panic(expected = "assertion failed: [Row at index 0 of members table]")]
fn failure_message_carries_the_navigation_path() {
    let conn = seeded().unwrap();
    let members = table("members").build(&conn).unwrap();
    expect(&members).row().has_size(3);
}

#[test]
#[should_panic(expected = "Expected <not-a-date> is not correct to compare to a value of type DATE")]
fn unparseable_expected_text_is_a_usage_error() {
    let conn = seeded().unwrap();
    let members = table("members").build(&conn).unwrap();
    expect(&members).row().value_named("birthdate").is_equal_to("not-a-date");
}
