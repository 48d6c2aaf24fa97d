use beesqlite::{Connection, Error, Field, ValueTag, is_database_file};
use beesqlite_test::{file_tdb, one, tdb};
use tempdir::TempDir;

fn count(conn: &mut Connection, table: &str) -> anyhow::Result<i64> {
    let row = one(conn, &format!("SELECT COUNT(*) AS n FROM {table}"), &[])?;
    Ok(row.field("n")?.as_int()?)
}

#[test]
fn it_inserts_and_selects() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let id = conn.insert(
        "people",
        &[
            Field::new("name", "Bob"),
            Field::new("age", 30),
            Field::new("score", 7.25),
            Field::new("avatar", vec![0xde_u8, 0xad]),
            Field::null("email"),
        ],
    )?;
    assert_eq!(id, 2);
    assert_eq!(conn.last_insert_rowid(), 2);

    let row = one(
        &mut conn,
        "SELECT * FROM people WHERE id = :id",
        &[Field::new("id", id)],
    )?;
    assert_eq!(row.len(), 6);
    assert_eq!(row.field("name")?.as_text()?, "Bob");
    assert_eq!(row.field("age")?.as_int()?, 30);
    assert_eq!(row.field("score")?.as_float()?, 7.25);
    assert_eq!(row.field("avatar")?.as_blob()?, [0xde, 0xad]);
    assert!(row.field("email")?.is_null());
    Ok(())
}

#[test]
fn it_refuses_empty_input() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    assert!(matches!(conn.insert("people", &[]), Err(Error::EmptyInput("insert"))));
    assert!(matches!(
        conn.update("people", &Field::new("id", 1), &[]),
        Err(Error::EmptyInput("update"))
    ));

    assert_eq!(count(&mut conn, "people")?, 1);
    Ok(())
}

#[test]
fn it_updates_by_identifier() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let changed = conn.update(
        "people",
        &Field::new("id", 1),
        &[Field::new("name", "Anna"), Field::new("age", 42)],
    )?;
    assert_eq!(changed, 1);

    let row = one(&mut conn, "SELECT name, age FROM people WHERE id = 1", &[])?;
    assert_eq!(row.field("name")?.as_text()?, "Anna");
    assert_eq!(row.field("age")?.as_int()?, 42);

    let missing = conn.update("people", &Field::new("id", 99), &[Field::new("age", 1)])?;
    assert_eq!(missing, 0);
    Ok(())
}

#[test]
fn it_requires_an_integer_identifier() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    match conn.update("people", &Field::new("id", "1"), &[Field::new("age", 1)]) {
        Err(Error::TypeMismatch { name, expected, found }) => {
            assert_eq!(name, "id");
            assert_eq!(expected, ValueTag::Integer);
            assert_eq!(found, ValueTag::Text);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn it_returns_rows_in_order() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    for i in 0..50 {
        conn.insert("samples", &[Field::new("value", i * 3)])?;
    }

    let result = conn.select("SELECT value FROM samples ORDER BY id")?;
    assert_eq!(result.count(), 50);

    let values = result
        .iter()
        .map(|row| row.field("value").and_then(|f| f.as_int()))
        .collect::<beesqlite::Result<Vec<_>>>()?;
    assert_eq!(values, (0..50).map(|i| i * 3).collect::<Vec<_>>());
    assert_eq!(result.first().unwrap().field("value")?.as_int()?, 0);
    assert_eq!(result.last().unwrap().field("value")?.as_int()?, 147);
    Ok(())
}

#[test]
fn it_returns_empty_results() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let result = conn.select("SELECT * FROM people WHERE id < 0")?;
    assert!(result.is_empty());
    assert!(result.first().is_none());
    assert!(result.last().is_none());
    Ok(())
}

#[test]
fn it_does_not_step_statements_without_columns() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let result = conn.select("DELETE FROM pets")?;
    assert!(result.is_empty());
    assert_eq!(count(&mut conn, "pets")?, 1);
    Ok(())
}

#[test]
fn it_executes_parameterized_writes() -> anyhow::Result<()> {
    let mut conn = tdb()?;
    conn.insert("people", &[Field::new("name", "Bob"), Field::new("age", 20)])?;

    let done = conn.execute(
        "UPDATE people SET age = age + :by WHERE age < :limit",
        &[Field::new("by", 1), Field::new("limit", 100)],
    )?;
    assert_eq!(done.rows_affected(), 2);
    assert_eq!(conn.changes(), 2);

    let ages = conn.select_with(
        "SELECT age FROM people WHERE age > :min ORDER BY id",
        &[Field::new("min", 21)],
    )?;
    assert_eq!(ages.count(), 1);
    assert_eq!(ages.first().unwrap().field("age")?.as_int()?, 42);
    Ok(())
}

#[test]
fn it_rolls_back_on_disk() -> anyhow::Result<()> {
    let dir = TempDir::new("beesqlite-rollback")?;
    let (mut conn, path) = file_tdb(dir.path())?;

    conn.begin()?;
    assert!(conn.in_transaction());
    conn.insert("people", &[Field::new("name", "Bob")])?;
    conn.update("people", &Field::new("id", 1), &[Field::new("name", "Anna")])?;
    conn.end(false)?;
    assert!(!conn.in_transaction());
    conn.close()?;

    let mut conn = Connection::open(&path)?;
    assert_eq!(count(&mut conn, "people")?, 1);
    let row = one(&mut conn, "SELECT name FROM people WHERE id = 1", &[])?;
    assert_eq!(row.field("name")?.as_text()?, "Ann");
    Ok(())
}

#[test]
fn it_rolls_back_a_failed_update_on_disk() -> anyhow::Result<()> {
    let dir = TempDir::new("beesqlite-failed-update")?;
    let (mut conn, path) = file_tdb(dir.path())?;
    conn.insert(
        "people",
        &[Field::new("name", "Bob"), Field::new("email", "bob@example.com")],
    )?;

    conn.begin()?;
    conn.update("people", &Field::new("id", 1), &[Field::new("age", 42)])?;
    let err = conn
        .update(
            "people",
            &Field::new("id", 1),
            &[Field::new("name", "Anna"), Field::new("email", "bob@example.com")],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Step(_)), "{err:?}");
    assert!(conn.in_transaction());
    conn.end(false)?;
    conn.close()?;

    let mut conn = Connection::open(&path)?;
    assert_eq!(count(&mut conn, "people")?, 2);
    let row = one(&mut conn, "SELECT name, age, email FROM people WHERE id = 1", &[])?;
    assert_eq!(row.field("name")?.as_text()?, "Ann");
    assert_eq!(row.field("age")?.as_int()?, 41);
    assert_eq!(row.field("email")?.as_text()?, "ann@example.com");
    Ok(())
}

#[test]
fn it_commits_on_disk() -> anyhow::Result<()> {
    let dir = TempDir::new("beesqlite-commit")?;
    let (mut conn, path) = file_tdb(dir.path())?;

    conn.begin()?;
    conn.insert("people", &[Field::new("name", "Bob")])?;
    conn.end(true)?;
    conn.close()?;

    let mut conn = Connection::open(&path)?;
    assert_eq!(count(&mut conn, "people")?, 2);
    Ok(())
}

#[test]
fn it_rolls_back_dropped_transactions() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    {
        let mut tx = conn.transaction()?;
        tx.insert("people", &[Field::new("name", "Bob")])?;
        assert!(tx.in_transaction());
    }
    assert!(!conn.in_transaction());
    assert_eq!(count(&mut conn, "people")?, 1);

    let mut tx = conn.transaction()?;
    tx.insert("people", &[Field::new("name", "Cid")])?;
    tx.commit()?;
    assert_eq!(count(&mut conn, "people")?, 2);

    let tx = conn.transaction()?;
    tx.rollback()?;
    assert!(!conn.in_transaction());
    Ok(())
}

#[test]
fn it_probes_before_opening() -> anyhow::Result<()> {
    let dir = TempDir::new("beesqlite-probe")?;

    let missing = dir.path().join("missing.db");
    assert!(matches!(Connection::open(&missing), Err(Error::NotADatabase(p)) if p == missing));
    assert!(!missing.exists());

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not a database at all")?;
    assert!(matches!(Connection::open(&text), Err(Error::NotADatabase(_))));

    let (conn, path) = file_tdb(dir.path())?;
    conn.close()?;
    assert!(is_database_file(&path));
    assert!(matches!(Connection::create(&path), Err(Error::AlreadyExists(p)) if p == path));

    Connection::open(&path)?.close()?;
    Ok(())
}

#[test]
fn it_removes_the_database_file() -> anyhow::Result<()> {
    let dir = TempDir::new("beesqlite-remove")?;
    let (conn, path) = file_tdb(dir.path())?;
    assert_eq!(conn.path(), Some(path.as_path()));

    conn.remove()?;
    assert!(!path.exists());

    // nothing to delete for an in-memory database
    Connection::open_in_memory()?.remove()?;
    Ok(())
}
