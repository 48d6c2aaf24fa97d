use std::path::{Path, PathBuf};

use beesqlite::{Connection, Field, Row};

const TEST_SCHEMA: &str = include_str!("setup.sql");

/// A fresh in-memory connection with default options.
pub fn connection() -> anyhow::Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

/// Return a connection to an in-memory database holding our test schema.
pub fn tdb() -> anyhow::Result<Connection> {
    let mut conn = connection()?;
    conn.exec(TEST_SCHEMA)?;
    Ok(conn)
}

/// Create `test.db` with the test schema inside `dir`.
pub fn file_tdb(dir: &Path) -> anyhow::Result<(Connection, PathBuf)> {
    let path = dir.join("test.db");
    let mut conn = Connection::create(&path)?;
    conn.exec(TEST_SCHEMA)?;
    Ok((conn, path))
}

/// Build a row from `(name, value)` pairs, for comparing against fetched rows.
#[macro_export]
macro_rules! row {
    ($($name:literal => $value:expr),* $(,)?) => {
        [$(::beesqlite::Field::new($name, $value)),*]
            .into_iter()
            .collect::<::beesqlite::Row>()
    };
}

/// The single row of `sql`, failing unless there is exactly one.
pub fn one(conn: &mut Connection, sql: &str, fields: &[Field]) -> anyhow::Result<Row> {
    let result = conn.select_with(sql, fields)?;
    anyhow::ensure!(result.count() == 1, "expected one row, got {}", result.count());
    Ok(result.into_rows().remove(0))
}
