use beesqlite::{BindError, Error, ExtendedErrCode, Field, PrimaryErrCode, StatementState};
use beesqlite_test::tdb;

fn constraint_failure(sql: &str) -> anyhow::Result<(PrimaryErrCode, ExtendedErrCode)> {
    let mut conn = tdb()?;
    let err = conn.execute(sql, &[]).unwrap_err();
    assert!(matches!(err, Error::Step(_)), "{err:?}");
    assert_eq!(conn.statement_state(), StatementState::Finalized);

    let err = err.into_sqlite_error().unwrap();
    assert!(err.is_constraint());
    Ok((err.primary, err.extended))
}

#[test]
fn it_fails_with_primary_key_violation() -> anyhow::Result<()> {
    let (primary, extended) =
        constraint_failure("INSERT INTO people (id, name) VALUES (1, 'Again')")?;
    assert_eq!(primary, PrimaryErrCode::Constraint);
    assert_eq!(extended, ExtendedErrCode::ConstraintPrimaryKey);
    Ok(())
}

#[test]
fn it_fails_with_foreign_key_violation() -> anyhow::Result<()> {
    let (_, extended) = constraint_failure("INSERT INTO pets (owner_id, name) VALUES (99, 'Stray')")?;
    assert_eq!(extended, ExtendedErrCode::ConstraintForeignKey);
    Ok(())
}

#[test]
fn it_fails_with_not_null_violation() -> anyhow::Result<()> {
    let (_, extended) = constraint_failure("INSERT INTO people (name) VALUES (NULL)")?;
    assert_eq!(extended, ExtendedErrCode::ConstraintNotNull);
    Ok(())
}

#[test]
fn it_fails_with_check_violation() -> anyhow::Result<()> {
    let (_, extended) = constraint_failure("INSERT INTO people (name, age) VALUES ('Neg', -1)")?;
    assert_eq!(extended, ExtendedErrCode::ConstraintCheck);
    Ok(())
}

#[test]
fn it_fails_with_unique_violation() -> anyhow::Result<()> {
    let (_, extended) = constraint_failure(
        "INSERT INTO people (name, email) VALUES ('Twin', 'ann@example.com')",
    )?;
    assert_eq!(extended, ExtendedErrCode::ConstraintUnique);
    Ok(())
}

#[test]
fn it_reports_constraint_failures_from_insert() -> anyhow::Result<()> {
    let mut conn = tdb()?;
    let err = conn
        .insert("people", &[Field::new("id", 1), Field::new("name", "Again")])
        .unwrap_err();

    let sqlite = err.sqlite_error().unwrap();
    assert_eq!(sqlite.primary_code(), PrimaryErrCode::Constraint);
    assert!(sqlite.message.contains("people.id"), "{}", sqlite.message);

    // the connection stays usable
    conn.insert("people", &[Field::new("name", "Bob")])?;
    Ok(())
}

#[test]
fn it_fails_to_prepare_invalid_sql() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    match conn.select("SELEC 1") {
        Err(Error::Prepare { sql, source }) => {
            assert_eq!(sql, "SELEC 1");
            assert_eq!(source.primary, PrimaryErrCode::Error);
            assert!(source.message.contains("syntax error"), "{}", source.message);
        }
        other => panic!("expected Prepare, got {other:?}"),
    }
    assert_eq!(conn.statement_state(), StatementState::Idle);
    assert!(conn.last_error().message.contains("syntax error"));

    let err = conn.select("SELECT * FROM nowhere").unwrap_err();
    assert!(err.to_string().contains("no such table"), "{err}");
    Ok(())
}

#[test]
fn it_fails_to_bind_unknown_parameters() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let err = conn
        .execute(
            "INSERT INTO people (name) VALUES (:name)",
            &[Field::new("nmae", "Typo")],
        )
        .unwrap_err();

    match err {
        Error::Bind(BindError::UnknownParameter(name)) => assert_eq!(name, ":nmae"),
        other => panic!("expected UnknownParameter, got {other:?}"),
    }
    assert_eq!(conn.statement_state(), StatementState::Finalized);

    // reads too
    let err = conn
        .select_with("SELECT 1", &[Field::new("extra", 1)])
        .unwrap_err();
    assert!(matches!(err, Error::Bind(BindError::UnknownParameter(_))));
    Ok(())
}

#[test]
fn it_rejects_field_names_that_are_not_parameter_names() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let err = conn
        .insert("people", &[Field::new("first name", "Bob")])
        .unwrap_err();
    assert!(
        matches!(err, Error::Bind(BindError::UnknownParameter(ref name)) if name == ":first name"),
        "{err:?}"
    );

    let err = conn
        .update("people", &Field::new("id", 1), &[Field::new("e-mail", "x")])
        .unwrap_err();
    assert!(matches!(err, Error::Bind(BindError::UnknownParameter(_))), "{err:?}");

    assert_eq!(conn.statement_state(), StatementState::Idle);
    Ok(())
}

#[test]
fn it_rejects_invalid_utf8_text() -> anyhow::Result<()> {
    let mut conn = tdb()?;

    let err = conn.select("SELECT CAST(x'ff00ff' AS TEXT) AS broken").unwrap_err();
    assert!(matches!(err, Error::Decode { ref column, .. } if column == "broken"), "{err:?}");
    assert_eq!(conn.statement_state(), StatementState::Finalized);
    Ok(())
}
