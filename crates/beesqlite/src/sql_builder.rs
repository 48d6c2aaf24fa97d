//! SQL text for the table-level write helpers on [`Connection`](crate::Connection).
//!
//! Values never appear in the generated text: every field becomes a named
//! `:name` parameter that is bound separately.

use crate::Field;

/// Quote an identifier (table or column name) for use in SQL text.
pub fn quote_identifier(ident: &str) -> String {
    let escaped = ident.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

/// Whether `name` can appear unquoted after `:` as a parameter name.
///
/// Column names are quoted in the generated SQL but parameter names cannot
/// be, so a field named e.g. `first name` cannot go through the helpers.
pub(crate) fn is_parameter_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `INSERT INTO "table" ("a", "b") VALUES (:a, :b)`, columns in field order.
pub(crate) fn insert_sql(table: &str, fields: &[Field]) -> String {
    let columns = fields
        .iter()
        .map(|f| quote_identifier(f.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = fields
        .iter()
        .map(Field::bind_name)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        columns,
        placeholders
    )
}

/// `UPDATE "table" SET "id" = :id, "a" = :a WHERE "id" = :id`.
///
/// The identifier column leads the SET list; a field sharing its name is
/// not listed twice.
pub(crate) fn update_sql(table: &str, id: &Field, fields: &[Field]) -> String {
    let assignments = std::iter::once(id)
        .chain(fields.iter().filter(|f| f.name() != id.name()))
        .map(|f| format!("{} = {}", quote_identifier(f.name()), f.bind_name()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quote_identifier(table),
        assignments,
        quote_identifier(id.name()),
        id.bind_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_escapes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_identifier("select"), "\"select\"");
    }

    #[test]
    fn accepts_plain_parameter_names() {
        assert!(is_parameter_name("name"));
        assert!(is_parameter_name("_private"));
        assert!(is_parameter_name("owner_id2"));
        assert!(is_parameter_name("zażółć"));

        assert!(!is_parameter_name(""));
        assert!(!is_parameter_name("first name"));
        assert!(!is_parameter_name("2fast"));
        assert!(!is_parameter_name("a-b"));
        assert!(!is_parameter_name("x)"));
    }

    #[test]
    fn insert_keeps_field_order() {
        let fields = [Field::new("name", "Ann"), Field::new("age", 41), Field::null("note")];
        assert_eq!(
            insert_sql("people", &fields),
            r#"INSERT INTO "people" ("name", "age", "note") VALUES (:name, :age, :note)"#
        );
    }

    #[test]
    fn update_leads_with_identifier() {
        let id = Field::new("id", 7);
        let fields = [Field::new("name", "Bob"), Field::new("age", 30)];
        assert_eq!(
            update_sql("people", &id, &fields),
            r#"UPDATE "people" SET "id" = :id, "name" = :name, "age" = :age WHERE "id" = :id"#
        );
    }

    #[test]
    fn update_skips_field_named_like_identifier() {
        let id = Field::new("id", 7);
        let fields = [Field::new("id", 8), Field::new("name", "Bob")];
        assert_eq!(
            update_sql("people", &id, &fields),
            r#"UPDATE "people" SET "id" = :id, "name" = :name WHERE "id" = :id"#
        );
    }
}
