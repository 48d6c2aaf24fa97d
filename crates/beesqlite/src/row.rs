use indexmap::IndexMap;

use crate::{
    Field, FieldValue, Result,
    error::Error,
    sqlite::{ValueTag, statement::StatementHandle},
};

/// One result record: fields keyed by column name, iterated in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: IndexMap<String, Field>,
}

impl Row {
    /// Read the row the statement is currently positioned on.
    pub(crate) fn current(statement: &StatementHandle) -> Result<Self> {
        let size = statement.column_count();
        let mut fields = IndexMap::with_capacity(size);

        for i in 0..size {
            let name = statement.column_name(i);
            let value = match statement.column_type(i) {
                ValueTag::Null => FieldValue::Null,
                ValueTag::Integer => FieldValue::Integer(statement.column_int64(i)),
                ValueTag::Float => FieldValue::Float(statement.column_double(i)),
                ValueTag::Text => {
                    let bytes = statement.column_text(i);
                    let text = String::from_utf8(bytes).map_err(|e| Error::Decode {
                        column: name.clone(),
                        message: e.to_string(),
                    })?;
                    FieldValue::Text(text)
                }
                ValueTag::Blob => FieldValue::Blob(statement.column_bytes(i)),
            };

            fields.insert(name.clone(), Field::new(name, value));
        }

        Ok(Self { fields })
    }

    /// Get a field by column name.
    pub fn get(&self, column: &str) -> Option<&Field> {
        self.fields.get(column)
    }

    /// Get a field by column name, failing if the row has no such column.
    pub fn field(&self, column: &str) -> Result<&Field> {
        self.get(column)
            .ok_or_else(|| Error::ColumnNotFound(column.into()))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }
}

impl FromIterator<Field> for Row {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|f| (f.name().to_owned(), f))
            .collect();
        Self { fields }
    }
}

impl IntoIterator for Row {
    type Item = Field;
    type IntoIter = indexmap::map::IntoValues<String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_values()
    }
}
