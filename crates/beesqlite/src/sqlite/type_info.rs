use std::fmt::{self, Display, Formatter};

use libsqlite3_sys::{SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT};

/// The five storage classes a [`Field`](crate::Field) can hold.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ValueTag {
    Null,
    Integer,
    Float,
    Text,
    Blob,
}

impl Display for ValueTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl ValueTag {
    pub fn is_null(&self) -> bool {
        matches!(self, ValueTag::Null)
    }

    /// The SQL name of the storage class.
    pub fn name(&self) -> &'static str {
        match self {
            ValueTag::Null => "NULL",
            ValueTag::Integer => "INTEGER",
            ValueTag::Float => "REAL",
            ValueTag::Text => "TEXT",
            ValueTag::Blob => "BLOB",
        }
    }

    // https://sqlite.org/c3ref/c_blob.html
    pub(crate) fn from_code(code: i32) -> Option<Self> {
        match code {
            SQLITE_NULL => Some(ValueTag::Null),
            SQLITE_INTEGER => Some(ValueTag::Integer),
            SQLITE_FLOAT => Some(ValueTag::Float),
            SQLITE_TEXT => Some(ValueTag::Text),
            SQLITE_BLOB => Some(ValueTag::Blob),
            _ => None,
        }
    }
}

#[test]
fn test_from_code() {
    assert_eq!(ValueTag::from_code(SQLITE_INTEGER), Some(ValueTag::Integer));
    assert_eq!(ValueTag::from_code(SQLITE_FLOAT), Some(ValueTag::Float));
    assert_eq!(ValueTag::from_code(SQLITE_TEXT), Some(ValueTag::Text));
    assert_eq!(ValueTag::from_code(SQLITE_BLOB), Some(ValueTag::Blob));
    assert_eq!(ValueTag::from_code(SQLITE_NULL), Some(ValueTag::Null));
    assert!(ValueTag::from_code(9999).is_none());
}

#[test]
fn test_display_uses_sql_names() {
    assert_eq!(ValueTag::Float.to_string(), "REAL");
    assert_eq!(format!("{:>6}", ValueTag::Null), "  NULL");
}
