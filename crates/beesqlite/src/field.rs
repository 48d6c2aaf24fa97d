//! Named, tagged scalar values used both for parameter binding and for
//! result extraction.

use std::borrow::Cow;

use crate::{Error, Result, ValueTag};

/// A dynamically-typed SQLite value.
///
/// The storage class of a field is derived from the variant, so the tag and
/// the stored value cannot disagree.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FieldValue {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    pub fn tag(&self) -> ValueTag {
        match self {
            FieldValue::Null => ValueTag::Null,
            FieldValue::Integer(_) => ValueTag::Integer,
            FieldValue::Float(_) => ValueTag::Float,
            FieldValue::Text(_) => ValueTag::Text,
            FieldValue::Blob(_) => ValueTag::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::Integer(i64::from(v))
                }
            }
        )+
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Cow<'_, str>> for FieldValue {
    fn from(v: Cow<'_, str>) -> Self {
        FieldValue::Text(v.into_owned())
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        FieldValue::Blob(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for FieldValue {
    fn from(v: [u8; N]) -> Self {
        FieldValue::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Blob(v)
    }
}

impl From<()> for FieldValue {
    fn from(_: ()) -> Self {
        FieldValue::Null
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A named value; the unit of parameter binding and of result extraction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    name: String,
    value: FieldValue,
}

impl Field {
    /// Create a field holding `value`, classified by its Rust type.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a field holding NULL.
    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, FieldValue::Null)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter name used to bind this field: the name prefixed with `:`.
    ///
    /// The name is not quoted, so it only matches a parameter if it is a
    /// plain identifier.
    pub fn bind_name(&self) -> String {
        format!(":{}", self.name)
    }

    pub fn tag(&self) -> ValueTag {
        self.value.tag()
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn into_value(self) -> FieldValue {
        self.value
    }

    /// Replace the stored value, reclassifying the field.
    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        self.value = value.into();
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn mismatch(&self, expected: ValueTag) -> Error {
        Error::TypeMismatch {
            name: self.name.clone(),
            expected,
            found: self.tag(),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self.value {
            FieldValue::Integer(v) => Ok(v),
            _ => Err(self.mismatch(ValueTag::Integer)),
        }
    }

    pub fn as_float(&self) -> Result<f64> {
        match self.value {
            FieldValue::Float(v) => Ok(v),
            _ => Err(self.mismatch(ValueTag::Float)),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match &self.value {
            FieldValue::Text(v) => Ok(v),
            _ => Err(self.mismatch(ValueTag::Text)),
        }
    }

    pub fn as_blob(&self) -> Result<&[u8]> {
        match &self.value {
            FieldValue::Blob(v) => Ok(v),
            _ => Err(self.mismatch(ValueTag::Blob)),
        }
    }

    /// Booleans are stored as integers; only `1` reads back as `true`.
    pub fn as_bool(&self) -> Result<bool> {
        Ok(self.as_int()? == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_rust_type() {
        assert_eq!(Field::new("a", "x").tag(), ValueTag::Text);
        assert_eq!(Field::new("a", String::from("x")).tag(), ValueTag::Text);
        assert_eq!(Field::new("a", 7_i32).tag(), ValueTag::Integer);
        assert_eq!(Field::new("a", u32::MAX).as_int().unwrap(), i64::from(u32::MAX));
        assert_eq!(Field::new("a", 1.5_f32).tag(), ValueTag::Float);
        assert_eq!(Field::new("a", vec![1_u8, 2]).tag(), ValueTag::Blob);
        assert_eq!(Field::new("a", [0_u8; 4]).tag(), ValueTag::Blob);
        assert_eq!(Field::new("a", ()).tag(), ValueTag::Null);
        assert_eq!(Field::new("a", None::<i64>).tag(), ValueTag::Null);
        assert_eq!(Field::new("a", Some("x")).tag(), ValueTag::Text);
        assert_eq!(Field::null("a").tag(), ValueTag::Null);
    }

    #[test]
    fn accessors_return_what_was_stored() {
        assert_eq!(Field::new("i", i64::MIN).as_int().unwrap(), i64::MIN);
        assert_eq!(Field::new("f", 0.25_f64).as_float().unwrap(), 0.25);
        assert_eq!(Field::new("f", 0.5_f32).as_float().unwrap(), 0.5);
        assert_eq!(Field::new("t", "héllo").as_text().unwrap(), "héllo");
        assert_eq!(Field::new("b", &b"\x00\xff"[..]).as_blob().unwrap(), b"\x00\xff");
        assert!(Field::new("b", Vec::<u8>::new()).as_blob().unwrap().is_empty());
    }

    #[test]
    fn bool_is_stored_as_integer() {
        let t = Field::new("flag", true);
        let f = Field::new("flag", false);
        assert_eq!(t.as_int().unwrap(), 1);
        assert_eq!(f.as_int().unwrap(), 0);
        assert!(t.as_bool().unwrap());
        assert!(!f.as_bool().unwrap());
        assert!(!Field::new("flag", 2).as_bool().unwrap());
    }

    #[test]
    fn mismatched_accessor_reports_both_tags() {
        let field = Field::new("age", "forty");
        match field.as_int() {
            Err(Error::TypeMismatch {
                name,
                expected,
                found,
            }) => {
                assert_eq!(name, "age");
                assert_eq!(expected, ValueTag::Integer);
                assert_eq!(found, ValueTag::Text);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }

        assert!(matches!(Field::null("n").as_int(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(Field::new("n", 1).as_float(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(Field::new("n", 1.0).as_int(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(Field::new("n", vec![1_u8]).as_text(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(Field::new("n", "x").as_blob(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(Field::new("n", "1").as_bool(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn set_value_reclassifies() {
        let mut field = Field::null("v");
        field.set_value(3);
        assert_eq!(field.tag(), ValueTag::Integer);
        field.set_value("three");
        assert_eq!(field.tag(), ValueTag::Text);
        assert!(field.as_int().is_err());
        field.set_value(None::<String>);
        assert!(field.is_null());
    }

    #[test]
    fn bind_name_is_prefixed() {
        let field = Field::new("user_id", 1);
        assert_eq!(field.bind_name(), ":user_id");
        assert_eq!(field.name(), "user_id");
    }
}
