//! Driver-neutral values and result rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{DriverError, DriverResult};

/// SQL type of a value. NULLs carry one so drivers can bind them with the
/// column's type instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Json,
    /// Type not known, e.g. a NULL read from a column of an unmapped type.
    Unknown,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Bytes => "bytes",
            Kind::Uuid => "uuid",
            Kind::TimestampTz => "timestamptz",
            Kind::Timestamp => "timestamp",
            Kind::Date => "date",
            Kind::Json => "json",
            Kind::Unknown => "unknown",
        }
    }
}

/// A single SQL value, either bound as a statement argument or read back
/// from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(Kind),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    TimestampTz(DateTime<Utc>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null(kind) => *kind,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Bytes(_) => Kind::Bytes,
            Value::Uuid(_) => Kind::Uuid,
            Value::TimestampTz(_) => Kind::TimestampTz,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Date(_) => Kind::Date,
            Value::Json(_) => Kind::Json,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Value::Null(_) => "null",
            other => other.kind().name(),
        }
    }
}

/// Rust types that map to one SQL [`Kind`].
///
/// Lets `Option<T>` turn `None` into a NULL of the right type.
pub trait Typed: Into<Value> {
    const KIND: Kind;
}

macro_rules! typed {
    ($($ty:ty => $kind:ident, |$v:ident| $conv:expr;)*) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl Typed for $ty {
                const KIND: Kind = Kind::$kind;
            }
        )*
    };
}

typed! {
    bool => Bool, |v| Value::Bool(v);
    i16 => Int, |v| Value::Int(v.into());
    i32 => Int, |v| Value::Int(v.into());
    i64 => Int, |v| Value::Int(v);
    f32 => Float, |v| Value::Float(v.into());
    f64 => Float, |v| Value::Float(v);
    &str => Text, |v| Value::Text(v.to_owned());
    String => Text, |v| Value::Text(v);
    &String => Text, |v| Value::Text(v.clone());
    Vec<u8> => Bytes, |v| Value::Bytes(v);
    &[u8] => Bytes, |v| Value::Bytes(v.to_vec());
    Uuid => Uuid, |v| Value::Uuid(v);
    DateTime<Utc> => TimestampTz, |v| Value::TimestampTz(v);
    NaiveDateTime => Timestamp, |v| Value::Timestamp(v);
    NaiveDate => Date, |v| Value::Date(v);
    serde_json::Value => Json, |v| Value::Json(v);
}

impl<T: Typed> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null(T::KIND), Into::into)
    }
}

/// Conversion from a column [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Name used in decode errors.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "int (32-bit)";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FromValue for i16 {
    const EXPECTED: &'static str = "int (16-bit)";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|v| i16::try_from(v).ok())
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    const EXPECTED: &'static str = "bytes";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Uuid {
    const EXPECTED: &'static str = "uuid";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    const EXPECTED: &'static str = "timestamptz";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampTz(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    const EXPECTED: &'static str = "timestamp";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for serde_json::Value {
    const EXPECTED: &'static str = "json";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Json(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null(_) => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A result row: column names paired with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Used by drivers while decoding, and by tests.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Reads the first column called `column`.
    pub fn get<T: FromValue>(&self, column: &str) -> DriverResult<T> {
        let (name, value) = self
            .columns
            .iter()
            .find(|(name, _)| name == column)
            .ok_or_else(|| DriverError::ColumnNotFound(column.to_owned()))?;
        decode(name, value)
    }

    /// Reads the column at `index`.
    pub fn get_at<T: FromValue>(&self, index: usize) -> DriverResult<T> {
        let (name, value) =
            self.columns
                .get(index)
                .ok_or(DriverError::ColumnIndexOutOfBounds {
                    index,
                    len: self.columns.len(),
                })?;
        decode(name, value)
    }
}

fn decode<T: FromValue>(column: &str, value: &Value) -> DriverResult<T> {
    T::from_value(value).ok_or_else(|| DriverError::Decode {
        column: column.to_owned(),
        expected: T::EXPECTED,
        found: value.describe(),
    })
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
