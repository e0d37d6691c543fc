use chrono::{DateTime, NaiveDateTime, Utc};

/// A single column value exchanged with the execution transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Errors raised when converting a [`Value`] into a field type.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    OutOfRange {
        target: &'static str,
        value: i64,
    },
    InvalidTimestamp(String),
    UnknownColumn(String),
}

impl std::fmt::Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueError::Mismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ValueError::OutOfRange { target, value } => {
                write!(f, "value {value} out of range for {target}")
            }
            ValueError::InvalidTimestamp(raw) => write!(f, "invalid timestamp: {raw}"),
            ValueError::UnknownColumn(col) => write!(f, "unknown column: {col}"),
        }
    }
}

impl std::error::Error for ValueError {}

/// Conversion of an entity field into a bindable [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion of a scanned [`Value`] back into an entity field.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, ValueError> {
    Err(ValueError::Mismatch {
        expected,
        found: value.kind(),
    })
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            // sqlite and mysql report booleans as integers
            Value::Int(v) => Ok(v != 0),
            other => mismatch("bool", &other),
        }
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| ValueError::OutOfRange {
                            target: stringify!($ty),
                            value: v,
                        }),
                        Value::Bool(v) => Ok(v as $ty),
                        other => mismatch(stringify!($ty), &other),
                    }
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|_| ValueError::Mismatch {
                expected: "utf-8 text",
                found: "bytes",
            }),
            other => mismatch("text", &other),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => mismatch("bytes", &other),
        }
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::Text(raw) => parse_timestamp(&raw),
            other => mismatch("timestamp", &other),
        }
    }
}

/// Accepts RFC 3339 as well as the `YYYY-MM-DD HH:MM:SS[.f]` form sqlite and mysql emit.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValueError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ValueError::InvalidTimestamp(raw.to_string()))
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    DateTime<Utc> => Timestamp,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_out_of_range() {
        let err = i8::from_value(Value::Int(300)).unwrap_err();
        assert_eq!(
            err,
            ValueError::OutOfRange {
                target: "i8",
                value: 300
            }
        );
    }

    #[test]
    fn test_bool_from_int() {
        assert!(bool::from_value(Value::Int(1)).unwrap());
        assert!(!bool::from_value(Value::Int(0)).unwrap());
    }

    #[test]
    fn test_option_null() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(5i64).to_value(), Value::Int(5));
    }

    #[test]
    fn test_timestamp_from_sqlite_text() {
        let ts = DateTime::<Utc>::from_value(Value::Text("2024-03-01 12:30:00".into())).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+00:00");

        let ts = DateTime::<Utc>::from_value(Value::Text("2024-03-01T12:30:00Z".into())).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+00:00");

        assert!(matches!(
            DateTime::<Utc>::from_value(Value::Text("yesterday".into())),
            Err(ValueError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_mismatch_reports_kinds() {
        let err = String::from_value(Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "expected text, found int");
    }
}
