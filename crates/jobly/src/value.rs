//! Dynamically typed bind values.
//!
//! Client-supplied fields arrive as strings, numbers or booleans and are only
//! known at runtime. [`FieldValue`] carries such a value through the fragment
//! builders and binds it as a `tokio-postgres` parameter.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A single raw field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// SQL `NULL`
    Null,
    /// `boolean`
    Bool(bool),
    /// `integer` (int4)
    Int(i32),
    /// `numeric`
    Numeric(Decimal),
    /// `text` / `varchar`
    Text(String),
}

impl FieldValue {
    /// Borrow the text payload, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        // Numbers may arrive as text or as the wrong numeric kind; convert to the
        // inferred parameter type. Other pairings must match the variant's own type.
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Int(v) if *ty == Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
            Self::Numeric(v) if *ty == Type::INT4 => whole_i32(v)?.to_sql(ty, out),
            Self::Text(v) if *ty == Type::INT4 => parse_text::<i32>(v, ty)?.to_sql(ty, out),
            Self::Text(v) if *ty == Type::NUMERIC => {
                parse_text::<Decimal>(v, ty)?.to_sql(ty, out)
            }
            Self::Text(v) if *ty == Type::BOOL => parse_text::<bool>(v, ty)?.to_sql(ty, out),
            Self::Bool(v) => v.to_sql_checked(ty, out),
            Self::Int(v) => v.to_sql_checked(ty, out),
            Self::Numeric(v) => v.to_sql_checked(ty, out),
            Self::Text(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <Decimal as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

fn whole_i32(value: &Decimal) -> Result<i32, Box<dyn Error + Sync + Send>> {
    if !value.fract().is_zero() {
        return Err(format!("{value} is not a whole number").into());
    }
    value
        .to_i32()
        .ok_or_else(|| format!("{value} is out of range for type integer").into())
}

fn parse_text<T: FromStr>(value: &str, ty: &Type) -> Result<T, Box<dyn Error + Sync + Send>> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid input for type {ty}: {value:?}").into())
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Numeric(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for FieldValue {
    type Error = JoblyError;

    fn try_from(value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return i32::try_from(i)
                        .map(Self::Int)
                        .map_err(|_| JoblyError::bad_request(format!("Number out of range: {n}")));
                }
                n.as_f64()
                    .and_then(|f| Decimal::try_from(f).ok())
                    .map(Self::Numeric)
                    .ok_or_else(|| JoblyError::bad_request(format!("Number out of range: {n}")))
            }
            other => Err(JoblyError::bad_request(format!(
                "Unsupported field value: {other}"
            ))),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Numeric(v) => Serialize::serialize(v, serializer),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}
