//! Criteria and bind values.
//!
//! Filter values are decoded from request JSON straight into [`Value`], so the
//! validator and the composer match on variants instead of inspecting types at
//! runtime. [`Value::Object`] only exists so that a client sending an object can
//! be told precisely what was wrong; it is never bound.

use crate::constants::MAX_VALUE_DEPTH;
use std::fmt;

/// A filter value or a bound SQL argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Expanded into one placeholder per element before the query is executed.
    Array(Vec<Value>),
    /// Decoded JSON object. Rejected by validation.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Whether this is a bindable scalar (string, int, float or bool).
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Short type name used in client-facing fault messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Text form used when a value is turned into a LIKE pattern.
    pub(crate) fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Convert decoded request JSON, refusing values nested more than
    /// [`MAX_VALUE_DEPTH`] containers deep. `depth` counts the enclosing
    /// containers and starts at 0.
    pub(crate) fn from_json(json: &miniserde::json::Value, depth: usize) -> Result<Self, String> {
        use miniserde::json::{Number, Value as Json};

        let enter = || {
            if depth >= MAX_VALUE_DEPTH {
                Err(format!("value nested deeper than {MAX_VALUE_DEPTH} levels"))
            } else {
                Ok(depth + 1)
            }
        };

        Ok(match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(Number::I64(n)) => Self::Int(*n),
            Json::Number(Number::U64(n)) => {
                i64::try_from(*n).map_or_else(|_| Self::Float(*n as f64), Self::Int)
            },
            Json::Number(Number::F64(n)) => Self::Float(*n),
            Json::String(s) => Self::String(s.clone()),
            Json::Array(items) => {
                let depth = enter()?;
                Self::Array(
                    items
                        .iter()
                        .map(|item| Self::from_json(item, depth))
                        .collect::<Result<_, _>>()?,
                )
            },
            Json::Object(map) => {
                let depth = enter()?;
                Self::Object(
                    map.iter()
                        .map(|(k, v)| Ok((k.clone(), Self::from_json(v, depth)?)))
                        .collect::<Result<_, String>>()?,
                )
            },
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
            Self::Object(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
