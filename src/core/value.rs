// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type - tagged runtime values
//!
//! [`Value`] is used for literals, column values and result slots alike.
//! It is immutable once constructed and cheap to clone (text is shared via
//! `Arc<str>`).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::sync::Arc;

use super::codec;
use super::error::{Error, Result};
use super::types::DataType;

/// A runtime value with type information
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// NULL
    #[default]
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),

    /// Boolean value
    Boolean(bool),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a text value
    pub fn text(value: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(value.as_ref()))
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for INTEGER and FLOAT values
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    // =========================================================================
    // Value extractors
    // =========================================================================

    /// Extract as i64, with type coercion
    ///
    /// Returns None if the value is NULL or the conversion is not possible.
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Integer(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
            Value::Boolean(b) => Some(if *b { 1 } else { 0 }),
        }
    }

    /// Extract as f64, with type coercion
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// Extract as boolean, with type coercion
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Null => None,
            Value::Integer(v) => Some(*v != 0),
            Value::Float(v) => Some(*v != 0.0),
            Value::Text(s) => {
                let s_ref: &str = s.as_ref();
                if s_ref.eq_ignore_ascii_case("true")
                    || s_ref.eq_ignore_ascii_case("t")
                    || s_ref.eq_ignore_ascii_case("yes")
                    || s_ref == "1"
                {
                    Some(true)
                } else if s_ref.eq_ignore_ascii_case("false")
                    || s_ref.eq_ignore_ascii_case("f")
                    || s_ref.eq_ignore_ascii_case("no")
                    || s_ref == "0"
                    || s_ref.is_empty()
                {
                    Some(false)
                } else {
                    s_ref.parse::<f64>().ok().map(|f| f != 0.0)
                }
            }
            Value::Boolean(b) => Some(*b),
        }
    }

    /// Truthiness used by conditionals: NULL and unconvertible values are false
    pub fn is_truthy(&self) -> bool {
        self.as_boolean().unwrap_or(false)
    }

    /// Extract as String, with type coercion
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(v) => Some(v.to_string()),
            Value::Float(v) => Some(format_float(*v)),
            Value::Text(s) => Some(s.to_string()),
            Value::Boolean(b) => Some(if *b { "true" } else { "false" }.to_string()),
        }
    }

    /// Extract as string reference (avoids clone for Text)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Numeric coercion
    // =========================================================================

    /// Returns true if the value can be used as a number
    pub fn is_convertible_to_numeric(&self) -> bool {
        match self {
            Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => true,
            Value::Text(s) => s.trim().parse::<f64>().is_ok(),
            Value::Null => false,
        }
    }

    /// Convert to INTEGER or FLOAT, preferring INTEGER for integral text
    pub fn to_numeric(&self) -> Result<Value> {
        match self {
            Value::Integer(_) | Value::Float(_) => Ok(self.clone()),
            Value::Boolean(b) => Ok(Value::Integer(*b as i64)),
            Value::Text(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Err(Error::type_error(format!(
                        "can't convert {} '{}' to NUMERIC",
                        self.data_type(),
                        s
                    )))
                }
            }
            Value::Null => Err(Error::type_error("can't convert NULL to NUMERIC")),
        }
    }

    /// Convert to f64, failing with a type error instead of returning None
    pub fn to_float(&self) -> Result<f64> {
        self.as_float64().ok_or_else(|| {
            Error::type_error(format!(
                "can't convert {} '{}' to FLOAT",
                self.data_type(),
                self
            ))
        })
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values for ordering
    ///
    /// NULL sorts equal to NULL; comparing NULL to a non-NULL value fails.
    /// Integers and floats compare numerically; other mixed types fall back
    /// to their string forms.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        if self.is_null() || other.is_null() {
            if self.is_null() && other.is_null() {
                return Ok(Ordering::Equal);
            }
            return Err(Error::type_error("cannot compare NULL with non-NULL value"));
        }

        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(compare_floats(*a, *b)),
            (Value::Integer(a), Value::Float(b)) => Ok(compare_floats(*a as f64, *b)),
            (Value::Float(a), Value::Integer(b)) => Ok(compare_floats(*a, *b as f64)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            _ => {
                let s1 = self.as_string().unwrap_or_default();
                let s2 = other.as_string().unwrap_or_default();
                Ok(s1.cmp(&s2))
            }
        }
    }

    // =========================================================================
    // Binary encoding
    // =========================================================================

    /// Encode this value: one tag byte followed by the payload
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, sink: &mut dyn Write) -> Result<usize> {
        let mut written = codec::write_u8(sink, self.data_type().as_u8())?;
        written += match self {
            Value::Null => 0,
            Value::Integer(i) => codec::write_i64(sink, *i)?,
            Value::Float(f) => codec::write_f64(sink, *f)?,
            Value::Text(s) => codec::write_bytes(sink, s.as_bytes())?,
            Value::Boolean(b) => codec::write_u8(sink, *b as u8)?,
        };
        Ok(written)
    }

    /// Decode a value previously written by [`Value::encode`]
    pub fn decode(source: &mut dyn Read) -> Result<Value> {
        let tag = codec::read_u8(source)?;
        let data_type = DataType::from_u8(tag)
            .ok_or_else(|| Error::internal(format!("invalid value tag {}", tag)))?;

        match data_type {
            DataType::Null => Ok(Value::Null),
            DataType::Integer => Ok(Value::Integer(codec::read_i64(source)?)),
            DataType::Float => Ok(Value::Float(codec::read_f64(source)?)),
            DataType::Text => {
                let bytes = codec::read_bytes(source)?;
                let s = String::from_utf8(bytes)
                    .map_err(|e| Error::internal(format!("invalid text: {}", e)))?;
                Ok(Value::Text(Arc::from(s.as_str())))
            }
            DataType::Boolean => Ok(Value::Boolean(codec::read_u8(source)? != 0)),
        }
    }
}

// =========================================================================
// Trait implementations
// =========================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                // NaN != NaN in IEEE 754, but equal values must compare equal here
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            // Cross-type numeric equality is exact: no rounding through f64
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                float_as_exact_int(*f) == Some(*i)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integer(5) == Float(5.0), so integral floats hash like integers
        match self {
            Value::Null => 0u8.hash(state),
            Value::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => match float_as_exact_int(*f) {
                // Also folds -0.0 into 0
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None if f.is_nan() => 2u8.hash(state),
                None => {
                    2u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Value::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Boolean(b) => {
                4u8.hash(state);
                b.hash(state);
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Arc::from(v.as_str()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// =========================================================================
// Helpers
// =========================================================================

/// Format a float without trailing zeros
fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        let s = format!("{:?}", v);
        if s.contains('.') && !s.contains('e') && !s.contains('E') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}

/// The integer `f` denotes exactly, if any
fn float_as_exact_int(f: f64) -> Option<i64> {
    // i64 covers [-2^63, 2^63); both bounds are exact in f64
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (-BOUND..BOUND).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Compare two floats with NaN sorted above every other value
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
