// Copyright 2026 Rowlift Contributors
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

//! Value type for Rowlift - scalar literals with type information
//!
//! A [`Value`] is a fully-known literal: a constant-pool entry of an
//! instruction trace, a captured binding folded at analysis time, or a
//! cell of an engine column. `Display` renders the value as a literal in
//! the engine's expression language.

use std::fmt;
use std::sync::Arc;

/// Semantic type of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Absent value
    Null,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// UTF-8 text
    Text,
    /// Sequence of literals (membership tests)
    List,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Null => "null",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Text => "text",
            DataType::List => "list",
        };
        write!(f, "{}", name)
    }
}

/// A scalar literal with type information
///
/// Text and List use `Arc` for cheap cloning: constants are cloned from
/// the pool into every expression node that references them, and cells
/// are cloned during column materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UTF-8 text string
    Text(Arc<str>),
    /// Sequence of literals
    List(Arc<[Value]>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a list value
    pub fn list(values: impl Into<Vec<Value>>) -> Self {
        Value::List(Arc::from(values.into()))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the semantic type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Boolean(_) => DataType::Boolean,
            Value::Text(_) => DataType::Text,
            Value::List(_) => DataType::List,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // =========================================================================
    // Extractors
    // =========================================================================

    /// Extract as i64 without coercion across non-numeric types
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Extract as f64, coercing integers and booleans
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Extract as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness under the source evaluation model: NULL, zero, empty
    /// text, and empty lists are false, everything else is true
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Integer(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Boolean(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value as a literal in the engine's expression language
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(v) => write!(f, "{}", v),
            // {:?} keeps the decimal point on round floats (2.0, not 2)
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Text(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
