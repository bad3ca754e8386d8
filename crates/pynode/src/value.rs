//! Marshaled values exchanged between Node.js and Python.
//!
//! `Value` is the neutral form every argument and return value passes
//! through. Neither side's object model leaks into it, which keeps the
//! napi and pyo3 conversions independent of each other.

use serde_json::Number;

/// Largest integer a JavaScript number represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Deepest container nesting either side converts. Deeper or cyclic
/// structures are rejected instead of recursing without bound.
pub const MAX_DEPTH: usize = 64;

/// A value marshaled between the host and the embedded interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Python `None`, JavaScript `null`/`undefined`, or an unsupported type
    None,
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
    /// String-keyed mapping in insertion order
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Build a numeric value from a JavaScript number.
    ///
    /// Integral numbers inside the safe integer range become `Int`, so that
    /// `f(3)` reaches Python as `3` rather than `3.0`.
    pub fn from_number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Short type label used in log lines and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "str",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Map(_) => "dict",
        }
    }

    /// JSON rendering for debug log lines.
    ///
    /// Bytes are rendered as lossy UTF-8 text and non-finite floats as
    /// `null`, matching what `JSON.stringify` would produce on the host side.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}
