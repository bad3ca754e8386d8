//! Host-side argument checks for `call`
//!
//! These run before any JavaScript value is converted, so they are kept
//! free of napi types.

use crate::{Error, Result};

/// Most positional arguments `call` forwards to Python.
pub const MAX_CALL_ARGS: usize = 32;

/// Validate the function name and positional argument count of a `call`.
///
/// `name` is `None` when the first argument is missing or not a string.
pub fn call_target(name: Option<String>, passed: usize) -> Result<String> {
    let name = name.ok_or(Error::MissingArgument("call"))?;
    if passed > MAX_CALL_ARGS {
        return Err(Error::TooManyArguments {
            limit: MAX_CALL_ARGS,
            passed,
        });
    }
    Ok(name)
}

/// JavaScript type of an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Buffer,
    Array,
    Object,
    Function,
    Symbol,
    External,
    /// Any type napi reports that has no counterpart here, e.g. `bigint`
    Other,
}

/// `Value` shape a convertible host kind turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Bool,
    Number,
    Text,
    Bytes,
    List,
    Map,
}

impl HostKind {
    pub fn name(self) -> &'static str {
        match self {
            HostKind::Undefined => "undefined",
            HostKind::Null => "null",
            HostKind::Boolean => "boolean",
            HostKind::Number => "number",
            HostKind::String => "string",
            HostKind::Buffer => "Buffer",
            HostKind::Array => "array",
            HostKind::Object => "object",
            HostKind::Function => "function",
            HostKind::Symbol => "symbol",
            HostKind::External => "external",
            HostKind::Other => "unrecognized",
        }
    }

    /// Shape of the converted value, or an error for kinds Python cannot receive.
    pub fn shape(self) -> Result<Shape> {
        let shape = match self {
            HostKind::Undefined | HostKind::Null => Shape::None,
            HostKind::Boolean => Shape::Bool,
            HostKind::Number => Shape::Number,
            HostKind::String => Shape::Text,
            HostKind::Buffer => Shape::Bytes,
            HostKind::Array => Shape::List,
            HostKind::Object => Shape::Map,
            HostKind::Function | HostKind::Symbol | HostKind::External | HostKind::Other => {
                return Err(Error::UnsupportedArgument(format!(
                    "javascript {} values cannot be passed to python",
                    self.name()
                )))
            }
        };
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_argument_limit_edge() {
        assert_eq!(call_target(Some("f".into()), MAX_CALL_ARGS).unwrap(), "f");

        let err = call_target(Some("f".into()), MAX_CALL_ARGS + 1).unwrap_err();
        assert!(matches!(err, Error::TooManyArguments { limit: 32, passed: 33 }));
    }

    #[test]
    fn test_call_requires_string_name() {
        let err = call_target(None, 0).unwrap_err();
        assert_eq!(err.to_string(), "Must pass a string to 'call'");

        // A missing name wins over the argument count
        assert!(matches!(
            call_target(None, MAX_CALL_ARGS + 5),
            Err(Error::MissingArgument("call"))
        ));
    }

    #[test]
    fn test_convertible_kinds() {
        assert_eq!(HostKind::Null.shape().unwrap(), Shape::None);
        assert_eq!(HostKind::Undefined.shape().unwrap(), Shape::None);
        assert_eq!(HostKind::Buffer.shape().unwrap(), Shape::Bytes);
        assert_eq!(HostKind::Array.shape().unwrap(), Shape::List);
        assert_eq!(HostKind::Object.shape().unwrap(), Shape::Map);
    }

    #[test]
    fn test_functions_and_symbols_rejected() {
        let err = HostKind::Function.shape().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported argument: javascript function values cannot be passed to python"
        );
        assert!(matches!(HostKind::Symbol.shape(), Err(Error::UnsupportedArgument(_))));
        assert!(matches!(HostKind::Other.shape(), Err(Error::UnsupportedArgument(_))));
    }
}
