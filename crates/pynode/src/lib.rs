//! # pynode Shared Rust Library
//!
//! This crate provides the interpreter-independent pieces shared by the
//! pynode crates:
//! - **value**: The marshaled value type exchanged between Node.js and Python
//! - **args**: Argument checks for `call` that need no JavaScript engine
//! - **error**: Common error type for bridge operations
//! - **tracing**: Logging setup
//!
//! ## Usage
//!
//! ```rust
//! use pynode::{Error, Value};
//!
//! let args = vec![Value::Int(2), Value::Text("x".into())];
//! assert_eq!(args.len(), 2);
//!
//! let err = Error::Arity { function: "add".into(), expected: 2, passed: 3 };
//! assert_eq!(err.to_string(), "The function 'add' has 2 arguments, 3 were passed");
//! ```

pub mod args;
pub mod error;
pub mod tracing;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;
