//! pynode Python session
//!
//! Embeds a CPython interpreter through PyO3 and exposes the operations the
//! Node.js addon forwards: starting the interpreter, extending `sys.path`,
//! loading a module, and calling its functions with marshaled values.
//!
//! ## Module Structure
//!
//! - `config` - Interpreter configuration
//! - `interpreter` - Interpreter startup and `sys.path` handling
//! - `session` - Loaded module handle and call dispatch
//! - `marshal` - Conversion between Python objects and `pynode::Value`
//! - `error` - Python exception formatting

pub mod config;
mod error;
pub mod interpreter;
pub mod marshal;
pub mod session;

pub use config::InterpreterConfig;
pub use marshal::PyKind;
pub use session::Session;
