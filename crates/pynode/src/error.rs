//! Common error types for pynode bridge operations.

use thiserror::Error;

/// Common error type for pynode operations.
///
/// Every variant surfaces in Node.js as a thrown `Error` carrying the
/// `Display` text.
#[derive(Error, Debug)]
pub enum Error {
    /// A required string argument was missing or had the wrong type
    #[error("Must pass a string to '{0}'")]
    MissingArgument(&'static str),

    /// A host value has no Python representation
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),

    /// More positional arguments than the bridge forwards
    #[error("at most {limit} arguments can be passed to a python function, {passed} were passed")]
    TooManyArguments { limit: usize, passed: usize },

    /// Supplied argument count differs from the declared parameter count
    #[error("The function '{function}' has {expected} arguments, {passed} were passed")]
    Arity {
        function: String,
        expected: usize,
        passed: usize,
    },

    /// The name is not an attribute of the loaded module
    #[error("Function call failed: '{0}' is not defined in the loaded module")]
    Unresolved(String),

    /// The attribute exists but cannot be called
    #[error("Function call failed: '{0}' is not callable")]
    NotCallable(String),

    /// The callable's parameter count could not be determined
    #[error("Function call failed: cannot determine the parameters of '{0}'")]
    UnknownArity(String),

    /// `call` was used before any module was opened
    #[error("no python module loaded, call openFile first")]
    NoModuleLoaded,

    /// Importing a module failed
    #[error("Failed to load python module '{module}': {message}")]
    Import { module: String, message: String },

    /// An exception raised inside Python
    #[error("python error: {0}")]
    Python(String),

    /// Interpreter startup failed
    #[error("python initialization failed: {0}")]
    Init(String),

    /// A search path entry could not be handed to the interpreter
    #[error("invalid python path: {0}")]
    InvalidPath(String),
}

/// Result type alias using pynode Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_names_function_and_counts() {
        let err = Error::Arity {
            function: "greet".to_string(),
            expected: 1,
            passed: 0,
        };
        assert_eq!(err.to_string(), "The function 'greet' has 1 arguments, 0 were passed");
    }

    #[test]
    fn test_missing_argument_message() {
        let err = Error::MissingArgument("openFile");
        assert_eq!(err.to_string(), "Must pass a string to 'openFile'");
    }

    #[test]
    fn test_unresolved_mentions_name() {
        let err = Error::Unresolved("nope".to_string());
        assert!(err.to_string().contains("'nope'"));
        assert!(err.to_string().starts_with("Function call failed"));
    }
}
