//! Interpreter configuration types

use serde::Deserialize;

/// Configuration applied when the interpreter starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterpreterConfig {
    /// Full module search path, entries joined with the platform separator.
    /// Replaces the interpreter's computed path entirely.
    pub search_path: Option<String>,
    /// Directories appended to `sys.path` once the interpreter is running
    pub sys_paths: Vec<String>,
}

impl InterpreterConfig {
    /// Configuration carrying only a search path override.
    pub fn with_search_path(search_path: impl Into<String>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_from_host_options() {
        let config: InterpreterConfig =
            serde_json::from_str(r#"{"searchPath": "/srv/py", "sysPaths": ["lib", "./handlers"]}"#).unwrap();
        assert_eq!(
            config,
            InterpreterConfig {
                search_path: Some("/srv/py".to_string()),
                sys_paths: vec!["lib".to_string(), "./handlers".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let empty: InterpreterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, InterpreterConfig::default());

        let paths_only: InterpreterConfig = serde_json::from_str(r#"{"sysPaths": ["x"]}"#).unwrap();
        assert!(paths_only.search_path.is_none());
        assert_eq!(paths_only.sys_paths, vec!["x"]);
    }

    #[test]
    fn test_with_search_path() {
        let config = InterpreterConfig::with_search_path("/opt/python/lib");
        assert_eq!(config.search_path.as_deref(), Some("/opt/python/lib"));
        assert!(config.sys_paths.is_empty());
    }
}
