//! Deployment configuration: the relevant-function table override, path
//! limits, and the process name used to anchor a provenance stream.

use crate::cfg::paths::PathLimits;
use crate::error::AnalyzerError;
use crate::provenance::{default_table, RelevantFunction, RelevantFunctionTable};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct RelevantFunctionEntry {
    artifact: String,
    arg_index: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawConfig {
    process_name: String,
    max_paths: usize,
    max_depth: usize,
    relevant_functions: HashMap<String, RelevantFunctionEntry>,
}

impl Default for RawConfig {
    fn default() -> Self {
        let limits = PathLimits::default();
        Self {
            process_name: "process_name".to_string(),
            max_paths: limits.max_paths,
            max_depth: limits.max_depth,
            relevant_functions: HashMap::new(),
        }
    }
}

/// Resolved analyzer configuration. Deployments that supply no config file
/// get the built-in relevant-function table (§4.6) and default path
/// limits.
#[derive(Debug, Clone)]
pub struct Config {
    pub process_name: String,
    pub path_limits: PathLimits,
    pub relevant_functions: RelevantFunctionTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_name: "process_name".to_string(),
            path_limits: PathLimits::default(),
            relevant_functions: default_table(),
        }
    }
}

impl Config {
    /// Loads a JSON config file, overlaying its `relevant_functions` table
    /// on top of the built-in default rather than replacing it wholesale,
    /// so a deployment config only needs to list its additions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| AnalyzerError::ConfigIo { path: path.display().to_string(), source })?;
        let raw: RawConfig = serde_json::from_str(&text)
            .map_err(|source| AnalyzerError::ConfigParse { path: path.display().to_string(), source })?;

        let mut relevant_functions = default_table();
        for (name, entry) in raw.relevant_functions {
            relevant_functions.insert(name, RelevantFunction { artifact: entry.artifact, arg_index: entry.arg_index });
        }

        Ok(Self {
            process_name: raw.process_name,
            path_limits: PathLimits::new(raw.max_paths, raw.max_depth),
            relevant_functions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_builtin_relevant_function_table() {
        let config = Config::default();
        assert!(config.relevant_functions.get("fopen").is_some());
        assert_eq!(config.process_name, "process_name");
    }

    #[test]
    fn load_overlays_custom_entries_without_dropping_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"process_name": "myproc", "relevant_functions": {"socket": {"artifact": "SOCKET", "arg_index": -1}}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.process_name, "myproc");
        assert!(config.relevant_functions.get("fopen").is_some());
        assert!(config.relevant_functions.get("socket").is_some());
    }

    #[test]
    fn load_missing_file_returns_config_io_error() {
        let err = Config::load("/nonexistent/path/config.json").unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigIo { .. }));
    }
}
