//! Library error types. CLI-boundary failures wrap these with
//! `anyhow::Context`; in-pipeline recoverable conditions (bad refs, missing
//! callees, unmodeled opcodes) are not errors at all — they're logged via
//! `tracing::warn!` and skipped, per §7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to read config file {path}: {source}")]
    ConfigIo { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: String, #[source] source: serde_json::Error },

    #[error("failed to write output file {path}: {source}")]
    OutputIo { path: String, #[source] source: std::io::Error },
}
