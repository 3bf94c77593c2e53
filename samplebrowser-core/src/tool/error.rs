//! Error types for tool resolution and invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Why the tool could not be made ready.
///
/// Cloneable so the single memoized outcome can be handed to every caller
/// awaiting readiness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Configured oneapi-cli path is not an executable file: {}", .0.display())]
    InvalidExplicitPath(PathBuf),
    #[error("oneapi-cli at {} reports version {found}, but {required} or newer is required", .path.display())]
    IncompatibleVersion {
        path: PathBuf,
        found: String,
        required: String,
    },
    #[error("oneapi-cli was not found and downloading it was declined")]
    DownloadDeclined,
    #[error("oneapi-cli could not be installed: {0}")]
    InstallFailed(String),
}

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} timed out after {secs} seconds", .program.display())]
    Timeout { program: PathBuf, secs: u64 },
    #[error("oneapi-cli exited with code {code:?}: {output}")]
    Failed { code: Option<i32>, output: String },
}
