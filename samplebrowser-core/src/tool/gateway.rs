//! Invocations of a resolved tool.
//!
//! Each operation is one process call whose output is interpreted here:
//!
//! - `fetch_catalog`: `list -j -o <lang> [--url=<base>] [--ignore-os]`
//! - `check_dependencies`: `check --deps=<list>`
//! - `materialize`: `create -s <lang> <sample> <dest>`
//! - `purge_cache`: `clean`
//!
//! Arguments are handed to the process as separate argv entries, so paths
//! and values with spaces or quotes reach the tool unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::GatewayError;
use super::runner::ProcessRunner;
use crate::catalog::{parse_listing, CatalogEntry};

/// Options for a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Overrides the catalog location the tool reads from.
    pub base_url: Option<String>,
    /// Lists samples for every OS, not only the host's.
    pub ignore_os: bool,
}

/// Runs the tool at a resolved path.
#[derive(Clone)]
pub struct ToolGateway {
    exe: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl ToolGateway {
    pub fn new(exe: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { exe, runner }
    }

    /// Lists the catalog for `language`.
    ///
    /// A failed run or unparseable output yields an empty list.
    pub async fn fetch_catalog(&self, language: &str, query: &CatalogQuery) -> Vec<CatalogEntry> {
        let mut args = vec![
            "list".to_string(),
            "-j".to_string(),
            "-o".to_string(),
            language.to_string(),
        ];
        if let Some(url) = query.base_url.as_deref().filter(|u| !u.is_empty()) {
            args.push(format!("--url={}", url));
        }
        if query.ignore_os {
            args.push("--ignore-os".to_string());
        }

        let output = match self.runner.run(&self.exe, &args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(language = %language, "Catalog listing failed: {}", e);
                return Vec::new();
            }
        };

        if !output.success() {
            warn!(
                language = %language,
                code = ?output.code,
                "Catalog listing exited unsuccessfully: {}",
                output.stderr.trim()
            );
            return Vec::new();
        }

        match parse_listing(&output.stdout, language) {
            Ok(entries) => {
                debug!(language = %language, count = entries.len(), "Catalog fetched");
                entries
            }
            Err(e) => {
                warn!(language = %language, "Catalog output is not valid JSON: {}", e);
                Vec::new()
            }
        }
    }

    /// Asks the tool whether `deps` (comma separated) are installed.
    ///
    /// Returns the tool's advisory text whether the check passed or failed;
    /// an empty string means there is nothing to report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tool could not be run at all.
    pub async fn check_dependencies(&self, deps: &str) -> Result<String, GatewayError> {
        let args = vec!["check".to_string(), format!("--deps={}", deps)];
        let output = self.runner.run(&self.exe, &args).await.map_err(|e| {
            warn!("Dependency check could not run: {}", e);
            e
        })?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Ok(output.text().to_string())
        }
    }

    /// Creates the sample `relative_path` for `language` at `destination`.
    ///
    /// # Errors
    ///
    /// Returns the tool's output if it cannot be run or exits non-zero.
    pub async fn materialize(
        &self,
        language: &str,
        relative_path: &str,
        destination: &Path,
    ) -> Result<(), GatewayError> {
        let args = vec![
            "create".to_string(),
            "-s".to_string(),
            language.to_string(),
            relative_path.to_string(),
            destination.to_string_lossy().into_owned(),
        ];

        let output = self.runner.run(&self.exe, &args).await?;
        if !output.success() {
            return Err(GatewayError::Failed {
                code: output.code,
                output: output.text().trim().to_string(),
            });
        }

        info!(
            sample = %relative_path,
            destination = %destination.display(),
            "Sample created"
        );
        Ok(())
    }

    /// Clears the tool's download cache. Failures are only logged.
    pub async fn purge_cache(&self) {
        match self.runner.run(&self.exe, &["clean".to_string()]).await {
            Ok(output) => debug!(code = ?output.code, "oneapi-cli clean finished"),
            Err(e) => debug!("oneapi-cli clean failed: {}", e),
        }
    }
}
