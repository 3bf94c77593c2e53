//! Resolution of a runnable, version-checked tool executable.
//!
//! Strategies are tried in a fixed order and the first success wins:
//!
//! 1. An explicitly configured path (validated at construction, never falls
//!    through to the other strategies).
//! 2. The bare command name, resolved through `PATH`.
//! 3. The per-user cache path.
//! 4. After asking permission, a fresh download into the cache.
//!
//! Nothing is retried; a failed resolution needs a new locator.

use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ResolveError;
use super::installer::ToolInstaller;
use super::paths;
use super::runner::ProcessRunner;
use super::types::{CLI_BIN_NAME, REQUIRED_CLI_VERSION};
use super::version::{clean_version, version_satisfies};

/// Asks whether the tool may be downloaded.
///
/// This is the only step of resolution that waits on a person.
#[async_trait]
pub trait DownloadPermission: Send + Sync {
    async fn allow_download(&self) -> bool;
}

/// Locates the tool and verifies it is recent enough.
pub struct ToolLocator {
    explicit_path: Option<PathBuf>,
    command: PathBuf,
    cache_path: PathBuf,
    required: Version,
    runner: Arc<dyn ProcessRunner>,
    installer: ToolInstaller,
    permission: Arc<dyn DownloadPermission>,
}

impl ToolLocator {
    /// Creates a locator.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidExplicitPath` if `explicit_path` is set
    /// but does not name an executable file.
    pub fn new(
        explicit_path: Option<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
        installer: ToolInstaller,
        permission: Arc<dyn DownloadPermission>,
    ) -> Result<Self, ResolveError> {
        if let Some(path) = &explicit_path {
            if !paths::is_executable(path) {
                warn!("Configured oneapi-cli path rejected: {}", path.display());
                return Err(ResolveError::InvalidExplicitPath(path.clone()));
            }
        }

        let cache_path = installer
            .target_path()
            .unwrap_or_else(|| paths::cached_binary_path_in(installer.cache_dir()));

        Ok(Self {
            explicit_path,
            command: PathBuf::from(CLI_BIN_NAME),
            cache_path,
            required: Version::parse(REQUIRED_CLI_VERSION)
                .unwrap_or_else(|_| Version::new(0, 0, 0)),
            runner,
            installer,
            permission,
        })
    }

    /// Overrides the bare command name probed on `PATH`.
    pub fn with_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.command = command.into();
        self
    }

    /// Overrides the minimum accepted version.
    pub fn with_required_version(mut self, required: Version) -> Self {
        self.required = required;
        self
    }

    /// Runs `<exe> version` and returns the cleaned version.
    ///
    /// A missing binary, failed run or unparseable output yields `None`.
    pub async fn probe_version(&self, exe: &Path) -> Option<String> {
        let output = match self.runner.run(exe, &["version".to_string()]).await {
            Ok(output) => output,
            Err(e) => {
                debug!("Version probe of {} failed: {}", exe.display(), e);
                return None;
            }
        };

        if !output.success() {
            debug!(
                "Version probe of {} exited with {:?}",
                exe.display(),
                output.code
            );
            return None;
        }

        clean_version(&output.stdout)
    }

    /// Probes `exe` and returns its version if it meets the minimum.
    async fn accept(&self, exe: &Path) -> Result<String, Option<String>> {
        match self.probe_version(exe).await {
            Some(version) if version_satisfies(&version, &self.required) => Ok(version),
            other => Err(other),
        }
    }

    /// Resolves the executable path.
    pub async fn resolve(&self) -> Result<PathBuf, ResolveError> {
        if let Some(explicit) = &self.explicit_path {
            return match self.accept(explicit).await {
                Ok(version) => {
                    info!("Using configured oneapi-cli {} at {}", version, explicit.display());
                    Ok(explicit.clone())
                }
                Err(found) => Err(self.incompatible(explicit, found)),
            };
        }

        match self.accept(&self.command).await {
            Ok(version) => {
                info!("Using oneapi-cli {} from PATH", version);
                return Ok(self.command.clone());
            }
            Err(found) => debug!("oneapi-cli on PATH not usable (version {:?})", found),
        }

        if self.cache_path.exists() {
            match self.accept(&self.cache_path).await {
                Ok(version) => {
                    info!(
                        "Using cached oneapi-cli {} at {}",
                        version,
                        self.cache_path.display()
                    );
                    return Ok(self.cache_path.clone());
                }
                Err(found) => debug!("Cached oneapi-cli not usable (version {:?})", found),
            }
        }

        if !self.permission.allow_download().await {
            info!("Download of oneapi-cli declined");
            return Err(ResolveError::DownloadDeclined);
        }

        let installed = self.installer.install().await.ok_or_else(|| {
            ResolveError::InstallFailed("download or verification failed".to_string())
        })?;

        match self.accept(&installed).await {
            Ok(version) => {
                info!("Using downloaded oneapi-cli {}", version);
                Ok(installed)
            }
            Err(found) => Err(ResolveError::InstallFailed(format!(
                "downloaded binary reports version {}, {} or newer is required",
                found.as_deref().unwrap_or("none"),
                self.required
            ))),
        }
    }

    fn incompatible(&self, path: &Path, found: Option<String>) -> ResolveError {
        ResolveError::IncompatibleVersion {
            path: path.to_path_buf(),
            found: found.unwrap_or_else(|| "none".to_string()),
            required: self.required.to_string(),
        }
    }
}
