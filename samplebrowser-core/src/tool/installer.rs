//! Download and installation of the tool binary into the per-user cache.
//!
//! Installation is a single attempt: fetch the binary and its checksum,
//! verify the SHA-384 digest, then write the binary with executable
//! permissions. Every failure collapses into `None` after being logged, and
//! bytes that fail verification never reach the disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::downloader::{verify_checksum, AssetFetcher};
use super::types::{OsTag, ReleaseAsset, RELEASE_BASE_URL};

/// Installs a checksum-verified tool binary into a cache directory.
pub struct ToolInstaller {
    os: Option<OsTag>,
    release_base: String,
    cache_dir: PathBuf,
    fetcher: Arc<dyn AssetFetcher>,
}

impl ToolInstaller {
    /// Creates an installer for the host OS using the default release.
    pub fn new(cache_dir: PathBuf, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            os: OsTag::detect(),
            release_base: RELEASE_BASE_URL.to_string(),
            cache_dir,
            fetcher,
        }
    }

    /// Overrides the target OS (`None` means unsupported).
    pub fn with_os(mut self, os: Option<OsTag>) -> Self {
        self.os = os;
        self
    }

    /// Overrides the release base URL.
    pub fn with_release_base(mut self, release_base: impl Into<String>) -> Self {
        self.release_base = release_base.into();
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path the binary is written to on success.
    pub fn target_path(&self) -> Option<PathBuf> {
        self.os.map(|os| self.cache_dir.join(os.binary_name()))
    }

    /// Downloads, verifies and installs the binary.
    ///
    /// Returns the installed path, or `None` on any failure.
    pub async fn install(&self) -> Option<PathBuf> {
        let Some(os) = self.os else {
            warn!("No oneapi-cli release exists for {}", std::env::consts::OS);
            return None;
        };

        match self.try_install(os).await {
            Ok(path) => {
                info!("oneapi-cli installed at {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("oneapi-cli installation failed: {:#}", e);
                None
            }
        }
    }

    async fn try_install(&self, os: OsTag) -> Result<PathBuf> {
        let asset = ReleaseAsset::for_os(&self.release_base, os);
        info!("Installing oneapi-cli for {} from {}", os, asset.binary_url);

        let binary = self.fetcher.fetch(&asset.binary_url).await?;
        let checksum = self.fetcher.fetch(&asset.checksum_url).await?;
        let checksum = String::from_utf8_lossy(&checksum);

        verify_checksum(&binary, &checksum)
            .with_context(|| format!("Rejected download from {}", asset.binary_url))?;

        ensure_dir(&self.cache_dir).await?;

        let exe_path = self.cache_dir.join(os.binary_name());
        tokio::fs::write(&exe_path, &binary)
            .await
            .with_context(|| format!("Failed to write {}", exe_path.display()))?;
        make_executable(&exe_path)?;

        Ok(exe_path)
    }
}

/// Creates `dir`, treating an existing directory as success.
async fn ensure_dir(dir: &Path) -> Result<()> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => {
            debug!("Created cache directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to create directory: {}", dir.display()))
        }
    }
}

/// Sets executable permissions on a file (Unix only).
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for {}", path.display()))?;

        let mut permissions = metadata.permissions();
        let current_mode = permissions.mode();
        permissions.set_mode(current_mode | 0o755);

        std::fs::set_permissions(path, permissions).with_context(|| {
            format!("Failed to set executable permission on {}", path.display())
        })?;

        debug!("Set executable permission on {}", path.display());
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
