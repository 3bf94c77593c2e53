//! Discovery, installation and invocation of `oneapi-cli`.
//!
//! The sample catalog lives behind an external command-line tool. This
//! module finds a recent enough copy of it, downloads one on request, and
//! wraps every call made to it.
//!
//! # Architecture
//!
//! - `types`: Tool identity, OS detection and release assets
//! - `paths`: Per-user cache location
//! - `version`: Version cleaning, coercion and minimum checks
//! - `runner`: Process execution seam (`ProcessRunner`)
//! - `downloader`: HTTPS download and SHA-384 verification
//! - `installer`: Writes a verified binary into the cache
//! - `locator`: Ordered resolution strategies
//! - `readiness`: Memoized one-shot resolution (`ToolHandle`)
//! - `gateway`: The tool's list/check/create/clean operations
//!
//! # Example
//!
//! ```ignore
//! use samplebrowser_core::tool::{CatalogQuery, SystemRunner, ToolGateway, ToolHandle};
//!
//! let runner = Arc::new(SystemRunner::default());
//! let handle = ToolHandle::with_defaults(None, runner.clone(), permission)?;
//!
//! let exe = handle.ready().await?;
//! let gateway = ToolGateway::new(exe, runner);
//! let samples = gateway.fetch_catalog("cpp", &CatalogQuery::default()).await;
//! ```

pub mod downloader;
pub mod error;
pub mod gateway;
pub mod installer;
pub mod locator;
pub mod paths;
pub mod readiness;
pub mod runner;
pub mod types;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use downloader::{AssetFetcher, DownloadProgress, HttpFetcher};
pub use error::{GatewayError, ResolveError};
pub use gateway::{CatalogQuery, ToolGateway};
pub use installer::ToolInstaller;
pub use locator::{DownloadPermission, ToolLocator};
pub use paths::{get_cache_dir, get_cached_binary_path};
pub use readiness::{ReadinessState, ToolHandle};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use types::{OsTag, ReleaseAsset, CLI_BIN_NAME, RELEASE_BASE_URL, REQUIRED_CLI_VERSION};
pub use version::{clean_version, coerce_version, version_satisfies};
