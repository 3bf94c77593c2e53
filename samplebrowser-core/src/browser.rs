//! The sample browser service.
//!
//! `SampleBrowser` ties the pieces together for a front end: it waits for
//! the tool, lists the catalog for every configured language, builds the
//! category tree, and runs the create/preview/clean actions. Everything the
//! user has to see or answer goes through the `Interaction` trait.

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::CatalogEntry;
use crate::config::Settings;
use crate::tool::{
    DownloadPermission, GatewayError, ProcessRunner, ResolveError, ToolGateway, ToolHandle,
};
use crate::tree::CategoryTree;

/// Shown in place of the tree when the tool cannot be made ready.
pub const UNAVAILABLE_MESSAGE: &str = "Unable to find oneapi-cli or download it";

/// Environment variable naming the installed toolkit.
pub const TOOLKIT_ROOT_VAR: &str = "ONEAPI_ROOT";

/// Warning given when a sample's dependencies cannot be checked.
pub const MISSING_TOOLKIT_WARNING: &str =
    "This sample has dependencies, but ONEAPI_ROOT is not set so they cannot be checked";

/// Warning given when the dependency check itself could not run.
pub const DEPENDENCY_CHECK_FAILED_WARNING: &str = "The dependencies of this sample could not be checked";

/// File opened when previewing a sample.
pub const README_FILE: &str = "README.md";

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Unavailable(#[from] ResolveError),
    #[error("Sample creation failed: {0}")]
    Create(#[from] GatewayError),
    #[error("Sample path '{0}' does not name a directory")]
    InvalidSamplePath(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// What a front end shows at the top level.
#[derive(Debug, Clone)]
pub enum BrowserView {
    /// The tool is unusable; a single, non-selectable message.
    Unavailable(String),
    Tree(CategoryTree),
}

/// One row of a flat, searchable sample picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickItem {
    pub label: String,
    pub description: String,
    pub detail: String,
    pub entry: CatalogEntry,
}

impl From<CatalogEntry> for QuickPickItem {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            label: entry.name.clone(),
            description: entry.language.clone(),
            detail: entry.description.clone(),
            entry,
        }
    }
}

/// Result of a create request the user did not abort with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(PathBuf),
    /// The user declined after reading the dependency advisory.
    Cancelled,
}

/// User-facing prompts raised while running browser actions.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Shows dependency advisory text (markdown links) and asks whether to
    /// continue anyway.
    async fn confirm_dependencies(&self, advisory: &str) -> bool;

    /// Shows a non-blocking warning.
    async fn warn(&self, message: &str);
}

/// Rewrites bare `http(s)://` URLs as markdown links.
pub fn linkify(text: &str) -> String {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    match URL.get_or_init(|| Regex::new(r"https?://\S+").ok()) {
        Some(re) => re.replace_all(text, "[$0]($0)").into_owned(),
        None => text.to_string(),
    }
}

/// `<temp>/<user>/inteloneapi`, the per-user preview area.
pub fn default_preview_root() -> PathBuf {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "default".to_string());
    std::env::temp_dir().join(user).join("inteloneapi")
}

/// Joins a catalog path below `root`, ignoring segments that would climb
/// out of it.
///
/// Returns `None` when no segment is left, since the result would be
/// `root` itself.
fn contained_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = relative
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(
        segments
            .into_iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment)),
    )
}

// =============================================================================
// SampleBrowser
// =============================================================================

/// Front-end independent sample browser.
///
/// Built from one `Settings` value; a configuration change means building
/// a new browser.
pub struct SampleBrowser {
    settings: Settings,
    handle: Arc<ToolHandle>,
    runner: Arc<dyn ProcessRunner>,
    interaction: Arc<dyn Interaction>,
    toolkit_root: Option<PathBuf>,
    preview_root: PathBuf,
    current_preview: Mutex<Option<PathBuf>>,
}

impl SampleBrowser {
    pub fn new(
        settings: Settings,
        handle: Arc<ToolHandle>,
        runner: Arc<dyn ProcessRunner>,
        interaction: Arc<dyn Interaction>,
    ) -> Self {
        let toolkit_root = std::env::var_os(TOOLKIT_ROOT_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            settings,
            handle,
            runner,
            interaction,
            toolkit_root,
            preview_root: default_preview_root(),
            current_preview: Mutex::new(None),
        }
    }

    /// Builds a browser and its tool handle from `settings`.
    ///
    /// # Errors
    ///
    /// Fails if `settings.cli_path` is set but not executable.
    pub fn from_settings(
        settings: Settings,
        runner: Arc<dyn ProcessRunner>,
        permission: Arc<dyn DownloadPermission>,
        interaction: Arc<dyn Interaction>,
    ) -> Result<Self, ResolveError> {
        let handle = ToolHandle::with_defaults(settings.cli_path.clone(), runner.clone(), permission)?;
        Ok(Self::new(settings, Arc::new(handle), runner, interaction))
    }

    /// Overrides the toolkit root read from the environment.
    pub fn with_toolkit_root(mut self, root: Option<PathBuf>) -> Self {
        self.toolkit_root = root;
        self
    }

    pub fn with_preview_root(mut self, root: PathBuf) -> Self {
        self.preview_root = root;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handle(&self) -> &ToolHandle {
        &self.handle
    }

    async fn gateway(&self) -> Result<ToolGateway, ResolveError> {
        let exe = self.handle.ready().await?;
        Ok(ToolGateway::new(exe, self.runner.clone()))
    }

    /// Lists every configured language, in configured order.
    ///
    /// Languages are fetched concurrently; one failing yields no entries
    /// for it and does not affect the others.
    pub async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>, ResolveError> {
        let gateway = self.gateway().await?;
        let query = self.settings.catalog_query();

        let listings = join_all(
            self.settings
                .languages
                .iter()
                .map(|language| gateway.fetch_catalog(language, &query)),
        )
        .await;

        Ok(listings.into_iter().flatten().collect())
    }

    /// Rebuilds the top-level view.
    pub async fn refresh(&self) -> BrowserView {
        match self.fetch_entries().await {
            Ok(entries) => {
                let tree = CategoryTree::build(&entries, &self.settings.languages);
                debug!(samples = entries.len(), nodes = tree.len(), "Sample tree rebuilt");
                BrowserView::Tree(tree)
            }
            Err(e) => {
                warn!("{}: {}", UNAVAILABLE_MESSAGE, e);
                BrowserView::Unavailable(UNAVAILABLE_MESSAGE.to_string())
            }
        }
    }

    /// Flat list of every sample; empty when the tool is unavailable.
    pub async fn quick_pick_items(&self) -> Vec<QuickPickItem> {
        match self.fetch_entries().await {
            Ok(entries) => entries.into_iter().map(QuickPickItem::from).collect(),
            Err(e) => {
                warn!("{}: {}", UNAVAILABLE_MESSAGE, e);
                Vec::new()
            }
        }
    }

    /// Creates `entry` in `destination`.
    ///
    /// If the sample declares dependencies they are checked first, unless
    /// checks are disabled. Advisory output from the check is shown and the
    /// user may cancel.
    pub async fn create(
        &self,
        entry: &CatalogEntry,
        destination: &Path,
    ) -> Result<CreateOutcome, BrowserError> {
        let gateway = self.gateway().await?;

        if !entry.dependencies.is_empty() && !self.settings.skip_dependency_checks {
            match &self.toolkit_root {
                None => {
                    warn!(sample = %entry.relative_path, "{} is not set, skipping dependency check", TOOLKIT_ROOT_VAR);
                    self.interaction.warn(MISSING_TOOLKIT_WARNING).await;
                }
                Some(root) => {
                    debug!(root = %root.display(), "Checking sample dependencies");
                    let advisory = match gateway
                        .check_dependencies(&entry.dependencies.join(","))
                        .await
                    {
                        Ok(advisory) => advisory,
                        Err(e) => {
                            self.interaction
                                .warn(&format!("{}: {}", DEPENDENCY_CHECK_FAILED_WARNING, e))
                                .await;
                            String::new()
                        }
                    };
                    if !advisory.trim().is_empty()
                        && !self
                            .interaction
                            .confirm_dependencies(&linkify(advisory.trim()))
                            .await
                    {
                        info!(sample = %entry.relative_path, "Sample creation cancelled");
                        return Ok(CreateOutcome::Cancelled);
                    }
                }
            }
        }

        gateway
            .materialize(&entry.language, &entry.relative_path, destination)
            .await?;
        Ok(CreateOutcome::Created(destination.to_path_buf()))
    }

    /// Creates `entry` in the preview area and returns its README path.
    ///
    /// The previously previewed sample is removed once the new one exists,
    /// unless one of the two directories contains the other.
    pub async fn preview(&self, entry: &CatalogEntry) -> Result<PathBuf, BrowserError> {
        let target = contained_path(&self.preview_root, &entry.relative_path)
            .ok_or_else(|| BrowserError::InvalidSamplePath(entry.relative_path.clone()))?;
        let gateway = self.gateway().await?;

        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            remove_dir(&target).await?;
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| BrowserError::Io {
                    context: format!("Failed to create {}", parent.display()),
                    source,
                })?;
        }

        gateway
            .materialize(&entry.language, &entry.relative_path, &target)
            .await?;

        let mut current = self.current_preview.lock().await;
        if let Some(previous) = current.take() {
            let nested = previous.starts_with(&target) || target.starts_with(&previous);
            if !nested {
                if let Err(e) = remove_dir(&previous).await {
                    warn!("Failed to remove previous preview: {}", e);
                }
            }
        }
        *current = Some(target.clone());

        Ok(target.join(README_FILE))
    }

    /// Clears the tool's cache and rebuilds the view.
    pub async fn clean(&self) -> BrowserView {
        match self.gateway().await {
            Ok(gateway) => gateway.purge_cache().await,
            Err(e) => debug!("Skipping cache purge: {}", e),
        }
        self.refresh().await
    }
}

async fn remove_dir(path: &Path) -> Result<(), BrowserError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BrowserError::Io {
            context: format!("Failed to remove {}", path.display()),
            source,
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
