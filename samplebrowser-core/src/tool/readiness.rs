//! One-shot, memoized readiness of the tool.
//!
//! A `ToolHandle` wraps a `ToolLocator` and runs it at most once. Every
//! caller of `ready()` waits for that single resolution and observes the
//! same outcome. The handle moves through
//! `Unresolved -> Resolving -> Ready | Failed` and never leaves a terminal
//! state; retrying means building a new handle.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};
use tracing::{info, warn};

use super::downloader::{AssetFetcher, HttpFetcher};
use super::error::ResolveError;
use super::installer::ToolInstaller;
use super::locator::{DownloadPermission, ToolLocator};
use super::paths;
use super::runner::ProcessRunner;

/// Observable readiness of a `ToolHandle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Unresolved,
    Resolving,
    Ready(PathBuf),
    Failed(ResolveError),
}

impl ReadinessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }
}

/// Memoized handle to a resolved tool executable.
pub struct ToolHandle {
    locator: ToolLocator,
    outcome: OnceCell<Result<PathBuf, ResolveError>>,
    state: watch::Sender<ReadinessState>,
}

impl ToolHandle {
    pub fn new(locator: ToolLocator) -> Self {
        let (state, _) = watch::channel(ReadinessState::Unresolved);
        Self {
            locator,
            outcome: OnceCell::new(),
            state,
        }
    }

    /// Builds a handle with the default cache directory and HTTPS fetcher.
    ///
    /// # Errors
    ///
    /// Fails immediately if `explicit_path` is set but not executable.
    pub fn with_defaults(
        explicit_path: Option<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
        permission: Arc<dyn DownloadPermission>,
    ) -> Result<Self, ResolveError> {
        let fetcher: Arc<dyn AssetFetcher> = Arc::new(HttpFetcher::new());
        let installer = ToolInstaller::new(paths::get_cache_dir(), fetcher);
        let locator = ToolLocator::new(explicit_path, runner, installer, permission)?;
        Ok(Self::new(locator))
    }

    /// Waits for the tool to be resolved and returns its path.
    ///
    /// The first call drives resolution; concurrent and later calls share
    /// its result.
    pub async fn ready(&self) -> Result<PathBuf, ResolveError> {
        self.outcome
            .get_or_init(|| async {
                self.state.send_replace(ReadinessState::Resolving);
                let outcome = self.locator.resolve().await;
                match &outcome {
                    Ok(path) => {
                        info!("oneapi-cli ready at {}", path.display());
                        self.state.send_replace(ReadinessState::Ready(path.clone()));
                    }
                    Err(e) => {
                        warn!("oneapi-cli unavailable: {}", e);
                        self.state.send_replace(ReadinessState::Failed(e.clone()));
                    }
                }
                outcome
            })
            .await
            .clone()
    }

    /// Current state without waiting.
    pub fn state(&self) -> ReadinessState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), ReadinessState::Ready(_))
    }

    /// The resolved path, if resolution has already succeeded.
    pub fn executable_path(&self) -> Option<PathBuf> {
        match self.outcome.get() {
            Some(Ok(path)) => Some(path.clone()),
            _ => None,
        }
    }
}
