//! Sample Browser Core Library
//!
//! This crate provides the core functionality for browsing oneAPI code
//! samples. It includes:
//!
//! - Discovery, version checking and installation of `oneapi-cli`
//! - Memoized tool readiness shared by every caller
//! - Catalog listing, dependency checks and sample creation via the tool
//! - Category tree construction for display
//! - Configuration management (settings file)
//! - The browser service used by front ends

pub mod browser;
pub mod catalog;
pub mod config;
pub mod tool;
pub mod tree;

// Re-exports for convenience
pub use config::{default_settings_path, Settings};

// Re-export browser
pub use browser::{
    linkify, BrowserError, BrowserView, CreateOutcome, Interaction, QuickPickItem, SampleBrowser,
    UNAVAILABLE_MESSAGE,
};

// Re-export catalog and tree
pub use catalog::CatalogEntry;
pub use tree::{render_tree, CategoryTree, NodeId, NodeKind, TreeNode};

// Re-export tool
pub use tool::{
    CatalogQuery, DownloadPermission, GatewayError, ProcessRunner, ReadinessState, ResolveError,
    SystemRunner, ToolGateway, ToolHandle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
