//! Core types for locating and installing the sample CLI.
//!
//! This module defines the fixed identity of the tool (binary name, minimum
//! version, release location), host OS detection, and the release assets
//! published for each supported OS.

use std::fmt;

// ============================================================================
// Tool Identity
// ============================================================================

/// Bare command name of the tool, resolved through the process search path.
pub const CLI_BIN_NAME: &str = "oneapi-cli";

/// Oldest tool version that speaks the interface used by the gateway.
pub const REQUIRED_CLI_VERSION: &str = "0.1.1";

/// Base URL of the versioned release holding the platform binaries.
pub const RELEASE_BASE_URL: &str = "https://github.com/intel/oneapi-cli/releases/download/v0.1.1";

/// Suffix of the companion asset holding the SHA-384 digest of a binary.
pub const CHECKSUM_SUFFIX: &str = ".sha384";

// ============================================================================
// OS Detection
// ============================================================================

/// Operating systems with a published tool binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsTag {
    Linux,
    Windows,
    Macos,
}

impl OsTag {
    /// Detects the host OS at runtime.
    ///
    /// Returns `None` when no release asset exists for this OS.
    pub fn detect() -> Option<Self> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` style name to a tag.
    pub fn from_os_name(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            "macos" => Some(Self::Macos),
            _ => None,
        }
    }

    /// Tag used in release asset names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "macos",
        }
    }

    /// File suffix of executables on this OS.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux | Self::Macos => "",
        }
    }

    /// Name of the tool binary once installed on this OS.
    pub fn binary_name(&self) -> String {
        format!("{}{}", CLI_BIN_NAME, self.exe_suffix())
    }
}

impl fmt::Display for OsTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Release Assets
// ============================================================================

/// Download locations for one OS: the binary and its checksum file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// URL of the raw executable.
    pub binary_url: String,
    /// URL of the checksum file; its first line is the lowercase hex digest.
    pub checksum_url: String,
}

impl ReleaseAsset {
    /// Builds the asset URLs for `os` under `release_base`.
    ///
    /// Layout: `<base>/oneapi-cli-<os>[.exe]` and the same URL + `.sha384`.
    pub fn for_os(release_base: &str, os: OsTag) -> Self {
        let base = release_base.trim_end_matches('/');
        let binary_url = format!("{}/{}-{}{}", base, CLI_BIN_NAME, os.as_str(), os.exe_suffix());
        let checksum_url = format!("{}{}", binary_url, CHECKSUM_SUFFIX);
        Self {
            binary_url,
            checksum_url,
        }
    }
}
