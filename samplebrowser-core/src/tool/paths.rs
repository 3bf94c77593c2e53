//! Per-user cache location for a downloaded tool binary.
//!
//! The tool is installed under the user's home directory:
//!
//! - Linux/macOS: `~/.oneapi-cli/oneapi-cli`
//! - Windows: `%USERPROFILE%\.oneapi-cli\oneapi-cli.exe`
//!
//! When no home directory can be determined the OS temp directory is used.

use std::path::{Path, PathBuf};

use super::types::{OsTag, CLI_BIN_NAME};

/// Directory name of the cache under the home directory.
const CACHE_DIR_NAME: &str = ".oneapi-cli";

/// Returns the per-user cache directory.
///
/// Path: `{home}/.oneapi-cli/`
pub fn get_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR_NAME)
}

/// Returns the path of the cached tool binary inside `cache_dir`.
pub fn cached_binary_path_in(cache_dir: &Path) -> PathBuf {
    let name = OsTag::detect()
        .map(|os| os.binary_name())
        .unwrap_or_else(|| CLI_BIN_NAME.to_string());
    cache_dir.join(name)
}

/// Returns the path of the cached tool binary.
///
/// Path: `{home}/.oneapi-cli/oneapi-cli[.exe]`
pub fn get_cached_binary_path() -> PathBuf {
    cached_binary_path_in(&get_cache_dir())
}

/// Returns true if `path` is a regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return false,
    };

    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
