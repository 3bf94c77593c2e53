//! Async asset downloader with progress reporting and integrity checks.
//!
//! Downloads are streamed into memory with reqwest; nothing touches the disk
//! until the caller has verified the SHA-384 digest of the bytes against the
//! published checksum.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use sha2::{Digest, Sha384};
use tracing::{debug, info};
use url::Url;

// ============================================================================
// URL Security Validation
// ============================================================================

/// Allowed domains for downloading the tool.
const ALLOWED_DOMAINS: &[&str] = &["github.com", "githubusercontent.com"];

/// Largest body accepted from a single download.
pub const MAX_DOWNLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Upper bound on memory reserved up front from `Content-Length`.
const MAX_PREALLOC_BYTES: u64 = 64 * 1024 * 1024;

/// Validates that a URL is safe for downloading.
///
/// Checks:
/// - URL scheme must be HTTPS
/// - Host must be in the allowed domain list
fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL: {}", url_str))?;

    if url.scheme() != "https" {
        anyhow::bail!("URL must use HTTPS: {}", url_str);
    }

    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("URL must have a host: {}", url_str))?;

    // Subdomains of an allowed domain are accepted
    let is_allowed = ALLOWED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    if !is_allowed {
        anyhow::bail!(
            "Download domain not allowed: {}. Allowed: {:?}",
            host,
            ALLOWED_DOMAINS
        );
    }

    Ok(())
}

// ============================================================================
// Download Progress
// ============================================================================

/// Progress information during a download.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    /// Bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Total bytes expected (if known from Content-Length header).
    pub total_bytes: Option<u64>,
    /// Progress percentage (0.0 to 100.0), or None if total is unknown.
    pub percent: Option<f32>,
}

impl DownloadProgress {
    fn new(bytes_downloaded: u64, total_bytes: Option<u64>) -> Self {
        let percent = total_bytes.map(|total| {
            if total > 0 {
                (bytes_downloaded as f32 / total as f32) * 100.0
            } else {
                0.0
            }
        });

        Self {
            bytes_downloaded,
            total_bytes,
            percent,
        }
    }
}

// ============================================================================
// Checksums
// ============================================================================

/// Formats a digest as lowercase hex.
fn format_hex(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Returns the SHA-384 digest of `bytes` as lowercase hex.
pub fn sha384_hex(bytes: &[u8]) -> String {
    format_hex(&Sha384::digest(bytes))
}

/// Extracts the expected digest from a checksum file.
///
/// Only the first line counts. A `sha384sum` style trailing file name is
/// ignored.
pub fn parse_checksum_file(content: &str) -> Option<String> {
    let first_line = content.lines().next()?.trim();
    let digest = first_line.split_whitespace().next()?;
    if digest.is_empty() {
        None
    } else {
        Some(digest.to_lowercase())
    }
}

/// Verifies `bytes` against the digest published in `checksum_file`.
pub fn verify_checksum(bytes: &[u8], checksum_file: &str) -> Result<()> {
    let expected = parse_checksum_file(checksum_file)
        .ok_or_else(|| anyhow::anyhow!("Checksum file is empty"))?;
    let actual = sha384_hex(bytes);

    if actual != expected {
        anyhow::bail!(
            "SHA384 checksum mismatch!\nExpected: {}\nActual: {}",
            expected,
            actual
        );
    }

    debug!("SHA384 verified: {}", actual);
    Ok(())
}

// ============================================================================
// Download Function
// ============================================================================

/// Downloads a URL into memory with streaming and progress reporting.
///
/// # Errors
///
/// Returns an error if:
/// - The URL is not HTTPS or from an allowed domain.
/// - The network request fails.
/// - The server returns a non-success status code.
/// - The body is larger than `MAX_DOWNLOAD_BYTES`.
pub async fn download_bytes<F>(client: &reqwest::Client, url: &str, progress_cb: F) -> Result<Vec<u8>>
where
    F: Fn(DownloadProgress),
{
    info!("Downloading {}", url);

    validate_url(url)?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to start download from {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!(
            "Download failed with status {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        );
    }

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);
    if let Some(total) = total_bytes.filter(|&t| t > MAX_DOWNLOAD_BYTES) {
        anyhow::bail!(
            "Download of {} bytes exceeds the {} byte limit: {}",
            total,
            MAX_DOWNLOAD_BYTES,
            url
        );
    }

    let mut stream = response.bytes_stream();
    let mut body = Vec::with_capacity(initial_capacity(total_bytes));

    progress_cb(DownloadProgress::new(0, total_bytes));

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.with_context(|| "Failed to read chunk from response stream")?;
        append_chunk(&mut body, &chunk, MAX_DOWNLOAD_BYTES)?;
        progress_cb(DownloadProgress::new(body.len() as u64, total_bytes));
    }

    info!("Download complete: {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Bytes to reserve for a body announced as `total_bytes`.
fn initial_capacity(total_bytes: Option<u64>) -> usize {
    let reserved = total_bytes.unwrap_or(0).min(MAX_PREALLOC_BYTES);
    usize::try_from(reserved).unwrap_or(0)
}

/// Appends `chunk` unless the body would grow past `limit`.
fn append_chunk(body: &mut Vec<u8>, chunk: &[u8], limit: u64) -> Result<()> {
    let new_len = body.len() as u64 + chunk.len() as u64;
    if new_len > limit {
        anyhow::bail!("Download exceeds the {} byte limit", limit);
    }
    body.extend_from_slice(chunk);
    Ok(())
}

// ============================================================================
// Asset Fetcher
// ============================================================================

/// Source of release assets.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetches the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// `AssetFetcher` that downloads over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        download_bytes(&self.client, url, |progress| {
            if let Some(percent) = progress.percent {
                debug!("oneapi-cli download progress: {:.1}%", percent);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress_calculation() {
        let progress = DownloadProgress::new(50, Some(100));
        assert_eq!(progress.bytes_downloaded, 50);
        assert_eq!(progress.total_bytes, Some(100));
        assert_eq!(progress.percent, Some(50.0));

        let progress_no_total = DownloadProgress::new(50, None);
        assert_eq!(progress_no_total.percent, None);

        let progress_zero_total = DownloadProgress::new(0, Some(0));
        assert_eq!(progress_zero_total.percent, Some(0.0));
    }

    #[test]
    fn test_initial_capacity_is_bounded() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(1024)), 1024);
        assert_eq!(
            initial_capacity(Some(u64::MAX)),
            MAX_PREALLOC_BYTES as usize
        );
    }

    #[test]
    fn test_append_chunk_enforces_limit() {
        let mut body = Vec::new();
        append_chunk(&mut body, b"abcd", 6).unwrap();
        append_chunk(&mut body, b"ef", 6).unwrap();
        assert_eq!(body, b"abcdef");

        let err = append_chunk(&mut body, b"g", 6).unwrap_err();
        assert!(err.to_string().contains("limit"));
        assert_eq!(body.len(), 6);
    }

    #[test]
    fn test_validate_url_https_required() {
        assert!(validate_url("http://github.com/file").is_err());
        assert!(validate_url("https://github.com/file").is_ok());
    }

    #[test]
    fn test_validate_url_allowed_domains() {
        assert!(validate_url(
            "https://github.com/intel/oneapi-cli/releases/download/v0.1.1/oneapi-cli-linux"
        )
        .is_ok());
        assert!(validate_url("https://objects.githubusercontent.com/x").is_ok());

        assert!(validate_url("https://evil.com/oneapi-cli").is_err());
        assert!(validate_url("https://github.com.evil.org/oneapi-cli").is_err());
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_sha384_hex_empty_input() {
        assert_eq!(
            sha384_hex(b""),
            "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b"
        );
    }

    #[test]
    fn test_parse_checksum_file() {
        assert_eq!(parse_checksum_file("ABCDEF\n"), Some("abcdef".to_string()));
        assert_eq!(
            parse_checksum_file("abc123  oneapi-cli-linux\nsecond line"),
            Some("abc123".to_string())
        );
        assert_eq!(parse_checksum_file(""), None);
        assert_eq!(parse_checksum_file("\nabc"), None);
    }

    #[test]
    fn test_verify_checksum() {
        let bytes = b"binary contents";
        let good = format!("{}\n", sha384_hex(bytes));
        assert!(verify_checksum(bytes, &good).is_ok());

        let bad = format!("{}\n", sha384_hex(b"something else"));
        let err = verify_checksum(bytes, &bad).unwrap_err();
        assert!(err.to_string().contains("mismatch"));

        assert!(verify_checksum(bytes, "").is_err());
    }
}
