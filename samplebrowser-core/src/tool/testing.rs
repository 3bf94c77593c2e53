//! In-memory stand-ins for the process, network and prompt seams.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::downloader::{sha384_hex, AssetFetcher};
use super::error::GatewayError;
use super::locator::DownloadPermission;
use super::runner::{ProcessOutput, ProcessRunner};
use super::types::{OsTag, ReleaseAsset};

pub(crate) const TEST_RELEASE_BASE: &str = "https://github.com/intel/oneapi-cli/releases/download/test";

/// Output of a successful `version` call.
pub(crate) fn version_output(version: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(0),
        stdout: format!("{}\n", version),
        stderr: String::new(),
    }
}

// ============================================================================
// Process Runner
// ============================================================================

/// Answers per program path and records every invocation.
///
/// Responses registered for an argument prefix win over the program-wide
/// response; the longest matching prefix is used.
#[derive(Default)]
pub(crate) struct FakeRunner {
    responses: Mutex<HashMap<PathBuf, ProcessOutput>>,
    scripted: Mutex<Vec<(PathBuf, Vec<String>, ProcessOutput)>>,
    created_files: Vec<String>,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, program: impl Into<PathBuf>, output: ProcessOutput) -> Self {
        self.set_response(program, output);
        self
    }

    pub fn set_response(&self, program: impl Into<PathBuf>, output: ProcessOutput) {
        self.responses.lock().unwrap().insert(program.into(), output);
    }

    /// Answers calls of `program` whose arguments start with `prefix`.
    pub fn respond_to(self, program: impl Into<PathBuf>, prefix: &[&str], output: ProcessOutput) -> Self {
        self.scripted.lock().unwrap().push((
            program.into(),
            prefix.iter().map(|a| a.to_string()).collect(),
            output,
        ));
        self
    }

    /// Writes `files` (relative paths) under the destination of every
    /// `create` call, the way the real tool lays out a sample.
    pub fn writing_on_create(mut self, files: &[&str]) -> Self {
        self.created_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Calls whose first argument is `subcommand`.
    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, args)| args.first().map(String::as_str) == Some(subcommand))
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));

        if args.first().map(String::as_str) == Some("create") {
            if let Some(dest) = args.last() {
                for file in &self.created_files {
                    let path = Path::new(dest).join(file);
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent).unwrap();
                    }
                    std::fs::write(&path, file).unwrap();
                }
            }
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, prefix, _)| p == program && args.starts_with(prefix))
            .max_by_key(|(_, prefix, _)| prefix.len())
            .map(|(_, _, output)| output.clone());
        if let Some(output) = scripted {
            return Ok(output);
        }

        self.responses
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .ok_or_else(|| GatewayError::Spawn {
                program: program.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

// ============================================================================
// Asset Fetcher
// ============================================================================

/// Serves canned bodies by URL and counts requests.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    pub bodies: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    /// A fetcher serving a valid release for `os` under `base`.
    pub fn serving(base: &str, os: OsTag, binary: &[u8]) -> Self {
        let asset = ReleaseAsset::for_os(base, os);
        let mut bodies = HashMap::new();
        bodies.insert(asset.binary_url, binary.to_vec());
        bodies.insert(
            asset.checksum_url,
            format!("{}\n", sha384_hex(binary)).into_bytes(),
        );
        Self {
            bodies,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Download failed with status 404: {}", url))
    }
}

// ============================================================================
// Download Permission
// ============================================================================

/// Gives a fixed answer and counts how often it was asked.
pub(crate) struct FakePermission {
    answer: bool,
    calls: AtomicUsize,
}

impl FakePermission {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DownloadPermission for FakePermission {
    async fn allow_download(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
