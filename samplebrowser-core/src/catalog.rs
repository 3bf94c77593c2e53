//! Catalog entries as listed by the tool.
//!
//! `oneapi-cli list -j` prints a JSON array of containers, each holding the
//! sample's relative path and its metadata. `CatalogEntry` is the flattened
//! form used everywhere else, tagged with the language it was listed for.
//! Category paths are kept as listed; `normalize_categories` is applied
//! once, when the entry is placed in the tree.

use serde::{Deserialize, Serialize};

/// Category given to entries that list none.
pub const OTHER_CATEGORY: &str = "Other";

/// Leading category segment that is dropped as a redundant grouping.
pub const TOOLKIT_SEGMENT: &str = "Toolkit";

/// Separator between segments of a category path.
pub const CATEGORY_SEPARATOR: char = '/';

/// One element of the tool's listing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleContainer {
    pub path: String,
    pub example: SampleRecord,
}

/// Metadata block of a listed sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub sample_readme_uri: String,
}

/// A sample from the catalog, tagged with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique key of the sample within the catalog.
    pub relative_path: String,
    pub language: String,
    pub name: String,
    pub description: String,
    /// Category paths as listed by the tool.
    pub categories: Vec<String>,
    pub dependencies: Vec<String>,
    pub documentation_uri: String,
}

impl CatalogEntry {
    /// Converts a listed container into an entry for `language`.
    pub fn from_container(container: SampleContainer, language: &str) -> Self {
        let SampleContainer { path, example } = container;
        Self {
            relative_path: path,
            language: language.to_string(),
            name: example.name,
            description: example.description,
            categories: example.categories,
            dependencies: example.dependencies,
            documentation_uri: example.sample_readme_uri,
        }
    }
}

/// Splits a category path into non-empty, trimmed segments.
pub fn split_category(category: &str) -> Vec<&str> {
    category
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Normalizes a single category path.
///
/// Drops a leading `Toolkit` segment. Returns `None` when nothing is left.
pub fn normalize_category(category: &str) -> Option<String> {
    let mut segments = split_category(category);
    if segments.first() == Some(&TOOLKIT_SEGMENT) {
        segments.remove(0);
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Normalizes all category paths of an entry.
///
/// The result is never empty: an entry without usable categories is filed
/// under `Other`.
pub fn normalize_categories(categories: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories.iter().filter_map(|c| normalize_category(c)) {
        if !normalized.contains(&category) {
            normalized.push(category);
        }
    }
    if normalized.is_empty() {
        normalized.push(OTHER_CATEGORY.to_string());
    }
    normalized
}

/// Parses the tool's JSON listing into entries for `language`.
pub fn parse_listing(json: &str, language: &str) -> serde_json::Result<Vec<CatalogEntry>> {
    let containers: Vec<SampleContainer> = serde_json::from_str(json)?;
    Ok(containers
        .into_iter()
        .map(|c| CatalogEntry::from_container(c, language))
        .collect())
}
