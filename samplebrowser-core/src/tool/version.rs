//! Version parsing and comparison for the tool's `version` output.
//!
//! The tool prints a loosely formatted semantic version. Parsing happens in
//! two steps: `clean_version` accepts a full semver token (prerelease and
//! build metadata included), and `coerce_version` reduces any text to its
//! first numeric `major.minor.patch` triple. Only the triple takes part in
//! the minimum-version comparison.

use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn triple_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").ok())
        .as_ref()
}

/// Cleans raw version text into a canonical semver string.
///
/// Surrounding whitespace and a leading `v` or `=` are dropped. Returns
/// `None` if what remains is not a valid semantic version.
pub fn clean_version(raw: &str) -> Option<String> {
    let first_line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let trimmed = first_line.trim_start_matches(['=', 'v', 'V']).trim();
    Version::parse(trimmed).ok().map(|v| v.to_string())
}

/// Coerces arbitrary text to the first `major[.minor[.patch]]` it contains.
///
/// Missing components default to zero; prerelease and build metadata are
/// discarded.
pub fn coerce_version(raw: &str) -> Option<Version> {
    let caps = triple_pattern()?.captures(raw)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Returns true if `raw` coerces to a triple at least `required`.
///
/// Text without any numeric triple never satisfies the requirement.
pub fn version_satisfies(raw: &str, required: &Version) -> bool {
    match coerce_version(raw) {
        Some(found) => {
            (found.major, found.minor, found.patch) >= (required.major, required.minor, required.patch)
        }
        None => false,
    }
}
