//! Output cache for incremental builds.
//!
//! Rendering is cheap, but rewriting every file on every build touches
//! modification times, which makes rsync and CI artifact uploads re-send
//! the whole site. This module lets the build skip the write when a page
//! renders to exactly the bytes already on disk.
//!
//! ## Cache keys
//!
//! Entries are keyed by the page's derived URL (its path inside the output
//! directory) and store the SHA-256 of the rendered HTML. Content-based
//! rather than mtime-based, so it survives `git checkout`.
//!
//! A page is unchanged when:
//! 1. The manifest records the same hash for its URL
//! 2. The previously-written file still exists on disk
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.build-manifest.json`. It
//! lives alongside the output so it travels with the directory when cached
//! in CI.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build` to write every page. This starts from an
//! empty manifest; the new manifest is still saved at the end.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".build-manifest.json";

/// Version of the manifest format. Bump to invalidate existing manifests.
const MANIFEST_VERSION: u32 = 1;

/// On-disk record of what each output URL was last written with.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BuildManifest {
    pub version: u32,
    /// Derived URL → SHA-256 hex of the rendered bytes.
    pub entries: BTreeMap<String, String>,
}

impl BuildManifest {
    /// An empty manifest (first build or `--no-cache`).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the output directory. Missing, corrupt, or wrong-version
    /// manifests load as empty.
    pub fn load(output_dir: &Path) -> Self {
        let path = manifest_path(output_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::empty();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(manifest) if manifest.version == MANIFEST_VERSION => manifest,
            Ok(manifest) => {
                debug!(found = manifest.version, "build manifest version mismatch");
                Self::empty()
            }
            Err(e) => {
                debug!(error = %e, "unreadable build manifest");
                Self::empty()
            }
        }
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Whether `url` was last written with `hash` and is still on disk.
    pub fn is_fresh(&self, url: &str, hash: &str, output_dir: &Path) -> bool {
        self.entries.get(url).is_some_and(|stored| stored == hash)
            && output_dir.join(url).is_file()
    }

    pub fn record(&mut self, url: impl Into<String>, hash: impl Into<String>) {
        self.entries.insert(url.into(), hash.into());
    }
}

/// SHA-256 of a byte slice as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write counts for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub written: u32,
    pub unchanged: u32,
}

impl WriteStats {
    pub fn wrote(&mut self) {
        self.written += 1;
    }

    pub fn skipped(&mut self) {
        self.unchanged += 1;
    }

    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "{} written, {} unchanged ({} total)",
                self.written,
                self.unchanged,
                self.total()
            )
        } else {
            write!(f, "{} written", self.written)
        }
    }
}

/// Path of the manifest for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // BuildManifest
    // =========================================================================

    #[test]
    fn empty_manifest_has_no_entries() {
        let manifest = BuildManifest::empty();
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert!(manifest.entries.is_empty());
    }

    #[test]
    fn fresh_when_hash_matches_and_file_exists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "<p>hi</p>").unwrap();

        let mut manifest = BuildManifest::empty();
        manifest.record("index.html", "abc");
        assert!(manifest.is_fresh("index.html", "abc", tmp.path()));
    }

    #[test]
    fn stale_when_hash_differs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "<p>hi</p>").unwrap();

        let mut manifest = BuildManifest::empty();
        manifest.record("index.html", "abc");
        assert!(!manifest.is_fresh("index.html", "def", tmp.path()));
    }

    #[test]
    fn stale_when_file_deleted() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::empty();
        manifest.record("docs/a.html", "abc");
        assert!(!manifest.is_fresh("docs/a.html", "abc", tmp.path()));
    }

    #[test]
    fn stale_when_no_entry() {
        let tmp = TempDir::new().unwrap();
        assert!(!BuildManifest::empty().is_fresh("x.html", "abc", tmp.path()));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::empty();
        manifest.record("index.html", "abc");
        manifest.record("team/about.html", "def");
        manifest.save(tmp.path()).unwrap();

        assert_eq!(BuildManifest::load(tmp.path()), manifest);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(BuildManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(manifest_path(tmp.path()), "not json {{{").unwrap();
        assert!(BuildManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            manifest_path(tmp.path()),
            r#"{"version": 99, "entries": {"index.html": "abc"}}"#,
        )
        .unwrap();
        assert!(BuildManifest::load(tmp.path()).entries.is_empty());
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    #[test]
    fn hash_bytes_known_value() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_bytes_changes_with_content() {
        assert_ne!(hash_bytes(b"<p>a</p>"), hash_bytes(b"<p>b</p>"));
    }

    // =========================================================================
    // WriteStats
    // =========================================================================

    #[test]
    fn stats_display_with_unchanged() {
        let stats = WriteStats {
            written: 2,
            unchanged: 3,
        };
        assert_eq!(stats.to_string(), "2 written, 3 unchanged (5 total)");
    }

    #[test]
    fn stats_display_all_written() {
        let mut stats = WriteStats::default();
        for _ in 0..5 {
            stats.wrote();
        }
        assert_eq!(stats.to_string(), "5 written");
    }

    #[test]
    fn stats_counters() {
        let mut stats = WriteStats::default();
        stats.wrote();
        stats.skipped();
        stats.skipped();
        assert_eq!(stats.total(), 3);
    }
}
