//! Shared test utilities for the page-weaver test suite.
//!
//! Provides a fixture site, a compact page builder, and lookup helpers that
//! panic with the available alternatives on a miss.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let pages = read_pages(&tmp.path().join("pages"), &["md".into()]).unwrap();
//!
//! let about = find_page(&pages, "team/about.md");
//! assert_eq!(about.title.as_deref(), Some("About"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::types::{NavigationEntry, Page, PageHeader};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Builders
// =========================================================================

/// A page read from `path` (forward slashes) with an optional title.
pub fn page(path: &str, title: Option<&str>) -> Page {
    let (dirname, file) = path.rsplit_once('/').unwrap_or(("", path));
    let (basename, ext) = file.rsplit_once('.').unwrap_or((file, ""));
    Page {
        header: PageHeader {
            cwd: String::new(),
            path: path.to_string(),
            dirname: dirname.to_string(),
            basename: basename.to_string(),
            extname: if ext.is_empty() {
                String::new()
            } else {
                format!(".{ext}")
            },
        },
        title: title.map(str::to_string),
        url: None,
        output: None,
        body: String::new(),
        extra: serde_json::Map::new(),
    }
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by source path. Panics if not found.
pub fn find_page<'a>(pages: &'a [Page], path: &str) -> &'a Page {
    pages
        .iter()
        .find(|p| p.header.path.replace('\\', "/") == path)
        .unwrap_or_else(|| {
            let paths = page_paths(pages);
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Source paths (forward slashes) in page order.
pub fn page_paths(pages: &[Page]) -> Vec<String> {
    pages
        .iter()
        .map(|p| p.header.path.replace('\\', "/"))
        .collect()
}

/// Navigation labels in order.
pub fn nav_texts(entries: &[NavigationEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.text.as_str()).collect()
}
