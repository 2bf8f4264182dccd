//! Content reader: turns a directory of markdown files into page records.
//!
//! ## Directory Structure
//!
//! ```text
//! pages/                       # Pages directory (config: content.pages_dir)
//! ├── index.md                 # → index.html
//! ├── docs/
//! │   ├── getting-started.md   # → docs/getting-started.html
//! │   └── reference.md
//! ├── team/
//! │   └── about.md             # → team/about.html
//! └── .drafts/                 # Hidden entries are skipped
//! ```
//!
//! ## Order
//!
//! Pages come out depth-first with entries sorted by file name at each
//! level. This order is the menu order the navigation preserves, so it is
//! stable across runs and platforms.
//!
//! ## Front Matter
//!
//! A page may start with a YAML block between `---` lines:
//!
//! ```markdown
//! ---
//! title: About
//! lang: fr
//! output:
//!   url: company/about
//! ---
//! # About us
//! ```
//!
//! `title`, `url` and `output` drive naming and placement; every other key is
//! kept on the page for templates. The reader fills in `header` and `body`.
//!
//! ## Page Manifests
//!
//! [`load_manifest`] reads page records produced by another tool as a JSON
//! array. Each record is checked by [`page_from_record`], which reports a
//! malformed record by its path, title, or position instead of failing later
//! on a missing field.

use crate::types::{Page, PageHeader};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Pages directory not found: {0}")]
    MissingPagesDir(PathBuf),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Front matter in {0} must be a mapping")]
    FrontMatterNotMapping(PathBuf),
    #[error("Page manifest {path} is not valid JSON: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Page manifest {0} must be a JSON array of page records")]
    ManifestNotArray(PathBuf),
    #[error("Malformed page record {id}: {reason}")]
    MalformedPage { id: String, reason: String },
}

/// Read every page under `pages_dir` whose extension is in `extensions`.
pub fn read_pages(pages_dir: &Path, extensions: &[String]) -> Result<Vec<Page>, ReaderError> {
    if !pages_dir.is_dir() {
        return Err(ReaderError::MissingPagesDir(pages_dir.to_path_buf()));
    }

    let walker = WalkDir::new(pages_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    let mut pages = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(pages_dir) else {
            continue;
        };
        let header = page_header(pages_dir, rel);
        let content = fs::read_to_string(entry.path())?;
        let index = pages.len();
        pages.push(parse_page(entry.path(), header, &content, index)?);
    }
    Ok(pages)
}

/// Read a JSON array of page records.
pub fn load_manifest(path: &Path) -> Result<Vec<Page>, ReaderError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ReaderError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(records) = value else {
        return Err(ReaderError::ManifestNotArray(path.to_path_buf()));
    };
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| page_from_record(record, index))
        .collect()
}

/// Validate a loose page record and convert it to a [`Page`].
///
/// `index` is the record's position, used to name it when it has neither
/// a `header.path` nor a `title`.
pub fn page_from_record(record: Value, index: usize) -> Result<Page, ReaderError> {
    let id = record_id(&record, index);
    if !record.get("header").is_some_and(Value::is_object) {
        return Err(ReaderError::MalformedPage {
            id,
            reason: "missing `header`".to_string(),
        });
    }
    serde_json::from_value(record).map_err(|e| ReaderError::MalformedPage {
        id,
        reason: e.to_string(),
    })
}

fn record_id(record: &Value, index: usize) -> String {
    record
        .pointer("/header/path")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| record.get("title").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

fn page_header(pages_dir: &Path, rel: &Path) -> PageHeader {
    PageHeader {
        cwd: pages_dir.to_string_lossy().to_string(),
        path: rel.to_string_lossy().to_string(),
        dirname: rel
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        basename: rel
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        extname: rel
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
    }
}

fn parse_page(
    source: &Path,
    header: PageHeader,
    content: &str,
    index: usize,
) -> Result<Page, ReaderError> {
    let (front_matter, body) = split_front_matter(content);

    let mut record = match front_matter {
        Some(yaml) => parse_front_matter(yaml, source)?,
        None => Map::new(),
    };
    record.insert("header".to_string(), serde_json::to_value(header).unwrap_or_default());
    record.insert("body".to_string(), Value::String(body.to_string()));

    page_from_record(Value::Object(record), index)
}

fn parse_front_matter(yaml: &str, source: &Path) -> Result<Map<String, Value>, ReaderError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_yaml::from_str(yaml).map_err(|e| ReaderError::FrontMatter {
        path: source.to_path_buf(),
        source: e,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ReaderError::FrontMatterNotMapping(source.to_path_buf())),
    }
}

/// Split `---`-delimited YAML front matter from the body.
///
/// Returns `(None, content)` when the content does not open with a `---`
/// line or the block is never closed. The closing line may be `---` or `...`.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let rest = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(after_open) = rest.strip_prefix("---") else {
        return (None, content);
    };
    let Some(block) = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return (Some(&block[..offset]), &block[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}
