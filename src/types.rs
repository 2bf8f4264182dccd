//! Shared types passed between the reader, the builders, and the renderer.
//!
//! A [`Page`] is the record the content reader produces for one source file.
//! Its serialized form is also the shape templates see, so field names here
//! are part of the template contract (`header.path`, `title`, `output.url`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Where a page came from, relative to the pages directory.
///
/// `path` uses the host path separator; [`crate::url::derive_url`] normalizes
/// it. `basename` is the file name without its extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageHeader {
    /// Absolute pages directory the path is relative to.
    pub cwd: String,
    /// Source path relative to `cwd`, e.g. `team/about.md`.
    pub path: String,
    /// Directory part of `path` (empty at the root).
    pub dirname: String,
    /// File name without extension, e.g. `about`.
    pub basename: String,
    /// Extension including the dot, e.g. `.md`.
    pub extname: String,
}

/// Explicit output placement from front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOutput {
    /// Exact output path, used verbatim (`x/y.html`).
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,
    /// Output URL without extension (`.html` is appended).
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
}

/// One content unit, corresponding to one source file.
///
/// Front matter keys other than `title`, `url` and `output` are kept in
/// `extra` and flattened back into the record when serialized, so templates
/// can read `lang`, `layout`, or any custom key directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub header: PageHeader,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PageOutput>,
    /// Raw markdown body (front matter removed).
    #[serde(default)]
    pub body: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An optional string that also accepts numbers and booleans, so front
/// matter like `title: 2024` or `url: 404` reads as text.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "invalid type: {other}, expected a string"
        ))),
    }
}

impl Page {
    /// Display label: the title when set and non-empty, otherwise the basename.
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.header.basename,
        }
    }

    /// A human-readable identifier for error messages.
    pub fn id(&self) -> &str {
        if self.header.path.is_empty() {
            self.label()
        } else {
            &self.header.path
        }
    }

    /// A front matter string value from `extra`, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// One menu item, derived once per run from the page collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub text: String,
    pub url: String,
}

/// Version-control metadata exposed to templates as `git`.
///
/// Serializes as `{ "commit": { "hash": ... }, "dir": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitMetadata {
    pub commit: CommitInfo,
    /// Repository root directory.
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
}

impl GitMetadata {
    pub fn new(hash: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            commit: CommitInfo { hash: hash.into() },
            dir: dir.into(),
        }
    }

    /// First seven characters of the commit hash.
    pub fn short_hash(&self) -> &str {
        let hash = &self.commit.hash;
        hash.get(..7).unwrap_or(hash)
    }
}
