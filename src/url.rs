//! Output URL derivation and relative link computation.
//!
//! Every function here is pure string manipulation: no filesystem access, no
//! host path semantics. URLs are always relative to the site root and use `/`
//! as the separator, whatever the host OS uses in `header.path`.
//!
//! ## Derivation precedence
//!
//! [`derive_url`] tries the strategies in [`PRECEDENCE`] in order and takes
//! the first one whose precondition holds:
//!
//! | Strategy | Precondition | Result |
//! |----------|--------------|--------|
//! | [`UrlStrategy::OutputPath`] | `output.path` non-empty | the path as-is |
//! | [`UrlStrategy::ExplicitUrl`] | `output.url` or `url` non-empty | that url + `.html` |
//! | [`UrlStrategy::SourcePath`] | `header.path` non-empty | path without extension + `.html` |
//!
//! When none applies the derived URL is the empty string.

use crate::types::Page;

/// One way of deriving a page's output URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStrategy {
    /// Explicit `output.path`, used verbatim.
    OutputPath,
    /// `output.url`, else the top-level `url`, with `.html` appended.
    ExplicitUrl,
    /// The source path with its extension replaced by `.html`.
    SourcePath,
}

/// Strategies in the order [`derive_url`] tries them.
pub const PRECEDENCE: [UrlStrategy; 3] = [
    UrlStrategy::OutputPath,
    UrlStrategy::ExplicitUrl,
    UrlStrategy::SourcePath,
];

impl UrlStrategy {
    /// The URL this strategy yields for `page`, or `None` if its
    /// precondition does not hold.
    pub fn apply(self, page: &Page) -> Option<String> {
        match self {
            UrlStrategy::OutputPath => page
                .output
                .as_ref()
                .and_then(|o| non_empty(o.path.as_deref()))
                .map(normalize_separators),
            UrlStrategy::ExplicitUrl => page
                .output
                .as_ref()
                .and_then(|o| non_empty(o.url.as_deref()))
                .or_else(|| non_empty(page.url.as_deref()))
                .map(|url| format!("{}.html", normalize_separators(url))),
            UrlStrategy::SourcePath => non_empty(Some(page.header.path.as_str()))
                .map(|path| format!("{}.html", strip_extension(&normalize_separators(path)))),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Canonical output URL of a page. Never fails; returns `""` when the page
/// carries no usable path or url.
pub fn derive_url(page: &Page) -> String {
    PRECEDENCE
        .iter()
        .find_map(|strategy| strategy.apply(page))
        .unwrap_or_default()
}

/// Replace backslashes with forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Remove the final extension of the last path segment.
///
/// - `"a/b/c.html"` → `"a/b/c"`
/// - `"a.d/c"` → `"a.d/c"` (dots in directories are not extensions)
/// - `".htaccess"` → `".htaccess"` (a leading dot is not an extension)
pub fn strip_extension(url: &str) -> String {
    let name_start = url.rfind('/').map(|i| i + 1).unwrap_or(0);
    match url[name_start..].rfind('.') {
        Some(dot) if dot > 0 => url[..name_start + dot].to_string(),
        _ => url.to_string(),
    }
}

/// Relative link from the page at `from_url` to `to_url`.
///
/// Both arguments are site-root relative (a leading `/` is ignored). The
/// result walks up out of `from_url`'s directory and down into `to_url`'s,
/// then names the target file. `.` and `..` segments are resolved.
///
/// ```
/// use page_weaver::url::relative_url;
/// assert_eq!(relative_url("a/b/index.html", "a/c/page.html"), "../c/page.html");
/// assert_eq!(relative_url("index.html", "css/site.css"), "css/site.css");
/// ```
pub fn relative_url(from_url: &str, to_url: &str) -> String {
    let from = normalize_separators(from_url);
    let to = normalize_separators(to_url);

    let (from_parent, _) = split_file(&from);
    let (to_parent, file) = split_file(&to);
    let from_dir = segments(from_parent);
    let to_dir = segments(to_parent);

    let mut parts = climb(&from_dir, &to_dir);
    if !file.is_empty() {
        parts.push(file);
    }
    join_or_dot(&parts)
}

/// Relative path from the directory of `from_url` up to the site root.
///
/// `"a/b/c.html"` → `"../.."`; a page at the root yields `"."`.
pub fn base_url(from_url: &str) -> String {
    let from = normalize_separators(from_url);
    let (parent, _) = split_file(&from);
    join_or_dot(&climb(&segments(parent), &[]))
}

/// Split into (directory, file name) at the last `/`.
fn split_file(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

/// Directory segments with empty and `.` segments dropped and `..` resolved.
fn segments(dir: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for seg in dir.split('/') {
        match seg {
            "" | "." => {}
            ".." if out.last().is_some_and(|last| *last != "..") => {
                out.pop();
            }
            _ => out.push(seg),
        }
    }
    out
}

/// `..` for every `from` segment past the common prefix, then the rest of `to`.
fn climb<'a>(from: &[&'a str], to: &[&'a str]) -> Vec<&'a str> {
    let common = from.iter().zip(to).take_while(|(a, b)| a == b).count();
    let mut parts = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);
    parts
}

fn join_or_dot(parts: &[&str]) -> String {
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
