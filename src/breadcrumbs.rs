//! Breadcrumb trail for a single page.

use crate::types::Page;
use crate::url::derive_url;
use tracing::info;

/// Label of the first breadcrumb.
pub const HOME: &str = "Home";

/// Build `["Home", ...directories, label]` for `page`.
///
/// The directories are the segments of the derived URL minus the file name.
/// A page with an empty derived URL gets `["Home", label]`.
pub fn build(page: &Page) -> Vec<String> {
    info!(path = %page.header.path, "rendering");

    let url = derive_url(page);
    let mut trail: Vec<String> = url.split('/').map(str::to_string).collect();
    trail.pop();
    trail.push(page.label().to_string());
    trail.insert(0, HOME.to_string());
    trail
}
