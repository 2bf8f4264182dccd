//! Site navigation built from the full page collection.
//!
//! The navigation is a flat list, one entry per page, in the order the
//! content reader produced the pages. That order is the menu order: entries
//! are never re-sorted by title or URL.

use crate::types::{NavigationEntry, Page};
use crate::url::derive_url;

/// Build the navigation list for a run.
pub fn build(pages: &[Page]) -> Vec<NavigationEntry> {
    pages
        .iter()
        .map(|page| NavigationEntry {
            text: page.label().to_string(),
            url: derive_url(page),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(path: &str, basename: &str, title: Option<&str>) -> Page {
        let mut record = json!({ "header": { "path": path, "basename": basename } });
        if let Some(title) = title {
            record["title"] = json!(title);
        }
        serde_json::from_value(record).unwrap()
    }

    #[test]
    fn entries_use_title_and_derived_url() {
        let nav = build(&[page("team/about.md", "about", Some("About"))]);
        assert_eq!(
            nav,
            vec![NavigationEntry {
                text: "About".into(),
                url: "team/about.html".into()
            }]
        );
    }

    #[test]
    fn untitled_page_uses_basename() {
        let nav = build(&[page("notes.md", "notes", None)]);
        assert_eq!(nav[0].text, "notes");
    }

    #[test]
    fn reader_order_is_preserved() {
        let pages = vec![
            page("zeta.md", "zeta", Some("Zeta")),
            page("alpha.md", "alpha", Some("Alpha")),
            page("mid/beta.md", "beta", Some("Beta")),
        ];
        let texts: Vec<String> = build(&pages).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn empty_collection() {
        assert!(build(&[]).is_empty());
    }
}
