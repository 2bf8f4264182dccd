//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each page leads with
//! its positional index and label; its source file and output URL follow as
//! secondary context. The same page looks the same in `check`, `nav` and
//! `build` output.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Pages
//! 001 Getting Started → docs/getting-started.html
//!     Source: docs/getting-started.md
//!     Layout: doc.html
//! 002 About → team/about.html
//!     Source: team/about.md
//!
//! Globals
//!     lang, site_name
//!     git: 3f78685
//! ```
//!
//! ## Nav
//!
//! ```text
//! 001 Getting Started → docs/getting-started.html
//! 002 About → team/about.html
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Getting Started → docs/getting-started.html
//! 002 About → team/about.html (unchanged)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::context::SiteContext;
use crate::site::{BuildReport, WriteStatus};
use crate::types::{NavigationEntry, Page};
use crate::url::derive_url;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index + label + output URL.
///
/// ```text
/// 001 About → team/about.html
/// 002 Orphan → (no url)
/// ```
fn entry_line(index: usize, label: &str, url: &str) -> String {
    if url.is_empty() {
        format!("{} {} → (no url)", format_index(index), label)
    } else {
        format!("{} {} → {}", format_index(index), label, url)
    }
}

// ============================================================================
// check
// ============================================================================

/// Page inventory: one entry per page with source and layout context lines.
pub fn format_pages(pages: &[Page]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    if pages.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, page) in pages.iter().enumerate() {
        lines.push(entry_line(i + 1, page.label(), &derive_url(page)));
        if !page.header.path.is_empty() {
            lines.push(format!(
                "{}Source: {}",
                indent(1),
                page.header.path.replace('\\', "/")
            ));
        }
        if let Some(layout) = page.extra_str("layout") {
            lines.push(format!("{}Layout: {}", indent(1), layout));
        }
    }
    lines
}

/// Global keys available to templates, plus git metadata.
pub fn format_context(context: &SiteContext) -> Vec<String> {
    let globals = context.globals();
    let mut keys: Vec<&str> = globals
        .keys()
        .map(String::as_str)
        .filter(|k| !matches!(*k, "navigation" | "git"))
        .collect();
    keys.sort_unstable();

    let mut lines = vec!["Globals".to_string()];
    if keys.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    } else {
        lines.push(format!("{}{}", indent(1), keys.join(", ")));
    }
    match context.git() {
        Some(git) => lines.push(format!("{}git: {}", indent(1), git.short_hash())),
        None => lines.push(format!("{}git: none", indent(1))),
    }
    lines
}

/// Print `check` output to stdout.
pub fn print_check_output(pages: &[Page], context: &SiteContext) {
    for line in format_pages(pages) {
        println!("{}", line);
    }
    println!();
    for line in format_context(context) {
        println!("{}", line);
    }
}

// ============================================================================
// nav
// ============================================================================

pub fn format_navigation(entries: &[NavigationEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry_line(i + 1, &entry.text, &entry.url))
        .collect()
}

/// Print the navigation list to stdout.
pub fn print_navigation(entries: &[NavigationEntry]) {
    for line in format_navigation(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// One line per rendered page; unchanged pages are marked.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    report
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let line = entry_line(i + 1, &page.label, &page.url);
            match page.status {
                WriteStatus::Written => line,
                WriteStatus::Unchanged => format!("{line} (unchanged)"),
            }
        })
        .collect()
}

/// Print build output to stdout.
pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
