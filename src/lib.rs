//! # Page Weaver
//!
//! A static site generator for sites written as a directory of markdown
//! pages. Every page is rendered through a minijinja template that sees the
//! whole site: a navigation list over all pages, its own breadcrumb trail,
//! shared global data, translated texts, and the commit the site was built
//! from.
//!
//! # Architecture: Load Once, Render Each
//!
//! ```text
//! 1. Load     config.toml, pages/, globals.yaml  →  Site        (all pages + global context)
//! 2. Render   Site × page                        →  HTML string (template or built-in layout)
//! 3. Write    HTML                               →  dist/<url>  (skipped when unchanged)
//! ```
//!
//! Everything global (navigation, git metadata, globals file) is computed
//! once in step 1 and owned by the [`site::Site`] value. Step 2 is a pure
//! function of the site and one page, so a page's output never depends on
//! render order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Page`, `NavigationEntry`, `GitMetadata`: the records templates see |
//! | [`url`] | Derived output URL of a page, relative links between pages |
//! | [`reader`] | Reads markdown files and front matter, or a JSON manifest, into pages |
//! | [`navigation`] | Flat navigation list in reader order |
//! | [`breadcrumbs`] | `Home › dir › Title` trail for one page |
//! | [`i18n`] | Lazily loaded `messages/<lang>.yaml` tables for the `trans` filter |
//! | [`git`] | Commit hash and repository root via the `git` executable or `.git/` files |
//! | [`context`] | Global template data: globals file + navigation + git |
//! | [`filters`] | Template hooks: `json`, `yaml`, `trans`, `url`, `base`, `page_url`, `messages` |
//! | [`render`] | Markdown → HTML, template selection, page context, output paths |
//! | [`layout`] | Built-in maud layout used when the site has no default template |
//! | [`cache`] | Build manifest of rendered-output hashes for incremental writes |
//! | [`site`] | One run: load, build, report |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Relative Links Everywhere
//!
//! Every link a template produces with `url()` or `base()` is relative to
//! the page it appears on. The output can be served from any subdirectory,
//! opened from `file://`, or moved between hosts without a base URL setting.
//!
//! ## Navigation Order Is Reader Order
//!
//! Pages are read depth-first with entries sorted by file name. Menu order is
//! that order; nothing re-sorts it. Prefix files (`01-intro.md`) to reorder.
//!
//! ## Expected Absences Are Not Errors
//!
//! A missing translation file, no git repository, no `git` executable, no
//! globals file, or no previous build manifest all fall back to empty data.
//! A file that exists but cannot be parsed is always an error, so typos are
//! never silently ignored.

pub mod breadcrumbs;
pub mod cache;
pub mod config;
pub mod context;
pub mod filters;
pub mod git;
pub mod i18n;
pub mod layout;
pub mod navigation;
pub mod output;
pub mod reader;
pub mod render;
pub mod site;
pub mod types;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;
