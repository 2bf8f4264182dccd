//! Built-in page layout, used when the site has no default template.
//!
//! A site can start with nothing but markdown files: every page is wrapped
//! in this layout until `templates/page.html` exists. The markup mirrors
//! what a hand-written template gets from the context (navigation,
//! breadcrumbs, `content`, `git`), so switching to a custom template is a
//! matter of copying the structure.
//!
//! ```text
//! <header class="site-header">
//!   <nav class="breadcrumb">Home › team › About</nav>
//!   <nav class="site-nav"><ul><li class="current">…</li></ul></nav>
//! </header>
//! <main class="page">…rendered markdown…</main>
//! <footer class="site-footer">3f78685</footer>
//! ```
//!
//! All links are relative to the page, so the output works from any
//! subdirectory and from `file://`.

use crate::types::{GitMetadata, NavigationEntry};
use crate::url::relative_url;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = "\
body{font-family:system-ui,sans-serif;max-width:46rem;margin:0 auto;padding:1rem;line-height:1.6;color:#222}\
.site-header{border-bottom:1px solid #ddd;margin-bottom:1.5rem}\
.breadcrumb{font-size:.9rem;color:#666}\
.site-nav ul{list-style:none;padding:0;display:flex;flex-wrap:wrap;gap:1rem}\
.site-nav li.current a{font-weight:bold;text-decoration:none}\
.site-footer{border-top:1px solid #ddd;margin-top:2rem;font-size:.8rem;color:#888}\
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:.25rem .5rem}";

/// Separator between breadcrumb labels.
pub const CRUMB_SEPARATOR: &str = " › ";

/// Everything the built-in layout shows for one page.
#[derive(Debug, Clone, Copy)]
pub struct LayoutData<'a> {
    pub title: &'a str,
    pub lang: &'a str,
    pub site_name: Option<&'a str>,
    /// Derived URL of the page being rendered.
    pub url: &'a str,
    pub breadcrumbs: &'a [String],
    pub navigation: &'a [NavigationEntry],
    /// Already rendered HTML body.
    pub content: &'a str,
    pub git: Option<&'a GitMetadata>,
}

/// Render a complete HTML document.
pub fn render_page(data: &LayoutData<'_>) -> Markup {
    let title = match data.site_name {
        Some(site) if !site.is_empty() && site != data.title => format!("{} · {}", data.title, site),
        _ => data.title.to_string(),
    };
    let body = html! {
        (site_header(render_breadcrumbs(data.breadcrumbs, data.url), render_nav(data.navigation, data.url)))
        main.page {
            (PreEscaped(data.content))
        }
        @if let Some(git) = data.git {
            footer.site-footer {
                span.commit title=(git.commit.hash) { (git.short_hash()) }
            }
        }
    };
    base_document(&title, data.lang, body)
}

fn base_document(title: &str, lang: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Breadcrumb trail. The first crumb links to the site's index page.
fn render_breadcrumbs(crumbs: &[String], current_url: &str) -> Markup {
    html! {
        @for (i, crumb) in crumbs.iter().enumerate() {
            @if i > 0 {
                (CRUMB_SEPARATOR)
            }
            @if i == 0 {
                a href=(relative_url(current_url, "index.html")) { (crumb) }
            } @else {
                span { (crumb) }
            }
        }
    }
}

/// Flat navigation list with links relative to `current_url`.
pub fn render_nav(entries: &[NavigationEntry], current_url: &str) -> Markup {
    html! {
        ul {
            @for entry in entries {
                @let is_current = entry.url == current_url;
                li class=[is_current.then_some("current")] {
                    a href=(relative_url(current_url, &entry.url)) { (entry.text) }
                }
            }
        }
    }
}
