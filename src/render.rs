//! Page renderer: markdown body → HTML → template → file contents.
//!
//! Each page goes through a small controller step that produces a
//! [`PageView`] (derived URL, breadcrumbs, rendered markdown) and then
//! through [`Renderer::render`], which picks the template and builds the
//! context:
//!
//! | Context key | Value |
//! |-------------|-------|
//! | *globals* | `globals.yaml`, `navigation`, `git` |
//! | *page fields* | `header`, `title`, `url`, `output`, `body`, front matter extras (override globals) |
//! | `content` | the markdown body as HTML |
//! | `breadcrumbs` | `["Home", …dirs, label]` |
//! | `page` | the page record |
//! | `__page` | the same record, read by `url()`, `base()` and `page_url()` |
//! | `current_url` | the derived URL without extension |
//!
//! ## Template selection
//!
//! A page's `layout` front matter names its template. Pages without one use
//! the configured default (`page.html`). When the default does not exist
//! the built-in [`crate::layout`] renders the page instead; a missing
//! explicit `layout` is an error.

use crate::context::SiteContext;
use crate::filters;
use crate::i18n::Translations;
use crate::layout::{self, LayoutData};
use crate::types::Page;
use crate::{breadcrumbs, url};
use minijinja::{Environment, ErrorKind, Value};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render {page} with template {template}: {source:#}")]
    Template {
        page: String,
        template: String,
        source: minijinja::Error,
    },
    #[error("Page {0} has no output URL")]
    EmptyUrl(String),
    #[error("Output URL {url:?} of page {page} is outside the output directory")]
    UnsafeUrl { page: String, url: String },
    #[error("Page {0} could not be converted to template data: {1}")]
    Serialize(String, serde_json::Error),
}

/// A page prepared for its template.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub page: &'a Page,
    /// Derived output URL.
    pub url: String,
    pub breadcrumbs: Vec<String>,
    /// Markdown body rendered to HTML.
    pub content: String,
}

/// Build the view for one page.
pub fn controller(page: &Page) -> PageView<'_> {
    PageView {
        page,
        url: url::derive_url(page),
        breadcrumbs: breadcrumbs::build(page),
        content: markdown_to_html(&page.body),
    }
}

/// Render markdown with tables, footnotes and strikethrough.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Template environment plus the fallback layout.
pub struct Renderer {
    env: Environment<'static>,
    default_template: String,
    default_lang: String,
}

impl Renderer {
    pub fn new(
        templates_dir: &Path,
        default_template: &str,
        translations: Arc<Translations>,
        default_lang: &str,
    ) -> Self {
        let mut env = Environment::new();
        if templates_dir.is_dir() {
            env.set_loader(minijinja::path_loader(templates_dir));
        } else {
            debug!(dir = %templates_dir.display(), "no templates directory");
        }
        filters::register(&mut env, translations, default_lang);
        Self {
            env,
            default_template: default_template.to_string(),
            default_lang: default_lang.to_string(),
        }
    }

    /// Template name for a page: its `layout`, else the default.
    pub fn template_name<'p>(&'p self, page: &'p Page) -> &'p str {
        page.extra_str("layout")
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.default_template)
    }

    /// Render one page to a complete HTML document.
    pub fn render(&self, view: &PageView<'_>, site: &SiteContext) -> Result<String, RenderError> {
        let context = page_context(view, site)?;
        let name = self.template_name(view.page);

        let template = match self.env.get_template(name) {
            Ok(template) => template,
            Err(e) if e.kind() == ErrorKind::TemplateNotFound && name == self.default_template => {
                debug!(page = %view.page.id(), "default template missing, using built-in layout");
                return Ok(self.render_builtin(view, site, &context));
            }
            Err(source) => return Err(template_error(view.page, name, source)),
        };

        template
            .render(Value::from_serialize(&context))
            .map_err(|source| template_error(view.page, name, source))
    }

    fn render_builtin(
        &self,
        view: &PageView<'_>,
        site: &SiteContext,
        context: &serde_json::Map<String, serde_json::Value>,
    ) -> String {
        let lang = context
            .get("lang")
            .and_then(serde_json::Value::as_str)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&self.default_lang);
        let site_name = context.get("site_name").and_then(serde_json::Value::as_str);
        let data = LayoutData {
            title: view.page.label(),
            lang,
            site_name,
            url: &view.url,
            breadcrumbs: &view.breadcrumbs,
            navigation: site.navigation(),
            content: &view.content,
            git: site.git(),
        };
        layout::render_page(&data).into_string()
    }
}

/// Globals, overlaid by the page's own fields, plus the view's extras.
fn page_context(
    view: &PageView<'_>,
    site: &SiteContext,
) -> Result<serde_json::Map<String, serde_json::Value>, RenderError> {
    let record = serde_json::to_value(view.page)
        .map_err(|e| RenderError::Serialize(view.page.id().to_string(), e))?;

    let mut context = site.globals();
    if let serde_json::Value::Object(fields) = &record {
        for (key, value) in fields {
            context.insert(key.clone(), value.clone());
        }
    }
    context.insert("content".into(), view.content.clone().into());
    context.insert("breadcrumbs".into(), view.breadcrumbs.clone().into());
    context.insert("current_url".into(), url::strip_extension(&view.url).into());
    context.insert("page".into(), record.clone());
    context.insert(filters::CURRENT_PAGE_KEY.into(), record);
    Ok(context)
}

fn template_error(page: &Page, template: &str, source: minijinja::Error) -> RenderError {
    RenderError::Template {
        page: page.id().to_string(),
        template: template.to_string(),
        source,
    }
}

/// File path for a page's derived URL inside `output_dir`.
///
/// Rejects an empty URL and any URL that is absolute or climbs out of the
/// output directory.
pub fn output_path(output_dir: &Path, url: &str, page_id: &str) -> Result<PathBuf, RenderError> {
    if url.is_empty() {
        return Err(RenderError::EmptyUrl(page_id.to_string()));
    }
    let unsafe_url = || RenderError::UnsafeUrl {
        page: page_id.to_string(),
        url: url.to_string(),
    };

    let mut depth = 0usize;
    for component in Path::new(url).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(unsafe_url)?,
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_url()),
        }
    }
    if depth == 0 {
        return Err(unsafe_url());
    }
    Ok(output_dir.join(url))
}
