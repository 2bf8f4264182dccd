//! One run over a site: load everything once, then render every page.
//!
//! ```text
//! config.toml ─┐
//! pages/      ─┼─ Site::load ──▶ Site { pages, context, translations }
//! globals.yaml ┘                     │
//!                                    ▼
//!                         Site::build(output_dir)
//!                 controller → Renderer::render → cache check → write
//! ```
//!
//! A [`Site`] owns all per-run state: the page list, the assembled global
//! context, and the translation store. Nothing is shared between runs, so
//! two sites can be built in the same process (the tests do).

use crate::cache::{self, BuildManifest, WriteStats};
use crate::config::{self, ConfigError, SiteConfig};
use crate::context::{ContextError, SiteContext};
use crate::i18n::Translations;
use crate::reader::{self, ReaderError};
use crate::render::{self, RenderError, Renderer};
use crate::types::Page;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reader(#[from] ReaderError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether a page's file was written or left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// One rendered page in a [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub label: String,
    pub source: String,
    pub url: String,
    pub status: WriteStatus,
}

/// Result of [`Site::build`].
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub pages: Vec<RenderedPage>,
    pub stats: WriteStats,
}

/// A loaded site, ready to build.
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    pages: Vec<Page>,
    context: SiteContext,
    translations: Arc<Translations>,
}

impl Site {
    /// Load config, read pages from the pages directory, and assemble the
    /// global context.
    pub fn load(root: &Path) -> Result<Self, SiteError> {
        Self::load_with_pages(root, None)
    }

    /// Like [`Site::load`], but read page records from a JSON manifest
    /// instead of the pages directory when `manifest` is given.
    pub fn load_with_pages(root: &Path, manifest: Option<&Path>) -> Result<Self, SiteError> {
        let config = config::load_config(root)?;
        let pages = match manifest {
            Some(path) => reader::load_manifest(path)?,
            None => {
                reader::read_pages(&config.pages_dir(root), &config.content.extensions)?
            }
        };
        debug!(count = pages.len(), "pages loaded");
        let context = SiteContext::assemble(&config, root, &pages)?;
        Ok(Self::from_parts(root, config, pages, context))
    }

    /// Build a site from already-loaded parts.
    pub fn from_parts(
        root: &Path,
        config: SiteConfig,
        pages: Vec<Page>,
        context: SiteContext,
    ) -> Self {
        let translations = Arc::new(Translations::new(config.messages_dir(root)));
        Self {
            root: root.to_path_buf(),
            config,
            pages,
            context,
            translations,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn context(&self) -> &SiteContext {
        &self.context
    }

    /// Output directory from config, resolved against the root.
    pub fn default_output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.root)
    }

    fn renderer(&self) -> Renderer {
        Renderer::new(
            &self.config.templates_dir(&self.root),
            &self.config.templates.default,
            Arc::clone(&self.translations),
            &self.config.data.default_lang,
        )
    }

    /// Render every page into `output_dir`.
    ///
    /// With `use_cache`, pages whose rendered bytes match the previous
    /// build's manifest (and whose file still exists) are not rewritten.
    /// The manifest is saved either way.
    pub fn build(&self, output_dir: &Path, use_cache: bool) -> Result<BuildReport, SiteError> {
        fs::create_dir_all(output_dir)?;
        let renderer = self.renderer();
        let previous = if use_cache {
            BuildManifest::load(output_dir)
        } else {
            BuildManifest::empty()
        };
        let mut manifest = BuildManifest::empty();
        let mut stats = WriteStats::default();
        let mut rendered = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let view = render::controller(page);
            let target = render::output_path(output_dir, &view.url, page.id())?;
            let html = renderer.render(&view, &self.context)?;
            let hash = cache::hash_bytes(html.as_bytes());

            let status = if previous.is_fresh(&view.url, &hash, output_dir) {
                debug!(url = %view.url, "unchanged");
                stats.skipped();
                WriteStatus::Unchanged
            } else {
                write_file(&target, &html)?;
                info!(url = %view.url, "written");
                stats.wrote();
                WriteStatus::Written
            };
            manifest.record(view.url.clone(), hash);
            rendered.push(RenderedPage {
                label: page.label().to_string(),
                source: page.header.path.clone(),
                url: view.url,
                status,
            });
        }

        manifest.save(output_dir)?;
        Ok(BuildReport {
            output_dir: output_dir.to_path_buf(),
            pages: rendered,
            stats,
        })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SiteError> {
    let to_write_error = |source| SiteError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    fs::write(path, contents).map_err(to_write_error)
}
