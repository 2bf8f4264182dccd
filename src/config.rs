//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the site root (next to `pages/`, `templates/` and `globals.yaml`) and is
//! optional: stock defaults are used for anything it does not set.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! pages_dir = "pages"        # Markdown pages, relative to the site root
//! extensions = ["md"]        # File extensions read as pages
//!
//! [templates]
//! dir = "templates"          # minijinja templates directory
//! default = "page.html"      # Template used when a page sets no `layout`
//!
//! [data]
//! globals = "globals.yaml"   # Extra global template data
//! messages_dir = "messages"  # One <lang>.yaml file per language
//! default_lang = "en"        # Language when the context has no `lang`
//!
//! [build]
//! output_dir = "dist"
//!
//! [git]
//! strategy = "auto"          # auto | cli | files | off
//! ```
//!
//! ## Partial Configuration
//!
//! The file is sparse; override just the values you want:
//!
//! ```toml
//! [data]
//! default_lang = "fr"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file within the site root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where pages are read from.
    pub content: ContentConfig,
    /// Template lookup.
    pub templates: TemplatesConfig,
    /// Global data and message files.
    pub data: DataConfig,
    /// Output settings.
    pub build: BuildConfig,
    /// Version-control metadata probing.
    pub git: GitConfig,
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        if self
            .content
            .extensions
            .iter()
            .any(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(
                "content.extensions entries must be non-empty and written without a dot".into(),
            ));
        }
        if self.templates.default.is_empty() {
            return Err(ConfigError::Validation(
                "templates.default must not be empty".into(),
            ));
        }
        if self.data.default_lang.is_empty() {
            return Err(ConfigError::Validation(
                "data.default_lang must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Absolute-or-root-relative paths resolved against the site root.
    pub fn pages_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.pages_dir)
    }

    pub fn templates_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.templates.dir)
    }

    pub fn globals_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data.globals)
    }

    pub fn messages_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.data.messages_dir)
    }

    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.build.output_dir)
    }
}

/// Content reader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Pages directory, relative to the site root.
    pub pages_dir: String,
    /// Extensions (without dot) of files read as pages. Case-insensitive.
    pub extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            pages_dir: "pages".to_string(),
            extensions: vec!["md".to_string()],
        }
    }
}

/// Template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Templates directory, relative to the site root.
    pub dir: String,
    /// Template name used when a page has no `layout` front matter.
    /// When this template does not exist the built-in layout is used.
    pub default: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
            default: "page.html".to_string(),
        }
    }
}

/// Global data and translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// YAML file merged into the global template data.
    pub globals: String,
    /// Directory of `<lang>.yaml` message files.
    pub messages_dir: String,
    /// Language used by `trans` when the context has no `lang`.
    pub default_lang: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            globals: "globals.yaml".to_string(),
            messages_dir: "messages".to_string(),
            default_lang: "en".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Output directory, relative to the site root. `--output` overrides it.
    pub output_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: "dist".to_string(),
        }
    }
}

/// How git metadata is looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitStrategy {
    /// `git` executable when installed, ref files otherwise.
    #[default]
    Auto,
    /// Only the `git` executable.
    Cli,
    /// Only `.git/HEAD` and ref files.
    Files,
    /// Never probe; templates get no `git` global.
    Off,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub strategy: GitStrategy,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// The base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if there is no config file.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the site root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# page-weaver configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Content
# ---------------------------------------------------------------------------
[content]
# Directory holding the markdown pages, relative to the site root.
pages_dir = "pages"

# File extensions (without the dot) read as pages.
extensions = ["md"]

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# minijinja templates directory, relative to the site root.
dir = "templates"

# Template used for pages without a `layout` front matter key.
# If this file does not exist, the built-in layout is used.
default = "page.html"

# ---------------------------------------------------------------------------
# Global data and translations
# ---------------------------------------------------------------------------
[data]
# YAML mapping merged into every template's context.
globals = "globals.yaml"

# One <lang>.yaml file per language, used by the `trans` filter.
messages_dir = "messages"

# Language used when a page sets no `lang`.
default_lang = "en"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Output directory, relative to the site root. --output overrides it.
output_dir = "dist"

# ---------------------------------------------------------------------------
# Git metadata (exposed to templates as `git.commit.hash` and `git.dir`)
# ---------------------------------------------------------------------------
[git]
# auto  - use the git executable when installed, else read .git/ directly
# cli   - only the git executable
# files - only read .git/HEAD and refs
# off   - never add git metadata
strategy = "auto"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.content.pages_dir, "pages");
        assert_eq!(config.content.extensions, vec!["md"]);
        assert_eq!(config.templates.default, "page.html");
        assert_eq!(config.data.default_lang, "en");
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.git.strategy, GitStrategy::Auto);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[data]
default_lang = "fr"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.data.default_lang, "fr");
        // Defaults preserved
        assert_eq!(config.data.globals, "globals.yaml");
        assert_eq!(config.content.pages_dir, "pages");
    }

    #[test]
    fn parse_git_strategy() {
        let config: SiteConfig = toml::from_str("[git]\nstrategy = \"files\"\n").unwrap();
        assert_eq!(config.git.strategy, GitStrategy::Files);

        let bad: Result<SiteConfig, _> = toml::from_str("[git]\nstrategy = \"svn\"\n");
        assert!(bad.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.templates.dir, "templates");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[content]
pages_dir = "docs"
extensions = ["md", "markdown"]

[build]
output_dir = "public"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.content.pages_dir, "docs");
        assert_eq!(config.content.extensions, vec!["md", "markdown"]);
        assert_eq!(config.build.output_dir, "public");
        // Unspecified values are defaults
        assert_eq!(config.data.messages_dir, "messages");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[content]\nextensions = []\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn resolved_paths_join_root() {
        let config = SiteConfig::default();
        let root = Path::new("/site");
        assert_eq!(config.pages_dir(root), Path::new("/site/pages"));
        assert_eq!(config.messages_dir(root), Path::new("/site/messages"));
        assert_eq!(config.globals_path(root), Path::new("/site/globals.yaml"));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.content.pages_dir, defaults.content.pages_dir);
        assert_eq!(config.git.strategy, defaults.git.strategy);
        config.validate().unwrap();
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"lang = "en""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"lang = "fr""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("lang").unwrap().as_str(), Some("fr"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[data]
globals = "globals.yaml"
default_lang = "en"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[data]
default_lang = "de"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let data = merged.get("data").unwrap();
        assert_eq!(data.get("default_lang").unwrap().as_str(), Some("de"));
        assert_eq!(data.get("globals").unwrap().as_str(), Some("globals.yaml"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"extensions = ["md"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extensions = ["markdown"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extensions").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[content]\npages_dri = \"x\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[contnet]\npages_dir = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[build]\nout = \"x\"\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = SiteConfig::default();
        config.content.extensions = vec![".md".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_default_template() {
        let mut config = SiteConfig::default();
        config.templates.default.clear();
        assert!(config.validate().is_err());
    }
}
