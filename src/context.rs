//! Global template data for a run.
//!
//! Every template sees the same globals:
//!
//! | Key | Source |
//! |-----|--------|
//! | *any* | top-level keys of `globals.yaml` |
//! | `navigation` | [`crate::navigation::build`] over all pages |
//! | `git` | [`crate::git::probe`], omitted entirely when unavailable |
//!
//! `navigation` and `git` are inserted after the globals file, so they win
//! over keys of the same name there.

use crate::config::SiteConfig;
use crate::types::{GitMetadata, NavigationEntry, Page};
use crate::{git, navigation};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid globals file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Globals file {0} must contain a mapping")]
    NotAMapping(PathBuf),
}

/// Data shared by every page of a run, computed once.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    defaults: Map<String, Value>,
    navigation: Vec<NavigationEntry>,
    git: Option<GitMetadata>,
}

impl SiteContext {
    pub fn new(
        defaults: Map<String, Value>,
        navigation: Vec<NavigationEntry>,
        git: Option<GitMetadata>,
    ) -> Self {
        Self {
            defaults,
            navigation,
            git,
        }
    }

    /// Load globals, build navigation and probe git for `pages`.
    pub fn assemble(config: &SiteConfig, root: &Path, pages: &[Page]) -> Result<Self, ContextError> {
        let defaults = load_globals(&config.globals_path(root))?;
        let navigation = navigation::build(pages);
        let git = git::probe(root, config.git.strategy);
        Ok(Self::new(defaults, navigation, git))
    }

    pub fn navigation(&self) -> &[NavigationEntry] {
        &self.navigation
    }

    pub fn git(&self) -> Option<&GitMetadata> {
        self.git.as_ref()
    }

    /// A value from the globals file.
    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    /// The merged global mapping handed to templates.
    pub fn globals(&self) -> Map<String, Value> {
        let mut globals = self.defaults.clone();
        let navigation = self
            .navigation
            .iter()
            .map(|entry| json!({ "text": entry.text, "url": entry.url }))
            .collect();
        globals.insert("navigation".to_string(), Value::Array(navigation));
        if let Some(git) = &self.git {
            globals.insert(
                "git".to_string(),
                json!({ "commit": { "hash": git.commit.hash }, "dir": git.dir }),
            );
        }
        globals
    }
}

/// Load the globals file as a mapping.
///
/// A missing file yields an empty mapping. A file that is not valid YAML,
/// or whose document is not a mapping, is an error.
pub fn load_globals(path: &Path) -> Result<Map<String, Value>, ContextError> {
    if !path.is_file() {
        debug!(path = %path.display(), "no globals file");
        return Ok(Map::new());
    }
    let content = fs::read_to_string(path).map_err(|source| ContextError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_yaml::from_str(&content).map_err(|source| ContextError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ContextError::NotAMapping(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitStrategy;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn globals_file_keys_are_exposed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("globals.yaml");
        fs::write(&path, "site_name: Handbook\nlang: en\n").unwrap();

        let globals = load_globals(&path).unwrap();
        assert_eq!(globals["site_name"], "Handbook");
        assert_eq!(globals["lang"], "en");
    }

    #[test]
    fn missing_globals_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(load_globals(&tmp.path().join("globals.yaml")).unwrap().is_empty());
    }

    #[test]
    fn invalid_globals_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("globals.yaml");
        fs::write(&path, "site_name: [unclosed\n").unwrap();
        assert!(matches!(load_globals(&path), Err(ContextError::Yaml { .. })));
    }

    #[test]
    fn non_mapping_globals_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("globals.yaml");
        fs::write(&path, "- one\n- two\n").unwrap();
        assert!(matches!(load_globals(&path), Err(ContextError::NotAMapping(_))));
    }

    #[test]
    fn navigation_overrides_globals_key() {
        let mut defaults = Map::new();
        defaults.insert("navigation".into(), json!("from globals"));
        let context = SiteContext::new(
            defaults,
            vec![NavigationEntry {
                text: "Home".into(),
                url: "index.html".into(),
            }],
            None,
        );

        let globals = context.globals();
        assert_eq!(globals["navigation"], json!([{ "text": "Home", "url": "index.html" }]));
    }

    #[test]
    fn git_key_present_only_with_metadata() {
        let without = SiteContext::new(Map::new(), vec![], None);
        assert!(!without.globals().contains_key("git"));

        let with = SiteContext::new(Map::new(), vec![], Some(GitMetadata::new("abc123", "/repo")));
        assert_eq!(
            with.globals()["git"],
            json!({ "commit": { "hash": "abc123" }, "dir": "/repo" })
        );
    }

    #[test]
    fn assemble_with_git_off_omits_git() {
        let tmp = setup_fixtures();
        let mut config = crate::config::load_config(tmp.path()).unwrap();
        config.git.strategy = GitStrategy::Off;

        let pages = vec![page("index.md", Some("Welcome"))];
        let context = SiteContext::assemble(&config, tmp.path(), &pages).unwrap();

        assert!(context.git().is_none());
        assert!(!context.globals().contains_key("git"));
        assert_eq!(context.default_value("site_name"), Some(&json!("Field Notes")));
        assert_eq!(context.navigation().len(), 1);
    }

    #[test]
    fn assemble_outside_repository_omits_git() {
        let tmp = setup_fixtures();
        let pages = vec![page("index.md", Some("Welcome"))];

        for strategy in [GitStrategy::Auto, GitStrategy::Files] {
            let mut config = crate::config::load_config(tmp.path()).unwrap();
            config.git.strategy = strategy;

            let context = SiteContext::assemble(&config, tmp.path(), &pages).unwrap();
            assert!(context.git().is_none());
            assert!(!context.globals().contains_key("git"));
        }
    }
}
