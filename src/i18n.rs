//! Message lookup for the `trans` filter and `messages` function.
//!
//! Each language has an optional `messages/<lang>.yaml` file holding a flat
//! mapping of message keys to text:
//!
//! ```yaml
//! greeting: Bonjour
//! read_more: Lire la suite
//! ```
//!
//! Tables load lazily the first time a language is requested and stay
//! memoized for the rest of the run. A language without a file gets an
//! empty table, so every key resolves to itself. A file that exists but is
//! not valid YAML is an error: a broken translation file should fail the
//! build, not silently show raw keys.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum I18nError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid message file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Message file {0} must contain a mapping of keys to text")]
    NotAMapping(PathBuf),
}

/// Key → localized text for one language.
pub type MessageTable = BTreeMap<String, String>;

/// Per-run translation cache, keyed by language code.
#[derive(Debug)]
pub struct Translations {
    dir: PathBuf,
    tables: Mutex<HashMap<String, Arc<MessageTable>>>,
}

impl Translations {
    /// A store reading `<dir>/<lang>.yaml` files on demand.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Localized text for `key`, or `key` itself when the language or the
    /// key is missing.
    pub fn resolve(&self, lang: &str, key: &str) -> Result<String, I18nError> {
        let table = self.table(lang)?;
        Ok(table.get(key).cloned().unwrap_or_else(|| key.to_string()))
    }

    /// The full table for `lang`, loading it on first use.
    pub fn table(&self, lang: &str) -> Result<Arc<MessageTable>, I18nError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = tables.get(lang) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(self.load(lang)?);
        tables.insert(lang.to_string(), Arc::clone(&table));
        Ok(table)
    }

    fn load(&self, lang: &str) -> Result<MessageTable, I18nError> {
        if !is_plain_code(lang) {
            debug!(lang, "language code is not a plain file name, using empty table");
            return Ok(MessageTable::new());
        }
        let path = self.dir.join(format!("{lang}.yaml"));
        if !path.is_file() {
            debug!(path = %path.display(), "no message file");
            return Ok(MessageTable::new());
        }
        let content = fs::read_to_string(&path).map_err(|source| I18nError::Io {
            path: path.clone(),
            source,
        })?;
        parse_table(&content, &path)
    }
}

/// Language codes become file names, so reject anything that could leave
/// the messages directory.
fn is_plain_code(lang: &str) -> bool {
    !lang.is_empty() && lang != "." && lang != ".." && !lang.contains(['/', '\\'])
}

fn parse_table(content: &str, path: &Path) -> Result<MessageTable, I18nError> {
    if content.trim().is_empty() {
        return Ok(MessageTable::new());
    }
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| I18nError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    let serde_yaml::Value::Mapping(mapping) = value else {
        return Err(I18nError::NotAMapping(path.to_path_buf()));
    };

    let mut table = MessageTable::new();
    for (key, value) in mapping {
        let (Some(key), Some(text)) = (scalar_text(&key), scalar_text(&value)) else {
            warn!(path = %path.display(), "skipping non-scalar message entry");
            continue;
        };
        table.insert(key, text);
    }
    Ok(table)
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, Translations) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        let store = Translations::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn resolves_defined_key() {
        let (_tmp, store) = store_with(&[("fr.yaml", "greeting: Bonjour\n")]);
        assert_eq!(store.resolve("fr", "greeting").unwrap(), "Bonjour");
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        let (_tmp, store) = store_with(&[("fr.yaml", "greeting: Bonjour\n")]);
        assert_eq!(store.resolve("fr", "farewell").unwrap(), "farewell");
    }

    #[test]
    fn missing_language_falls_back_to_key() {
        let (_tmp, store) = store_with(&[]);
        assert_eq!(store.resolve("fr", "greeting").unwrap(), "greeting");
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let store = Translations::new("/nonexistent/messages");
        assert_eq!(store.resolve("de", "hello").unwrap(), "hello");
    }

    #[test]
    fn table_is_memoized() {
        let (tmp, store) = store_with(&[("fr.yaml", "greeting: Bonjour\n")]);
        assert_eq!(store.resolve("fr", "greeting").unwrap(), "Bonjour");

        // Later edits are not picked up within the same run
        fs::write(tmp.path().join("fr.yaml"), "greeting: Salut\n").unwrap();
        assert_eq!(store.resolve("fr", "greeting").unwrap(), "Bonjour");
    }

    #[test]
    fn absent_language_is_memoized_as_empty() {
        let (tmp, store) = store_with(&[]);
        assert!(store.table("es").unwrap().is_empty());

        fs::write(tmp.path().join("es.yaml"), "greeting: Hola\n").unwrap();
        assert_eq!(store.resolve("es", "greeting").unwrap(), "greeting");
    }

    #[test]
    fn scalar_values_become_text() {
        let (_tmp, store) = store_with(&[("en.yaml", "count: 3\nenabled: true\nnested:\n  a: b\n")]);
        let table = store.table("en").unwrap();
        assert_eq!(table.get("count").map(String::as_str), Some("3"));
        assert_eq!(table.get("enabled").map(String::as_str), Some("true"));
        assert!(!table.contains_key("nested"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let (_tmp, store) = store_with(&[("fr.yaml", "greeting: [unclosed\n")]);
        assert!(matches!(store.resolve("fr", "greeting"), Err(I18nError::Yaml { .. })));
    }

    #[test]
    fn non_mapping_is_an_error() {
        let (_tmp, store) = store_with(&[("fr.yaml", "- a\n- b\n")]);
        assert!(matches!(store.table("fr"), Err(I18nError::NotAMapping(_))));
    }

    #[test]
    fn empty_file_is_empty_table() {
        let (_tmp, store) = store_with(&[("fr.yaml", "\n")]);
        assert!(store.table("fr").unwrap().is_empty());
    }

    #[test]
    fn path_like_codes_are_treated_as_missing() {
        let (_tmp, store) = store_with(&[]);
        assert_eq!(store.resolve("../secrets", "key").unwrap(), "key");
        assert_eq!(store.resolve("..", "key").unwrap(), "key");
    }
}
