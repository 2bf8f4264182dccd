//! Filters and functions registered on the template environment.
//!
//! | Hook | Kind | Usage |
//! |------|------|-------|
//! | `json` | filter | `{{ navigation\|json }}`: 4-space indented JSON, not escaped |
//! | `yaml` | filter | `{{ header\|yaml }}`: YAML, not escaped |
//! | `trans` | filter | `{{ "read_more"\|trans }}`: text in the context's `lang` |
//! | `url` | function | `{{ url("docs/reference.html") }}`: link relative to the current page |
//! | `base` | function | `{{ base() }}/style.css`: path from the current page to the site root |
//! | `page_url` | function | `{{ page_url() }}`: current page URL without extension |
//! | `messages` | function | `{{ messages().greeting }}`: the whole message table |
//!
//! The "current page" is the [`CURRENT_PAGE_KEY`] value the renderer puts in
//! every context. Loop variables named `page` do not shadow it. Templates
//! rendered without one fall back to the top-level
//! `header`/`title`/`url`/`output` keys.

use crate::i18n::Translations;
use crate::reader::page_from_record;
use crate::types::Page;
use crate::url::{base_url, derive_url, relative_url, strip_extension};
use minijinja::{Environment, Error, ErrorKind, State, Value};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::sync::Arc;

/// Context key holding the record of the page being rendered.
pub const CURRENT_PAGE_KEY: &str = "__page";

/// Keys of a page record that URL derivation reads.
const PAGE_KEYS: [&str; 4] = ["header", "title", "url", "output"];

/// Register every hook on `env`.
pub fn register(env: &mut Environment<'_>, translations: Arc<Translations>, default_lang: &str) {
    env.add_filter("json", json);
    env.add_filter("yaml", yaml);

    let store = Arc::clone(&translations);
    let lang_fallback = default_lang.to_string();
    env.add_filter(
        "trans",
        move |state: &State, key: String| -> Result<String, Error> {
            let lang = context_lang(state, &lang_fallback);
            store.resolve(&lang, &key).map_err(hook_error)
        },
    );

    let lang_fallback = default_lang.to_string();
    env.add_function(
        "messages",
        move |state: &State, lang: Option<String>| -> Result<Value, Error> {
            let lang = lang.unwrap_or_else(|| context_lang(state, &lang_fallback));
            let table = translations.table(&lang).map_err(hook_error)?;
            Ok(Value::from_serialize(&*table))
        },
    );

    env.add_function("url", |state: &State, target: String| -> Result<Value, Error> {
        let current = current_page(state)?;
        Ok(link_value(relative_url(&derive_url(&current), &target)))
    });

    env.add_function("base", |state: &State| -> Result<Value, Error> {
        let current = current_page(state)?;
        Ok(link_value(base_url(&derive_url(&current))))
    });

    env.add_function(
        "page_url",
        |state: &State, page: Option<Value>| -> Result<Value, Error> {
            let page = match page {
                Some(value) if !value.is_undefined() && !value.is_none() => {
                    page_from_record(to_plain_value(&value)?, 0).map_err(hook_error)?
                }
                _ => current_page(state)?,
            };
            Ok(link_value(strip_extension(&derive_url(&page))))
        },
    );
}

/// A link for templates. HTML auto-escaping would turn `/` into `&#x2f;`,
/// so plain paths are marked safe; anything with markup characters is left
/// to the escaper.
fn link_value(link: String) -> Value {
    if link.contains(['<', '>', '&', '"', '\'']) {
        Value::from(link)
    } else {
        Value::from_safe_string(link)
    }
}

/// Convert a template value into plain data.
///
/// This is the one place template values (maps, sequences, the engine's
/// own objects) turn into ordinary key → value data before encoding or
/// deserializing. Undefined becomes `null`.
pub fn to_plain_value(value: &Value) -> Result<serde_json::Value, Error> {
    if value.is_undefined() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::to_value(value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            "value cannot be converted to plain data",
        )
        .with_source(e)
    })
}

/// `json` filter: 4-space indented JSON, marked safe.
pub fn json(value: Value) -> Result<Value, Error> {
    let plain = to_plain_value(&value)?;
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    plain.serialize(&mut ser).map_err(hook_error)?;
    Ok(Value::from_safe_string(
        String::from_utf8_lossy(&buf).into_owned(),
    ))
}

/// `yaml` filter: YAML document, marked safe.
pub fn yaml(value: Value) -> Result<Value, Error> {
    let plain = to_plain_value(&value)?;
    let text = serde_yaml::to_string(&plain).map_err(hook_error)?;
    Ok(Value::from_safe_string(text))
}

/// The page being rendered, rebuilt from the template state.
pub fn current_page(state: &State) -> Result<Page, Error> {
    if let Some(page) = state
        .lookup(CURRENT_PAGE_KEY)
        .filter(|v| !v.is_undefined() && !v.is_none())
    {
        return page_from_record(to_plain_value(&page)?, 0).map_err(hook_error);
    }

    let mut record = serde_json::Map::new();
    for key in PAGE_KEYS {
        if let Some(value) = state.lookup(key).filter(|v| !v.is_undefined() && !v.is_none()) {
            record.insert(key.to_string(), to_plain_value(&value)?);
        }
    }
    page_from_record(serde_json::Value::Object(record), 0).map_err(hook_error)
}

/// `lang` from the template context, or `fallback`.
fn context_lang(state: &State, fallback: &str) -> String {
    state
        .lookup("lang")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn hook_error<E>(err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}
