//! Character-reference table consulted for `{&name&}` placeholders.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::error::RenderResult;

/// Entities expanded by [`CharrefTable::html_defaults`].
const DEFAULT_ENTITIES: &[&str] = &[
    "amp", "lt", "gt", "quot", "apos", "nbsp", "copy", "reg", "trade", "mdash", "ndash",
    "hellip", "laquo", "raquo", "middot", "bull",
];

#[derive(Debug, Clone)]
struct Charref {
    matcher: Regex,
    expansion: String,
}

/// Mapping from character-reference name to its output text.
#[derive(Debug, Clone, Default)]
pub struct CharrefTable {
    entries: IndexMap<String, Charref>,
}

impl CharrefTable {
    /// Create an empty table; every `{&name&}` is then erased.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table mapping common entity names to their `&name;` form.
    pub fn html_defaults() -> Self {
        let mut table = Self::new();
        for name in DEFAULT_ENTITIES {
            table.insert(*name, format!("&{};", name));
        }
        table
    }

    /// Load a table from a YAML or JSON mapping of name to expansion.
    pub fn load(path: &Path) -> RenderResult<Self> {
        debug!("Loading character references from {:?}", path);
        let content = fs::read_to_string(path)?;
        let raw: IndexMap<String, String> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(raw.into_iter().collect())
    }

    pub fn insert(&mut self, name: impl Into<String>, expansion: impl Into<String>) {
        let name = name.into();
        let matcher = Regex::new(&format!(r"\{{&\s*{}\s*&\}}", regex::escape(&name)))
            .expect("escaped charref name is a valid pattern");
        self.entries.insert(
            name,
            Charref {
                matcher,
                expansion: expansion.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|c| c.expansion.as_str())
    }

    /// Replace every known `{&name&}` occurrence in `text`.
    pub fn expand(&self, text: &str) -> String {
        let mut result = text.to_string();
        for charref in self.entries.values() {
            result = charref
                .matcher
                .replace_all(&result, regex::NoExpand(&charref.expansion))
                .into_owned();
        }
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CharrefTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, expansion) in iter {
            table.insert(name, expansion);
        }
        table
    }
}
