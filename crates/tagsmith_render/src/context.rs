//! Render context: the layered name → value store behind `{{name}}`.

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

/// A single context variable and its compiled placeholder matcher.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    name: String,
    matcher: Regex,
    raw_value: String,
    escaped_value: String,
}

impl ContextEntry {
    /// Create an entry; `{{ name }}` with any surrounding whitespace matches it.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let raw_value = value.into();
        let matcher = Regex::new(&format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(&name)))
            .expect("escaped placeholder name is a valid pattern");
        let escaped_value = raw_value.replace('$', "$$");
        Self {
            name,
            matcher,
            raw_value,
            escaped_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// The value as it was set.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The value in a form that survives use as a replacement string.
    pub fn escaped_value(&self) -> &str {
        &self.escaped_value
    }
}

/// Ordered mapping of variable name to [`ContextEntry`].
///
/// Iteration order is insertion order; overwriting a name keeps its slot.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: IndexMap<String, ContextEntry>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from name/value pairs, decoding each value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut context = Self::new();
        for (name, value) in pairs {
            context.set(name, decode_value(value.as_ref()));
        }
        context
    }

    /// Seed a context from query parameters followed by `env` variables.
    ///
    /// Each query parameter must split into exactly one name and one value;
    /// anything else is dropped.
    pub fn seed<I, E>(query: I, env: E) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
        E: IntoIterator<Item = (String, String)>,
    {
        let mut context = Self::new();
        for pair in query {
            match <[String; 2]>::try_from(pair) {
                Ok([name, value]) => context.set(name, decode_value(&value)),
                Err(pair) => warn!("Dropping malformed query parameter: {:?}", pair),
            }
        }
        for (name, value) in env {
            context.set(name, decode_value(&value));
        }
        debug!("Seeded context with {} entries", context.len());
        context
    }

    /// Set or overwrite a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let entry = ContextEntry::new(name, value);
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ContextEntry> {
        self.entries.get(name)
    }

    /// Look up `name`, inserting an empty entry when it is not known yet.
    pub fn lookup(&mut self, name: &str) -> &ContextEntry {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| ContextEntry::new(name, ""))
    }

    /// Raw value of `name`, or the empty string.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).map(ContextEntry::raw_value).unwrap_or("")
    }

    pub fn entries(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a `QUERY_STRING` into its `&`-separated parameters.
///
/// Every parameter is returned split on `=`; callers drop the ones that do
/// not have exactly two parts.
pub fn parse_query_string(query: &str) -> Vec<Vec<String>> {
    query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split('=').map(str::to_string).collect())
        .collect()
}

pub(crate) fn decode_value(value: &str) -> String {
    value.replace("%20", " ").replace("%27", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_allows_interior_whitespace() {
        let entry = ContextEntry::new("title", "Home");
        assert!(entry.matcher().is_match("{{title}}"));
        assert!(entry.matcher().is_match("{{  title }}"));
        assert!(!entry.matcher().is_match("{{subtitle}}"));
        assert!(!entry.matcher().is_match("{{title2}}"));
    }

    #[test]
    fn test_name_with_regex_characters() {
        let entry = ContextEntry::new("a.b", "x");
        assert!(entry.matcher().is_match("{{a.b}}"));
        assert!(!entry.matcher().is_match("{{aXb}}"));
    }

    #[test]
    fn test_escaped_value_protects_dollar() {
        let entry = ContextEntry::new("price", "$1");
        assert_eq!(entry.raw_value(), "$1");
        assert_eq!(entry.escaped_value(), "$$1");
    }

    #[test]
    fn test_seed_drops_malformed_pairs() {
        let query = vec![
            vec!["page".to_string(), "about%20us".to_string()],
            vec!["broken".to_string()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ];
        let context = Context::seed(query, vec![("USER".to_string(), "o%27neil".to_string())]);

        assert_eq!(context.len(), 2);
        assert_eq!(context.value("page"), "about us");
        assert_eq!(context.value("USER"), "o'neil");
        assert!(context.get("broken").is_none());
    }

    #[test]
    fn test_lookup_inserts_empty_entry() {
        let mut context = Context::new();
        assert_eq!(context.lookup("missing").raw_value(), "");
        assert!(context.get("missing").is_some());
    }

    #[test]
    fn test_overwrite_keeps_insertion_slot() {
        let mut context = Context::new();
        context.set("a", "1");
        context.set("b", "2");
        context.set("a", "3");

        let names: Vec<_> = context.entries().map(ContextEntry::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(context.value("a"), "3");
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("a=1&b&c=2=3");
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], vec!["a", "1"]);
        assert_eq!(params[1], vec!["b"]);
        assert_eq!(params[2].len(), 3);
    }
}
