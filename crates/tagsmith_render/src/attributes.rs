//! Ordered tag attributes.

use indexmap::IndexMap;

/// Attributes of a tag, kept in source order.
///
/// A key mapped to `None` is a valueless (boolean) attribute such as
/// `<a new-tab>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, Option<String>>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an attribute set from `(key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Start from `defaults`, then apply `attrs` on top.
    ///
    /// Keys already present in the defaults keep their position and take the
    /// supplied value; new keys are appended in supplied order.
    pub fn with_defaults(defaults: &[(&str, &str)], attrs: Attributes) -> Self {
        let mut merged = Self::from_pairs(defaults.iter().copied());
        for (key, value) in attrs.entries {
            merged.entries.insert(key, value);
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Insert a valueless attribute.
    pub fn insert_flag(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    /// Remove a key, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.entries.shift_remove(key)
    }

    /// Append a class name, creating the `class` attribute when absent.
    pub fn add_class(&mut self, class_name: &str) {
        match self.entries.get_mut("class") {
            Some(Some(existing)) => {
                existing.push(' ');
                existing.push_str(class_name);
            }
            Some(slot @ None) => *slot = Some(class_name.to_string()),
            None => {
                self.entries
                    .insert("class".to_string(), Some(class_name.to_string()));
            }
        }
    }

    /// Subset of the attributes, in the order the keys are requested.
    pub fn pick(&self, keys: &[&str]) -> Self {
        Self {
            entries: keys
                .iter()
                .filter_map(|k| {
                    self.entries
                        .get_key_value(*k)
                        .map(|(k, v)| (k.clone(), v.clone()))
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_creates_and_appends() {
        let mut attrs = Attributes::new();
        attrs.add_class("row");
        assert_eq!(attrs.get("class"), Some("row"));

        attrs.add_class("wide");
        assert_eq!(attrs.get("class"), Some("row wide"));
    }

    #[test]
    fn test_with_defaults_keeps_default_position() {
        let supplied = Attributes::from_pairs([("href", "/a.css"), ("media", "print")]);
        let merged = Attributes::with_defaults(&[("rel", "stylesheet"), ("media", "all")], supplied);

        let keys: Vec<_> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["rel", "media", "href"]);
        assert_eq!(merged.get("media"), Some("print"));
    }

    #[test]
    fn test_pick_orders_by_request() {
        let attrs = Attributes::from_pairs([("style", "x"), ("id", "y"), ("href", "z")]);
        let picked = attrs.pick(&["class", "id", "style"]);

        let keys: Vec<_> = picked.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "style"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut attrs = Attributes::from_pairs([("a", "1"), ("b", "2"), ("c", "3")]);
        attrs.remove("b");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
