//! Placeholder substitution for text and attribute strings.

use regex::Regex;

use crate::charrefs::CharrefTable;
use crate::context::Context;

/// Rewrites `{{name}}` and `{&name&}` placeholders.
#[derive(Debug, Clone)]
pub struct Substitutor {
    unresolved_variable: Regex,
    unresolved_charref: Regex,
}

impl Default for Substitutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Substitutor {
    /// Create a new substitutor.
    pub fn new() -> Self {
        Self {
            unresolved_variable: Regex::new(r"\{\{[ a-zA-Z\-_]+\}\}")
                .expect("valid placeholder pattern"),
            unresolved_charref: Regex::new(r"\{&[ a-zA-Z\-_]+&\}")
                .expect("valid placeholder pattern"),
        }
    }

    /// Substitute context values and character references into `text`.
    ///
    /// Empty and all-whitespace strings come back unchanged. Context entries
    /// are applied in insertion order, then the charref table, and any
    /// placeholder still left over is erased.
    pub fn substitute(&self, text: &str, context: &Context, charrefs: &CharrefTable) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let mut result = text.to_string();
        for entry in context.entries() {
            result = entry
                .matcher()
                .replace_all(&result, entry.escaped_value())
                .into_owned();
        }
        result = charrefs.expand(&result);
        result = self.unresolved_variable.replace_all(&result, "").into_owned();
        self.unresolved_charref.replace_all(&result, "").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> Context {
        let mut context = Context::new();
        for (k, v) in pairs {
            context.set(*k, *v);
        }
        context
    }

    #[test]
    fn test_substitute_variables() {
        let sub = Substitutor::new();
        let ctx = context(&[("name", "my-site"), ("year", "2024")]);
        let out = sub.substitute("{{name}} ({{ year }})", &ctx, &CharrefTable::new());
        assert_eq!(out, "my-site (2024)");
    }

    #[test]
    fn test_whitespace_fast_path() {
        let sub = Substitutor::new();
        let ctx = context(&[("x", "y")]);
        assert_eq!(sub.substitute("", &ctx, &CharrefTable::new()), "");
        assert_eq!(sub.substitute("  \n\t", &ctx, &CharrefTable::new()), "  \n\t");
    }

    #[test]
    fn test_unresolved_placeholders_erased() {
        let sub = Substitutor::new();
        let out = sub.substitute(
            "a{{missing}}b{&missing&}c{{ also missing }}",
            &Context::new(),
            &CharrefTable::new(),
        );
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_value_with_replacement_syntax_is_literal() {
        let sub = Substitutor::new();
        let ctx = context(&[("price", "$1.00 \\o/")]);
        let out = sub.substitute("Cost: {{price}}", &ctx, &CharrefTable::new());
        assert_eq!(out, "Cost: $1.00 \\o/");
    }

    #[test]
    fn test_prefix_names_do_not_collide() {
        let sub = Substitutor::new();
        let ctx = context(&[("page", "A"), ("page_title", "B")]);
        let out = sub.substitute("{{page}}/{{page_title}}", &ctx, &CharrefTable::new());
        assert_eq!(out, "A/B");
    }

    #[test]
    fn test_charrefs_expanded() {
        let sub = Substitutor::new();
        let out = sub.substitute(
            "{&copy&} {{owner}}",
            &context(&[("owner", "ACME")]),
            &CharrefTable::html_defaults(),
        );
        assert_eq!(out, "&copy; ACME");
    }

    #[test]
    fn test_insertion_order_applies() {
        let sub = Substitutor::new();
        // The first entry introduces a placeholder the second one resolves.
        let ctx = context(&[("outer", "{{inner}}"), ("inner", "done")]);
        let out = sub.substitute("{{outer}}", &ctx, &CharrefTable::new());
        assert_eq!(out, "done");
    }
}
