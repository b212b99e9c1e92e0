//! Tag dispatch table and handler builders.
//!
//! A tag maps to up to three [`Handler`]s: one for its start tag, one for
//! its end tag and one for its self-closing form. A handler is an ordered
//! list of steps; a single step is a plain handler, several steps form a
//! composite whose outputs are joined with a space.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::attributes::Attributes;
use crate::error::RenderResult;
use crate::renderer::Renderer;

/// Handler for a start or self-closing tag. `None` means nothing to write.
pub type OpenFn =
    Arc<dyn Fn(&mut Renderer<'_, '_>, Attributes) -> RenderResult<Option<String>> + Send + Sync>;

/// Handler for an end tag.
pub type CloseFn = Arc<dyn Fn(&mut Renderer<'_, '_>) -> RenderResult<Option<String>> + Send + Sync>;

/// Box a closure as an [`OpenFn`].
pub fn open_fn<F>(f: F) -> OpenFn
where
    F: Fn(&mut Renderer<'_, '_>, Attributes) -> RenderResult<Option<String>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Box a closure as a [`CloseFn`].
pub fn close_fn<F>(f: F) -> CloseFn
where
    F: Fn(&mut Renderer<'_, '_>) -> RenderResult<Option<String>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One step of a handler.
#[derive(Clone)]
pub enum Step {
    /// Receives the tag's attributes.
    Open(OpenFn),
    /// Receives no attributes.
    Close(CloseFn),
}

/// A single or composite tag handler.
#[derive(Clone)]
pub struct Handler {
    steps: Vec<Step>,
}

impl Handler {
    pub fn open(f: OpenFn) -> Self {
        Self {
            steps: vec![Step::Open(f)],
        }
    }

    pub fn close(f: CloseFn) -> Self {
        Self {
            steps: vec![Step::Close(f)],
        }
    }

    pub fn composite(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn is_composite(&self) -> bool {
        self.steps.len() > 1
    }

    /// Run every step in order.
    ///
    /// Each open step gets its own copy of `attrs`.
    pub fn invoke(
        &self,
        renderer: &mut Renderer<'_, '_>,
        attrs: Attributes,
    ) -> RenderResult<Option<String>> {
        if let [step] = self.steps.as_slice() {
            return match step {
                Step::Open(f) => f(renderer, attrs),
                Step::Close(f) => f(renderer),
            };
        }

        let mut parts = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let part = match step {
                Step::Open(f) => f(renderer, attrs.clone())?,
                Step::Close(f) => f(renderer)?,
            };
            parts.extend(part);
        }
        Ok(if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Handlers registered for one tag.
#[derive(Debug, Clone, Default)]
pub struct TagHandlers {
    pub start: Option<Handler>,
    pub end: Option<Handler>,
    pub start_end: Option<Handler>,
}

/// Immutable map from tag identifier to its handlers.
///
/// Identifiers are tag names with `-` replaced by `_`.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    tags: HashMap<String, TagHandlers>,
}

impl HandlerTable {
    /// Create an empty table; every tag then renders as passthrough.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the start-tag handler for `tag`.
    pub fn on_start(mut self, tag: &str, handler: Handler) -> Self {
        self.slot(tag).start = Some(handler);
        self
    }

    /// Register the end-tag handler for `tag`.
    pub fn on_end(mut self, tag: &str, handler: Handler) -> Self {
        self.slot(tag).end = Some(handler);
        self
    }

    /// Register the self-closing handler for `tag`.
    pub fn on_start_end(mut self, tag: &str, handler: Handler) -> Self {
        self.slot(tag).start_end = Some(handler);
        self
    }

    /// Register a start/end pair.
    pub fn on_pair(self, tag: &str, start: Handler, end: Handler) -> Self {
        self.on_start(tag, start).on_end(tag, end)
    }

    fn slot(&mut self, tag: &str) -> &mut TagHandlers {
        let key = normalize(tag);
        debug!("Registering handler for <{}>", key);
        self.tags.entry(key).or_default()
    }

    pub fn start(&self, tag: &str) -> Option<&Handler> {
        self.get(tag).and_then(|h| h.start.as_ref())
    }

    pub fn end(&self, tag: &str) -> Option<&Handler> {
        self.get(tag).and_then(|h| h.end.as_ref())
    }

    pub fn start_end(&self, tag: &str) -> Option<&Handler> {
        self.get(tag).and_then(|h| h.start_end.as_ref())
    }

    pub fn get(&self, tag: &str) -> Option<&TagHandlers> {
        self.tags.get(&normalize(tag))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(&normalize(tag))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Tag name to table identifier.
pub fn normalize(tag: &str) -> String {
    tag.replace('-', "_")
}

/// Classes and id injected into a tag's attributes before its handler runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    classes: Vec<String>,
    compound_classes: Vec<String>,
    id: Option<String>,
}

impl Decoration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always add `class_name`.
    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.classes.push(class_name.into());
        self
    }

    /// Add a class built from the tag's own attributes, e.g.
    /// `{size}-{count}`. Skipped when a referenced attribute is absent.
    pub fn compound(mut self, template: impl Into<String>) -> Self {
        self.compound_classes.push(template.into());
        self
    }

    /// Force the tag's id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn apply(&self, attrs: &mut Attributes) {
        for class_name in &self.classes {
            attrs.add_class(class_name);
        }
        for template in &self.compound_classes {
            if let Some(class_name) = format_compound(template, attrs) {
                attrs.add_class(&class_name);
            }
        }
        if let Some(id) = &self.id {
            attrs.insert("id", id.as_str());
        }
    }
}

/// Fill `{name}` fields of `template` from `attrs`.
fn format_compound(template: &str, attrs: &Attributes) -> Option<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let close = open + rest[open..].find('}')?;
        result.push_str(attrs.get(&rest[open + 1..close])?);
        rest = &rest[close + 1..];
    }
    result.push_str(rest);
    Some(result)
}

/// Wrap `base` so `decoration` is applied to the attributes first.
pub fn decorate(decoration: Decoration, base: OpenFn) -> OpenFn {
    open_fn(move |renderer, mut attrs| {
        decoration.apply(&mut attrs);
        base(renderer, attrs)
    })
}

/// `<tag attrs>` with substituted attributes.
pub fn element_open(tag: &'static str) -> OpenFn {
    open_fn(move |renderer, attrs| Ok(Some(renderer.make_tag_start(tag, &attrs))))
}

/// `</tag>`.
pub fn element_close(tag: &'static str) -> CloseFn {
    close_fn(move |_| Ok(Some(format!("</{}>", tag))))
}

/// Start handler for a decorated `div`.
pub fn div_start(decoration: Decoration) -> Handler {
    Handler::open(decorate(decoration, element_open("div")))
}

/// End handler closing a `div`.
pub fn div_end() -> Handler {
    Handler::close(element_close("div"))
}
