//! The streaming renderer.
//!
//! A [`Renderer`] consumes tokens in document order, dispatches custom tags
//! through the [`HandlerTable`](crate::dispatch::HandlerTable), substitutes
//! placeholders in text and attributes, and writes fragments to its current
//! [`Destination`].

use tracing::{debug, trace};

use crate::attributes::Attributes;
use crate::context::Context;
use crate::engine::Engine;
use crate::error::{RenderError, RenderResult};
use crate::sink::{Destination, Output};
use crate::stacks::{CodeFrame, CodePart, NestingStacks};
use crate::tokenizer::{Token, Tokenizer};

/// Renders one template source.
///
/// Context and output are borrowed from the enclosing render call so that
/// includes and base templates share them; nesting stacks and the current
/// destination belong to this renderer alone.
pub struct Renderer<'r, 'w> {
    engine: &'r Engine,
    context: &'r mut Context,
    output: &'r mut Output<'w>,
    stacks: NestingStacks,
    destination: Destination,
    defer_extends: bool,
    deferred_base: Option<String>,
}

impl<'r, 'w> Renderer<'r, 'w> {
    /// Create a renderer writing to `destination`.
    pub fn new(
        engine: &'r Engine,
        context: &'r mut Context,
        output: &'r mut Output<'w>,
        destination: Destination,
    ) -> Self {
        Self {
            engine,
            context,
            output,
            stacks: NestingStacks::new(),
            destination,
            defer_extends: false,
            deferred_base: None,
        }
    }

    /// Record the base of `<extends>` instead of rendering it.
    pub fn defer_extends(mut self, defer: bool) -> Self {
        self.defer_extends = defer;
        self
    }

    pub fn engine(&self) -> &'r Engine {
        self.engine
    }

    pub fn context(&self) -> &Context {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut *self.context
    }

    pub fn output(&self) -> &Output<'w> {
        &*self.output
    }

    pub(crate) fn output_mut(&mut self) -> &mut Output<'w> {
        &mut *self.output
    }

    pub fn stacks(&self) -> &NestingStacks {
        &self.stacks
    }

    pub(crate) fn stacks_mut(&mut self) -> &mut NestingStacks {
        &mut self.stacks
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub(crate) fn set_destination(&mut self, destination: Destination) {
        self.destination = destination;
    }

    pub(crate) fn is_deferring_extends(&self) -> bool {
        self.defer_extends
    }

    pub(crate) fn set_deferred_base(&mut self, base: String) {
        self.deferred_base = Some(base);
    }

    /// Base template recorded by a deferred `<extends>`.
    pub fn deferred_base(&self) -> Option<&str> {
        self.deferred_base.as_deref()
    }

    /// Render a whole template source.
    pub fn feed(&mut self, source: &str) -> RenderResult<()> {
        for token in Tokenizer::new(source) {
            self.handle_token(token)?;
        }
        Ok(())
    }

    /// Dispatch one token.
    pub fn handle_token(&mut self, token: Token) -> RenderResult<()> {
        trace!("Token: {:?}", token);
        match token {
            Token::StartTag { name, attrs } => self.handle_start_tag(&name, attrs),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::StartEndTag { name, attrs } => self.handle_start_end_tag(&name, attrs),
            Token::Text(data) => self.handle_text(data),
            Token::Declaration(decl) => self.emit(&format!("<!{}>", decl)),
            Token::CharRef(name) => self.emit(&format!("&#{};", name)),
            Token::EntityRef(name) => self.emit(&format!("&{};", name)),
            Token::Comment(_) => Ok(()),
        }
    }

    fn handle_start_tag(&mut self, name: &str, attrs: Attributes) -> RenderResult<()> {
        let engine = self.engine;
        let fragment = match engine.table().start(name) {
            Some(handler) => handler.invoke(self, attrs)?,
            None => Some(self.make_tag_start(name, &attrs)),
        };
        self.emit_opt(fragment)
    }

    fn handle_end_tag(&mut self, name: &str) -> RenderResult<()> {
        let engine = self.engine;
        let fragment = match engine.table().end(name) {
            Some(handler) => handler.invoke(self, Attributes::new())?,
            None => Some(self.make_tag_end(name)),
        };
        self.emit_opt(fragment)
    }

    fn handle_start_end_tag(&mut self, name: &str, attrs: Attributes) -> RenderResult<()> {
        let engine = self.engine;
        let fragment = match engine.table().start_end(name) {
            Some(handler) => handler.invoke(self, attrs)?,
            None => Some(self.make_tag_start_end(name, &attrs)),
        };
        self.emit_opt(fragment)
    }

    fn handle_text(&mut self, data: String) -> RenderResult<()> {
        if let Some(code) = self.stacks.codes.top_mut() {
            code.push_raw(&data);
            return Ok(());
        }
        let text = self.populate(&data);
        self.emit(&text)
    }

    /// Write a fragment to the current destination.
    ///
    /// While a code capture is open the fragment joins the captured text
    /// as already rendered.
    pub fn emit(&mut self, fragment: &str) -> RenderResult<()> {
        if let Some(code) = self.stacks.codes.top_mut() {
            code.push_rendered(fragment);
            return Ok(());
        }
        self.output.write(&self.destination, fragment)
    }

    fn emit_opt(&mut self, fragment: Option<String>) -> RenderResult<()> {
        match fragment {
            Some(fragment) => self.emit(&fragment),
            None => Ok(()),
        }
    }

    /// Run the placeholder substitutor over `text`.
    pub fn populate(&self, text: &str) -> String {
        self.engine
            .substitutor()
            .substitute(text, &*self.context, self.engine.charrefs())
    }

    /// Serialize attributes with substituted keys and values.
    pub fn process_attrs(&self, attrs: &Attributes) -> String {
        attrs
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{}=\"{}\"", self.populate(key), self.populate(value)),
                None => self.populate(key),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn make_tag_start(&self, tag: &str, attrs: &Attributes) -> String {
        if attrs.is_empty() {
            format!("<{}>", tag)
        } else {
            format!("<{} {}>", tag, self.process_attrs(attrs))
        }
    }

    pub fn make_tag_start_end(&self, tag: &str, attrs: &Attributes) -> String {
        if attrs.is_empty() {
            format!("<{} />", tag)
        } else {
            format!("<{} {} />", tag, self.process_attrs(attrs))
        }
    }

    pub fn make_tag_end(&self, tag: &str) -> String {
        format!("</{}>", tag)
    }

    /// `<a>` start tag; a `new-tab` flag becomes `target="_blank"`.
    pub fn make_a_start(&self, mut attrs: Attributes) -> String {
        if attrs.remove("new-tab").is_some() {
            attrs.insert("target", "_blank");
        }
        self.make_tag_start("a", &attrs)
    }

    /// Splice the template referenced by `reference` into the current
    /// destination, sharing context and blocks.
    ///
    /// An open code capture is lent to the included template so its output
    /// joins the capture.
    pub fn include(&mut self, reference: &str) -> RenderResult<()> {
        let engine = self.engine;
        let loader = engine.loader();
        let path = loader.resolve_template(reference);
        debug!("Including {:?}", path);
        let source = loader.read(&path)?;

        let mut child = Renderer::new(
            engine,
            &mut *self.context,
            &mut *self.output,
            self.destination.clone(),
        )
        .defer_extends(self.defer_extends);
        child.stacks.codes = self.stacks.codes.take();
        let result = child.feed(&source);
        self.stacks.codes = child.stacks.codes.take();
        result?;

        if let Some(base) = child.deferred_base {
            self.deferred_base = Some(base);
        }
        Ok(())
    }

    /// Begin capturing text for a `<code>`/`<pre>` element.
    pub(crate) fn begin_code(&mut self, attrs: Attributes) {
        self.stacks.codes.push(CodeFrame::new(attrs));
    }

    /// Close a code capture and wrap its content in `tag`.
    ///
    /// Raw text is substituted here; fragments rendered by nested tags are
    /// kept as they are.
    pub(crate) fn end_code(&mut self, tag: &str) -> RenderResult<String> {
        let mut code = self.stacks.codes.pop()?;
        code.trim_leading_blank_line();
        let body: String = code
            .parts
            .iter()
            .map(|part| match part {
                CodePart::Raw(text) => self.populate(text),
                CodePart::Rendered(fragment) => fragment.clone(),
            })
            .collect();
        Ok(format!(
            "{}{}{}",
            self.make_tag_start(tag, &code.attrs),
            body,
            self.make_tag_end(tag)
        ))
    }

    /// Value of a required attribute.
    pub(crate) fn require<'a>(
        tag: &str,
        attrs: &'a Attributes,
        attribute: &str,
    ) -> RenderResult<&'a str> {
        attrs
            .get(attribute)
            .ok_or_else(|| RenderError::missing_attribute(tag, attribute))
    }
}
