//! Per-construct LIFO stacks for constructs whose end tag needs state
//! recorded at the start tag.
//!
//! Each construct kind owns its own stack. Kinds never share a stack, so
//! only per-kind depth is tracked, not ordering across kinds.

use std::fmt;

use crate::attributes::Attributes;
use crate::error::{RenderError, RenderResult};
use crate::sink::Destination;

/// The construct kinds that keep nesting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Section,
    Nav,
    Accordion,
    Extends,
    CodeCapture,
    BlockCapture,
}

impl FrameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Nav => "nav",
            Self::Accordion => "accordion",
            Self::Extends => "extends",
            Self::CodeCapture => "code capture",
            Self::BlockCapture => "block capture",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Section type recorded at `<section>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFrame {
    pub section_type: String,
}

impl SectionFrame {
    /// Class derived from the opening type, if any.
    pub fn class_name(&self) -> Option<&'static str> {
        match self.section_type.as_str() {
            "body" => Some("sectionbody"),
            "1" => Some("sect1"),
            _ => None,
        }
    }
}

/// Attributes recorded at `<nav>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavFrame {
    pub attrs: Attributes,
}

impl NavFrame {
    /// `sub` navs render as lists, top-level navs as `nav`.
    pub fn element(&self) -> &'static str {
        if self.attrs.contains("sub") {
            "ul"
        } else {
            "nav"
        }
    }
}

/// List element chosen at `<accordion>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionFrame {
    pub list_tag: &'static str,
}

/// Attributes recorded at `<extends>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendsFrame {
    pub attrs: Attributes,
}

/// One piece of a code capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodePart {
    /// Text as written in the template, substituted when the capture closes
    Raw(String),
    /// Fragment a tag already rendered
    Rendered(String),
}

/// Content collected between `<code>`/`<pre>` and its end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFrame {
    pub attrs: Attributes,
    pub parts: Vec<CodePart>,
}

impl CodeFrame {
    pub fn new(attrs: Attributes) -> Self {
        Self {
            attrs,
            parts: Vec::new(),
        }
    }

    /// Append template text, merging with a preceding raw part.
    pub fn push_raw(&mut self, text: &str) {
        match self.parts.last_mut() {
            Some(CodePart::Raw(last)) => last.push_str(text),
            _ => self.parts.push(CodePart::Raw(text.to_string())),
        }
    }

    pub fn push_rendered(&mut self, fragment: &str) {
        if !fragment.is_empty() {
            self.parts.push(CodePart::Rendered(fragment.to_string()));
        }
    }

    /// Drop a whitespace-only first line so the opening tag can sit on its
    /// own line.
    pub fn trim_leading_blank_line(&mut self) {
        if let Some(CodePart::Raw(first)) = self.parts.first_mut() {
            if let Some((line, rest)) = first.split_once('\n') {
                if line.trim().is_empty() {
                    *first = rest.to_string();
                }
            }
        }
    }
}

/// Destination to restore when a block capture closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub name: String,
    pub previous: Destination,
}

/// A LIFO stack of frames of one kind.
#[derive(Debug, Clone)]
pub struct FrameStack<T> {
    kind: FrameKind,
    frames: Vec<T>,
}

impl<T> FrameStack<T> {
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: T) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame; an empty stack means unbalanced markup.
    pub fn pop(&mut self) -> RenderResult<T> {
        self.frames
            .pop()
            .ok_or(RenderError::StackUnderflow(self.kind))
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Move all frames out, leaving this stack empty.
    pub fn take(&mut self) -> Self {
        let kind = self.kind;
        std::mem::replace(self, Self::new(kind))
    }
}

/// All nesting stacks owned by one renderer.
#[derive(Debug, Clone)]
pub struct NestingStacks {
    pub sections: FrameStack<SectionFrame>,
    pub navs: FrameStack<NavFrame>,
    pub accordions: FrameStack<AccordionFrame>,
    pub extends: FrameStack<ExtendsFrame>,
    pub codes: FrameStack<CodeFrame>,
    pub blocks: FrameStack<BlockFrame>,
}

impl Default for NestingStacks {
    fn default() -> Self {
        Self::new()
    }
}

impl NestingStacks {
    pub fn new() -> Self {
        Self {
            sections: FrameStack::new(FrameKind::Section),
            navs: FrameStack::new(FrameKind::Nav),
            accordions: FrameStack::new(FrameKind::Accordion),
            extends: FrameStack::new(FrameKind::Extends),
            codes: FrameStack::new(FrameKind::CodeCapture),
            blocks: FrameStack::new(FrameKind::BlockCapture),
        }
    }
}

/// Map an accordion `type` to its list element.
///
/// Unknown types map to the empty string.
pub fn list_tag(list_type: &str) -> &'static str {
    match list_type {
        "definition" | "dl" => "dl",
        "ordered" | "ol" => "ol",
        "unordered" | "ul" => "ul",
        _ => "",
    }
}
