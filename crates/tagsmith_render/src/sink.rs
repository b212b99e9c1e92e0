//! Output sinks and the destination a renderer currently writes to.

use std::io::Write;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::RenderResult;

/// Append-only sequence of rendered fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSink {
    fragments: Vec<String>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    /// All fragments joined with newlines.
    pub fn read(&self) -> String {
        self.fragments.join("\n")
    }

    /// Marks a flush point. Nothing is buffered, so this only logs.
    pub fn flush(&self) {
        trace!("Flushed sink with {} fragments", self.fragments.len());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Named sinks captured by `<block name=...>` containers.
///
/// Shared by every renderer reached from one root render call.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: IndexMap<String, OutputSink>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh sink for `name`, replacing any earlier capture.
    pub fn open(&mut self, name: &str) {
        self.blocks.insert(name.to_string(), OutputSink::new());
    }

    pub fn get(&self, name: &str) -> Option<&OutputSink> {
        self.blocks.get(name)
    }

    pub fn sink_mut(&mut self, name: &str) -> &mut OutputSink {
        self.blocks.entry(name.to_string()).or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Where rendered fragments go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The root output stream.
    Root,
    /// A named block sink in the registry.
    Block(String),
}

/// Root output stream plus the block registry.
pub struct Output<'w> {
    root: &'w mut dyn Write,
    blocks: BlockRegistry,
}

impl<'w> Output<'w> {
    pub fn new(root: &'w mut dyn Write, blocks: BlockRegistry) -> Self {
        Self { root, blocks }
    }

    /// Write one fragment to `destination`.
    ///
    /// Root fragments are written immediately, one per line.
    pub fn write(&mut self, destination: &Destination, fragment: &str) -> RenderResult<()> {
        match destination {
            Destination::Root => writeln!(self.root, "{}", fragment)?,
            Destination::Block(name) => self.blocks.sink_mut(name).write(fragment),
        }
        Ok(())
    }

    pub fn flush(&mut self) -> RenderResult<()> {
        trace!("Flushing root output");
        self.root.flush()?;
        Ok(())
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockRegistry {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> BlockRegistry {
        self.blocks
    }
}
