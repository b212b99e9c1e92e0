//! Template inheritance through `<extends>` and `<block>`.
//!
//! The child template renders first. Every `<block name=N>...</block>`
//! container it contains is captured into sink `N` of the shared
//! [`BlockRegistry`]. When `</extends>` is reached the base template is
//! rendered with the same context and registry, and each self-closing
//! `<block name=N/>` in it writes out the captured text of `N`.

use std::io::Write;

use tracing::{debug, info};

use crate::attributes::Attributes;
use crate::context::Context;
use crate::dispatch::{close_fn, open_fn, Handler};
use crate::engine::Engine;
use crate::error::RenderResult;
use crate::renderer::Renderer;
use crate::sink::{BlockRegistry, Destination, Output};
use crate::stacks::{BlockFrame, ExtendsFrame};

/// Blocks captured from a child template whose base has not rendered yet.
#[derive(Debug, Clone, Default)]
pub struct CapturedTemplate {
    pub blocks: BlockRegistry,
    /// Base named by the child's `<extends>`, if it had one
    pub base: Option<String>,
}

impl<'r, 'w> Renderer<'r, 'w> {
    /// Redirect output into a fresh sink for block `name`.
    pub fn begin_block(&mut self, name: &str) {
        debug!("Capturing block '{}'", name);
        self.output_mut().blocks_mut().open(name);
        let previous = self.destination().clone();
        self.stacks_mut().blocks.push(BlockFrame {
            name: name.to_string(),
            previous,
        });
        self.set_destination(Destination::Block(name.to_string()));
    }

    /// Stop capturing and restore the destination active before the block.
    pub fn end_block(&mut self) -> RenderResult<()> {
        let frame = self.stacks_mut().blocks.pop()?;
        if let Some(sink) = self.output().blocks().get(&frame.name) {
            sink.flush();
        }
        debug!("Captured block '{}'", frame.name);
        self.set_destination(frame.previous);
        Ok(())
    }

    /// Write the captured text of block `name`; nothing if never captured.
    pub fn replay_block(&mut self, name: &str) -> RenderResult<()> {
        let captured = match self.output().blocks().get(name) {
            Some(sink) if !sink.is_empty() => sink.read(),
            _ => {
                debug!("Block '{}' has no captured content", name);
                return Ok(());
            }
        };
        self.emit(&captured)
    }

    pub fn begin_extends(&mut self, attrs: Attributes) {
        self.stacks_mut().extends.push(ExtendsFrame { attrs });
    }

    /// Close `<extends>` and render its base template.
    pub fn finish_extends(&mut self) -> RenderResult<()> {
        let frame = self.stacks_mut().extends.pop()?;
        let base = frame
            .attrs
            .get("base")
            .unwrap_or(self.engine().config().default_base.as_str())
            .to_string();
        if self.is_deferring_extends() {
            debug!("Deferring base template '{}'", base);
            self.set_deferred_base(base);
            return Ok(());
        }
        self.render_with_blocks(&base)
    }

    /// Render `base` into the current destination with the blocks captured
    /// so far.
    pub fn render_with_blocks(&mut self, base: &str) -> RenderResult<()> {
        debug!(
            "Rendering base '{}' with {} captured blocks",
            base,
            self.output().blocks().len()
        );
        self.include(base)
    }
}

pub(crate) fn block_capture_start() -> Handler {
    Handler::open(open_fn(|renderer, attrs| {
        let name = Renderer::require("block", &attrs, "name")?;
        renderer.begin_block(name);
        Ok(None)
    }))
}

pub(crate) fn block_capture_end() -> Handler {
    Handler::close(close_fn(|renderer| {
        renderer.end_block()?;
        Ok(None)
    }))
}

pub(crate) fn block_replay() -> Handler {
    Handler::open(open_fn(|renderer, attrs| {
        let name = Renderer::require("block", &attrs, "name")?;
        renderer.replay_block(name)?;
        Ok(None)
    }))
}

pub(crate) fn extends_start() -> Handler {
    Handler::open(open_fn(|renderer, attrs| {
        renderer.begin_extends(attrs);
        Ok(None)
    }))
}

pub(crate) fn extends_end() -> Handler {
    Handler::close(close_fn(|renderer| {
        renderer.finish_extends()?;
        Ok(None)
    }))
}

impl Engine {
    /// Render a child template only to collect its blocks.
    ///
    /// Output outside blocks is discarded and the base named by
    /// `<extends>` is returned instead of rendered.
    pub fn capture_blocks<S: AsRef<str>>(
        &self,
        template: &[S],
        context: &mut Context,
    ) -> RenderResult<CapturedTemplate> {
        let path = self.loader().resolve(template);
        info!("Capturing blocks from {:?}", path);
        let source = self.loader().read(&path)?;

        let mut discard = std::io::sink();
        let mut output = Output::new(&mut discard, BlockRegistry::new());
        let base = {
            let mut renderer =
                Renderer::new(self, context, &mut output, Destination::Root).defer_extends(true);
            renderer.feed(&source)?;
            renderer.deferred_base().map(str::to_string)
        };
        Ok(CapturedTemplate {
            blocks: output.into_blocks(),
            base,
        })
    }

    /// Render the base template `base` against previously captured blocks.
    pub fn render_with_blocks(
        &self,
        base: &str,
        context: &mut Context,
        blocks: BlockRegistry,
        out: &mut dyn Write,
    ) -> RenderResult<BlockRegistry> {
        info!("Rendering base '{}' with {} blocks", base, blocks.len());
        let mut output = Output::new(out, blocks);
        {
            let mut renderer = Renderer::new(self, context, &mut output, Destination::Root);
            renderer.render_with_blocks(base)?;
        }
        output.flush()?;
        Ok(output.into_blocks())
    }
}
