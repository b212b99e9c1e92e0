//! The render engine: configuration, handler table and charrefs bundled
//! for repeated render calls.

use std::io::Write;

use tracing::{debug, info};

use crate::charrefs::CharrefTable;
use crate::config::RenderConfig;
use crate::context::{decode_value, parse_query_string, Context};
use crate::dispatch::HandlerTable;
use crate::error::RenderResult;
use crate::handlers;
use crate::loader::TemplateLoader;
use crate::renderer::Renderer;
use crate::sink::{BlockRegistry, Destination, Output};
use crate::substitute::Substitutor;

/// Renders templates against a fixed configuration.
///
/// An engine holds no per-render state; every render call gets its own
/// context, output and nesting stacks.
#[derive(Debug, Clone)]
pub struct Engine {
    config: RenderConfig,
    loader: TemplateLoader,
    table: HandlerTable,
    charrefs: CharrefTable,
    substitutor: Substitutor,
}

impl Engine {
    /// Build an engine with the standard tag catalog.
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        let charrefs = config.load_charrefs()?;
        let table = handlers::standard_table(&config);
        info!(
            "Engine ready: root={:?}, {} tags, {} charrefs",
            config.root,
            table.len(),
            charrefs.len()
        );
        Ok(Self::with_parts(config, table, charrefs))
    }

    /// Build an engine from explicit parts, e.g. a custom handler table.
    pub fn with_parts(config: RenderConfig, table: HandlerTable, charrefs: CharrefTable) -> Self {
        let loader = TemplateLoader::new(config.root.clone(), config.templates_dir.clone());
        Self {
            config,
            loader,
            table,
            charrefs,
            substitutor: Substitutor::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn loader(&self) -> &TemplateLoader {
        &self.loader
    }

    pub fn table(&self) -> &HandlerTable {
        &self.table
    }

    pub fn charrefs(&self) -> &CharrefTable {
        &self.charrefs
    }

    pub fn substitutor(&self) -> &Substitutor {
        &self.substitutor
    }

    /// Seed a context from a query string, explicit parameters and, when
    /// configured, the process environment.
    ///
    /// Explicit parameters override the environment, which overrides the
    /// query string.
    pub fn seed_context<I>(&self, query: Option<&str>, params: I) -> Context
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let pairs = query.map(parse_query_string).unwrap_or_default();
        let env: Vec<(String, String)> = if self.config.include_env {
            std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .collect()
        } else {
            Vec::new()
        };
        let mut context = Context::seed(pairs, env);
        for (name, value) in params {
            context.set(name, decode_value(&value));
        }
        context
    }

    /// Render the template at `template` (path segments below the root).
    ///
    /// Returns the blocks captured along the way.
    pub fn render<S: AsRef<str>>(
        &self,
        template: &[S],
        context: &mut Context,
        out: &mut dyn Write,
    ) -> RenderResult<BlockRegistry> {
        let path = self.loader.resolve(template);
        info!("Rendering {:?}", path);
        let source = self.loader.read(&path)?;
        self.render_source(&source, context, out)
    }

    /// Render template source held in memory.
    pub fn render_source(
        &self,
        source: &str,
        context: &mut Context,
        out: &mut dyn Write,
    ) -> RenderResult<BlockRegistry> {
        let mut output = Output::new(out, BlockRegistry::new());
        {
            let mut renderer = Renderer::new(self, context, &mut output, Destination::Root);
            renderer.feed(source)?;
        }
        output.flush()?;
        let blocks = output.into_blocks();
        debug!("Render finished with {} captured blocks", blocks.len());
        Ok(blocks)
    }

    /// Render template source to a string.
    pub fn render_str(&self, source: &str, context: &mut Context) -> RenderResult<String> {
        let mut buffer = Vec::new();
        self.render_source(source, context, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
