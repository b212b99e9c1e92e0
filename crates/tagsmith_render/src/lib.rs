//! # tagsmith_render
//!
//! Streaming tag-expansion engine for static pages.
//!
//! Templates are HTML-like markup in which custom tags (`<paragraph>`,
//! `<navlink>`, `<accordion>`, ...) expand into plain HTML while all other
//! markup passes through unchanged. On top of expansion the engine offers:
//!
//! - `{{name}}` variable and `{&name&}` character-reference placeholders
//! - `<set>` and `<include>` composition sharing one context
//! - `<extends>`/`<block>` template inheritance
//! - verbatim `<code>`/`<pre>` capture
//!
//! ## Example
//!
//! ```rust,no_run
//! use tagsmith_render::{Engine, RenderConfig};
//!
//! let engine = Engine::new(RenderConfig::new("htdocs")).unwrap();
//! let mut context = engine.seed_context(Some("title=Home"), Vec::new());
//!
//! let mut stdout = std::io::stdout();
//! engine.render(&["index.html"], &mut context, &mut stdout).unwrap();
//! ```

pub mod attributes;
pub mod charrefs;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod inheritance;
pub mod loader;
pub mod renderer;
pub mod sink;
pub mod site;
pub mod stacks;
pub mod substitute;
pub mod tokenizer;

pub use attributes::Attributes;
pub use charrefs::CharrefTable;
pub use config::{RenderConfig, CONFIG_FILE_NAME};
pub use context::{parse_query_string, Context, ContextEntry};
pub use dispatch::{Decoration, Handler, HandlerTable, Step};
pub use engine::Engine;
pub use error::{RenderError, RenderResult};
pub use inheritance::CapturedTemplate;
pub use loader::TemplateLoader;
pub use renderer::Renderer;
pub use sink::{BlockRegistry, Destination, Output, OutputSink};
pub use site::{BuildReport, SiteBuilder};
pub use stacks::FrameKind;
pub use substitute::Substitutor;
pub use tokenizer::{Token, Tokenizer};
