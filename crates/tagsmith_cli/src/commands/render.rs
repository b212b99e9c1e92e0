//! Render command - Render one template to stdout.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use super::SiteArgs;

#[derive(Args)]
pub struct RenderArgs {
    /// Template path below the root, given as one or more segments
    #[arg(required = true, value_name = "PATH")]
    pub path: Vec<String>,

    #[command(flatten)]
    pub site: SiteArgs,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let engine = args.site.engine()?;
    let mut context = args.site.context(&engine);
    info!("Rendering {} with {} context entries", args.path.join("/"), context.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    engine
        .render(&args.path, &mut context, &mut out)
        .with_context(|| format!("Failed to render {}", args.path.join("/")))?;
    out.flush()?;

    Ok(())
}
