//! Blocks command - Show what a child template captures.

use anyhow::{Context as _, Result};
use clap::Args;

use super::SiteArgs;

#[derive(Args)]
pub struct BlocksArgs {
    /// Child template path below the root, given as one or more segments
    #[arg(required = true, value_name = "PATH")]
    pub path: Vec<String>,

    /// Print each block's captured text
    #[arg(long)]
    pub show: bool,

    #[command(flatten)]
    pub site: SiteArgs,
}

pub fn execute(args: BlocksArgs) -> Result<()> {
    let engine = args.site.engine()?;
    let mut context = args.site.context(&engine);

    let captured = engine
        .capture_blocks(&args.path, &mut context)
        .with_context(|| format!("Failed to capture blocks from {}", args.path.join("/")))?;

    match &captured.base {
        Some(base) => println!("base: {}", base),
        None => println!("base: (none)"),
    }
    for name in captured.blocks.names() {
        let fragments = captured
            .blocks
            .get(name)
            .map(|sink| sink.fragments().len())
            .unwrap_or_default();
        println!("block {} ({} fragments)", name, fragments);
        if args.show {
            if let Some(sink) = captured.blocks.get(name) {
                for line in sink.read().lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    Ok(())
}
