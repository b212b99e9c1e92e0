//! Build command - Render a directory of pages.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use tagsmith_render::SiteBuilder;

use super::SiteArgs;

#[derive(Args)]
pub struct BuildArgs {
    /// Directory of pages, relative to the root
    #[arg(long, default_value = ".")]
    pub pages: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,

    /// Fail when any page fails to render
    #[arg(long)]
    pub strict: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    #[command(flatten)]
    pub site: SiteArgs,
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let engine = args.site.engine()?;
    let seed = args.site.context(&engine);

    let report = SiteBuilder::new(&engine)
        .with_seed(seed)
        .build(&args.pages, &args.out)
        .with_context(|| format!("Failed to build pages into {}", args.out.display()))?;

    info!("Wrote {} pages to {:?}", report.rendered.len(), args.out);
    if args.format == "json" {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize build report")?;
        println!("{}", json);
    } else {
        for path in &report.rendered {
            println!("{}", path.display());
        }
        for warning in &report.warnings {
            eprintln!("warning: {}", warning);
        }
    }

    if args.strict && !report.is_clean() {
        anyhow::bail!("{} pages failed to render", report.warnings.len());
    }

    Ok(())
}
