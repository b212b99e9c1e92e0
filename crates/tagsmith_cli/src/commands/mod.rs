//! CLI command definitions.
//!
//! Each subcommand wraps one entry point of the render engine. Options
//! shared by every subcommand live in [`SiteArgs`].

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use tagsmith_render::{Context, Engine, RenderConfig};

pub mod blocks;
pub mod build;
pub mod render;

/// tagsmith - tag-expanding static page renderer
#[derive(Parser)]
#[command(name = "tagsmith")]
#[command(version, about = "tagsmith - tag-expanding static page renderer")]
#[command(long_about = r#"
tagsmith renders HTML templates in which custom tags expand into plain
markup, with {{name}} placeholders, includes and template inheritance.

COMMANDS:
  render   → Render one template to stdout
  blocks   → Show the blocks a child template captures
  build    → Render every page of a directory into an output tree

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template to stdout
    Render(render::RenderArgs),

    /// List the blocks captured by a child template
    Blocks(blocks::BlocksArgs),

    /// Render a directory of pages
    Build(build::BuildArgs),
}

/// Site location, configuration and context options.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site root that template paths resolve against
    #[arg(long, env = "TAGSMITH_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (default: tagsmith.yaml in the root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Context variable, may be repeated
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Do not seed the context from environment variables
    #[arg(long)]
    pub no_env: bool,
}

impl SiteArgs {
    /// Build an engine from the discovered config with CLI overrides.
    pub fn engine(&self) -> Result<Engine> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut config = RenderConfig::discover(self.config.as_deref(), &root)
            .context("Failed to load configuration")?;
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if self.no_env {
            config.include_env = false;
        }
        debug!("Using config: {:?}", config);
        Engine::new(config).context("Failed to initialize render engine")
    }

    /// Seed a context from `QUERY_STRING`, the environment and `--param`.
    pub fn context(&self, engine: &Engine) -> Context {
        let query = std::env::var("QUERY_STRING").ok();
        engine.seed_context(query.as_deref(), self.params.clone())
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("title=Hello=World").unwrap(),
            ("title".to_string(), "Hello=World".to_string())
        );
        assert!(parse_param("title").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from([
            "tagsmith", "render", "docs", "index.html", "--root", "/srv", "-p", "a=b", "--no-env",
        ])
        .unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.path, vec!["docs", "index.html"]);
                assert_eq!(args.site.root, Some(PathBuf::from("/srv")));
                assert_eq!(args.site.params, vec![("a".to_string(), "b".to_string())]);
                assert!(args.site.no_env);
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_build_args() {
        let cli = Cli::try_parse_from([
            "tagsmith", "build", "--pages", "pages", "-o", "public", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.pages, PathBuf::from("pages"));
                assert_eq!(args.out, PathBuf::from("public"));
                assert_eq!(args.format, "json");
                assert!(!args.strict);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_render_requires_path() {
        assert!(Cli::try_parse_from(["tagsmith", "render"]).is_err());
    }
}
