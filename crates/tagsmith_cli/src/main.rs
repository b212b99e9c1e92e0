//! tagsmith CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 4: Template error

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tagsmith_render::RenderError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args),
        Commands::Blocks(args) => commands::blocks::execute(args),
        Commands::Build(args) => commands::build::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr; stdout carries rendered pages.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "tagsmith=debug"
    } else if cli.quiet {
        "tagsmith=warn"
    } else {
        "tagsmith=info"
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(level.parse().expect("valid log directive"))
        .add_directive("warn".parse().expect("valid log directive"));

    let json = cli.json_logs.then(|| fmt::layer().json().with_writer(io::stderr));
    let text = (!cli.json_logs).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(io::stderr)
    });

    // Already initialized in tests; keep going.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.chain().find_map(|cause| cause.downcast_ref::<RenderError>()) {
        Some(RenderError::InvalidConfig(_)) => ExitCodes::INVALID_ARGS,
        Some(
            RenderError::TemplateNotFound { .. }
            | RenderError::MissingAttribute { .. }
            | RenderError::StackUnderflow(_),
        ) => ExitCodes::TEMPLATE_ERROR,
        Some(RenderError::Yaml(_) | RenderError::Json(_)) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::path::PathBuf;
    use tagsmith_render::FrameKind;

    #[test]
    fn test_template_errors_map_to_template_code() {
        let err: anyhow::Error = RenderError::TemplateNotFound {
            path: PathBuf::from("missing.html"),
        }
        .into();
        assert_eq!(categorize_error(&err), ExitCodes::TEMPLATE_ERROR);

        let wrapped = Err::<(), _>(RenderError::StackUnderflow(FrameKind::Section))
            .context("Failed to render page.html")
            .unwrap_err();
        assert_eq!(categorize_error(&wrapped), ExitCodes::TEMPLATE_ERROR);
    }

    #[test]
    fn test_config_errors_map_to_invalid_args() {
        let err: anyhow::Error = RenderError::InvalidConfig("bad".to_string()).into();
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }
}
