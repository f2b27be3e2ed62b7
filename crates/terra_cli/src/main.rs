//! TerraStudio CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Compilation produced error findings
//! - 5: I/O error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const COMPILE_FAILURE: u8 = 3;
    pub const IO_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Compile(args) => commands::compile::execute(args),
        Commands::Types(args) => commands::types::execute(args),
        Commands::Rules(args) => commands::rules::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so stdout carries only the generated document.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "terra=debug"
    } else if quiet {
        "terra=error"
    } else {
        "terra=info"
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in [level, "warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logging may already be initialized
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(hcl) = e.downcast_ref::<terra_hcl::HclError>() {
        return match hcl {
            terra_hcl::HclError::Io(_) => ExitCodes::IO_ERROR,
            terra_hcl::HclError::InvalidSnapshot(_)
            | terra_hcl::HclError::Json(_)
            | terra_hcl::HclError::Yaml(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("error finding") {
        ExitCodes::COMPILE_FAILURE
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_findings_failure() {
        let err = anyhow::anyhow!("Compilation produced 2 error finding(s)");
        assert_eq!(categorize_error(&err), ExitCodes::COMPILE_FAILURE);
    }

    #[test]
    fn test_categorize_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = anyhow::Error::new(terra_hcl::HclError::from(io)).context("Failed to read diagram snapshot");
        assert_eq!(categorize_error(&err), ExitCodes::IO_ERROR);
    }

    #[test]
    fn test_categorize_invalid_snapshot() {
        let err = anyhow::Error::new(terra_hcl::HclError::InvalidSnapshot("dangling edge".into()));
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }
}
