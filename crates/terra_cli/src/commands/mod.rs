//! CLI command definitions.
//!
//! Each subcommand lives in its own module with an `Args` struct and an
//! `execute` function.

use clap::{Parser, Subcommand, ValueEnum};

pub mod compile;
pub mod rules;
pub mod types;

/// TerraStudio - compile infrastructure diagrams to Terraform
#[derive(Parser)]
#[command(name = "terra")]
#[command(version, about = "TerraStudio - compile infrastructure diagrams to Terraform")]
#[command(long_about = r#"
TerraStudio compiles a diagram of typed infrastructure resources and the
connections between them into Terraform configuration.

COMMANDS:
  compile  → Compile a diagram snapshot (JSON or YAML) to HCL
  types    → List registered resource types
  rules    → List connection rules

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Compilation produced error findings
  5 - I/O error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a diagram snapshot into Terraform configuration
    Compile(compile::CompileArgs),

    /// List registered resource types
    Types(types::TypesArgs),

    /// List connection rules
    Rules(rules::RulesArgs),
}

/// Output format shared by all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
