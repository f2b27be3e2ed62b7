//! Rules command - List connection rules.

use anyhow::{Context, Result};
use clap::Args;

use terra_hcl::{ConnectionRule, ReferenceSide};

use super::OutputFormat;

#[derive(Args)]
pub struct RulesArgs {
    /// Only list rules leaving this resource type
    #[arg(long)]
    source: Option<String>,

    /// Only list rules arriving at this resource type
    #[arg(long)]
    target: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub fn execute(args: RulesArgs) -> Result<()> {
    let catalog = terra_azure::catalog();

    let rules: Vec<&ConnectionRule> = catalog
        .rules
        .iter()
        .filter(|r| args.source.as_deref().map_or(true, |s| r.source_type == s))
        .filter(|r| args.target.as_deref().map_or(true, |t| r.target_type == t))
        .collect();

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rules).context("Failed to serialize rules")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("🔗 Connection rules ({}):", rules.len());
            for rule in &rules {
                println!(
                    "   {}[{}] -> {}[{}]{}",
                    rule.source_type,
                    rule.source_handle,
                    rule.target_type,
                    rule.target_handle,
                    describe_reference(rule)
                );
            }
        }
    }

    Ok(())
}

fn describe_reference(rule: &ConnectionRule) -> String {
    match &rule.creates_reference {
        Some(reference) => {
            let receiver = match reference.side {
                ReferenceSide::Source => "source",
                ReferenceSide::Target => "target",
            };
            format!(
                "  ({}.{} <- .{})",
                receiver,
                reference.property_key,
                reference.attribute()
            )
        }
        None => String::new(),
    }
}
