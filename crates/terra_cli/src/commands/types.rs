//! Types command - List registered resource types.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::OutputFormat;

#[derive(Args)]
pub struct TypesArgs {
    /// Only list types of this provider
    #[arg(short, long)]
    provider: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct TypeRow<'a> {
    type_id: &'a str,
    provider: &'a str,
    terraform_type: Option<&'a str>,
    required: Vec<&'a str>,
}

pub fn execute(args: TypesArgs) -> Result<()> {
    let catalog = terra_azure::catalog();

    let rows: Vec<TypeRow<'_>> = catalog
        .types
        .all_types()
        .into_values()
        .filter(|reg| args.provider.as_deref().map_or(true, |p| reg.provider == p))
        .map(|reg| TypeRow {
            type_id: &reg.type_id,
            provider: &reg.provider,
            terraform_type: reg.terraform_type.as_deref(),
            required: reg
                .schema
                .iter()
                .filter(|p| p.required)
                .map(|p| p.key.as_str())
                .collect(),
        })
        .collect();

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).context("Failed to serialize types")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("📦 Resource types ({}):", rows.len());
            for row in &rows {
                println!(
                    "   {:<45} {}",
                    row.type_id,
                    row.terraform_type.unwrap_or("(virtual)")
                );
            }
        }
    }

    Ok(())
}
