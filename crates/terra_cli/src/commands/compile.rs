//! Compile command - Turn a diagram snapshot into Terraform files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use terra_hcl::{CompiledConfig, DiagramCompiler, DiagramSnapshot, Finding, ProjectConfig, Severity};

use super::OutputFormat;

#[derive(Args)]
pub struct CompileArgs {
    /// Diagram snapshot file (.json, .yaml or .yml)
    snapshot: PathBuf,

    /// Project configuration file overriding the snapshot's embedded project
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Write Terraform files to this directory instead of printing the document
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct CompileReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a str>,
    files: Vec<String>,
    findings: &'a [Finding],
    has_errors: bool,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    info!("Compiling diagram: {:?}", args.snapshot);

    let snapshot = load_snapshot(&args.snapshot, args.project.as_deref())?;
    let catalog = terra_azure::catalog();
    let compiled = DiagramCompiler::new(&catalog)
        .compile(&snapshot)
        .context("Failed to compile diagram")?;

    let files = match &args.out {
        Some(dir) => compiled
            .write_to(dir)
            .with_context(|| format!("Failed to write Terraform files to {:?}", dir))?,
        None => Vec::new(),
    };

    match args.format {
        OutputFormat::Json => print_json(&compiled, &files, args.out.is_none())?,
        OutputFormat::Text => print_text(&compiled, &files, args.out.is_none()),
    }

    let errors = compiled.findings.count(Severity::Error);
    if errors > 0 {
        anyhow::bail!("Compilation produced {} error finding(s)", errors);
    }
    Ok(())
}

fn load_snapshot(path: &Path, project: Option<&Path>) -> Result<DiagramSnapshot> {
    let mut snapshot = DiagramSnapshot::from_file(path)
        .with_context(|| format!("Failed to read diagram snapshot {:?}", path))?;

    if let Some(project_path) = project {
        info!("Loading project configuration from {:?}", project_path);
        snapshot.project = ProjectConfig::from_file(project_path)
            .with_context(|| format!("Failed to read project configuration {:?}", project_path))?;
    }
    Ok(snapshot)
}

fn print_json(compiled: &CompiledConfig, files: &[PathBuf], with_document: bool) -> Result<()> {
    let report = CompileReport {
        document: with_document.then_some(compiled.document.as_str()),
        files: files.iter().map(|p| p.display().to_string()).collect(),
        findings: &compiled.findings.items,
        has_errors: compiled.has_errors(),
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

fn print_text(compiled: &CompiledConfig, files: &[PathBuf], with_document: bool) {
    if with_document {
        print!("{}", compiled.document);
    } else {
        println!("✅ Wrote {} files", files.len());
        for file in files {
            println!("   📄 {}", file.display());
        }
    }

    if compiled.findings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("Findings:");
    for finding in compiled.findings.iter() {
        let marker = match finding.severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        eprintln!("   {} {}", marker, finding);
    }
    eprintln!(
        "   {} errors, {} warnings, {} info",
        compiled.findings.count(Severity::Error),
        compiled.findings.count(Severity::Warning),
        compiled.findings.count(Severity::Info)
    );
}
