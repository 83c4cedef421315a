//! `partkeep check` command - Audit attachment lists against the upload folder

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Finding;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Only report missing files, not unreferenced ones
    #[arg(long)]
    pub no_orphans: bool,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut report = ws.inventory.check()?;
    if args.no_orphans {
        report
            .findings
            .retain(|f| !matches!(f, Finding::OrphanFile { .. }));
    }

    let format = ws.format(global, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&report).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            for finding in &report.findings {
                let marker = match finding {
                    Finding::OrphanFile { .. } => style("?").yellow(),
                    _ => style("✗").red(),
                };
                println!("{} {}", marker, finding);
            }
            if !global.quiet {
                if !report.findings.is_empty() {
                    println!();
                }
                println!(
                    "Checked {} part(s) and {} file(s)",
                    style(report.parts_checked).cyan(),
                    style(report.files_checked).cyan()
                );
            }
        }
    }

    if report.is_clean() {
        if !global.quiet && !matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
            println!("{} No problems found", style("✓").green());
        }
        Ok(())
    } else {
        Err(miette::miette!(
            "{} problem(s) found",
            report.findings.len()
        ))
    }
}
