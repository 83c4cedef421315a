//! `partkeep export` command - Write all parts to a CSV spreadsheet

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::cli::helpers::Workspace;
use crate::cli::GlobalOpts;
use crate::core::export::write_csv;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file, or `-` for stdout
    #[arg(long, short = 'o', default_value = "products.csv")]
    pub output: PathBuf,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let parts = ws.inventory.export_rows()?;

    if args.output.as_os_str() == "-" {
        write_csv(&parts, io::stdout().lock()).into_diagnostic()?;
        return Ok(());
    }

    let file = File::create(&args.output)
        .map_err(|e| miette::miette!("cannot create {}: {}", args.output.display(), e))?;
    let count = write_csv(&parts, BufWriter::new(file)).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Exported {} part(s) to {}",
            style("✓").green(),
            style(count).cyan(),
            style(args.output.display()).cyan()
        );
    }
    Ok(())
}
