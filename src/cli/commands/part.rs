//! `partkeep part` command - Part management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::helpers::{escape_csv, print_skipped, truncate_str, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::attachments::{AttachmentDescriptor, IncomingFile};
use crate::core::{Category, PartOutcome, PartPage, PartQuery, SortColumn, SortOrder, Uploads};
use crate::entities::part::{Part, PartChanges, PartFields};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List parts with search, sorting and paging
    List(ListArgs),

    /// Create a new part
    Add(AddArgs),

    /// Show a part's details and attachments
    Show(ShowArgs),

    /// Change a part's fields and add attachments
    Update(UpdateArgs),

    /// Add files to one attachment category
    Attach(AttachArgs),

    /// Remove one attachment and delete its file
    Detach(DetachArgs),

    /// Delete a part and its attachment folder
    Delete(DeleteArgs),

    /// Print the path of a part's attachment folder
    Folder(FolderArgs),
}

/// Attachment category
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliCategory {
    Photos,
    Drawings,
    Cad,
    Cnc,
    Invoice,
}

impl From<CliCategory> for Category {
    fn from(c: CliCategory) -> Self {
        match c {
            CliCategory::Photos => Category::Photos,
            CliCategory::Drawings => Category::Drawings,
            CliCategory::Cad => Category::Cad,
            CliCategory::Cnc => Category::Cnc,
            CliCategory::Invoice => Category::Invoice,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliSortOrder {
    Asc,
    Desc,
}

impl From<CliSortOrder> for SortOrder {
    fn from(o: CliSortOrder) -> Self {
        match o {
            CliSortOrder::Asc => SortOrder::Asc,
            CliSortOrder::Desc => SortOrder::Desc,
        }
    }
}

/// Editable part attributes shared by `add` and `update`
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Part name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Free-text description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Unit cost (stored as entered)
    #[arg(long)]
    pub cost: Option<String>,

    /// Quantity on hand
    #[arg(long)]
    pub qty: Option<i64>,

    /// Material specification
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// Stock size of the raw material
    #[arg(long)]
    pub material_size: Option<String>,

    /// Raw material cost
    #[arg(long)]
    pub material_cost: Option<String>,

    /// Surface finish (anodize, paint, ...)
    #[arg(long)]
    pub finishing_type: Option<String>,

    /// Finishing cost
    #[arg(long)]
    pub finishing_cost: Option<String>,
}

/// Files to upload, per category (each flag may be repeated)
#[derive(clap::Args, Debug, Default)]
pub struct UploadArgs {
    /// Photo to attach
    #[arg(long = "photo", value_name = "FILE")]
    pub photos: Vec<PathBuf>,

    /// 2D drawing to attach
    #[arg(long = "drawing", value_name = "FILE")]
    pub drawings: Vec<PathBuf>,

    /// 3D CAD model to attach
    #[arg(long = "cad", value_name = "FILE")]
    pub cad: Vec<PathBuf>,

    /// CNC program to attach
    #[arg(long = "cnc", value_name = "FILE")]
    pub cnc: Vec<PathBuf>,

    /// Invoice to attach
    #[arg(long = "invoice", value_name = "FILE")]
    pub invoice: Vec<PathBuf>,
}

impl UploadArgs {
    fn to_uploads(&self) -> Uploads {
        let files = |paths: &[PathBuf]| -> Vec<IncomingFile> {
            paths.iter().map(|p| IncomingFile::from_path(p)).collect()
        };
        Uploads {
            photos: files(&self.photos),
            drawings: files(&self.drawings),
            cad: files(&self.cad),
            cnc: files(&self.cnc),
            invoice: files(&self.invoice),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search part number, name, description and material
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort by column (part_no, part_name, qty, cost, created_at, updated_at, ...)
    #[arg(long, default_value = "updated_at")]
    pub sort: SortColumn,

    /// Sort direction
    #[arg(long, default_value = "desc")]
    pub order: CliSortOrder,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (default: page_size from config)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Part number (unique)
    #[arg(long, short = 'p')]
    pub part_no: String,

    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub uploads: UploadArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number or numeric id
    pub part: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Part number or numeric id
    pub part: String,

    /// New part number; the attachment folder moves with it
    #[arg(long, short = 'p')]
    pub part_no: Option<String>,

    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub uploads: UploadArgs,
}

#[derive(clap::Args, Debug)]
pub struct AttachArgs {
    /// Part number or numeric id
    pub part: String,

    /// Category to attach to
    #[arg(long, short = 'c')]
    pub category: CliCategory,

    /// Files to attach
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DetachArgs {
    /// Part number or numeric id
    pub part: String,

    /// Category the attachment belongs to
    #[arg(long, short = 'c')]
    pub category: CliCategory,

    /// Attachment name as shown by `partkeep part show`
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Part number or numeric id
    pub part: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct FolderArgs {
    /// Part number or numeric id
    pub part: String,
}

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Add(args) => run_add(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Update(args) => run_update(args, global),
        PartCommands::Attach(args) => run_attach(args, global),
        PartCommands::Detach(args) => run_detach(args, global),
        PartCommands::Delete(args) => run_delete(args, global),
        PartCommands::Folder(args) => run_folder(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let query = PartQuery {
        search: args.search.clone(),
        sort: args.sort,
        order: args.order.into(),
        page: args.page.max(1),
        limit: args.limit.unwrap_or_else(|| ws.config.page_size()).max(1),
    };
    let page = ws.inventory.list(&query)?;

    if args.count {
        println!("{}", page.total_count);
        return Ok(());
    }

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&PageDetail::new(&page)).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&PageDetail::new(&page)).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,part_no,part_name,qty,material,cost,attachments,updated_at");
            for part in &page.parts {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    part.id,
                    escape_csv(part.part_no()),
                    escape_csv(&part.fields.part_name),
                    part.fields.qty,
                    escape_csv(&part.fields.material),
                    escape_csv(&part.fields.cost),
                    total_attachments(part),
                    part.updated_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<6} {:<16} {:<28} {:>6} {:<16} {:>10} {:>5} {:<12}",
                style("ID").bold().dim(),
                style("PART #").bold(),
                style("NAME").bold(),
                style("QTY").bold(),
                style("MATERIAL").bold(),
                style("COST").bold(),
                style("FILES").bold(),
                style("UPDATED").bold()
            );
            println!("{}", "-".repeat(106));

            for part in &page.parts {
                println!(
                    "{:<6} {:<16} {:<28} {:>6} {:<16} {:>10} {:>5} {:<12}",
                    style(part.id).cyan(),
                    truncate_str(part.part_no(), 16),
                    truncate_str(&part.fields.part_name, 28),
                    part.fields.qty,
                    truncate_str(&part.fields.material, 16),
                    truncate_str(&part.fields.cost, 10),
                    total_attachments(part),
                    part.updated_at.format("%Y-%m-%d")
                );
            }

            if !global.quiet {
                println!();
                let shown = page.parts.len();
                println!(
                    "{} of {} part(s), page {}{}",
                    style(shown).cyan(),
                    style(page.total_count).cyan(),
                    page.current_page,
                    if page.has_more {
                        format!(" (more with --page {})", page.current_page + 1)
                    } else {
                        String::new()
                    }
                );
            }
        }
        OutputFormat::Id => {
            for part in &page.parts {
                println!("{}", part.part_no());
            }
        }
        OutputFormat::Md => {
            println!("| ID | Part # | Name | Qty | Material | Cost | Files |");
            println!("|---|---|---|---|---|---|---|");
            for part in &page.parts {
                println!(
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    part.id,
                    part.part_no(),
                    part.fields.part_name,
                    part.fields.qty,
                    part.fields.material,
                    part.fields.cost,
                    total_attachments(part)
                );
            }
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let f = args.fields;
    let fields = PartFields {
        part_no: args.part_no,
        part_name: f.name.unwrap_or_default(),
        description: f.description.unwrap_or_default(),
        cost: f.cost.unwrap_or_default(),
        qty: f.qty.unwrap_or_default(),
        material: f.material.unwrap_or_default(),
        material_size: f.material_size.unwrap_or_default(),
        material_cost: f.material_cost.unwrap_or_default(),
        finishing_type: f.finishing_type.unwrap_or_default(),
        finishing_cost: f.finishing_cost.unwrap_or_default(),
    };

    let outcome = ws.inventory.create(fields, &args.uploads.to_uploads())?;
    report_saved("Created", &outcome, global);
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let f = args.fields;
    let changes = PartChanges {
        part_no: args.part_no,
        part_name: f.name,
        description: f.description,
        cost: f.cost,
        qty: f.qty,
        material: f.material,
        material_size: f.material_size,
        material_cost: f.material_cost,
        finishing_type: f.finishing_type,
        finishing_cost: f.finishing_cost,
    };

    let outcome = ws
        .inventory
        .update(&args.part, &changes, &args.uploads.to_uploads())?;
    report_saved("Updated", &outcome, global);
    Ok(())
}

fn run_attach(args: AttachArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let category: Category = args.category.into();
    let files: Vec<_> = args.files.iter().map(|p| IncomingFile::from_path(p)).collect();

    let outcome = ws.inventory.attach(&args.part, category, &files)?;
    print_skipped(&outcome.skipped);

    let stored = files.len().saturating_sub(outcome.skipped.len());
    if !global.quiet {
        println!(
            "{} Attached {} file(s) to {} {}",
            style("✓").green(),
            style(stored).cyan(),
            style(outcome.part.part_no()).cyan(),
            category
        );
    }
    Ok(())
}

fn run_detach(args: DetachArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let category: Category = args.category.into();
    let removed = ws.inventory.detach(&args.part, category, &args.name)?;

    if !global.quiet {
        println!(
            "{} Removed {} from {}",
            style("✓").green(),
            style(&removed.name).cyan(),
            category
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let part = ws.inventory.get(&args.part)?;

    if !args.yes {
        let prompt = format!(
            "Delete part {} and all {} attachment(s)?",
            part.part_no(),
            total_attachments(&part)
        );
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let deleted = ws.inventory.delete(&args.part)?;
    if !global.quiet {
        println!(
            "{} Deleted part {}",
            style("✓").green(),
            style(deleted.part_no()).cyan()
        );
    }
    Ok(())
}

fn run_folder(args: FolderArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let path = ws.inventory.folder(&args.part)?;
    println!("{}", path.display());
    Ok(())
}

/// A part with its decoded attachments, for structured output
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartDetail<'a> {
    #[serde(flatten)]
    part: &'a Part,
    attachments: BTreeMap<&'static str, Vec<AttachmentDescriptor>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl<'a> PartDetail<'a> {
    fn new(part: &'a Part) -> Self {
        let mut attachments = BTreeMap::new();
        let mut warnings = Vec::new();
        for category in Category::ALL {
            let decoded = part.attachments(category);
            if let Some(warning) = decoded.warning {
                warnings.push(format!("{}: {}", category, warning));
            }
            attachments.insert(category.dir_name(), decoded.manifest.into_entries());
        }
        Self {
            part,
            attachments,
            warnings,
        }
    }
}

/// A listing page whose parts carry their decoded attachments
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageDetail<'a> {
    parts: Vec<PartDetail<'a>>,
    has_more: bool,
    total_count: u64,
    current_page: u32,
}

impl<'a> PageDetail<'a> {
    fn new(page: &'a PartPage) -> Self {
        Self {
            parts: page.parts.iter().map(PartDetail::new).collect(),
            has_more: page.has_more,
            total_count: page.total_count,
            current_page: page.current_page,
        }
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let part = ws.inventory.get(&args.part)?;
    let detail = PartDetail::new(&part);

    match ws.format(global, OutputFormat::Auto) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&detail).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&detail).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            println!("{}", part.part_no());
        }
        _ => {
            let f = &part.fields;
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Part Number").bold(),
                style(part.part_no()).cyan()
            );
            if !f.part_name.is_empty() {
                println!("{}: {}", style("Name").bold(), style(&f.part_name).yellow());
            }
            println!("{}: {}", style("ID").bold(), part.id);
            println!("{}: {}", style("Quantity").bold(), f.qty);
            if !f.cost.is_empty() {
                println!("{}: {}", style("Cost").bold(), f.cost);
            }
            println!("{}", style("─".repeat(60)).dim());

            if !f.material.is_empty() || !f.material_size.is_empty() || !f.material_cost.is_empty() {
                println!();
                println!("{}", style("Material:").bold());
                print_field("Material", &f.material);
                print_field("Size", &f.material_size);
                print_field("Cost", &f.material_cost);
            }

            if !f.finishing_type.is_empty() || !f.finishing_cost.is_empty() {
                println!();
                println!("{}", style("Finishing:").bold());
                print_field("Type", &f.finishing_type);
                print_field("Cost", &f.finishing_cost);
            }

            for category in Category::ALL {
                let Some(entries) = detail.attachments.get(category.dir_name()) else {
                    continue;
                };
                if entries.is_empty() {
                    continue;
                }
                println!();
                println!("{}", style(format!("{}:", category.label())).bold());
                for d in entries {
                    println!(
                        "  • {} {} {}",
                        d.name,
                        style(format!("({})", d.size)).dim(),
                        style(&d.content_type).dim()
                    );
                }
            }

            for warning in &detail.warnings {
                println!();
                println!("{} {}", style("!").yellow(), warning);
            }

            if !f.description.is_empty() {
                println!();
                println!("{}", style("Description:").bold());
                println!("{}", f.description);
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Created").dim(),
                part.created_at.format("%Y-%m-%d %H:%M"),
                style("Updated").dim(),
                part.updated_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("  {}: {}", style(label).dim(), value);
    }
}

fn total_attachments(part: &Part) -> usize {
    Category::ALL
        .iter()
        .map(|c| part.attachment_count(*c))
        .sum()
}

fn report_saved(verb: &str, outcome: &PartOutcome, global: &GlobalOpts) {
    print_skipped(&outcome.skipped);
    if global.quiet {
        return;
    }
    if global.format == OutputFormat::Id {
        println!("{}", outcome.part.part_no());
        return;
    }

    println!(
        "{} {} part {} (id {})",
        style("✓").green(),
        verb,
        style(outcome.part.part_no()).cyan(),
        outcome.part.id
    );
    for category in Category::ALL {
        let count = outcome.part.attachment_count(category);
        if count > 0 {
            println!("   {} {}: {}", style("•").dim(), category.label(), count);
        }
    }
}
