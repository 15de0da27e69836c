use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use newsletter_tools::build::{self, BuildOptions, SourceSelection};
use newsletter_tools::io::google::SheetTabs;
use newsletter_tools::{NewsletterError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    match cli.command.unwrap_or(Command::Build(cli.build)) {
        Command::Build(args) => execute_build(args),
        Command::InitTemplate(args) => execute_init_template(args),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| NewsletterError::Logging(err.to_string()))
}

fn execute_build(args: BuildArgs) -> Result<()> {
    let source = match args.google_sheet.as_deref().map(str::trim) {
        Some(reference) if !reference.is_empty() => SourceSelection::GoogleSheet {
            reference: reference.to_string(),
            tabs: SheetTabs {
                meta: args.google_meta_tab,
                points: args.google_points_tab,
                distribution: args.google_distribution_tab,
            },
        },
        _ => SourceSelection::Workbook(args.xlsx),
    };

    let report = build::build(&BuildOptions {
        source,
        output: args.out,
        keep_history: !args.no_history,
    })?;

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }
    println!("{report}");
    if let Some(snapshot) = &report.snapshot {
        println!("Source snapshot saved: {}", snapshot.display());
    }
    Ok(())
}

fn execute_init_template(args: InitTemplateArgs) -> Result<()> {
    if args.google_sheet.is_some() {
        return Err(NewsletterError::TemplateRequiresLocal);
    }
    build::init_template(&args.xlsx, args.force)?;
    println!("Template created: {}", args.xlsx.display());
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate a newsletter page from an Excel workbook or a published Google Sheet.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    build: BuildArgs,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the newsletter page (the default when no subcommand is given).
    Build(BuildArgs),
    /// Create a starter workbook and exit.
    InitTemplate(InitTemplateArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Input workbook path. Ignored when --google-sheet is set.
    #[arg(long, default_value = "newsletter_data.xlsx")]
    xlsx: PathBuf,

    /// Google Sheet URL or ID, used as the source instead of --xlsx.
    #[arg(long)]
    google_sheet: Option<String>,

    /// Tab holding the meta values in the Google Sheet.
    #[arg(long, default_value = "meta")]
    google_meta_tab: String,

    /// Tab holding the points in the Google Sheet.
    #[arg(long, default_value = "points")]
    google_points_tab: String,

    /// Tab holding the distribution in the Google Sheet (optional).
    #[arg(long, default_value = "distribution")]
    google_distribution_tab: String,

    /// Output HTML file path.
    #[arg(long, default_value = "newsletter.html")]
    out: PathBuf,

    /// Do not keep a copy of the source under history/.
    #[arg(long)]
    no_history: bool,

    /// Print the build report as JSON instead of the summary line.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct InitTemplateArgs {
    /// Workbook path to create.
    #[arg(long, default_value = "newsletter_data.xlsx")]
    xlsx: PathBuf,

    /// Overwrite an existing workbook.
    #[arg(long)]
    force: bool,

    /// Rejected: templates are only written to local workbooks.
    #[arg(long, hide = true)]
    google_sheet: Option<String>,
}
