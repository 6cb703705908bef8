use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use codelist_manager::client::HttpDirectoryClient;
use codelist_manager::reconcile::{Mode, Reconciler};
use codelist_manager::{Result, ToolError, config};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Reconcile(args) => execute_reconcile(args),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn execute_reconcile(args: ReconcileArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(ToolError::MissingInput(args.config));
    }
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let config = config::load(&args.config)?;
    let client = HttpDirectoryClient::new(&config)?;
    let reconciler = Reconciler::new(&client, &config.backup_dir, args.mode.into());
    let report = reconciler.run(&args.input)?;

    for (name, outcome) in report.outcomes() {
        println!("{name}: {outcome}");
    }
    if !report.diagnostics().is_empty() {
        eprintln!("Please review the following messages:");
        for message in report.diagnostics() {
            eprintln!("{message}");
        }
    }

    let failed = report.failed_lists();
    if failed > 0 {
        return Err(ToolError::ListsFailed(failed));
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile spreadsheet-defined code lists against a directory service."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Snapshot the remote code lists, then update or recreate them from the
    /// input workbook.
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// Input workbook, one sheet per code list.
    #[arg(long)]
    input: PathBuf,

    /// JSON configuration file with credentials and the service URL.
    #[arg(long, default_value = "apimgr.conf")]
    config: PathBuf,

    /// Whether existing remote lists are updated in place or deleted and
    /// recreated.
    #[arg(long, value_enum, default_value_t = ModeArg::Update)]
    mode: ModeArg,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    /// Update entries in place; create lists that do not exist yet.
    Update,
    /// Delete every snapshotted list before recreating it (destructive).
    Replace,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Update => Mode::Update,
            ModeArg::Replace => Mode::Replace,
        }
    }
}
