use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use habits_sync::cache::DirCache;
use habits_sync::dates::{self, SystemClock};
use habits_sync::io::{MountedDrive, SqliteStatsOpener, WorkbookPublisher};
use habits_sync::sync::{SyncRequest, SyncService};
use habits_sync::{Result, logging};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init_logging(cli.log_level.as_deref())?;
    match cli.command {
        Command::Sync(args) => execute_sync(args),
    }
}

fn execute_sync(args: SyncArgs) -> Result<()> {
    let window = dates::resolve(
        args.from.as_deref(),
        args.to.as_deref(),
        args.quarter,
        &SystemClock,
    )?;

    let request = SyncRequest {
        prefix: args.prefix,
        window,
        spreadsheet: args.spreadsheet,
        sheet: args.sheet,
    };

    let drive = MountedDrive::new(args.drive);
    let publisher = WorkbookPublisher::new(drive.clone());
    let cache = DirCache::new(&args.cache_dir);
    let stats = SqliteStatsOpener::new(&args.cache_dir);

    let stdout = std::io::stdout();
    // Progress lines would corrupt the JSON document.
    let progress: Box<dyn Write> = if args.json {
        Box::new(std::io::sink())
    } else {
        Box::new(stdout.lock())
    };

    let mut service = SyncService::new(&drive, &publisher, &cache, &stats, progress);
    let report = service.handle(&request)?;

    if args.json {
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    }
    Ok(())
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("habits-sync")
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Publish Loop Habit Tracker completion counts to a spreadsheet."
)]
struct Cli {
    /// Log filter such as `info` or `habits_sync=debug`. `RUST_LOG` wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import the newest backup into a spreadsheet sheet.
    Sync(SyncArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Local folder mirroring the cloud drive.
    #[arg(long, env = "HABITS_SYNC_DRIVE")]
    drive: PathBuf,

    /// Directory where downloaded backups are kept.
    #[arg(long, env = "HABITS_SYNC_CACHE_DIR", default_value_os_t = default_cache_dir())]
    cache_dir: PathBuf,

    /// Name prefix of the backup files.
    #[arg(long, default_value = "Loop Habits Backup")]
    prefix: String,

    /// First day to import, as YYYY-MM-DD. Requires --to.
    #[arg(long)]
    from: Option<String>,

    /// Last day to import, as YYYY-MM-DD. Requires --from.
    #[arg(long)]
    to: Option<String>,

    /// Quarter of the current year to import (1-4). Overrides --from/--to.
    #[arg(long, allow_negative_numbers = true)]
    quarter: Option<i32>,

    /// Name of the destination spreadsheet.
    #[arg(long)]
    spreadsheet: String,

    /// Sheet to overwrite inside the spreadsheet.
    #[arg(long)]
    sheet: String,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    json: bool,
}
