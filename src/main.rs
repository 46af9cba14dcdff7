use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use goalstash::cli::{
    handle_backup_command, handle_goal_command, handle_transaction_command, BackupCommands,
    GoalCommands, TxnCommands,
};
use goalstash::config::paths::{AppPaths, DATA_DIR_ENV};
use goalstash::config::settings::Settings;
use goalstash::storage::Storage;

#[derive(Parser)]
#[command(
    name = "goalstash",
    author = "Kaylee Beyene",
    version,
    about = "Terminal savings-goal tracker",
    long_about = "goalstash tracks savings goals and the deposits and withdrawals made \
                  towards them, and keeps portable JSON or CSV backups of everything."
)]
struct Cli {
    /// Log verbosity (RUST_LOG takes precedence when set)
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// Directory holding settings, data and backups
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal management commands
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Deposit and withdrawal commands
    #[command(subcommand, alias = "transaction")]
    Txn(TxnCommands),

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => AppPaths::with_base_dir(dir),
        None => AppPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Goal(cmd)) => {
            handle_goal_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Txn(cmd)) => {
            handle_transaction_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing goalstash at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            storage.save_all()?;
            println!("Initialization complete!");
            println!();
            println!("Create your first goal with:");
            println!("  goalstash goal add \"Laptop\" 1000 --deadline 2030-01-01");
        }
        Some(Commands::Config) => {
            println!("goalstash Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Schema version:   {}", settings.schema_version);
            println!("  Backup format:    {}", settings.backup_format);
            println!(
                "  Backup retention: {} daily, {} monthly",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
        }
        None => {
            println!("goalstash - Terminal savings-goal tracker");
            println!();
            println!("Run 'goalstash --help' for usage information.");
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
