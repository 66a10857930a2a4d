use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, items, migrate, profile, Context};
use reeltrack_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reeltrack")]
#[command(about = "reeltrack - Keep watchlists consistent across schema generations")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON database file (overrides store.path from the config)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Also write logs to this file, rotated daily
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Also write logs to the default log file in the data directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetStatus {
    Watchlist,
    Watching,
    Watched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Tv,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a user's collection from legacy status strings to status flags
    #[command(long_about = "Recompute inWatchlist/inProgress/watched for every item of a user and write them, together with the legacy status string, in one atomic update. By default flags are always recomputed from the legacy status so earlier bad migrations get corrected.")]
    Migrate {
        /// User id
        #[arg(long)]
        user: String,

        /// Recompute flags even for items that already have them
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_force")]
        force: bool,

        /// Keep the flags of fully flagged items (applying mutual exclusion);
        /// items with some or no flags are still recomputed from the legacy status
        #[arg(long, action = ArgAction::SetTrue)]
        no_force: bool,

        /// Show what would be written without writing anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// List a user's items with their status
    List {
        /// User id
        #[arg(long)]
        user: String,
    },
    /// Show one item, its stored fields and its reconciled status
    Show {
        #[arg(long)]
        user: String,

        #[arg(long)]
        item: String,
    },
    /// Change an item's status
    Set {
        #[arg(long)]
        user: String,

        #[arg(long)]
        item: String,

        /// New status
        #[arg(long, value_enum)]
        to: TargetStatus,

        /// Completion count to record when marking as watched
        #[arg(long, value_name = "N")]
        times: Option<u64>,
    },
    /// Add an item to a user's watchlist
    Add {
        #[arg(long)]
        user: String,

        /// Item id, usually the catalog id
        #[arg(long)]
        item: String,

        #[arg(long)]
        title: String,

        #[arg(long, value_enum, default_value = "movie")]
        kind: KindArg,

        /// Total episode count (tv only)
        #[arg(long, value_name = "N")]
        episodes: Option<u64>,
    },
    /// Remove an item from a user's collection
    Remove {
        #[arg(long)]
        user: String,

        #[arg(long)]
        item: String,
    },
    /// Show a user's public profile
    Profile {
        #[arg(long)]
        user: String,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = log_destination(cli.log_file.clone(), cli.log, &PathManager::default());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show);
            config::run_config(cmd, cli.config, cli.db, &output).await
        }
        command => {
            let ctx = Context::load(cli.config, cli.db)?;
            run_data_command(command, &ctx, &output).await
        }
    }
}

/// Log file to write to, if any. `--log` picks the default location.
fn log_destination(log_file: Option<PathBuf>, log: bool, paths: &PathManager) -> Option<PathBuf> {
    log_file.or_else(|| log.then(|| paths.log_file()))
}

async fn run_data_command(
    command: Commands,
    ctx: &Context,
    output: &output::Output,
) -> color_eyre::Result<()> {
    match command {
        Commands::Migrate { user, force, no_force, dry_run } => {
            let force = if force {
                true
            } else if no_force {
                false
            } else {
                ctx.config.migration.force
            };
            migrate::run_migrate(ctx, &user, force, dry_run, output).await
        }
        Commands::List { user } => items::run_list(ctx, &user, output).await,
        Commands::Show { user, item } => items::run_show(ctx, &user, &item, output).await,
        Commands::Set { user, item, to, times } => {
            items::run_set(ctx, &user, &item, to, times, output).await
        }
        Commands::Add { user, item, title, kind, episodes } => {
            items::run_add(ctx, &user, &item, title, kind, episodes, output).await
        }
        Commands::Remove { user, item } => items::run_remove(ctx, &user, &item, output).await,
        Commands::Profile { user } => profile::run_profile(ctx, &user, output).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_destination() {
        let paths = PathManager::with_base(PathBuf::from("/srv/reeltrack"));
        let explicit = PathBuf::from("/var/log/rt.log");

        assert_eq!(log_destination(None, false, &paths), None);
        assert_eq!(
            log_destination(None, true, &paths),
            Some(PathBuf::from("/srv/reeltrack/logs/reeltrack.log"))
        );
        assert_eq!(log_destination(Some(explicit.clone()), false, &paths), Some(explicit));
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("reeltrack").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_parses_migrate_flags() {
        let cli = parse(&["migrate", "--user", "u1", "--no-force", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Migrate { user, force, no_force, dry_run } => {
                assert_eq!(user, "u1");
                assert!(!force && no_force && dry_run);
            }
            _ => panic!("expected migrate"),
        }

        assert!(parse(&["migrate", "--user", "u1", "--force", "--no-force"]).is_err());
        assert!(parse(&["list", "--user", "u1", "--log", "--log-file", "x.log"]).is_err());
    }
}
