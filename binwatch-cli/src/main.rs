//! binwatch CLI - runs the waste-sorting kiosk.
//!
//! Thin wrapper over the `binwatch` library: argument parsing, logging setup
//! and signal handling live here, everything else in the library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "binwatch", version, about = "Watches disposal bins and announces sorting verdicts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the kiosk until interrupted
    Run {
        /// Configuration file (defaults to the user config directory)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, short)]
        verbose: bool,

        /// Tracking window in seconds, overriding tracking.window_secs
        #[arg(long)]
        window: Option<u64>,

        /// Use an offline classifier instead of the remote service
        #[arg(long)]
        dry_run: bool,

        /// Component reported by the offline classifier, as name=bin[:material].
        /// Implies --dry-run. May be repeated.
        #[arg(long = "item", value_name = "NAME=BIN")]
        items: Vec<String>,
    },

    /// Compare two images against the bin regions
    Detect {
        /// Earlier frame
        previous: PathBuf,

        /// Later frame
        current: PathBuf,

        /// Configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Send an image to the classifier and print its components
    Classify {
        /// Image of the item
        image: PathBuf,

        /// Configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Show the configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,

        /// Configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Where to write the file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            config,
            verbose,
            window,
            dry_run,
            items,
        } => commands::run::run(commands::run::RunArgs {
            config,
            verbose,
            window,
            dry_run,
            items,
        }),
        Commands::Detect {
            previous,
            current,
            config,
        } => commands::detect::run(&previous, &current, config.as_deref()),
        Commands::Classify { image, config } => commands::classify::run(&image, config.as_deref()),
        Commands::Config { command, config } => commands::config::run(command, config.as_deref()),
        Commands::Init { force, config } => commands::init::run(force, config.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_items() {
        let cli = Cli::try_parse_from([
            "binwatch", "run", "--window", "30", "--item", "can=recycling", "--item", "lid=garbage",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { window, items, dry_run, .. } => {
                assert_eq!(window, Some(30));
                assert_eq!(items.len(), 2);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_without_subcommand() {
        let cli = Cli::try_parse_from(["binwatch", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { command: None, .. }));
    }
}
