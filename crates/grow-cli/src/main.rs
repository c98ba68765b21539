//! CLI frontend for the grow interactive fiction engine.

mod commands;
mod prefs;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grow",
    about = "grow: interactive fiction you write while you play",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the last adventure, or start a new one
    Play {
        /// grow home directory (default: the saved root)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// RNG seed for reproducible responses
        #[arg(short, long)]
        seed: Option<u64>,

        /// Text-only front end (the only one available)
        #[arg(long)]
        text: bool,
    },

    /// Show or change the saved grow home directory
    Root {
        #[command(subcommand)]
        action: RootAction,
    },

    /// Validate an adventure file
    Check {
        /// Adventure file to check
        file: PathBuf,
    },

    /// List the adventures in the grow home directory
    List {
        /// grow home directory (default: the saved root)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RootAction {
    /// Save a new home directory
    Set {
        /// Directory to use
        dir: PathBuf,
    },
    /// Go back to the default home directory
    Reset,
    /// Print the home directory
    Show,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GROW_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { root, seed, text } => commands::play::run(root.as_deref(), seed, text),
        Commands::Root { action } => match action {
            RootAction::Set { dir } => commands::root::set(&dir),
            RootAction::Reset => commands::root::reset(),
            RootAction::Show => commands::root::show(),
        },
        Commands::Check { file } => commands::check::run(&file),
        Commands::List { root } => commands::list::run(root.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
