//! Poset CLI — runs scripts of partial-order operations.

mod commands;
mod manifest;
mod script;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::run::RunOptions;
use manifest::OutputFormat;

#[derive(Parser)]
#[command(name = "poset", version, about = "Mutable partial orders over labelled elements")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script of poset operations
    Run {
        /// Script file (default: read from stdin)
        file: Option<PathBuf>,
        /// Write the diagnostic trace to stderr
        #[arg(long)]
        trace: bool,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Print the effective configuration
    Config,
    /// Write a default poset.toml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Run {
            file,
            trace,
            format,
        } => commands::run::run(
            &cwd,
            &RunOptions {
                input: file.as_deref(),
                trace,
                format,
            },
        ),
        Commands::Config => commands::config::run(&cwd),
        Commands::Init => commands::init::run(&cwd),
    }
}
