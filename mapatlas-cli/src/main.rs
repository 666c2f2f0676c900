//! MapAtlas CLI - Command-line interface
//!
//! Builds a multi-resolution PNG tile pyramid from a manifest of map tiles.

mod commands;
mod error;
mod manifest;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::render::RenderArgs;
use error::CliError;
use runner::{init_logging, CliRunner};

#[derive(Parser)]
#[command(name = "mapatlas")]
#[command(version, about = "Assemble sparse map tiles into a PNG tile pyramid", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and export a tile pyramid
    Render {
        /// JSON manifest listing the input tiles
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output directory for depth/x/z.png files
        #[arg(short, long)]
        output: PathBuf,

        /// Edge length of output PNGs (power of two, default from config)
        #[arg(long)]
        size: Option<u32>,

        /// Export on a single thread
        #[arg(long)]
        serial: bool,

        /// Config file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli.command);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Render {
            manifest,
            output,
            size,
            serial,
            config,
        } => {
            let runner = CliRunner::new(config.as_deref())?;
            commands::render::run(
                RenderArgs {
                    manifest,
                    output,
                    size,
                    serial,
                },
                &runner,
            )
        }
        Commands::Config { command } => commands::config::run(command),
    }
}
