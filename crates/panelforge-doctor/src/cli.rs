#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::replay::{ReplayArgs, run_replay};
use crate::templates::{TemplatesArgs, run_templates};
use crate::validate::{ValidateArgs, run_validate};

#[derive(Debug, Parser)]
#[command(
    name = "panelforge-doctor",
    about = "Inspect templates, replay editing scripts and validate saved pages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the layout template catalog.
    Templates(TemplatesArgs),

    /// Run a JSON script of editor actions and print the resulting project.
    Replay(ReplayArgs),

    /// Load a page snapshot and report clamped or overlapping panels.
    Validate(ValidateArgs),
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_from_env() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Templates(args) => run_templates(args),
        Commands::Replay(args) => run_replay(args),
        Commands::Validate(args) => run_validate(args),
    }
}
