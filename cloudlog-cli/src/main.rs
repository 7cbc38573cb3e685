//! cloudlog -- command-line entry point
//!
//! Loads configuration, initializes tracing and dispatches to a command handler.
//! Every failure is reported on stderr and mapped to an exit code by [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod window;

use clap::Parser;

use cloudlog_core::config::CloudlogConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let loaded = commands::config::load_config(&cli.config).await;

    // `config validate` must still run (and report) when the file is invalid.
    let mut general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => CloudlogConfig::default().general,
    };
    if let Some(level) = cli.log_level.clone() {
        general.log_level = level;
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("warning: {}", e);
    }

    cloudlog_core::metrics::describe_all();
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Collect(args) => commands::collect::execute(args, &loaded?, &writer).await,
        Commands::Query(args) => commands::query::execute(args, &loaded?, &writer).await,
        Commands::Stats(args) => commands::stats::execute(args, &loaded?, &writer).await,
        Commands::Analyze(args) => commands::analyze::execute(args, &loaded?, &writer).await,
    }
}
