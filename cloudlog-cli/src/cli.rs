//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cloudlog_core::types::Provider;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "cloudlog.toml";

/// cloudlog -- collect, query and analyze cloud provider logs.
///
/// Use `cloudlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "cloudlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the cloudlog.toml configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect logs from a cloud provider and index them.
    Collect(CollectArgs),

    /// Search indexed logs.
    Query(QueryArgs),

    /// Show record counts grouped by a field.
    Stats(StatsArgs),

    /// Analyze logs for error patterns, anomalies or volume over time.
    Analyze(AnalyzeArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- collect ----

/// Cloud providers accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Aws,
    Azure,
    Gcp,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Aws => Provider::Aws,
            ProviderArg::Azure => Provider::Azure,
            ProviderArg::Gcp => Provider::Gcp,
        }
    }
}

/// Collect logs from a provider export (or sample data) into the store.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Cloud provider to collect from.
    pub provider: ProviderArg,

    /// AWS log group name.
    #[arg(long)]
    pub log_group: Option<String>,

    /// Azure Log Analytics workspace ID.
    #[arg(long)]
    pub workspace_id: Option<String>,

    /// GCP project ID.
    #[arg(long)]
    pub project: Option<String>,

    /// Hours to fetch, counting back from now (default: collector.default_hours).
    #[arg(long)]
    pub hours: Option<u64>,

    /// Provider CLI export file (default: {collector.export_dir}/{provider}.json).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Fail instead of falling back to sample data.
    #[arg(long)]
    pub no_fallback: bool,
}

impl CollectArgs {
    /// Target identifier matching the selected provider.
    pub fn target(&self) -> Option<&str> {
        match self.provider {
            ProviderArg::Aws => self.log_group.as_deref(),
            ProviderArg::Azure => self.workspace_id.as_deref(),
            ProviderArg::Gcp => self.project.as_deref(),
        }
    }
}

// ---- query ----

/// Search indexed logs, newest first.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Case-insensitive text to search for in messages.
    #[arg(long)]
    pub text: Option<String>,

    /// Time range counting back from now (e.g. 30m, 24h, 7d). Omit to search everything.
    #[arg(long)]
    pub last: Option<String>,

    /// Maximum number of results (default: storage.search_limit).
    #[arg(long)]
    pub limit: Option<usize>,
}

// ---- stats ----

/// Count records grouped by a field.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Field to group by (level, provider, source or any raw key).
    #[arg(long, default_value = "level")]
    pub group_by: String,

    /// Time range counting back from now.
    #[arg(long, default_value = "24h")]
    pub last: String,
}

// ---- analyze ----

/// Kinds of analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisType {
    /// Most frequent error signatures.
    Errors,
    /// High error rate and repeated errors.
    Anomalies,
    /// Record counts per time bucket.
    Timeline,
}

/// Analyze indexed logs.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Analysis to run.
    #[arg(long = "type", default_value = "errors")]
    pub kind: AnalysisType,

    /// Time range counting back from now.
    #[arg(long, default_value = "7d")]
    pub last: String,

    /// Bucket width for the timeline (e.g. 15m, 1h, 1d; default: analysis.bucket_width).
    #[arg(long)]
    pub interval: Option<String>,
}

// ---- config ----

/// Manage cloudlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, storage, collector, analysis).
        #[arg(long)]
        section: Option<String>,
    },
}
