//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod collect;
pub mod config;
pub mod query;
pub mod stats;

use cloudlog_analyzer::{AnalyzerConfig, JsonlStore, LogAnalyzer};
use cloudlog_core::config::CloudlogConfig;

use crate::error::CliError;

/// Build an analyzer over the on-disk store described by `config`.
pub(crate) fn open_analyzer(config: &CloudlogConfig) -> Result<LogAnalyzer<JsonlStore>, CliError> {
    let store = JsonlStore::from_config(&config.storage);
    let analyzer_config = AnalyzerConfig::from_core(config)?;
    Ok(LogAnalyzer::new(store, analyzer_config)?)
}
