//! `cloudlog collect` command handler

use std::io::Write;

use chrono::{SecondsFormat, TimeDelta, Utc};
use serde::Serialize;
use tracing::{info, warn};

use cloudlog_analyzer::{Collector, JsonlStore};
use cloudlog_core::config::CloudlogConfig;
use cloudlog_core::pipeline::LogStore;
use cloudlog_core::types::{Provider, TimeWindow};

use crate::cli::CollectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `collect` command.
///
/// Reads the provider export for the requested window (falling back to
/// sample data when allowed), normalizes it and appends it to the store.
pub async fn execute(
    args: CollectArgs,
    config: &CloudlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let provider = Provider::from(args.provider);
    warn_foreign_targets(&args, provider);

    let hours = args.hours.unwrap_or(config.collector.default_hours);
    let window = collection_window(hours)?;
    let target = args.target().map(str::to_owned);

    let mut collector_config = config.collector.clone();
    if args.no_fallback {
        collector_config.fallback_to_sample = false;
    }
    let collector =
        Collector::from_config(provider, &collector_config, args.export, target.clone());

    info!(
        provider = %provider,
        target = target.as_deref().unwrap_or("-"),
        hours,
        "collecting logs"
    );
    let collected = collector.collect(&window).await?;

    let store = JsonlStore::from_config(&config.storage);
    let indexed = store.bulk_write(&collected.records).await?;

    let report = CollectReport {
        provider: provider.as_str().to_owned(),
        target,
        window_start: window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        window_end: window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        collected: collected.records.len(),
        indexed,
        fell_back: collected.fell_back,
    };
    writer.render(&report)?;

    Ok(())
}

fn collection_window(hours: u64) -> Result<TimeWindow, CliError> {
    if hours == 0 {
        return Err(CliError::Command("--hours must be greater than 0".to_owned()));
    }
    let span = i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .ok_or_else(|| CliError::Command(format!("--hours {} is too large", hours)))?;
    Ok(TimeWindow::ending_at(Utc::now(), span))
}

/// Target flags only apply to their own provider.
fn warn_foreign_targets(args: &CollectArgs, provider: Provider) {
    let flags = [
        ("--log-group", Provider::Aws, args.log_group.is_some()),
        ("--workspace-id", Provider::Azure, args.workspace_id.is_some()),
        ("--project", Provider::Gcp, args.project.is_some()),
    ];
    for (flag, owner, given) in flags {
        if given && owner != provider {
            warn!(flag, provider = %provider, "flag ignored for this provider");
        }
    }
}

/// Result of a collection run.
#[derive(Serialize)]
pub struct CollectReport {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub window_start: String,
    pub window_end: String,
    /// Records produced by the collector
    pub collected: usize,
    /// Records written to the store
    pub indexed: usize,
    /// Whether sample data replaced the provider export
    pub fell_back: bool,
}

impl Render for CollectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Indexed {} logs from {}",
            self.indexed.to_string().bold(),
            self.provider.bold()
        )?;
        if let Some(ref target) = self.target {
            writeln!(w, "  Target: {}", target)?;
        }
        writeln!(w, "  Window: {} .. {}", self.window_start, self.window_end)?;
        if self.fell_back {
            writeln!(
                w,
                "  {}",
                "provider export unavailable, sample data was used".yellow()
            )?;
        }

        Ok(())
    }
}
