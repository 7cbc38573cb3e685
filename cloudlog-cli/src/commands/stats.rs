//! `cloudlog stats` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use cloudlog_analyzer::StatsReport;
use cloudlog_core::config::CloudlogConfig;

use crate::cli::StatsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::window::start_of_last;

/// Execute the `stats` command.
pub async fn execute(
    args: StatsArgs,
    config: &CloudlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let start = start_of_last(&args.last)?;

    info!(group_by = %args.group_by, last = %args.last, "generating statistics");
    let analyzer = super::open_analyzer(config)?;
    let report = analyzer.generate_stats(Some(start), &args.group_by).await?;

    writer.render(&StatsOutput {
        last: args.last,
        report,
    })?;

    Ok(())
}

/// Statistics for a relative window.
#[derive(Serialize)]
pub struct StatsOutput {
    /// Requested range (e.g. `24h`)
    pub last: String,
    #[serde(flatten)]
    pub report: StatsReport,
}

impl Render for StatsOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let stats = &self.report.stats;
        writeln!(w)?;
        writeln!(w, "{}", format!("Log Statistics (Last {})", self.last).bold())?;
        writeln!(w, "{}", "=".repeat(50))?;
        writeln!(w, "Total Logs: {}", stats.total)?;
        writeln!(w)?;
        writeln!(w, "Breakdown by {}:", self.report.group_by)?;
        for (key, count) in stats.ranked() {
            writeln!(w, "  {}: {} ({:.2}%)", key, count, stats.percentage(count))?;
        }

        Ok(())
    }
}
