//! `cloudlog query` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use cloudlog_core::config::CloudlogConfig;
use cloudlog_core::types::LogRecord;

use crate::cli::QueryArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::window::start_of_last;

/// Characters of each message shown in text mode.
const MESSAGE_PREVIEW_CHARS: usize = 100;

/// Execute the `query` command.
pub async fn execute(
    args: QueryArgs,
    config: &CloudlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let start = args.last.as_deref().map(start_of_last).transpose()?;
    let limit = args.limit.unwrap_or(config.storage.search_limit);
    if limit == 0 {
        return Err(CliError::Command("--limit must be greater than 0".to_owned()));
    }

    info!(text = args.text.as_deref(), last = args.last.as_deref(), limit, "searching logs");
    let analyzer = super::open_analyzer(config)?;
    let records = analyzer.search(args.text.as_deref(), start, limit).await?;

    let report = QueryReport {
        count: records.len(),
        records,
    };
    writer.render(&report)?;

    Ok(())
}

/// Search results, newest first.
#[derive(Serialize)]
pub struct QueryReport {
    pub count: usize,
    pub records: Vec<LogRecord>,
}

impl Render for QueryReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w)?;
        writeln!(w, "Found {} matching logs:", self.count.to_string().bold())?;
        writeln!(w)?;
        for record in &self.records {
            let message: String = record.message.chars().take(MESSAGE_PREVIEW_CHARS).collect();
            writeln!(
                w,
                "[{}] {}: {}",
                record.timestamp.as_deref().unwrap_or("N/A"),
                record.level,
                message
            )?;
        }

        Ok(())
    }
}
