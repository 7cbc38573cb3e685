//! `cloudlog analyze` command handler

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use tracing::info;

use cloudlog_analyzer::{AnomalySeverity, Finding, SignatureCount};
use cloudlog_core::config::CloudlogConfig;
use cloudlog_core::error::CloudlogError;
use cloudlog_core::types::BucketWidth;

use crate::cli::{AnalysisType, AnalyzeArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::window::start_of_last;

/// Width of the longest timeline bar in text mode.
const TIMELINE_BAR_WIDTH: usize = 40;

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config: &CloudlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let start = start_of_last(&args.last)?;
    let interval = args
        .interval
        .as_deref()
        .map(str::parse::<BucketWidth>)
        .transpose()
        .map_err(CloudlogError::from)?;

    info!(kind = ?args.kind, last = %args.last, "analyzing logs");
    let analyzer = super::open_analyzer(config)?;

    let report = match args.kind {
        AnalysisType::Errors => AnalyzeReport::Errors {
            last: args.last,
            errors: analyzer.analyze_errors(Some(start)).await?,
        },
        AnalysisType::Anomalies => AnalyzeReport::Anomalies {
            last: args.last,
            findings: analyzer.detect_anomalies(Some(start)).await?,
        },
        AnalysisType::Timeline => {
            let width = interval.unwrap_or(analyzer.config().bucket_width);
            AnalyzeReport::Timeline {
                last: args.last,
                interval: width.to_string(),
                buckets: analyzer.time_series(Some(start), Some(width)).await?,
            }
        }
    };
    writer.render(&report)?;

    Ok(())
}

/// Analysis results, tagged by analysis type.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzeReport {
    Errors {
        last: String,
        errors: Vec<SignatureCount>,
    },
    Anomalies {
        last: String,
        findings: Vec<Finding>,
    },
    Timeline {
        last: String,
        interval: String,
        buckets: BTreeMap<String, usize>,
    },
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match self {
            Self::Errors { last, errors } => {
                writeln!(w)?;
                writeln!(w, "{}", format!("Top Error Messages (Last {})", last).bold())?;
                writeln!(w, "{}", "=".repeat(50))?;
                if errors.is_empty() {
                    writeln!(w, "No errors found.")?;
                }
                for (i, entry) in errors.iter().enumerate() {
                    writeln!(
                        w,
                        "{}. {} ({} occurrences)",
                        i + 1,
                        entry.signature,
                        entry.count
                    )?;
                }
            }
            Self::Anomalies { last, findings } => {
                writeln!(w)?;
                writeln!(w, "{}", format!("Anomalies (Last {})", last).bold())?;
                writeln!(w, "{}", "=".repeat(50))?;
                if findings.is_empty() {
                    writeln!(w, "{}", "No anomalies detected.".green())?;
                }
                for finding in findings {
                    let severity = format!("[{}]", finding.severity.as_str().to_uppercase());
                    let severity = match finding.severity {
                        AnomalySeverity::High => severity.red().bold(),
                        AnomalySeverity::Medium => severity.yellow().bold(),
                    };
                    writeln!(w, "{} {}: {}", severity, finding.kind, finding.message)?;
                }
            }
            Self::Timeline {
                last,
                interval,
                buckets,
            } => {
                writeln!(w)?;
                writeln!(
                    w,
                    "{}",
                    format!("Log Volume (Last {}, interval {})", last, interval).bold()
                )?;
                writeln!(w, "{}", "=".repeat(50))?;
                if buckets.is_empty() {
                    writeln!(w, "No timestamped logs found.")?;
                }
                let max = buckets.values().copied().max().unwrap_or(0);
                for (bucket, count) in buckets {
                    writeln!(w, "  {}  {:>6}  {}", bucket, count, bar(*count, max))?;
                }
            }
        }

        Ok(())
    }
}

/// Proportional bar; any non-zero count gets at least one mark.
fn bar(count: usize, max: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let len = (count * TIMELINE_BAR_WIDTH / max).max(1);
    "#".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlog_analyzer::AnomalyKind;

    fn render(report: &AnalyzeReport) -> String {
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_errors_report_render_text() {
        let report = AnalyzeReport::Errors {
            last: "7d".to_owned(),
            errors: vec![
                SignatureCount {
                    signature: "ERROR: Database query failed".to_owned(),
                    count: 20,
                },
                SignatureCount {
                    signature: "Error at [TIMESTAMP] id=[ID]".to_owned(),
                    count: 3,
                },
            ],
        };
        let output = render(&report);
        assert!(output.contains("Top Error Messages"));
        assert!(output.contains("1. ERROR: Database query failed (20 occurrences)"));
        assert!(output.contains("2. Error at [TIMESTAMP] id=[ID] (3 occurrences)"));
    }

    #[test]
    fn test_errors_report_render_text_empty() {
        let report = AnalyzeReport::Errors {
            last: "7d".to_owned(),
            errors: Vec::new(),
        };
        assert!(render(&report).contains("No errors found."));
    }

    #[test]
    fn test_anomalies_report_render_text() {
        let report = AnalyzeReport::Anomalies {
            last: "24h".to_owned(),
            findings: vec![Finding {
                kind: AnomalyKind::HighErrorRate,
                severity: AnomalySeverity::High,
                message: "Error rate is 15.0% (threshold: 10%)".to_owned(),
                count: 15,
            }],
        };
        let output = render(&report);
        assert!(output.contains("[HIGH]"));
        assert!(output.contains("high_error_rate: Error rate is 15.0% (threshold: 10%)"));
    }

    #[test]
    fn test_anomalies_report_json_tagged() {
        let report = AnalyzeReport::Anomalies {
            last: "24h".to_owned(),
            findings: vec![Finding {
                kind: AnomalyKind::RepeatedError,
                severity: AnomalySeverity::Medium,
                message: "Error repeated 20 times: Database query failed...".to_owned(),
                count: 20,
            }],
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["type"], "anomalies");
        assert_eq!(json["findings"][0]["type"], "repeated_error");
        assert_eq!(json["findings"][0]["severity"], "medium");
        assert_eq!(json["findings"][0]["count"], 20);
    }

    #[test]
    fn test_timeline_report_render_text_bars() {
        let mut buckets = BTreeMap::new();
        buckets.insert("2024-01-15T10".to_owned(), 10);
        buckets.insert("2024-01-15T11".to_owned(), 5);
        let report = AnalyzeReport::Timeline {
            last: "7d".to_owned(),
            interval: "1h".to_owned(),
            buckets,
        };
        let output = render(&report);
        assert!(output.contains("interval 1h"));
        let marks = |hour: &str| {
            output
                .lines()
                .find(|line| line.contains(hour))
                .map(|line| line.matches('#').count())
        };
        assert_eq!(marks("T10"), Some(TIMELINE_BAR_WIDTH));
        assert_eq!(marks("T11"), Some(TIMELINE_BAR_WIDTH / 2));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
        assert_eq!(bar(10, 10).len(), TIMELINE_BAR_WIDTH);
        assert_eq!(bar(1, 1000).len(), 1, "small counts stay visible");
    }

    #[tokio::test]
    async fn test_analyze_invalid_interval_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = CloudlogConfig::default();
        config.storage.data_dir = dir.path().display().to_string();

        let args = AnalyzeArgs {
            kind: AnalysisType::Timeline,
            last: "7d".to_owned(),
            interval: Some("7m".to_owned()),
        };
        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        let err = execute(args, &config, &writer)
            .await
            .expect_err("7m does not divide an hour");
        assert_eq!(err.exit_code(), 2);
    }
}
