//! `cloudlog config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use cloudlog_core::config::CloudlogConfig;
use cloudlog_core::error::CloudlogError;

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 4] = ["general", "storage", "collector", "analysis"];

/// Load the effective configuration.
///
/// A missing file is only tolerated at the default path, so a mistyped
/// `--config` still fails loudly.
pub async fn load_config(path: &Path) -> Result<CloudlogConfig, CloudlogError> {
    if path == Path::new(DEFAULT_CONFIG_PATH) {
        CloudlogConfig::load_or_default(path).await
    } else {
        CloudlogConfig::load(path).await
    }
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match load_config(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = load_config(config_path).await?;
    let report = build_config_report(&config, config_path, section)?;

    writer.render(&report)?;

    Ok(())
}

fn build_config_report(
    config: &CloudlogConfig,
    config_path: &Path,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let rendered = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("storage") => toml::to_string_pretty(&config.storage),
        Some("collector") => toml::to_string_pretty(&config.collector),
        Some("analysis") => toml::to_string_pretty(&config.analysis),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml: rendered.unwrap_or_else(|e| format!("(serialization error: {})", e)),
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_config_report_full_config_contains_all_sections() {
        let report = build_config_report(
            &CloudlogConfig::default(),
            Path::new("cloudlog.toml"),
            None,
        )
        .expect("full report");

        for section in SECTIONS {
            assert!(
                report.config_toml.contains(&format!("[{}]", section)),
                "full config should contain [{}]",
                section
            );
        }
    }

    #[test]
    fn test_config_report_single_section() {
        let report = build_config_report(
            &CloudlogConfig::default(),
            Path::new("cloudlog.toml"),
            Some("analysis".to_owned()),
        )
        .expect("section report");

        assert!(report.config_toml.contains("error_rate_threshold"));
        assert!(!report.config_toml.contains("index_prefix"));
    }

    #[test]
    fn test_config_report_unknown_section_fails() {
        let result = build_config_report(
            &CloudlogConfig::default(),
            Path::new("cloudlog.toml"),
            Some("ebpf".to_owned()),
        );
        match result {
            Err(CliError::Command(msg)) => {
                assert!(msg.contains("unknown section: ebpf"));
                assert!(msg.contains("analysis"));
            }
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_render_text_section_header() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: Some("storage".to_owned()),
            config_toml: "data_dir = \"./data\"\n".to_owned(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[storage]"));
        assert!(output.contains("test.toml"));
        assert!(output.contains("data_dir"));
    }

    #[test]
    fn test_config_report_json_skips_toml_body() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: None,
            config_toml: "[general]".to_owned(),
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["source"], "test.toml");
        assert!(json.get("config_toml").is_none());
        assert!(json.get("section").is_none());
    }

    #[test]
    fn test_validation_report_render_text_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'analysis.bucket_width'".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("analysis.bucket_width"));
    }

    #[tokio::test]
    async fn test_load_config_missing_default_path_uses_defaults() {
        // Relative to the working directory; only meaningful when no file is present.
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return;
        }
        let config = load_config(Path::new(DEFAULT_CONFIG_PATH))
            .await
            .expect("defaults should be used");
        assert_eq!(config.storage.search_limit, 50);
    }

    #[tokio::test]
    async fn test_load_config_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = load_config(&dir.path().join("missing.toml")).await;
        assert!(result.is_err(), "explicit missing path should fail");
    }

    #[tokio::test]
    async fn test_validate_invalid_file_returns_config_exit_code() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cloudlog.toml");
        std::fs::write(&path, "[analysis]\nbucket_width = \"7m\"\n").expect("write");

        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_validate(&path, &writer)
            .await
            .expect_err("invalid config should fail");
        assert_eq!(err.exit_code(), 2);
    }
}
