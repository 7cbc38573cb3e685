//! 제공자 내보내기 파일 소스
//!
//! 각 제공자 CLI가 만든 JSON 출력을 읽어 원시 이벤트로 변환합니다.
//!
//! | 제공자 | 생성 명령 | 형태 |
//! |---|---|---|
//! | aws | `aws logs filter-log-events --output json` | `{"events": [{"timestamp": ms, "message": ..}]}` |
//! | gcp | `gcloud logging read --format=json` | `[{"timestamp", "textPayload" \| "jsonPayload", "logName"}]` |
//! | azure | `az monitor log-analytics query` | `[{"TimeGenerated", "Message", ..}]` |
//!
//! 원본 항목의 키는 모두 보존되며, 그 위에 `timestamp`/`message`/`source`가 채워집니다.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};

use cloudlog_core::error::{CloudlogError, CollectorError};
use cloudlog_core::pipeline::LogSource;
use cloudlog_core::types::{Provider, RawEvent, TimeWindow, parse_timestamp_utc};

use crate::error::AnalyzerError;

/// Azure 메시지 후보 컬럼 (우선순위 순)
const AZURE_MESSAGE_COLUMNS: &[&str] = &["Message", "message", "RenderedDescription"];

/// 내보내기 파일 소스
#[derive(Debug, Clone)]
pub struct ExportSource {
    provider: Provider,
    path: PathBuf,
    target: Option<String>,
    name: String,
}

impl ExportSource {
    /// `target`은 제공자별 수집 대상 (로그 그룹, 워크스페이스 ID, 프로젝트)입니다.
    pub fn new(provider: Provider, path: impl Into<PathBuf>, target: Option<String>) -> Self {
        Self {
            provider,
            path: path.into(),
            target,
            name: format!("{provider}-export"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, CollectorError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CollectorError::Unavailable {
                    provider: self.provider.to_string(),
                    reason: format!("export file {} not found", self.path.display()),
                },
                _ => CollectorError::Fetch {
                    provider: self.provider.to_string(),
                    reason: format!("failed to read {}: {e}", self.path.display()),
                },
            })
    }
}

impl LogSource for ExportSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, CloudlogError> {
        let content = self.read().await?;
        let events = parse_export(self.provider, &content, self.target.as_deref())?;
        let total = events.len();

        // 타임스탬프를 해석할 수 있고 창 밖에 있는 이벤트만 제외합니다
        let in_window: Vec<RawEvent> = events
            .into_iter()
            .filter(|event| {
                event
                    .get_text("timestamp")
                    .and_then(|ts| parse_timestamp_utc(&ts))
                    .is_none_or(|at| window.contains(at))
            })
            .collect();

        tracing::debug!(
            provider = %self.provider,
            path = %self.path.display(),
            total,
            kept = in_window.len(),
            "parsed export file"
        );
        Ok(in_window)
    }
}

/// 제공자 형식에 맞춰 내보내기 내용을 파싱합니다.
pub fn parse_export(
    provider: Provider,
    content: &str,
    target: Option<&str>,
) -> Result<Vec<RawEvent>, AnalyzerError> {
    let root: Value = serde_json::from_str(content).map_err(|e| export_error(provider, e))?;
    match provider {
        Provider::Aws => parse_aws(root, target),
        Provider::Gcp => parse_gcp(root),
        Provider::Azure => parse_azure(root, target),
    }
}

fn parse_aws(root: Value, log_group: Option<&str>) -> Result<Vec<RawEvent>, AnalyzerError> {
    let events = match root {
        Value::Object(mut obj) => obj.remove("events"),
        _ => None,
    };
    let Some(Value::Array(events)) = events else {
        return Err(export_error(Provider::Aws, "expected an object with an 'events' array"));
    };

    events
        .into_iter()
        .map(|event| {
            let mut map = into_object(Provider::Aws, event)?;
            if let Some(ms) = map.get("timestamp").and_then(Value::as_i64) {
                let rendered = DateTime::from_timestamp_millis(ms)
                    .map(|dt| Value::from(dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
                    .unwrap_or(Value::Null);
                map.insert("timestamp".to_owned(), rendered);
            }
            let source = log_group
                .map(str::to_owned)
                .or_else(|| text_of(&map, "logGroupName"))
                .unwrap_or_default();
            map.insert("source".to_owned(), Value::from(source));
            Ok(RawEvent::from(map))
        })
        .collect()
}

fn parse_gcp(root: Value) -> Result<Vec<RawEvent>, AnalyzerError> {
    let Value::Array(entries) = root else {
        return Err(export_error(Provider::Gcp, "expected an array of log entries"));
    };

    entries
        .into_iter()
        .map(|entry| {
            let mut map = into_object(Provider::Gcp, entry)?;
            let message = text_of(&map, "textPayload").or_else(|| {
                map.get("jsonPayload").map(|payload| {
                    payload
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                        .unwrap_or_else(|| payload.to_string())
                })
            });
            if let Some(message) = message {
                map.insert("message".to_owned(), Value::from(message));
            }
            let source = text_of(&map, "logName").unwrap_or_default();
            map.insert("source".to_owned(), Value::from(source));
            Ok(RawEvent::from(map))
        })
        .collect()
}

fn parse_azure(root: Value, workspace_id: Option<&str>) -> Result<Vec<RawEvent>, AnalyzerError> {
    let Value::Array(rows) = root else {
        return Err(export_error(Provider::Azure, "expected an array of result rows"));
    };

    rows.into_iter()
        .map(|row| {
            let mut map = into_object(Provider::Azure, row)?;
            if let Some(ts) = text_of(&map, "TimeGenerated") {
                map.insert("timestamp".to_owned(), Value::from(ts));
            }
            if let Some(message) = AZURE_MESSAGE_COLUMNS
                .iter()
                .find_map(|column| text_of(&map, column))
            {
                map.insert("message".to_owned(), Value::from(message));
            }
            let source = workspace_id
                .map(str::to_owned)
                .or_else(|| text_of(&map, "TenantId"))
                .unwrap_or_default();
            map.insert("source".to_owned(), Value::from(source));
            Ok(RawEvent::from(map))
        })
        .collect()
}

fn into_object(provider: Provider, value: Value) -> Result<Map<String, Value>, AnalyzerError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(export_error(
            provider,
            format!("expected an object entry, found {other}"),
        )),
    }
}

fn text_of(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn export_error(provider: Provider, reason: impl ToString) -> AnalyzerError {
    AnalyzerError::ExportParse {
        provider: provider.to_string(),
        reason: reason.to_string(),
    }
}
