//! 일별 NDJSON 인덱스 저장소
//!
//! 레코드를 `{data_dir}/{index_prefix}-YYYY.MM.DD.jsonl` 파일에 한 줄씩 추가합니다.
//! 파티션 날짜는 쓰기 시점의 UTC 날짜입니다. 손상된 줄은 경고 로그를 남기고 건너뜁니다.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tokio::io::AsyncWriteExt;

use cloudlog_core::config::StorageConfig;
use cloudlog_core::error::{CloudlogError, StorageError};
use cloudlog_core::metrics as m;
use cloudlog_core::pipeline::{LogQuery, LogStore};
use cloudlog_core::types::LogRecord;

use super::apply_query;
use crate::error::AnalyzerError;

/// 인덱스 파일 확장자
const INDEX_EXTENSION: &str = "jsonl";

/// 인덱스 이름의 날짜 형식
const INDEX_DATE_FORMAT: &str = "%Y.%m.%d";

/// 날짜별 NDJSON 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonlStore {
    data_dir: PathBuf,
    index_prefix: String,
}

impl JsonlStore {
    pub fn new(data_dir: impl Into<PathBuf>, index_prefix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_prefix: index_prefix.into(),
        }
    }

    /// core 저장소 설정으로 생성합니다.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir, &config.index_prefix)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 날짜에 해당하는 인덱스 이름 (`cloud-logs-2024.01.15`)
    pub fn index_name(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.index_prefix, date.format(INDEX_DATE_FORMAT))
    }

    fn index_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}.{INDEX_EXTENSION}", self.index_name(date)))
    }

    /// 파일 이름이 이 저장소의 인덱스인지 확인합니다.
    fn is_own_index(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(INDEX_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .and_then(|stem| stem.strip_prefix(self.index_prefix.as_str()))
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|date| NaiveDate::parse_from_str(date, INDEX_DATE_FORMAT).is_ok())
    }

    /// 모든 인덱스 파일 경로를 이름순으로 반환합니다. 디렉토리가 없으면 빈 목록입니다.
    async fn index_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let own = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| self.is_own_index(name));
            if own {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_index(&self, path: &Path) -> Result<Vec<LogRecord>, AnalyzerError> {
        let content = tokio::fs::read_to_string(path).await?;
        let index = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let err = AnalyzerError::CorruptIndex {
                        index: index.clone(),
                        line: idx + 1,
                        reason: e.to_string(),
                    };
                    tracing::warn!(error = %err, "skipping corrupt index line");
                }
            }
        }
        Ok(records)
    }

    async fn append(&self, records: &[LogRecord]) -> Result<PathBuf, AnalyzerError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let mut buf = String::new();
        for record in records {
            buf.push_str(&serde_json::to_string(record)?);
            buf.push('\n');
        }

        let path = self.index_path(Utc::now().date_naive());
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(path)
    }
}

impl LogStore for JsonlStore {
    async fn bulk_write(&self, records: &[LogRecord]) -> Result<usize, CloudlogError> {
        if records.is_empty() {
            return Ok(0);
        }

        let path = self
            .append(records)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        metrics::counter!(m::STORAGE_RECORDS_INDEXED_TOTAL, m::LABEL_STORE => "jsonl")
            .increment(records.len() as u64);
        tracing::info!(
            path = %path.display(),
            count = records.len(),
            "indexed records"
        );
        Ok(records.len())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRecord>, CloudlogError> {
        metrics::counter!(m::STORAGE_QUERIES_TOTAL, m::LABEL_STORE => "jsonl").increment(1);

        let files = self
            .index_files()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::new();
        for path in &files {
            let loaded = self
                .read_index(path)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
            records.extend(loaded);
        }

        tracing::debug!(
            indices = files.len(),
            scanned = records.len(),
            "executed store query"
        );
        Ok(apply_query(records, query))
    }
}
