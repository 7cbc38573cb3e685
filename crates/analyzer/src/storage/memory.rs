//! 인메모리 로그 저장소

use metrics::counter;
use tokio::sync::RwLock;

use cloudlog_core::error::CloudlogError;
use cloudlog_core::metrics as m;
use cloudlog_core::pipeline::{LogQuery, LogStore};
use cloudlog_core::types::LogRecord;

use super::apply_query;

/// 프로세스 내 로그 저장소
///
/// 프로세스가 끝나면 내용이 사라집니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<LogRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드로 미리 채운 저장소를 생성합니다.
    pub fn with_records(records: Vec<LogRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// 저장된 레코드 수
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl LogStore for MemoryStore {
    async fn bulk_write(&self, records: &[LogRecord]) -> Result<usize, CloudlogError> {
        if records.is_empty() {
            return Ok(0);
        }

        self.records.write().await.extend_from_slice(records);
        counter!(m::STORAGE_RECORDS_INDEXED_TOTAL, m::LABEL_STORE => "memory")
            .increment(records.len() as u64);
        tracing::debug!(count = records.len(), "indexed records in memory store");
        Ok(records.len())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRecord>, CloudlogError> {
        counter!(m::STORAGE_QUERIES_TOTAL, m::LABEL_STORE => "memory").increment(1);
        let snapshot = self.records.read().await.clone();
        Ok(apply_query(snapshot, query))
    }
}
