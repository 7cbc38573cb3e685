//! 로그 저장소 -- [`LogStore`](cloudlog_core::pipeline::LogStore) 구현
//!
//! # 저장소
//! - [`MemoryStore`]: 프로세스 내 저장소 (테스트, 일회성 분석)
//! - [`JsonlStore`]: 일별 NDJSON 인덱스 파일 (`{prefix}-YYYY.MM.DD.jsonl`)
//!
//! 두 저장소는 같은 쿼리 의미를 공유합니다.
//! 검색어는 메시지에 대한 대소문자 무시 부분 일치이고, 시작 시각이 주어지면
//! 타임스탬프를 해석할 수 없는 레코드는 제외됩니다. 결과는 타임스탬프
//! 내림차순(없는 레코드는 맨 뒤)으로 정렬한 뒤 `limit`개로 자릅니다.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use cloudlog_core::pipeline::LogQuery;
use cloudlog_core::types::{LogRecord, parse_timestamp_utc};

/// 레코드 묶음에 쿼리 조건을 적용합니다.
pub(crate) fn apply_query<I>(records: I, query: &LogQuery) -> Vec<LogRecord>
where
    I: IntoIterator<Item = LogRecord>,
{
    let needle = query.text.as_deref().map(str::to_lowercase);

    let mut matched: Vec<(Option<DateTime<Utc>>, LogRecord)> = records
        .into_iter()
        .filter_map(|record| {
            let at = record.timestamp.as_deref().and_then(parse_timestamp_utc);
            if let Some(start) = query.start_time
                && at.is_none_or(|at| at < start)
            {
                return None;
            }
            if let Some(needle) = needle.as_deref()
                && !record.message.to_lowercase().contains(needle)
            {
                return None;
            }
            Some((at, record))
        })
        .collect();

    matched.sort_by(|a, b| newest_first(a.0, b.0));
    matched.truncate(query.limit);
    matched.into_iter().map(|(_, record)| record).collect()
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
