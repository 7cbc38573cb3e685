//! 파이프라인 trait — 외부 협력자(수집 소스, 로그 저장소) 확장 포인트 정의
//!
//! 분석 코어는 이 trait들을 통해서만 수집/저장 계층과 통신합니다.
//! 두 trait 모두 RPITIT(`impl Future + Send`)를 사용하므로 제네릭으로 조립합니다.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::CloudlogError;
use crate::types::{LogRecord, RawEvent, TimeWindow};

/// 원시 로그 소스 trait
///
/// 새로운 수집 경로를 추가하려면 이 trait을 구현합니다.
/// 빈 결과는 "해당 창에 로그 없음"과 동일하게 취급됩니다.
pub trait LogSource: Send + Sync {
    /// 소스 이름 (로그/메트릭 라벨용)
    fn name(&self) -> &str;

    /// 시간 창 안의 원시 이벤트를 가져옵니다.
    fn fetch(
        &self,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<RawEvent>, CloudlogError>> + Send;
}

/// 로그 저장소 trait
///
/// 전문 검색 가능한 시간 정렬 저장소의 논리적 연산만 정의합니다.
pub trait LogStore: Send + Sync {
    /// 레코드를 일괄 저장하고 저장된 개수를 반환합니다.
    fn bulk_write(
        &self,
        records: &[LogRecord],
    ) -> impl Future<Output = Result<usize, CloudlogError>> + Send;

    /// 조건에 맞는 레코드를 타임스탬프 내림차순으로 반환합니다.
    fn query(
        &self,
        query: &LogQuery,
    ) -> impl Future<Output = Result<Vec<LogRecord>, CloudlogError>> + Send;
}

/// 저장소 쿼리 조건
///
/// 사전 정의된 형태(텍스트, 시작 시각, 개수 제한)만 지원합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// 메시지 검색어 (대소문자 무시 부분 일치)
    pub text: Option<String>,
    /// 이 시각 이후(포함)의 레코드만 반환
    pub start_time: Option<DateTime<Utc>>,
    /// 최대 반환 개수
    pub limit: usize,
}

impl LogQuery {
    /// 조건 없이 `limit`개까지 반환하는 쿼리를 생성합니다.
    pub fn new(limit: usize) -> Self {
        Self {
            text: None,
            start_time: None,
            limit,
        }
    }

    /// 검색어를 설정합니다.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// 시작 시각을 설정합니다.
    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// 선택적 시작 시각을 설정합니다.
    pub fn since_opt(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.start_time = start;
        self
    }
}
