//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 수집기/저장소 계층은 이 상수로 `metrics::counter!()` 매크로를 호출합니다.
//! 분석 코어(정규화, 시그니처, 통계, 이상 탐지)는 메트릭을 기록하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `cloudlog_`
//! - 계층명: `collector_`, `storage_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(cloudlog_core::metrics::COLLECTOR_RECORDS_COLLECTED_TOTAL,
//!     cloudlog_core::metrics::LABEL_PROVIDER => "aws").increment(30);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 제공자 레이블 키 (aws, azure, gcp)
pub const LABEL_PROVIDER: &str = "provider";

/// 저장소 종류 레이블 키 (memory, jsonl)
pub const LABEL_STORE: &str = "store";

// ─── Collector 메트릭 ──────────────────────────────────────────────

/// Collector: 수집된 원시 이벤트 수 (counter, label: provider)
pub const COLLECTOR_RECORDS_COLLECTED_TOTAL: &str = "cloudlog_collector_records_collected_total";

/// Collector: 샘플 데이터로 대체된 횟수 (counter, label: provider)
pub const COLLECTOR_FALLBACKS_TOTAL: &str = "cloudlog_collector_fallbacks_total";

// ─── Storage 메트릭 ────────────────────────────────────────────────

/// Storage: 저장된 레코드 수 (counter, label: store)
pub const STORAGE_RECORDS_INDEXED_TOTAL: &str = "cloudlog_storage_records_indexed_total";

/// Storage: 실행된 쿼리 수 (counter, label: store)
pub const STORAGE_QUERIES_TOTAL: &str = "cloudlog_storage_queries_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치되지 않았다면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        COLLECTOR_RECORDS_COLLECTED_TOTAL,
        "Total number of raw log events fetched from cloud sources"
    );
    describe_counter!(
        COLLECTOR_FALLBACKS_TOTAL,
        "Total number of times a collector fell back to sample data"
    );
    describe_counter!(
        STORAGE_RECORDS_INDEXED_TOTAL,
        "Total number of normalized records written to the log store"
    );
    describe_counter!(
        STORAGE_QUERIES_TOTAL,
        "Total number of queries executed against the log store"
    );
}
