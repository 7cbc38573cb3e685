#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`normalize`]: 원시 이벤트 정규화와 로그 레벨 추론
//! - [`signature`]: 에러 메시지 시그니처 축약 (가변 부분 마스킹)
//! - [`stats`]: 필드별 집계, 시간 버킷 집계
//! - [`anomaly`]: 에러 비율/반복 에러 이상 탐지
//! - [`collector`]: 제공자 내보내기 파일 및 샘플 소스, 샘플 대체 전략
//! - [`storage`]: 인메모리 / 일별 NDJSON 저장소
//! - [`analyzer`]: 저장소 쿼리 + 분석 엔진 진입점
//! - [`config`]: 분석기 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! Collector -> normalize -> LogStore -> LogAnalyzer -> stats / signature / anomaly
//!     |                        |
//!  Export/Sample           Memory/Jsonl
//! ```

pub mod analyzer;
pub mod anomaly;
pub mod collector;
pub mod config;
pub mod error;
pub mod normalize;
pub mod signature;
pub mod stats;
pub mod storage;

// --- 주요 타입 re-export ---

// 분석기
pub use analyzer::{LogAnalyzer, StatsReport};

// 설정
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};

// 에러
pub use error::AnalyzerError;

// 분석 엔진
pub use anomaly::{AnomalyDetector, AnomalyKind, AnomalySeverity, DetectorConfig, Finding};
pub use normalize::{infer_level, normalize, normalize_all};
pub use signature::{SignatureCount, SignatureReducer};
pub use stats::{Breakdown, breakdown, time_series};

// 수집기
pub use collector::{Collected, Collector, ExportSource, SampleSource, SourceKind};

// 저장소
pub use storage::{JsonlStore, MemoryStore};
