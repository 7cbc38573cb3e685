//! 분석기 -- 저장소 쿼리와 분석 엔진을 묶는 진입점
//!
//! [`LogAnalyzer`]는 각 분석 요청마다 저장소에 한 번 쿼리하고,
//! 결과 레코드를 통계 엔진/시그니처 축약기/이상 탐지기에 넘깁니다.
//!
//! # 사용 예시
//! ```ignore
//! use cloudlog_analyzer::{AnalyzerConfig, LogAnalyzer, MemoryStore};
//!
//! let analyzer = LogAnalyzer::new(MemoryStore::new(), AnalyzerConfig::default())?;
//! let findings = analyzer.detect_anomalies(None).await?;
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use cloudlog_core::error::CloudlogError;
use cloudlog_core::pipeline::{LogQuery, LogStore};
use cloudlog_core::types::{BucketWidth, LogRecord};

use crate::anomaly::{AnomalyDetector, Finding};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::signature::{SignatureCount, SignatureReducer};
use crate::stats::{self, Breakdown};

/// 필드별 통계 보고서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    /// 그룹화 기준 필드
    pub group_by: String,
    /// 집계 결과
    #[serde(flatten)]
    pub stats: Breakdown,
    /// 조회 시작 시각 (RFC 3339)
    pub start_time: Option<String>,
}

/// 로그 분석기
pub struct LogAnalyzer<S: LogStore> {
    store: S,
    config: AnalyzerConfig,
    reducer: SignatureReducer,
    detector: AnomalyDetector,
}

impl<S: LogStore> LogAnalyzer<S> {
    /// 저장소와 설정으로 분석기를 생성합니다.
    pub fn new(store: S, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;
        let reducer = SignatureReducer::with_max_chars(config.signature_max_chars)?;
        let detector = AnomalyDetector::new(config.detector.clone());
        Ok(Self {
            store,
            config,
            reducer,
            detector,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// 시작 시각 이후 레코드를 분석 한도만큼 가져옵니다.
    async fn load(&self, start: Option<DateTime<Utc>>) -> Result<Vec<LogRecord>, CloudlogError> {
        let query = LogQuery::new(self.config.query_limit).since_opt(start);
        self.store.query(&query).await
    }

    /// 검색어/시작 시각으로 레코드를 검색합니다.
    pub async fn search(
        &self,
        text: Option<&str>,
        start: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<LogRecord>, CloudlogError> {
        let mut query = LogQuery::new(limit).since_opt(start);
        if let Some(text) = text {
            query = query.with_text(text);
        }
        self.store.query(&query).await
    }

    /// 필드별 통계를 생성합니다.
    pub async fn generate_stats(
        &self,
        start: Option<DateTime<Utc>>,
        group_by: &str,
    ) -> Result<StatsReport, CloudlogError> {
        let records = self.load(start).await?;
        Ok(StatsReport {
            group_by: group_by.to_owned(),
            stats: stats::breakdown(&records, group_by),
            start_time: start.map(|s| s.to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    }

    /// ERROR 레코드의 상위 시그니처를 반환합니다.
    pub async fn analyze_errors(
        &self,
        start: Option<DateTime<Utc>>,
    ) -> Result<Vec<SignatureCount>, CloudlogError> {
        let records = self.load(start).await?;
        Ok(self
            .reducer
            .top_signatures(&records, self.config.top_errors))
    }

    /// 버킷별 레코드 수를 반환합니다. `width`가 없으면 설정값을 사용합니다.
    pub async fn time_series(
        &self,
        start: Option<DateTime<Utc>>,
        width: Option<BucketWidth>,
    ) -> Result<BTreeMap<String, usize>, CloudlogError> {
        let records = self.load(start).await?;
        Ok(stats::time_series(
            &records,
            width.unwrap_or(self.config.bucket_width),
        ))
    }

    /// 이상 탐지를 실행합니다.
    pub async fn detect_anomalies(
        &self,
        start: Option<DateTime<Utc>>,
    ) -> Result<Vec<Finding>, CloudlogError> {
        let records = self.load(start).await?;
        Ok(self.detector.detect(&records))
    }
}
