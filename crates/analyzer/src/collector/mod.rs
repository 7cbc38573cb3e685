//! 로그 수집 모듈 -- 제공자별 소스에서 원시 이벤트를 가져옵니다.
//!
//! # 수집 소스
//! - [`ExportSource`]: 제공자 CLI 내보내기 파일 (AWS, GCP, Azure)
//! - [`SampleSource`]: 결정적 합성 데이터
//!
//! # 대체 전략
//! [`Collector`]는 주 소스와 선택적 샘플 대체 소스를 묶습니다. 주 소스가 실패하고
//! 대체가 활성화되어 있으면 경고를 남기고 샘플 데이터를 반환합니다.
//! 대체 여부는 [`Collected::fell_back`]로 호출자에게 드러납니다.

pub mod export;
pub mod sample;

pub use export::ExportSource;
pub use sample::SampleSource;

use std::path::PathBuf;

use cloudlog_core::config::CollectorConfig;
use cloudlog_core::error::CloudlogError;
use cloudlog_core::metrics as m;
use cloudlog_core::pipeline::LogSource;
use cloudlog_core::types::{LogRecord, Provider, RawEvent, TimeWindow};

use crate::normalize::normalize_all;

/// 주 소스 종류
///
/// 제공자 변형은 작은 닫힌 집합이므로 열거형으로 선택합니다.
#[derive(Debug, Clone)]
pub enum SourceKind {
    /// 내보내기 파일
    Export(ExportSource),
    /// 샘플 데이터
    Sample(SampleSource),
}

impl LogSource for SourceKind {
    fn name(&self) -> &str {
        match self {
            Self::Export(source) => source.name(),
            Self::Sample(source) => source.name(),
        }
    }

    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, CloudlogError> {
        match self {
            Self::Export(source) => source.fetch(window).await,
            Self::Sample(source) => source.fetch(window).await,
        }
    }
}

/// 수집 결과
#[derive(Debug, Clone)]
pub struct Collected {
    /// 정규화된 레코드
    pub records: Vec<LogRecord>,
    /// 샘플 데이터로 대체되었는지 여부
    pub fell_back: bool,
}

/// 제공자별 수집기
#[derive(Debug, Clone)]
pub struct Collector {
    provider: Provider,
    primary: SourceKind,
    fallback: Option<SampleSource>,
}

impl Collector {
    /// 주 소스로 수집기를 생성합니다. 대체는 비활성 상태입니다.
    pub fn new(provider: Provider, primary: SourceKind) -> Self {
        Self {
            provider,
            primary,
            fallback: None,
        }
    }

    /// 샘플 대체를 설정합니다.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled.then(|| SampleSource::new(self.provider));
        self
    }

    /// 설정에 따라 수집기를 조립합니다.
    ///
    /// `export`가 없으면 `{export_dir}/{provider}.json`을 읽습니다.
    pub fn from_config(
        provider: Provider,
        config: &CollectorConfig,
        export: Option<PathBuf>,
        target: Option<String>,
    ) -> Self {
        let path = export.unwrap_or_else(|| {
            PathBuf::from(&config.export_dir).join(format!("{provider}.json"))
        });
        Self::new(
            provider,
            SourceKind::Export(ExportSource::new(provider, path, target)),
        )
        .with_fallback(config.fallback_to_sample)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// 원시 이벤트를 가져옵니다. 필요하면 샘플 데이터로 대체합니다.
    pub async fn fetch(&self, window: &TimeWindow) -> Result<(Vec<RawEvent>, bool), CloudlogError> {
        let (events, fell_back) = match self.primary.fetch(window).await {
            Ok(events) => (events, false),
            Err(err) => {
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                tracing::warn!(
                    provider = %self.provider,
                    source = self.primary.name(),
                    error = %err,
                    "primary source failed, falling back to sample data"
                );
                metrics::counter!(m::COLLECTOR_FALLBACKS_TOTAL, m::LABEL_PROVIDER => self.provider.as_str())
                    .increment(1);
                (fallback.fetch(window).await?, true)
            }
        };

        metrics::counter!(m::COLLECTOR_RECORDS_COLLECTED_TOTAL, m::LABEL_PROVIDER => self.provider.as_str())
            .increment(events.len() as u64);
        tracing::info!(
            provider = %self.provider,
            count = events.len(),
            fell_back,
            "collected raw events"
        );
        Ok((events, fell_back))
    }

    /// 원시 이벤트를 가져와 정규화합니다.
    pub async fn collect(&self, window: &TimeWindow) -> Result<Collected, CloudlogError> {
        let (events, fell_back) = self.fetch(window).await?;
        Ok(Collected {
            records: normalize_all(events, self.provider.as_str()),
            fell_back,
        })
    }
}
