//! 분석기 설정
//!
//! [`AnalyzerConfig`]는 core의 [`CloudlogConfig`](cloudlog_core::config::CloudlogConfig)에서
//! 분석에 필요한 값만 골라 타입이 확정된 형태로 보관합니다.
//! 버킷 폭 문자열은 여기서 한 번 파싱되며, 잘못된 값은 생성 시점에 실패합니다.
//!
//! # 사용 예시
//! ```ignore
//! use cloudlog_core::config::CloudlogConfig;
//! use cloudlog_analyzer::config::AnalyzerConfig;
//!
//! let core_config = CloudlogConfig::default();
//! let config = AnalyzerConfig::from_core(&core_config)?;
//! ```

use cloudlog_core::config::CloudlogConfig;
use cloudlog_core::types::BucketWidth;

use crate::anomaly::DetectorConfig;
use crate::error::AnalyzerError;
use crate::signature::DEFAULT_MAX_CHARS;

/// 분석기 설정
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// 분석 쿼리 한 번에 읽는 최대 레코드 수
    pub query_limit: usize,
    /// 보고할 상위 에러 시그니처 수
    pub top_errors: usize,
    /// 시그니처 최대 길이 (문자)
    pub signature_max_chars: usize,
    /// 기본 시계열 버킷 폭
    pub bucket_width: BucketWidth,
    /// 이상 탐지 임계값
    pub detector: DetectorConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            query_limit: 10_000,
            top_errors: 10,
            signature_max_chars: DEFAULT_MAX_CHARS,
            bucket_width: BucketWidth::HOUR,
            detector: DetectorConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// core 설정에서 분석기 설정을 생성합니다.
    pub fn from_core(core: &CloudlogConfig) -> Result<Self, AnalyzerError> {
        let bucket_width = core
            .analysis
            .bucket_width()
            .map_err(|e| AnalyzerError::Config {
                field: "analysis.bucket_width".to_owned(),
                reason: e.to_string(),
            })?;

        let config = Self {
            query_limit: core.storage.query_limit,
            top_errors: core.analysis.top_errors,
            signature_max_chars: core.analysis.signature_max_chars,
            bucket_width,
            detector: DetectorConfig::from_core(&core.analysis),
        };
        config.validate()?;
        Ok(config)
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.query_limit == 0 {
            return Err(config_error("query_limit", "must be greater than 0"));
        }
        if self.top_errors == 0 {
            return Err(config_error("top_errors", "must be greater than 0"));
        }
        if self.signature_max_chars == 0 {
            return Err(config_error("signature_max_chars", "must be greater than 0"));
        }
        let threshold = self.detector.error_rate_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(config_error(
                "error_rate_threshold",
                format!("must be greater than 0 and at most 1, got {threshold}"),
            ));
        }
        if self.detector.repeat_candidates == 0 {
            return Err(config_error("repeat_candidates", "must be greater than 0"));
        }
        Ok(())
    }
}

fn config_error(field: &str, reason: impl Into<String>) -> AnalyzerError {
    AnalyzerError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// 분석기 설정 빌더
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_limit(mut self, limit: usize) -> Self {
        self.config.query_limit = limit;
        self
    }

    pub fn top_errors(mut self, top: usize) -> Self {
        self.config.top_errors = top;
        self
    }

    pub fn signature_max_chars(mut self, max: usize) -> Self {
        self.config.signature_max_chars = max;
        self
    }

    pub fn bucket_width(mut self, width: BucketWidth) -> Self {
        self.config.bucket_width = width;
        self
    }

    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.config.detector = detector;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlog_core::types::BucketUnit;

    #[test]
    fn default_config_is_valid() {
        AnalyzerConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_copies_analysis_values() {
        let mut core = CloudlogConfig::default();
        core.storage.query_limit = 500;
        core.analysis.top_errors = 3;
        core.analysis.bucket_width = "30m".to_owned();
        core.analysis.repeat_threshold = 4;

        let config = AnalyzerConfig::from_core(&core).unwrap();
        assert_eq!(config.query_limit, 500);
        assert_eq!(config.top_errors, 3);
        assert_eq!(config.bucket_width.unit(), BucketUnit::Minute);
        assert_eq!(config.bucket_width.step(), 30);
        assert_eq!(config.detector.repeat_threshold, 4);
    }

    #[test]
    fn from_core_rejects_bad_bucket_width() {
        let mut core = CloudlogConfig::default();
        core.analysis.bucket_width = "3x".to_owned();
        let err = AnalyzerConfig::from_core(&core).unwrap_err();
        assert!(err.to_string().contains("bucket_width"));
    }

    #[test]
    fn builder_validates() {
        let err = AnalyzerConfig::builder().top_errors(0).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::Config { .. }));

        let config = AnalyzerConfig::builder()
            .query_limit(100)
            .top_errors(5)
            .build()
            .unwrap();
        assert_eq!(config.query_limit, 100);
        assert_eq!(config.top_errors, 5);
    }

    #[test]
    fn builder_rejects_out_of_range_rate() {
        let detector = DetectorConfig {
            error_rate_threshold: 1.5,
            ..DetectorConfig::default()
        };
        assert!(AnalyzerConfig::builder().detector(detector).build().is_err());
    }
}
