//! 설정 관리 — cloudlog.toml 파싱 및 런타임 설정
//!
//! [`CloudlogConfig`]는 모든 계층의 설정을 담는 최상위 구조체입니다.
//! 분석 임계값은 전역 상태가 아니라 이 값에서 각 컴포넌트 생성자로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CLOUDLOG_STORAGE_DATA_DIR=/data` 형식)
//! 3. 설정 파일 (`cloudlog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), cloudlog_core::error::CloudlogError> {
//! use cloudlog_core::config::CloudlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CloudlogConfig::load("cloudlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CloudlogConfig::parse("[analysis]\nbucket_width = \"15m\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CloudlogError, ConfigError};
use crate::types::BucketWidth;

/// cloudlog 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 수집기 설정
    #[serde(default)]
    pub collector: CollectorConfig,
    /// 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl CloudlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CloudlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값(+환경변수)으로 대체합니다.
    ///
    /// 파일이 존재하지만 파싱/검증에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CloudlogError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(CloudlogError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CloudlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CloudlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CloudlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CloudlogError> {
        toml::from_str(toml_str).map_err(|e| {
            CloudlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CLOUDLOG_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CLOUDLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CLOUDLOG_GENERAL_LOG_FORMAT");

        // Storage
        override_string(&mut self.storage.data_dir, "CLOUDLOG_STORAGE_DATA_DIR");
        override_string(
            &mut self.storage.index_prefix,
            "CLOUDLOG_STORAGE_INDEX_PREFIX",
        );
        override_usize(&mut self.storage.query_limit, "CLOUDLOG_STORAGE_QUERY_LIMIT");
        override_usize(
            &mut self.storage.search_limit,
            "CLOUDLOG_STORAGE_SEARCH_LIMIT",
        );

        // Collector
        override_u64(
            &mut self.collector.default_hours,
            "CLOUDLOG_COLLECTOR_DEFAULT_HOURS",
        );
        override_bool(
            &mut self.collector.fallback_to_sample,
            "CLOUDLOG_COLLECTOR_FALLBACK_TO_SAMPLE",
        );
        override_string(
            &mut self.collector.export_dir,
            "CLOUDLOG_COLLECTOR_EXPORT_DIR",
        );

        // Analysis
        override_f64(
            &mut self.analysis.error_rate_threshold,
            "CLOUDLOG_ANALYSIS_ERROR_RATE_THRESHOLD",
        );
        override_usize(
            &mut self.analysis.repeat_threshold,
            "CLOUDLOG_ANALYSIS_REPEAT_THRESHOLD",
        );
        override_usize(
            &mut self.analysis.repeat_candidates,
            "CLOUDLOG_ANALYSIS_REPEAT_CANDIDATES",
        );
        override_usize(
            &mut self.analysis.repeat_preview_chars,
            "CLOUDLOG_ANALYSIS_REPEAT_PREVIEW_CHARS",
        );
        override_usize(&mut self.analysis.top_errors, "CLOUDLOG_ANALYSIS_TOP_ERRORS");
        override_usize(
            &mut self.analysis.signature_max_chars,
            "CLOUDLOG_ANALYSIS_SIGNATURE_MAX_CHARS",
        );
        override_string(
            &mut self.analysis.bucket_width,
            "CLOUDLOG_ANALYSIS_BUCKET_WIDTH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CloudlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.storage.data_dir.is_empty() {
            return Err(invalid("storage.data_dir", "must not be empty"));
        }

        if self.storage.index_prefix.is_empty()
            || self.storage.index_prefix.contains(['/', '\\'])
        {
            return Err(invalid(
                "storage.index_prefix",
                "must be a non-empty name without path separators",
            ));
        }

        if self.storage.query_limit == 0 {
            return Err(invalid("storage.query_limit", "must be greater than 0"));
        }

        if self.storage.search_limit == 0 {
            return Err(invalid("storage.search_limit", "must be greater than 0"));
        }

        if self.collector.default_hours == 0 {
            return Err(invalid("collector.default_hours", "must be greater than 0"));
        }

        self.analysis.validate()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 인덱스 파일 디렉토리
    pub data_dir: String,
    /// 인덱스 이름 접두어 (`{prefix}-YYYY.MM.DD`)
    pub index_prefix: String,
    /// 분석용 쿼리의 최대 레코드 수
    pub query_limit: usize,
    /// 검색 명령의 기본 결과 수
    pub search_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./cloudlog-data".to_owned(),
            index_prefix: "cloud-logs".to_owned(),
            query_limit: 10_000,
            search_limit: 50,
        }
    }
}

/// 수집기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// 기본 수집 기간 (시간)
    pub default_hours: u64,
    /// 소스를 사용할 수 없을 때 샘플 데이터로 대체할지 여부
    pub fallback_to_sample: bool,
    /// 제공자 내보내기 파일 기본 디렉토리 (`{provider}.json`)
    pub export_dir: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            default_hours: 24,
            fallback_to_sample: true,
            export_dir: "./exports".to_owned(),
        }
    }
}

/// 분석 설정
///
/// 이상 탐지 임계값과 시그니처/시계열 파라미터를 담습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 에러 비율 임계값 (이 값을 초과하면 탐지)
    pub error_rate_threshold: f64,
    /// 동일 에러 메시지 반복 임계값 (이 값을 초과하면 탐지)
    pub repeat_threshold: usize,
    /// 반복 에러 후보 수 (빈도 상위 N개만 평가)
    pub repeat_candidates: usize,
    /// 반복 에러 메시지 미리보기 길이 (문자)
    pub repeat_preview_chars: usize,
    /// 상위 에러 시그니처 보고 개수
    pub top_errors: usize,
    /// 시그니처 최대 길이 (문자)
    pub signature_max_chars: usize,
    /// 시계열 버킷 폭 (예: 15m, 1h, 1d)
    pub bucket_width: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: 0.10,
            repeat_threshold: 10,
            repeat_candidates: 5,
            repeat_preview_chars: 50,
            top_errors: 10,
            signature_max_chars: 100,
            bucket_width: "1h".to_owned(),
        }
    }
}

impl AnalysisConfig {
    /// 설정된 버킷 폭을 파싱합니다.
    pub fn bucket_width(&self) -> Result<BucketWidth, ConfigError> {
        self.bucket_width
            .parse::<BucketWidth>()
            .map_err(|e| match e {
                ConfigError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
                    field: "analysis.bucket_width".to_owned(),
                    reason,
                },
                other => other,
            })
    }

    /// 분석 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CloudlogError> {
        if !(self.error_rate_threshold > 0.0 && self.error_rate_threshold <= 1.0) {
            return Err(invalid(
                "analysis.error_rate_threshold",
                "must be greater than 0 and at most 1",
            ));
        }

        if self.repeat_candidates == 0 {
            return Err(invalid(
                "analysis.repeat_candidates",
                "must be greater than 0",
            ));
        }

        if self.top_errors == 0 {
            return Err(invalid("analysis.top_errors", "must be greater than 0"));
        }

        if self.signature_max_chars == 0 {
            return Err(invalid(
                "analysis.signature_max_chars",
                "must be greater than 0",
            ));
        }

        self.bucket_width()?;
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CloudlogError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}
