//! 분석기 에러 타입
//!
//! [`AnalyzerError`]는 분석기 크레이트 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<AnalyzerError> for CloudlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use cloudlog_core::error::{CloudlogError, CollectorError, ConfigError, StorageError};

/// 분석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 내보내기 파일 파싱 실패
    #[error("export parse error: {provider}: {reason}")]
    ExportParse {
        /// 제공자 태그
        provider: String,
        /// 실패 사유
        reason: String,
    },

    /// 인덱스 파일 손상
    #[error("corrupt index {index} at line {line}: {reason}")]
    CorruptIndex {
        /// 인덱스 이름
        index: String,
        /// 1부터 시작하는 줄 번호
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// 직렬화 에러
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<AnalyzerError> for CloudlogError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Config { field, reason } => {
                CloudlogError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnalyzerError::ExportParse { provider, reason } => {
                CloudlogError::Collector(CollectorError::Fetch { provider, reason })
            }
            AnalyzerError::Io(e) => CloudlogError::Io(e),
            other @ (AnalyzerError::CorruptIndex { .. } | AnalyzerError::Serialization(_)) => {
                CloudlogError::Storage(StorageError::Query(other.to_string()))
            }
            AnalyzerError::Regex(e) => CloudlogError::Config(ConfigError::InvalidValue {
                field: "signature".to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_parse_error_display() {
        let err = AnalyzerError::ExportParse {
            provider: "gcp".to_owned(),
            reason: "expected array".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("gcp"));
        assert!(msg.contains("expected array"));
    }

    #[test]
    fn corrupt_index_error_display() {
        let err = AnalyzerError::CorruptIndex {
            index: "cloud-logs-2024.01.15".to_owned(),
            line: 7,
            reason: "EOF while parsing".to_owned(),
        };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn config_error_converts_to_core_config_error() {
        let err: CloudlogError = AnalyzerError::Config {
            field: "bucket_width".to_owned(),
            reason: "unknown unit".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            CloudlogError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn export_parse_converts_to_collector_error() {
        let err: CloudlogError = AnalyzerError::ExportParse {
            provider: "aws".to_owned(),
            reason: "missing events".to_owned(),
        }
        .into();
        assert!(matches!(err, CloudlogError::Collector(_)));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CloudlogError = AnalyzerError::from(io_err).into();
        assert!(matches!(err, CloudlogError::Io(_)));
    }
}
