//! 에러 타입 — 도메인별 에러 정의

/// cloudlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CloudlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 로그 수집기 에러
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 저장소 연결(열기) 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 쓰기 실패
    #[error("write failed: {0}")]
    Write(String),
}

/// 로그 수집기 에러
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// 소스를 사용할 수 없음 (자격 증명/내보내기 파일 없음 등)
    #[error("{provider} source unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    /// 소스에서 이벤트를 가져오는 중 실패
    #[error("{provider} fetch failed: {reason}")]
    Fetch { provider: String, reason: String },
}
