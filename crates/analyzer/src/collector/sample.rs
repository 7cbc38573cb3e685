//! 샘플 로그 소스 -- 자격 증명이나 내보내기 파일 없이 동작하는 결정적 합성 데이터

use chrono::SecondsFormat;

use cloudlog_core::error::CloudlogError;
use cloudlog_core::pipeline::LogSource;
use cloudlog_core::types::{Provider, RawEvent, TimeWindow};

/// 샘플 메시지 (순서대로 반복)
pub const SAMPLE_MESSAGES: [&str; 6] = [
    "Application started successfully",
    "Database connection established",
    "WARNING: High memory usage detected",
    "ERROR: Connection timeout to external service",
    "User authentication successful",
    "ERROR: Database query failed",
];

/// 샘플 메시지 반복 횟수
pub const SAMPLE_REPEAT: usize = 5;

/// 합성 데이터 소스
///
/// 6개 메시지를 5번 반복한 30개 이벤트를 생성합니다.
/// 모든 이벤트의 타임스탬프는 창의 시작 시각이고 소스는 `{provider}-sample`입니다.
#[derive(Debug, Clone)]
pub struct SampleSource {
    provider: Provider,
    name: String,
}

impl SampleSource {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            name: format!("{provider}-sample"),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// 창에 대한 샘플 이벤트를 생성합니다.
    pub fn generate(&self, window: &TimeWindow) -> Vec<RawEvent> {
        let timestamp = window.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        std::iter::repeat_n(SAMPLE_MESSAGES, SAMPLE_REPEAT)
            .flatten()
            .map(|message| {
                RawEvent::from_parts(Some(timestamp.as_str()), message, Some(self.name.as_str()))
            })
            .collect()
    }
}

impl LogSource for SampleSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<RawEvent>, CloudlogError> {
        Ok(self.generate(window))
    }
}
