//! 정규화 -- 제공자별 원시 이벤트를 공통 레코드 형태로 변환
//!
//! [`normalize`]는 순수하고 전역(total)적인 함수입니다. 필드가 없으면
//! 빈 문자열 또는 `None`으로 대체되며 실패하지 않습니다.

use cloudlog_core::types::{LogLevel, LogRecord, RawEvent};

/// 레벨 추론 규칙 (먼저 일치하는 규칙이 우선)
const LEVEL_RULES: &[(&[&str], LogLevel)] = &[
    (&["ERROR", "FATAL"], LogLevel::Error),
    (&["WARN"], LogLevel::Warning),
    (&["DEBUG"], LogLevel::Debug),
];

/// 원시 이벤트 하나를 정규화된 레코드로 변환합니다.
///
/// 원시 이벤트는 변경 없이 `raw` 필드에 보존됩니다.
pub fn normalize(event: RawEvent, provider: &str) -> LogRecord {
    let timestamp = event.get_text("timestamp").map(|ts| ts.into_owned());
    let message = event
        .get_text("message")
        .map(|m| m.into_owned())
        .unwrap_or_default();
    let source = event
        .get_text("source")
        .map(|s| s.into_owned())
        .unwrap_or_default();
    let level = infer_level(&message);

    LogRecord {
        timestamp,
        message,
        level,
        provider: provider.to_owned(),
        source,
        raw: event,
    }
}

/// 이벤트 묶음을 정규화합니다.
pub fn normalize_all(events: Vec<RawEvent>, provider: &str) -> Vec<LogRecord> {
    events
        .into_iter()
        .map(|event| normalize(event, provider))
        .collect()
}

/// 메시지에서 로그 레벨을 추론합니다.
///
/// 대소문자를 무시한 부분 문자열 일치입니다. 어떤 규칙에도 맞지 않으면 `Info`입니다.
pub fn infer_level(message: &str) -> LogLevel {
    let upper = message.to_uppercase();
    LEVEL_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| upper.contains(needle)))
        .map(|(_, level)| *level)
        .unwrap_or_default()
}
