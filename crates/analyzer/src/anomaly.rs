//! 이상 탐지 -- 임계값/빈도 기반 두 가지 규칙으로 발견 사항을 생성
//!
//! 1. 에러 비율이 임계값을 넘으면 `high_error_rate` (심각도 high)
//! 2. 동일한 에러 메시지가 임계 횟수를 넘게 반복되면 `repeated_error` (심각도 medium)
//!
//! 반복 규칙은 시그니처가 아니라 원본 메시지를 그대로 셉니다.
//! 결과 순서: 에러 비율 발견이 먼저, 그 뒤 반복 발견이 횟수 내림차순
//! (같으면 먼저 나타난 메시지 순)입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use cloudlog_core::config::AnalysisConfig;
use cloudlog_core::types::{LogLevel, LogRecord};

use crate::stats::rank_by_frequency;

/// 발견 사항 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// 에러 비율 초과
    HighErrorRate,
    /// 동일 에러 반복
    RepeatedError,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighErrorRate => "high_error_rate",
            Self::RepeatedError => "repeated_error",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 발견 사항 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    High,
    Medium,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 이상 탐지 발견 사항
///
/// 실행마다 새로 생성되며 식별자가 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 종류
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    /// 심각도
    pub severity: AnomalySeverity,
    /// 사람이 읽을 수 있는 설명
    pub message: String,
    /// 관련 레코드 수
    pub count: usize,
}

/// 탐지 임계값
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// 에러 비율 임계값 (초과 시 탐지)
    pub error_rate_threshold: f64,
    /// 반복 횟수 임계값 (초과 시 탐지)
    pub repeat_threshold: usize,
    /// 평가할 반복 후보 수
    pub repeat_candidates: usize,
    /// 메시지 미리보기 길이 (문자)
    pub repeat_preview_chars: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_core(&AnalysisConfig::default())
    }
}

impl DetectorConfig {
    /// core의 분석 설정에서 탐지 임계값을 가져옵니다.
    pub fn from_core(core: &AnalysisConfig) -> Self {
        Self {
            error_rate_threshold: core.error_rate_threshold,
            repeat_threshold: core.repeat_threshold,
            repeat_candidates: core.repeat_candidates,
            repeat_preview_chars: core.repeat_preview_chars,
        }
    }
}

/// 이상 탐지기
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// 레코드 집합을 두 규칙으로 평가합니다.
    pub fn detect(&self, records: &[LogRecord]) -> Vec<Finding> {
        let errors: Vec<&LogRecord> = records
            .iter()
            .filter(|r| r.level == LogLevel::Error)
            .collect();

        let mut findings = Vec::new();
        if let Some(finding) = self.error_rate_finding(errors.len(), records.len()) {
            findings.push(finding);
        }
        findings.extend(self.repeated_error_findings(&errors));
        findings
    }

    fn error_rate_finding(&self, error_count: usize, total: usize) -> Option<Finding> {
        if total == 0 {
            return None;
        }

        let rate = error_count as f64 / total as f64;
        if rate <= self.config.error_rate_threshold {
            return None;
        }

        Some(Finding {
            kind: AnomalyKind::HighErrorRate,
            severity: AnomalySeverity::High,
            message: format!(
                "Error rate is {:.1}% (threshold: {}%)",
                rate * 100.0,
                format_threshold(self.config.error_rate_threshold * 100.0),
            ),
            count: error_count,
        })
    }

    fn repeated_error_findings(&self, errors: &[&LogRecord]) -> Vec<Finding> {
        rank_by_frequency(errors.iter().map(|r| r.message.as_str()))
            .into_iter()
            .take(self.config.repeat_candidates)
            .filter(|(_, count)| *count > self.config.repeat_threshold)
            .map(|(message, count)| {
                let preview: String = message
                    .chars()
                    .take(self.config.repeat_preview_chars)
                    .collect();
                Finding {
                    kind: AnomalyKind::RepeatedError,
                    severity: AnomalySeverity::Medium,
                    message: format!("Error repeated {count} times: {preview}..."),
                    count,
                }
            })
            .collect()
    }
}

/// 임계값 백분율을 소수 첫째 자리로 반올림하고, 정수면 소수점을 생략합니다.
fn format_threshold(percent: f64) -> String {
    let rounded = (percent * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}
