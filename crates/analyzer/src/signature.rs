//! 에러 시그니처 축약 -- 가변 부분 문자열을 마스킹하여 메시지를 안정적인 키로 변환
//!
//! [`SignatureReducer`]는 마스킹 정규식을 생성 시 한 번만 컴파일하여 보관합니다.
//! 치환 순서는 정확성 요구사항입니다. 타임스탬프를 숫자보다 먼저,
//! 16진수 ID를 IP/숫자보다 먼저 치환해야 같은 메시지가 같은 시그니처가 됩니다.
//!
//! # 사용 예시
//! ```
//! use cloudlog_analyzer::signature::SignatureReducer;
//!
//! let reducer = SignatureReducer::new().unwrap();
//! assert_eq!(
//!     reducer.reduce("timeout after 30 seconds from 10.0.0.1"),
//!     "timeout after [NUM] seconds from [IP]",
//! );
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use cloudlog_core::types::{LogLevel, LogRecord};

use crate::error::AnalyzerError;
use crate::stats::rank_by_frequency;

/// 기본 시그니처 최대 길이 (문자)
pub const DEFAULT_MAX_CHARS: usize = 100;

/// 잘린 시그니처 끝에 붙는 표시
pub const ELLIPSIS: &str = "...";

/// 마스킹 규칙 (적용 순서대로)
const MASK_RULES: &[(&str, &str)] = &[
    (r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}", "[TIMESTAMP]"),
    (r"(?i)\b[0-9a-f]{8,}\b", "[ID]"),
    (r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b", "[IP]"),
    (r"\b\d+\b", "[NUM]"),
];

/// 시그니처별 발생 횟수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureCount {
    /// 축약된 시그니처
    pub signature: String,
    /// 발생 횟수
    pub count: usize,
}

/// 에러 메시지 시그니처 축약기
///
/// 순수하고 결정적입니다. 내부 상태는 컴파일된 정규식뿐이므로
/// 여러 스레드에서 공유해도 안전합니다.
#[derive(Debug, Clone)]
pub struct SignatureReducer {
    masks: Vec<(Regex, &'static str)>,
    max_chars: usize,
}

impl SignatureReducer {
    /// 기본 길이 제한(100자)으로 축약기를 생성합니다.
    pub fn new() -> Result<Self, AnalyzerError> {
        Self::with_max_chars(DEFAULT_MAX_CHARS)
    }

    /// 길이 제한을 지정하여 축약기를 생성합니다.
    pub fn with_max_chars(max_chars: usize) -> Result<Self, AnalyzerError> {
        if max_chars == 0 {
            return Err(AnalyzerError::Config {
                field: "signature_max_chars".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        let masks = MASK_RULES
            .iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, *replacement)))
            .collect::<Result<Vec<_>, AnalyzerError>>()?;

        Ok(Self { masks, max_chars })
    }

    /// 길이 제한 (문자)
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// 메시지를 시그니처로 축약합니다.
    ///
    /// 마스킹 후 길이 제한을 넘으면 앞부분만 남기고 `...`을 붙이며,
    /// 마지막으로 앞뒤 공백을 제거합니다.
    pub fn reduce(&self, message: &str) -> String {
        let mut masked = message.to_owned();
        for (regex, replacement) in &self.masks {
            masked = regex.replace_all(&masked, *replacement).into_owned();
        }

        if masked.chars().count() > self.max_chars {
            // 문자 경계에서 자릅니다
            let cut = masked
                .char_indices()
                .nth(self.max_chars)
                .map(|(idx, _)| idx)
                .unwrap_or(masked.len());
            masked.truncate(cut);
            masked.push_str(ELLIPSIS);
        }

        masked.trim().to_owned()
    }

    /// ERROR 레코드의 시그니처를 빈도순으로 상위 `top_n`개 반환합니다.
    ///
    /// 빈도가 같으면 먼저 나타난 시그니처가 앞에 옵니다.
    pub fn top_signatures(&self, records: &[LogRecord], top_n: usize) -> Vec<SignatureCount> {
        let signatures = records
            .iter()
            .filter(|r| r.level == LogLevel::Error)
            .map(|r| self.reduce(&r.message));

        rank_by_frequency(signatures)
            .into_iter()
            .take(top_n)
            .map(|(signature, count)| SignatureCount { signature, count })
            .collect()
    }
}
