//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 수집기, 저장소, 분석기가 공유하는 데이터 구조를 정의합니다.
//! 원시 이벤트([`RawEvent`])는 정규화를 거쳐 [`LogRecord`]가 되고,
//! 이후 모든 분석은 `LogRecord` 시퀀스 위에서 수행됩니다.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// 로그 레벨
///
/// 정규화된 레코드는 항상 이 네 값 중 하나를 가집니다.
/// 인식할 수 없는 내용은 `Info`로 매핑됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// 에러 (FATAL 포함)
    Error,
    /// 경고
    Warning,
    /// 디버그
    Debug,
    /// 정보성 (기본값)
    #[default]
    Info,
}

impl LogLevel {
    /// 저장 형식의 레벨 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
        }
    }

    /// 문자열에서 레벨을 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" | "fatal" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 클라우드 로그 제공자
///
/// 수집기 선택에만 사용되며, 분석 로직은 제공자에 따라 분기하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// AWS CloudWatch Logs
    Aws,
    /// Azure Monitor (Log Analytics)
    Azure,
    /// GCP Cloud Logging
    Gcp,
}

impl Provider {
    /// 제공자 태그 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
        }
    }

    /// 수집 대상 식별자의 이름 (로그 그룹, 워크스페이스 ID, 프로젝트)
    pub fn target_label(&self) -> &'static str {
        match self {
            Self::Aws => "log group",
            Self::Azure => "workspace id",
            Self::Gcp => "project",
        }
    }

    /// 문자열에서 제공자를 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" | "cloudwatch" => Some(Self::Aws),
            "azure" => Some(Self::Azure),
            "gcp" | "google" => Some(Self::Gcp),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 원시 로그 이벤트
///
/// 수집기가 생성하는 제공자별 불투명 매핑입니다. 최소한 `timestamp`,
/// `message`, `source` 키를 가질 수 있으며, 그 외 키는 그대로 보존됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    /// 빈 이벤트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 표준 세 필드로 이벤트를 생성합니다. `None`인 필드는 키 자체를 생략합니다.
    pub fn from_parts(
        timestamp: Option<&str>,
        message: impl Into<String>,
        source: Option<&str>,
    ) -> Self {
        let mut event = Self::new().with("message", message.into());
        if let Some(ts) = timestamp {
            event = event.with("timestamp", ts);
        }
        if let Some(src) = source {
            event = event.with("source", src);
        }
        event
    }

    /// 필드를 추가한 이벤트를 반환합니다.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// 원본 JSON 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 필드를 문자열로 조회합니다.
    ///
    /// 문자열은 그대로, 숫자/불리언/객체는 JSON 표현으로 반환합니다.
    /// 키가 없거나 `null`이면 `None`입니다.
    pub fn get_text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// 내부 매핑에 대한 참조
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 정규화된 로그 레코드
///
/// 제공자에 관계없이 동일한 형태를 가지며, 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 타임스탬프 (없을 수 있음)
    pub timestamp: Option<String>,
    /// 로그 메시지 (빈 문자열 가능)
    pub message: String,
    /// 추론된 로그 레벨
    pub level: LogLevel,
    /// 수집 제공자 태그 (귀속 정보 전용)
    pub provider: String,
    /// 제공자별 소스 식별자 (예: 로그 그룹 이름)
    pub source: String,
    /// 추적용 원시 이벤트
    pub raw: RawEvent,
}

impl LogRecord {
    /// 이름으로 필드 값을 조회합니다.
    ///
    /// 표준 필드(`timestamp`, `message`, `level`, `provider`, `source`) 외의
    /// 이름은 원시 이벤트에서 찾습니다. 값이 없으면 `None`입니다.
    pub fn field_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "timestamp" => self.timestamp.as_deref().map(Cow::Borrowed),
            "message" => Some(Cow::Borrowed(self.message.as_str())),
            "level" => Some(Cow::Borrowed(self.level.as_str())),
            "provider" => Some(Cow::Borrowed(self.provider.as_str())),
            "source" => Some(Cow::Borrowed(self.source.as_str())),
            other => self.raw.get_text(other),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.as_deref().unwrap_or("N/A"),
            self.level,
            self.message,
        )
    }
}

/// 수집 시간 창 (시작 포함, 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// 시작 시각
    pub start: DateTime<Utc>,
    /// 종료 시각
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// 시작/종료 시각으로 창을 생성합니다.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `end`에서 `span`만큼 거슬러 올라간 창을 생성합니다.
    pub fn ending_at(end: DateTime<Utc>, span: TimeDelta) -> Self {
        Self {
            start: end - span,
            end,
        }
    }

    /// 시각이 창 안에 있는지 확인합니다.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// 시계열 버킷 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketUnit {
    /// 분
    Minute,
    /// 시간
    Hour,
    /// 일
    Day,
}

/// 시계열 버킷 폭
///
/// `"15m"`, `"1h"`, `"6h"`, `"1d"` 형식으로 표기합니다.
/// 분 단위는 60의 약수, 시간 단위는 24의 약수, 일 단위는 1만 허용하여
/// 버킷 경계가 항상 고정되도록 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketWidth {
    unit: BucketUnit,
    step: u32,
}

impl BucketWidth {
    /// 1시간 버킷 (기본값)
    pub const HOUR: Self = Self {
        unit: BucketUnit::Hour,
        step: 1,
    };

    /// 버킷 단위
    pub fn unit(&self) -> BucketUnit {
        self.unit
    }

    /// 단위당 배수
    pub fn step(&self) -> u32 {
        self.step
    }

    /// 시각이 속한 버킷 라벨을 반환합니다.
    ///
    /// 1시간 버킷의 라벨은 `YYYY-MM-DDTHH`로, ISO 타임스탬프의 앞 13자와 같습니다.
    pub fn label(&self, at: &NaiveDateTime) -> String {
        let date = format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day());
        match self.unit {
            BucketUnit::Minute => {
                let minute = at.minute() - at.minute() % self.step;
                format!("{date}T{:02}:{minute:02}", at.hour())
            }
            BucketUnit::Hour => {
                let hour = at.hour() - at.hour() % self.step;
                format!("{date}T{hour:02}")
            }
            BucketUnit::Day => date,
        }
    }

    fn invalid(value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            field: "bucket_width".to_owned(),
            reason: format!("'{value}': {}", reason.into()),
        }
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self::HOUR
    }
}

impl FromStr for BucketWidth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (step, unit) = match trimmed.to_lowercase().as_str() {
            "minute" => (1, BucketUnit::Minute),
            "hour" => (1, BucketUnit::Hour),
            "day" => (1, BucketUnit::Day),
            _ => {
                let Some(unit_char) = trimmed.chars().last() else {
                    return Err(Self::invalid(s, "bucket width must not be empty"));
                };
                let unit = match unit_char {
                    'm' => BucketUnit::Minute,
                    'h' => BucketUnit::Hour,
                    'd' => BucketUnit::Day,
                    other => {
                        return Err(Self::invalid(
                            s,
                            format!("unknown unit '{other}', expected one of m, h, d"),
                        ));
                    }
                };
                let digits = &trimmed[..trimmed.len() - unit_char.len_utf8()];
                let step = digits
                    .parse::<u32>()
                    .map_err(|_| Self::invalid(s, "expected a positive integer before the unit"))?;
                (step, unit)
            }
        };

        let valid = match unit {
            BucketUnit::Minute => step > 0 && 60 % step == 0,
            BucketUnit::Hour => step > 0 && 24 % step == 0,
            BucketUnit::Day => step == 1,
        };
        if !valid {
            return Err(Self::invalid(
                s,
                "minutes must divide 60, hours must divide 24, days must be 1",
            ));
        }

        Ok(Self { unit, step })
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            BucketUnit::Minute => 'm',
            BucketUnit::Hour => 'h',
            BucketUnit::Day => 'd',
        };
        write!(f, "{}{}", self.step, unit)
    }
}

/// 타임스탬프 문자열을 기록된 벽시계 시각 그대로 파싱합니다.
///
/// RFC 3339(오프셋 포함)와 오프셋 없는 ISO-8601(`T` 또는 공백 구분)을
/// 허용합니다. 오프셋 없는 형식은 시까지만 있어도 되며 분, 초, 소수 초는
/// 생략할 수 있습니다. 그 외 형식은 `None`입니다.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    let parse = |input: &str| {
        NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    };
    // chrono는 분 없이 시만 있는 입력을 거부하므로 `:00`을 붙여 재시도합니다
    parse(raw).or_else(|| parse(&format!("{raw}:00")))
}

/// 오프셋 없는 ISO-8601 형식 (시:분까지 필수)
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 타임스탬프 문자열을 UTC 시각으로 파싱합니다.
///
/// 오프셋이 없는 타임스탬프는 UTC로 간주합니다.
pub fn parse_timestamp_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_timestamp(raw).map(|naive| naive.and_utc())
}
