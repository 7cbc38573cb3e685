//! 통계 엔진 -- 필드별 집계와 시간 버킷 집계
//!
//! 모든 함수는 호출자가 넘긴 레코드 위에서 동기적으로 계산하며 I/O가 없습니다.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use cloudlog_core::types::{BucketWidth, LogRecord, parse_timestamp};

/// 필드 값이 없을 때 사용하는 그룹 키
pub const UNKNOWN_KEY: &str = "unknown";

/// 필드별 집계 결과
///
/// `breakdown`의 합은 항상 `total`과 같습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// 전체 레코드 수
    pub total: usize,
    /// 그룹 키별 레코드 수 (키 오름차순)
    pub breakdown: BTreeMap<String, usize>,
}

impl Breakdown {
    /// 전체 대비 비율(%)을 계산합니다. 전체가 0이면 0입니다.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// 개수 내림차순으로 정렬된 항목을 반환합니다. 개수가 같으면 키 순서입니다.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .breakdown
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// 레코드를 지정한 필드 값으로 그룹화하여 셉니다.
///
/// 표준 필드(`level`, `provider`, `source`, `timestamp`, `message`) 외의
/// 이름은 원본 이벤트의 키로 조회합니다. 필드가 없는 레코드는
/// `"unknown"` 그룹으로 집계됩니다.
pub fn breakdown(records: &[LogRecord], group_by: &str) -> Breakdown {
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let key = record
            .field_value(group_by)
            .map(|v| v.into_owned())
            .unwrap_or_else(|| UNKNOWN_KEY.to_owned());
        *groups.entry(key).or_insert(0) += 1;
    }

    Breakdown {
        total: records.len(),
        breakdown: groups,
    }
}

/// 타임스탬프를 버킷 폭으로 내림하여 버킷별 레코드 수를 셉니다.
///
/// 타임스탬프가 없거나 ISO-8601로 해석할 수 없는 레코드는 제외됩니다.
/// 결과는 버킷 라벨 오름차순입니다.
pub fn time_series(records: &[LogRecord], width: BucketWidth) -> BTreeMap<String, usize> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let Some(at) = record.timestamp.as_deref().and_then(parse_timestamp) else {
            continue;
        };
        *buckets.entry(width.label(&at)).or_insert(0) += 1;
    }
    buckets
}

/// 항목을 빈도 내림차순으로 셉니다.
///
/// 빈도가 같으면 먼저 나타난 항목이 앞에 옵니다 (안정 정렬).
pub fn rank_by_frequency<K, I>(items: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut ranked: Vec<(K, usize)> = Vec::new();

    for item in items {
        if let Some(&pos) = index.get(&item) {
            ranked[pos].1 += 1;
        } else {
            index.insert(item.clone(), ranked.len());
            ranked.push((item, 1));
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlog_core::types::{LogLevel, RawEvent};
    use proptest::prelude::*;

    fn record(ts: Option<&str>, level: LogLevel) -> LogRecord {
        LogRecord {
            timestamp: ts.map(str::to_owned),
            message: String::new(),
            level,
            provider: "aws".to_owned(),
            source: "app".to_owned(),
            raw: RawEvent::new(),
        }
    }

    #[test]
    fn breakdown_of_empty_input() {
        let result = breakdown(&[], "level");
        assert_eq!(result.total, 0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn breakdown_by_level() {
        let records = vec![
            record(None, LogLevel::Error),
            record(None, LogLevel::Info),
            record(None, LogLevel::Error),
        ];
        let result = breakdown(&records, "level");
        assert_eq!(result.total, 3);
        assert_eq!(result.breakdown.get("ERROR"), Some(&2));
        assert_eq!(result.breakdown.get("INFO"), Some(&1));
    }

    #[test]
    fn breakdown_by_raw_event_key_falls_back_to_unknown() {
        let mut tagged = record(None, LogLevel::Info);
        tagged.raw = RawEvent::new().with("region", "eu-west-1");
        let records = vec![tagged, record(None, LogLevel::Info)];

        let result = breakdown(&records, "region");
        assert_eq!(result.breakdown.get("eu-west-1"), Some(&1));
        assert_eq!(result.breakdown.get(UNKNOWN_KEY), Some(&1));

        let by_ts = breakdown(&records, "timestamp");
        assert_eq!(by_ts.breakdown.get(UNKNOWN_KEY), Some(&2));
    }

    #[test]
    fn percentage_and_ranking() {
        let records = vec![
            record(None, LogLevel::Info),
            record(None, LogLevel::Error),
            record(None, LogLevel::Info),
            record(None, LogLevel::Info),
        ];
        let result = breakdown(&records, "level");
        assert_eq!(result.percentage(3), 75.0);
        assert_eq!(result.ranked(), vec![("INFO", 3), ("ERROR", 1)]);
        assert_eq!(Breakdown::default().percentage(5), 0.0);
    }

    #[test]
    fn time_series_hourly_buckets_ascending() {
        let records = vec![
            record(Some("2024-01-01T11:59:59"), LogLevel::Info),
            record(Some("2024-01-01T10:00:00"), LogLevel::Info),
            record(Some("2024-01-01T10:30:00Z"), LogLevel::Info),
            record(None, LogLevel::Info),
        ];
        let series = time_series(&records, BucketWidth::HOUR);
        let entries: Vec<_> = series.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                ("2024-01-01T10".to_owned(), 2),
                ("2024-01-01T11".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn time_series_excludes_non_iso_timestamps() {
        let records = vec![
            record(Some("Jan 01 10:00:00"), LogLevel::Info),
            record(Some("1704103200000"), LogLevel::Info),
            record(Some("2024-01-01T10:00:00"), LogLevel::Info),
        ];
        let series = time_series(&records, BucketWidth::HOUR);
        assert_eq!(series.values().sum::<usize>(), 1);
    }

    #[test]
    fn time_series_accepts_minute_and_hour_precision() {
        let records = vec![
            record(Some("2024-01-01T10:00"), LogLevel::Info),
            record(Some("2024-01-01T10"), LogLevel::Info),
            record(Some("2024-01-01T10:00:00"), LogLevel::Info),
            record(Some("2024-01-01 11"), LogLevel::Info),
        ];
        let series = time_series(&records, BucketWidth::HOUR);
        assert_eq!(series.get("2024-01-01T10"), Some(&3));
        assert_eq!(series.get("2024-01-01T11"), Some(&1));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn time_series_quarter_hour_buckets() {
        let width: BucketWidth = "15m".parse().unwrap();
        let records = vec![
            record(Some("2024-01-01T10:14:59"), LogLevel::Info),
            record(Some("2024-01-01T10:15:00"), LogLevel::Info),
            record(Some("2024-01-01T10:29:00"), LogLevel::Info),
        ];
        let series = time_series(&records, width);
        assert_eq!(series.get("2024-01-01T10:00"), Some(&1));
        assert_eq!(series.get("2024-01-01T10:15"), Some(&2));
    }

    #[test]
    fn rank_by_frequency_is_stable_on_ties() {
        let ranked = rank_by_frequency(["b", "a", "c", "a", "b", "d"]);
        assert_eq!(ranked, vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
    }

    fn level() -> impl Strategy<Value = LogLevel> {
        prop_oneof![
            Just(LogLevel::Error),
            Just(LogLevel::Warning),
            Just(LogLevel::Debug),
            Just(LogLevel::Info),
        ]
    }

    proptest! {
        #[test]
        fn breakdown_counts_sum_to_total(
            levels in prop::collection::vec(level(), 0..200),
            field in prop_oneof![Just("level"), Just("source"), Just("missing")],
        ) {
            let records: Vec<_> = levels.into_iter().map(|l| record(None, l)).collect();
            let result = breakdown(&records, field);
            prop_assert_eq!(result.total, records.len());
            prop_assert_eq!(result.breakdown.values().sum::<usize>(), result.total);
        }
    }
}
