//! 이상 탐지 / 통계 벤치마크
//!
//! 기본 쿼리 한도(10,000건) 규모의 레코드 집합에 대한 탐지와 집계 비용을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cloudlog_analyzer::{AnomalyDetector, breakdown, time_series};
use cloudlog_core::types::{BucketWidth, LogLevel, LogRecord, RawEvent};

fn make_records(n: usize) -> Vec<LogRecord> {
    (0..n)
        .map(|i| {
            let (level, message) = match i % 10 {
                0 | 1 => (LogLevel::Error, format!("ERROR: query {} failed", i % 37)),
                2 => (LogLevel::Warning, "WARNING: High memory usage detected".to_owned()),
                _ => (LogLevel::Info, "User authentication successful".to_owned()),
            };
            LogRecord {
                timestamp: Some(format!("2024-01-15T{:02}:{:02}:00Z", (i / 60) % 24, i % 60)),
                message,
                level,
                provider: "aws".to_owned(),
                source: "/aws/lambda/api".to_owned(),
                raw: RawEvent::new(),
            }
        })
        .collect()
}

fn bench_detect(c: &mut Criterion) {
    let detector = AnomalyDetector::default();
    let mut group = c.benchmark_group("anomaly_detect");

    for size in [1_000usize, 10_000] {
        let records = make_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), &records, |b, records| {
            b.iter(|| detector.detect(black_box(records)))
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let records = make_records(10_000);
    let mut group = c.benchmark_group("stats");
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("breakdown_level", |b| {
        b.iter(|| breakdown(black_box(&records), "level"))
    });
    group.bench_function("time_series_hourly", |b| {
        b.iter(|| time_series(black_box(&records), BucketWidth::HOUR))
    });

    group.finish();
}

criterion_group!(benches, bench_detect, bench_stats);
criterion_main!(benches);
