//! Performance benchmarks for audit-pipeline
//!
//! Run with: cargo bench

use audit_pipeline::{AuditConfig, AuditEvent, AuditLevel, AuditPipeline, MemorySink};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_event_creation(c: &mut Criterion) {
    c.bench_function("AuditEvent::new", |b| {
        b.iter(|| {
            AuditEvent::new("note.delete", AuditLevel::High)
                .with_actor("usr-1")
                .with_target("note:42")
                .with_metadata("ip", serde_json::json!("10.0.0.1"))
        });
    });
}

fn bench_event_serialization(c: &mut Criterion) {
    let event = AuditEvent::new("note.delete", AuditLevel::High)
        .with_actor("usr-1")
        .with_target("note:42")
        .with_metadata("ip", serde_json::json!("10.0.0.1"))
        .with_metadata("reason", serde_json::json!("user request"));

    c.bench_function("AuditEvent serialize", |b| {
        b.iter(|| serde_json::to_vec(&event).unwrap());
    });

    let bytes = serde_json::to_vec(&event).unwrap();
    c.bench_function("AuditEvent deserialize", |b| {
        b.iter(|| serde_json::from_slice::<AuditEvent>(&bytes).unwrap());
    });
}

fn bench_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("record below batch size", |b| {
        let pipeline = rt.block_on(async {
            let config = AuditConfig {
                batch_size: usize::MAX,
                flush_interval_ms: 60_000,
                ..AuditConfig::default()
            };
            AuditPipeline::new(config, MemorySink::new(0)).unwrap()
        });

        b.to_async(&rt).iter(|| async {
            pipeline
                .record(
                    AuditEvent::new("user.update", AuditLevel::Medium)
                        .with_metadata("password", serde_json::json!("secret")),
                )
                .await
        });
    });
}

fn bench_record_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("record_throughput");
    for count in [10, 100, 1000] {
        group.bench_function(format!("{} events", count), |b| {
            b.to_async(&rt).iter(|| async {
                let config = AuditConfig {
                    batch_size: 50,
                    flush_interval_ms: 60_000,
                    ..AuditConfig::default()
                };
                let pipeline = AuditPipeline::new(config, MemorySink::new(0)).unwrap();
                for i in 0..count {
                    pipeline
                        .record(AuditEvent::new(format!("e{}", i), AuditLevel::Medium))
                        .await;
                }
                pipeline.shutdown().await.unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_event_creation,
    bench_event_serialization,
    bench_record,
    bench_record_throughput
);
criterion_main!(benches);
