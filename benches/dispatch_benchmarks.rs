//! Criterion benchmarks for rust_log_router

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_log_router::prelude::*;
use std::sync::Arc;

fn noop_manager(config: Configuration) -> LogManager {
    LogManager::builder()
        .function("console", |_| Ok(()))
        .function("backlog", |_| Ok(()))
        .function("sentry", |_| Ok(()))
        .configuration(config)
        .build()
        .expect("handlers registered")
}

fn standard_config() -> Configuration {
    Configuration::from_json_str(
        r#"{ "loggers": {
            "^dashboard\\.": {
                "console": ["warn", "error", "critical"],
                "backlog": ["debug", "info", "warn"],
                "sentry": ["error", "critical"]
            },
            ".*": { "console": ["error", "critical"] }
        } }"#,
    )
    .expect("valid configuration")
}

// ============================================================================
// Resolution Benchmarks
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    for rule_count in [1usize, 10, 100] {
        let mut builder = Configuration::builder();
        for i in 0..rule_count {
            builder = builder.rule(
                format!(r"^module{}\.", i),
                ActivationTable::new().with_handler("console", [LogLevel::Error]),
            );
        }
        let config = builder.build().expect("valid patterns");
        let last = format!("module{}.worker", rule_count - 1);

        group.bench_with_input(BenchmarkId::new("last_rule", rule_count), &last, |b, name| {
            b.iter(|| black_box(config.resolve(black_box(name))));
        });

        group.bench_with_input(BenchmarkId::new("no_match", rule_count), &config, |b, config| {
            b.iter(|| black_box(config.resolve(black_box("unrelated"))));
        });
    }

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let manager = noop_manager(standard_config());
    let logger = manager.get_logger("dashboard.websocket");

    group.bench_function("delivered_one_handler", |b| {
        b.iter(|| black_box(logger.info(black_box("connected"))));
    });

    group.bench_function("delivered_two_handlers", |b| {
        b.iter(|| black_box(logger.error(black_box("dropped"))));
    });

    let narrowed = logger.use_handler("sentry");
    group.bench_function("strict_handler", |b| {
        b.iter(|| black_box(narrowed.error(black_box("dropped"))));
    });

    let fallback = manager.get_logger("other");
    group.bench_function("filtered_by_level", |b| {
        b.iter(|| black_box(fallback.debug(black_box("ignored"))));
    });

    let extra = LogContext::new()
        .with_field("user_id", 12345)
        .with_field("action", "login");
    group.bench_function("with_extra", |b| {
        b.iter(|| black_box(logger.warn_with(black_box("retrying"), &extra)));
    });

    group.finish();
}

fn bench_unrouted(c: &mut Criterion) {
    let manager = noop_manager(
        Configuration::from_json_str(r#"{ "loggers": { "^app\\.": { "console": ["info"] } } }"#)
            .expect("valid configuration"),
    );
    let logger = manager.get_logger("library.internal");

    c.bench_function("unrouted", |b| {
        b.iter(|| black_box(logger.info(black_box("nobody listens"))));
    });
}

// ============================================================================
// Concurrency Benchmarks
// ============================================================================

fn bench_concurrent_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_dispatch");

    for thread_count in [2usize, 4, 8] {
        let manager = Arc::new(noop_manager(standard_config()));
        group.throughput(Throughput::Elements((thread_count * 100) as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(thread_count),
            &thread_count,
            |b, &threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let manager = Arc::clone(&manager);
                            std::thread::spawn(move || {
                                let logger = manager.get_logger(format!("dashboard.{}", t));
                                for _ in 0..100 {
                                    logger.warn("contended");
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_configuration_parse(c: &mut Criterion) {
    let json = r#"{ "loggers": {
        "^dashboard\\.": { "console": ["warn", "error"], "sentry": ["error", "critical"] },
        "^api\\.": { "console": ["info"], "backlog": ["debug", "info"] },
        ".*": { "console": ["error"] }
    } }"#;

    c.bench_function("configuration_parse", |b| {
        b.iter(|| black_box(Configuration::from_json_str(black_box(json))));
    });
}

criterion_group!(
    benches,
    bench_resolution,
    bench_dispatch,
    bench_unrouted,
    bench_concurrent_dispatch,
    bench_configuration_parse,
);
criterion_main!(benches);
