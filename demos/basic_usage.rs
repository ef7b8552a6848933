//! Basic router usage example
//!
//! Demonstrates rule-based routing to the console, breadcrumb and reporter
//! handlers, level filtering and narrowing a logger with `use_handler`.
//!
//! Run with: cargo run --example basic_usage

use rust_log_router::handlers::JsonLinesReporter;
use rust_log_router::prelude::*;
use std::sync::Arc;

const CONFIG: &str = r#"{
    "loggers": {
        "^dashboard\\.": {
            "console": ["warn", "error", "critical"],
            "backlog": ["debug", "info", "warn"],
            "sentry": ["error", "critical"]
        },
        ".*": {
            "console": ["error", "critical"]
        }
    }
}"#;

fn main() -> Result<()> {
    println!("=== Rust Log Router - Basic Usage Example ===\n");

    let trail = Arc::new(BreadcrumbTrail::new());
    let reporter = Arc::new(
        ReporterHandler::new(Arc::new(JsonLinesReporter::new(std::io::stdout())))
            .with_breadcrumbs(Arc::clone(&trail)),
    );

    let manager = LogManager::builder()
        .handler(ConsoleHandler::new())
        .handler(BreadcrumbHandler::new(Arc::clone(&trail)))
        .shared_handler(reporter.clone())
        .configuration(Configuration::from_json_str(CONFIG)?)
        .build()?;

    println!("1. Routing by logger name:");
    let socket = manager.get_logger("dashboard.websocket");
    socket.info("connected to gateway");
    socket.warn("heartbeat late, reconnecting");
    socket.error("gave up after 5 attempts");

    println!("\n2. Level filtering:");
    let other = manager.get_logger("billing");
    match other.info("invoice generated") {
        Some(_) => println!("   info delivered"),
        None => println!("   info dropped: no handler accepts it for 'billing'"),
    }
    other.error("payment provider timeout");

    println!("\n3. Narrowing to one handler:");
    socket
        .use_handler("console")
        .critical("reported to the console only");

    reporter.flush()?;

    println!("\n4. Breadcrumbs recorded: {}", trail.len());
    let metrics = manager.metrics();
    println!(
        "   dispatched={} filtered={} unrouted={}",
        metrics.events_dispatched(),
        metrics.events_filtered(),
        metrics.events_unrouted()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
