//! Common test utilities and helpers

use chrono::{DateTime, Duration, TimeZone, Utc};
use optree::{BuildEvent, ContextId, Failure, OperationCategory, OperationId};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a subscriber once so `RUST_LOG=debug` surfaces aggregator
/// logs while a test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Fixed origin so event sequences are reproducible across runs.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

/// Timestamp `offset_secs` after the origin.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(offset_secs)
}

/// Build a start event with an optional explicit parent.
pub fn started(
    id: u64,
    name: &str,
    category: OperationCategory,
    parent: Option<u64>,
    context: &str,
    offset_secs: i64,
) -> BuildEvent {
    BuildEvent::Started {
        id: OperationId(id),
        display_name: name.to_string(),
        category,
        parent_id: parent.map(OperationId),
        context_id: ContextId::new(context),
        timestamp: at(offset_secs),
    }
}

/// Build a successful finish event.
pub fn finished(id: u64, context: &str, offset_secs: i64) -> BuildEvent {
    BuildEvent::Finished {
        id: OperationId(id),
        context_id: ContextId::new(context),
        timestamp: at(offset_secs),
        failures: Vec::new(),
    }
}

/// Build a failing finish event with the given messages.
pub fn finished_with_failures(
    id: u64,
    context: &str,
    offset_secs: i64,
    messages: &[&str],
) -> BuildEvent {
    BuildEvent::Finished {
        id: OperationId(id),
        context_id: ContextId::new(context),
        timestamp: at(offset_secs),
        failures: messages.iter().map(|m| Failure::new(*m)).collect(),
    }
}
