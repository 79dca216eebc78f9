//! Aggregate statistics over an operation tree snapshot.
//!
//! Statistics are computed from record data only, so the same function
//! serves the aggregator facade and tests.

use crate::tree::{OperationRecord, OperationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counts and observed time range for one build's operations.
///
/// `running + completed + failed == total_operations`; a record counts as
/// running until its finish event arrives, even if a descendant already
/// marked it failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeStats {
    pub total_operations: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub category_counts: HashMap<String, usize>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TreeStats {
    /// Compute statistics from any sequence of records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a OperationRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_operations += 1;
            match record.status() {
                OperationStatus::Running => stats.running += 1,
                OperationStatus::Completed => stats.completed += 1,
                OperationStatus::Failed => stats.failed += 1,
            }
            *stats
                .category_counts
                .entry(record.category.name().to_string())
                .or_insert(0) += 1;

            let latest = record.end_time.unwrap_or(record.start_time);
            stats.time_range = match stats.time_range {
                None => Some((record.start_time, latest)),
                Some((start, end)) => Some((start.min(record.start_time), end.max(latest))),
            };
        }
        stats
    }
}
