//! Operation records and the mutable operation forest.

use crate::error::{Error, Result};
use crate::event::{Failure, OperationCategory, OperationId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Running,
    Completed,
    Failed,
}

/// One reported operation.
///
/// Created by its start event, closed by its finish event, never removed
/// for the lifetime of a build. `failures` holds only the failures this
/// operation reported itself; `failed` is also set when any descendant
/// reported one, and once set is never cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub display_name: String,
    pub category: OperationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<OperationId>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
    pub failed: bool,
    /// Child ids in the order their start events were accepted.
    pub children: Vec<OperationId>,
}

impl OperationRecord {
    pub fn status(&self) -> OperationStatus {
        match self.end_time {
            None => OperationStatus::Running,
            Some(_) if self.failed => OperationStatus::Failed,
            Some(_) => OperationStatus::Completed,
        }
    }

    /// True until the finish event arrives. A stream that ends abnormally
    /// leaves records in this state.
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Mutable forest of operation records for one build.
///
/// Append-only: records are inserted by start events and updated once by
/// finish events. A new build gets a fresh tree.
#[derive(Debug, Default)]
pub struct OperationTree {
    records: HashMap<OperationId, OperationRecord>,
    start_order: Vec<OperationId>,
    by_name: HashMap<String, Vec<OperationId>>,
    root: Option<OperationId>,
}

impl OperationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for a started operation.
    ///
    /// A missing `parent_id` makes the operation the build root; only one
    /// rootless insert is accepted per tree. Parents must be inserted
    /// before their children.
    pub fn insert_start(
        &mut self,
        id: OperationId,
        display_name: impl Into<String>,
        category: OperationCategory,
        parent_id: Option<OperationId>,
        start_time: DateTime<Utc>,
    ) -> Result<()> {
        if self.records.contains_key(&id) {
            return Err(Error::DuplicateOperation(id));
        }
        match parent_id {
            Some(parent) => {
                let parent_record = self.records.get_mut(&parent).ok_or(Error::UnknownParent {
                    id,
                    parent_id: parent,
                })?;
                parent_record.children.push(id);
            }
            None => {
                if let Some(existing) = self.root {
                    return Err(Error::DuplicateRoot { id, existing });
                }
                self.root = Some(id);
            }
        }
        let display_name = display_name.into();
        self.by_name
            .entry(display_name.clone())
            .or_default()
            .push(id);
        self.records.insert(
            id,
            OperationRecord {
                id,
                display_name,
                category,
                parent_id,
                start_time,
                end_time: None,
                failures: Vec::new(),
                failed: false,
                children: Vec::new(),
            },
        );
        self.start_order.push(id);
        Ok(())
    }

    /// Close a running operation.
    ///
    /// Non-empty `failures` mark the record and every ancestor up to the
    /// root as failed. Failure never propagates downward or across
    /// siblings.
    pub fn record_finish(
        &mut self,
        id: OperationId,
        end_time: DateTime<Utc>,
        failures: Vec<Failure>,
    ) -> Result<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(Error::UnknownOperation(id))?;
        if record.end_time.is_some() {
            return Err(Error::AlreadyFinished(id));
        }
        record.end_time = Some(end_time);
        let reported_failure = !failures.is_empty();
        record.failures = failures;
        if reported_failure {
            self.mark_failed_upward(id);
        }
        Ok(())
    }

    // Walks parent links toward the root. Stops at the first node that is
    // already failed: a failed node's ancestors are failed too, since
    // every earlier walk ran all the way up.
    fn mark_failed_upward(&mut self, from: OperationId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let Some(record) = self.records.get_mut(&id) else {
                break;
            };
            if record.failed {
                break;
            }
            record.failed = true;
            current = record.parent_id;
        }
    }

    pub fn get(&self, id: OperationId) -> Option<&OperationRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: OperationId) -> bool {
        self.records.contains_key(&id)
    }

    /// The single rootless operation, once its start event has arrived.
    pub fn root(&self) -> Option<&OperationRecord> {
        self.root.and_then(|id| self.records.get(&id))
    }

    /// The unique record with the given display name. Zero matches and
    /// multiple matches are both surfaced as errors; a duplicated display
    /// name is a producer bug, never silently resolved by picking one.
    pub fn lookup_by_name(&self, display_name: &str) -> Result<&OperationRecord> {
        match self.by_name.get(display_name).map(Vec::as_slice) {
            None | Some([]) => Err(Error::NotFound(display_name.to_string())),
            Some([id]) => Ok(&self.records[id]),
            Some(ids) => Err(Error::AmbiguousName {
                name: display_name.to_string(),
                count: ids.len(),
            }),
        }
    }

    /// Records in the order their start events were accepted. The
    /// iterator is lazy and restartable: each call starts over.
    pub fn all_operations(&self) -> impl Iterator<Item = &OperationRecord> + '_ {
        self.start_order.iter().map(|id| &self.records[id])
    }

    pub fn len(&self) -> usize {
        self.start_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_order.is_empty()
    }
}
