//! The public facade: ingest events from producer threads, expose the
//! query surface.

use crate::causality::CausalityResolver;
use crate::error::{Error, Result};
use crate::event::BuildEvent;
use crate::filter::{subtree_visible, CategoryFilter};
use crate::stats::TreeStats;
use crate::tree::{OperationRecord, OperationTree};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct AggregatorState {
    tree: OperationTree,
    resolver: CausalityResolver,
}

/// Thread-safe entry point for one build's event stream.
///
/// `record` is the single synchronization point across producer threads.
/// Queries take a read lock and hand out cloned snapshots, so a record
/// whose parent link is not yet established is never observable, and a
/// slow consumer never blocks ingestion longer than one clone.
#[derive(Debug, Clone, Default)]
pub struct EventAggregator {
    state: Arc<RwLock<AggregatorState>>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one event.
    ///
    /// Structural faults in the stream (duplicate ids, unknown parents,
    /// nesting violations) surface as errors and leave the tree as it was
    /// before the event; they are producer bugs and never repaired here.
    pub fn record(&self, event: BuildEvent) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let result = apply(&mut state, event);
        if let Err(err) = &result {
            warn!(error = %err, "rejected malformed build event");
        }
        result
    }

    /// Filtered view for a subscriber interested in a category subset.
    pub fn subscribe(&self, filter: CategoryFilter) -> OperationView {
        OperationView {
            state: Arc::clone(&self.state),
            filter,
        }
    }

    /// The unique operation with the given display name, across all
    /// categories.
    pub fn operation(&self, display_name: &str) -> Result<OperationRecord> {
        let state = self.state.read().unwrap();
        state
            .tree
            .lookup_by_name(display_name)
            .map(|record| record.clone())
    }

    pub fn parent_of(&self, record: &OperationRecord) -> Option<OperationRecord> {
        let state = self.state.read().unwrap();
        record
            .parent_id
            .and_then(|id| state.tree.get(id))
            .map(|parent| parent.clone())
    }

    /// Children of `record` in start-event order, re-read from the
    /// current tree so children started after the snapshot are included.
    pub fn children_of(&self, record: &OperationRecord) -> Vec<OperationRecord> {
        let state = self.state.read().unwrap();
        let Some(current) = state.tree.get(record.id) else {
            return Vec::new();
        };
        current
            .children
            .iter()
            .filter_map(|id| state.tree.get(*id))
            .cloned()
            .collect()
    }

    /// Snapshot of every operation in start-event order.
    pub fn all_operations(&self) -> Vec<OperationRecord> {
        let state = self.state.read().unwrap();
        state.tree.all_operations().cloned().collect()
    }

    pub fn stats(&self) -> TreeStats {
        let state = self.state.read().unwrap();
        TreeStats::from_records(state.tree.all_operations())
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap().tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().unwrap().tree.is_empty()
    }
}

fn apply(state: &mut AggregatorState, event: BuildEvent) -> Result<()> {
    match event {
        BuildEvent::Started {
            id,
            display_name,
            category,
            parent_id,
            context_id,
            timestamp,
        } => {
            let parent = state.resolver.resolve_parent(&context_id, parent_id);
            state
                .tree
                .insert_start(id, display_name, category, parent, timestamp)?;
            state.resolver.opened(&context_id, id);
            debug!(%id, context = %context_id, "operation started");
        }
        BuildEvent::Finished {
            id,
            context_id,
            timestamp,
            failures,
        } => {
            if !state.tree.contains(id) {
                return Err(Error::UnknownOperation(id));
            }
            state.resolver.closed(&context_id, id)?;
            state.tree.record_finish(id, timestamp, failures)?;
            debug!(%id, context = %context_id, "operation finished");
        }
    }
    Ok(())
}

/// A subscriber's filtered view over the shared tree.
///
/// An operation is visible only when its own category and every
/// ancestor's category are in the subscribed set, so hiding a node hides
/// its whole subtree; lookups and child listings never reparent hidden
/// descendants onto a visible ancestor.
#[derive(Debug, Clone)]
pub struct OperationView {
    state: Arc<RwLock<AggregatorState>>,
    filter: CategoryFilter,
}

impl OperationView {
    /// The unique visible operation with the given display name.
    /// Visibility applies before the zero/ambiguous check, so a name
    /// hidden by the filter reports not-found rather than leaking.
    pub fn operation(&self, display_name: &str) -> Result<OperationRecord> {
        let state = self.state.read().unwrap();
        let matches: Vec<&OperationRecord> = state
            .tree
            .all_operations()
            .filter(|record| record.display_name == display_name)
            .filter(|record| subtree_visible(&state.tree, &self.filter, record))
            .collect();
        match matches.as_slice() {
            [] => Err(Error::NotFound(display_name.to_string())),
            [record] => Ok((*record).clone()),
            records => Err(Error::AmbiguousName {
                name: display_name.to_string(),
                count: records.len(),
            }),
        }
    }

    pub fn contains(&self, display_name: &str) -> bool {
        let state = self.state.read().unwrap();
        let found = state.tree.all_operations().any(|record| {
            record.display_name == display_name
                && subtree_visible(&state.tree, &self.filter, record)
        });
        found
    }

    pub fn parent_of(&self, record: &OperationRecord) -> Option<OperationRecord> {
        let state = self.state.read().unwrap();
        let parent = record.parent_id.and_then(|id| state.tree.get(id))?;
        subtree_visible(&state.tree, &self.filter, parent).then(|| parent.clone())
    }

    /// Visible children of `record` in start-event order.
    pub fn children_of(&self, record: &OperationRecord) -> Vec<OperationRecord> {
        let state = self.state.read().unwrap();
        let Some(current) = state.tree.get(record.id) else {
            return Vec::new();
        };
        current
            .children
            .iter()
            .filter_map(|id| state.tree.get(*id))
            .filter(|child| subtree_visible(&state.tree, &self.filter, child))
            .cloned()
            .collect()
    }

    /// Snapshot of every visible operation in start-event order.
    pub fn all_operations(&self) -> Vec<OperationRecord> {
        let state = self.state.read().unwrap();
        state
            .tree
            .all_operations()
            .filter(|record| subtree_visible(&state.tree, &self.filter, record))
            .cloned()
            .collect()
    }
}
