//! # optree
//!
//! Reconstructs the causal parent/child tree of build operations from a
//! stream of started/finished events. Operations may be deeply nested,
//! interleave across unrelated subtrees, and span concurrent execution
//! contexts; the tree stays correct because parents come from explicit
//! parent ids when producers stamp them and from per-context causality
//! stacks when they do not.
//!
//! ## Modules
//!
//! - `aggregator` - Thread-safe facade accepting events and exposing the query surface
//! - `causality` - Per-execution-context stacks for parent inference
//! - `error` - Structural and query error taxonomy
//! - `event` - Inbound event records, ids, categories, failures
//! - `filter` - Subscription-time category filtering with subtree semantics
//! - `stats` - Aggregate counts over a tree snapshot
//! - `tree` - Operation records and the mutable operation forest
//!
//! ## Usage
//!
//! ```
//! use chrono::Utc;
//! use optree::{BuildEvent, ContextId, EventAggregator, OperationCategory, OperationId};
//!
//! let aggregator = EventAggregator::new();
//! aggregator.record(BuildEvent::Started {
//!     id: OperationId(1),
//!     display_name: "Run build".to_string(),
//!     category: OperationCategory::Generic,
//!     parent_id: None,
//!     context_id: ContextId::new("main"),
//!     timestamp: Utc::now(),
//! })?;
//! aggregator.record(BuildEvent::Finished {
//!     id: OperationId(1),
//!     context_id: ContextId::new("main"),
//!     timestamp: Utc::now(),
//!     failures: Vec::new(),
//! })?;
//!
//! let root = aggregator.operation("Run build")?;
//! assert!(!root.failed);
//! # Ok::<(), optree::Error>(())
//! ```

pub mod aggregator;
pub mod causality;
pub mod error;
pub mod event;
pub mod filter;
pub mod stats;
pub mod tree;

pub use aggregator::{EventAggregator, OperationView};
pub use causality::CausalityResolver;
pub use error::{Error, Result};
pub use event::{BuildEvent, ContextId, Failure, OperationCategory, OperationId};
pub use filter::CategoryFilter;
pub use stats::TreeStats;
pub use tree::{OperationRecord, OperationStatus, OperationTree};
