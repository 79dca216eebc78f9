//! Event records emitted by a build process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque operation identifier, assigned by the producer and unique for
/// the lifetime of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OperationId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier grouping events that share one causality stack, such as a
/// worker thread or a logical sub-build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Operation classification used for subscription-time filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationCategory {
    Generic,
    ProjectConfiguration,
    TaskExecution,
    DependencyResolution,
    Transform,
    Worker,
}

impl OperationCategory {
    /// Stable name used in logs and statistics keys.
    pub fn name(&self) -> &'static str {
        match self {
            OperationCategory::Generic => "generic",
            OperationCategory::ProjectConfiguration => "project_configuration",
            OperationCategory::TaskExecution => "task_execution",
            OperationCategory::DependencyResolution => "dependency_resolution",
            OperationCategory::Transform => "transform",
            OperationCategory::Worker => "worker",
        }
    }
}

/// A reported failure with an optional cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Failure>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn caused_by(message: impl Into<String>, cause: Failure) -> Self {
        Self {
            message: message.into(),
            causes: vec![cause],
        }
    }
}

/// One notification from a build process.
///
/// `Started` carries everything needed to place the operation in the
/// tree. `parent_id` is optional: producers that do not stamp parents
/// rely on per-context causality inference instead. `Finished` closes
/// the operation; absent or empty `failures` means success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildEvent {
    Started {
        id: OperationId,
        display_name: String,
        category: OperationCategory,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<OperationId>,
        context_id: ContextId,
        timestamp: DateTime<Utc>,
    },
    Finished {
        id: OperationId,
        context_id: ContextId,
        timestamp: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        failures: Vec<Failure>,
    },
}

impl BuildEvent {
    /// The operation this event refers to.
    pub fn operation_id(&self) -> OperationId {
        match self {
            BuildEvent::Started { id, .. } | BuildEvent::Finished { id, .. } => *id,
        }
    }

    /// The execution context the event arrived on.
    pub fn context_id(&self) -> &ContextId {
        match self {
            BuildEvent::Started { context_id, .. } | BuildEvent::Finished { context_id, .. } => {
                context_id
            }
        }
    }

    /// Get a human-readable name for this event kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BuildEvent::Started { .. } => "started",
            BuildEvent::Finished { .. } => "finished",
        }
    }
}
