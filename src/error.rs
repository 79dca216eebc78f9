use crate::event::{ContextId, OperationId};
use thiserror::Error;

/// Errors surfaced by event ingestion and tree queries.
///
/// Structural variants mean the event stream itself is malformed; the
/// tree is never patched to hide them. Query variants are returned
/// synchronously to the caller. Reported build failures are data, not
/// errors, and never appear here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate start event for operation {0}")]
    DuplicateOperation(OperationId),

    #[error("operation {id} has no parent but {existing} is already the build root")]
    DuplicateRoot {
        id: OperationId,
        existing: OperationId,
    },

    #[error("operation {id} references unknown parent {parent_id}")]
    UnknownParent {
        id: OperationId,
        parent_id: OperationId,
    },

    #[error("finish event for operation {0} that was never started")]
    UnknownOperation(OperationId),

    #[error("operation {0} already finished")]
    AlreadyFinished(OperationId),

    #[error("finish event for operation {id} does not match innermost open operation {expected:?} in context '{context}'")]
    StackMismatch {
        context: ContextId,
        id: OperationId,
        expected: Option<OperationId>,
    },

    #[error("no operation named '{0}'")]
    NotFound(String),

    #[error("display name '{name}' matches {count} operations")]
    AmbiguousName { name: String, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
