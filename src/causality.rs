//! Parent inference for start events that carry no explicit parent id.

use crate::error::{Error, Result};
use crate::event::{ContextId, OperationId};
use std::collections::HashMap;

/// Per-execution-context stacks of currently open operation ids.
///
/// Every start pushes its id onto the stack of the context it arrived on,
/// whether or not its parent was explicit: later starts in the same
/// context may still infer it. An explicit parent id always wins over
/// stack inference, which is what keeps the tree correct when an
/// operation is interleaved into a context it did not originate from.
#[derive(Debug, Default)]
pub struct CausalityResolver {
    stacks: HashMap<ContextId, Vec<OperationId>>,
}

impl CausalityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parent for a start event: the explicit id when present, otherwise
    /// the innermost open operation of the context, otherwise none (the
    /// build-root case).
    pub fn resolve_parent(
        &self,
        context: &ContextId,
        explicit: Option<OperationId>,
    ) -> Option<OperationId> {
        explicit.or_else(|| {
            self.stacks
                .get(context)
                .and_then(|stack| stack.last().copied())
        })
    }

    /// Record that `id` is now the innermost open operation of `context`.
    pub fn opened(&mut self, context: &ContextId, id: OperationId) {
        self.stacks.entry(context.clone()).or_default().push(id);
    }

    /// Record that `id` finished. The finishing id must be the innermost
    /// open operation of its context; anything else is a nesting
    /// violation on the producer side. The check runs before the pop, so
    /// a surfaced mismatch leaves the stacks unchanged.
    pub fn closed(&mut self, context: &ContextId, id: OperationId) -> Result<()> {
        let Some(stack) = self.stacks.get_mut(context) else {
            return Err(Error::StackMismatch {
                context: context.clone(),
                id,
                expected: None,
            });
        };
        match stack.last().copied() {
            Some(top) if top == id => {
                stack.pop();
                if stack.is_empty() {
                    self.stacks.remove(context);
                }
                Ok(())
            }
            expected => Err(Error::StackMismatch {
                context: context.clone(),
                id,
                expected,
            }),
        }
    }

    /// Number of operations currently open on `context`.
    pub fn open_depth(&self, context: &ContextId) -> usize {
        self.stacks.get(context).map_or(0, Vec::len)
    }
}
