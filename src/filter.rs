//! Category filtering for subscription views.
//!
//! Filtering is applied lazily at query time: the tree always holds every
//! operation, and a view decides visibility per lookup. Hiding a node
//! hides its entire subtree; descendants are never promoted to a visible
//! ancestor. Visibility checks are pure predicates over a tree snapshot.

use crate::event::OperationCategory;
use crate::tree::{OperationRecord, OperationTree};
use std::collections::HashSet;

/// Subscription-time predicate over operation categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    // None means every category is visible.
    visible: Option<HashSet<OperationCategory>>,
}

impl CategoryFilter {
    /// Every category is visible. This is the default subscription.
    pub fn all() -> Self {
        Self { visible: None }
    }

    /// Only the given categories are visible.
    pub fn only(categories: impl IntoIterator<Item = OperationCategory>) -> Self {
        Self {
            visible: Some(categories.into_iter().collect()),
        }
    }

    pub fn is_visible(&self, category: OperationCategory) -> bool {
        self.visible
            .as_ref()
            .map_or(true, |set| set.contains(&category))
    }
}

/// True when `record` and every one of its ancestors is visible under
/// `filter`.
///
/// A hidden node's descendants are unreachable through any visible path
/// in a single-parent tree, so checking the ancestor chain is the whole
/// subtree rule.
pub fn subtree_visible(
    tree: &OperationTree,
    filter: &CategoryFilter,
    record: &OperationRecord,
) -> bool {
    if !filter.is_visible(record.category) {
        return false;
    }
    let mut parent = record.parent_id;
    while let Some(id) = parent {
        match tree.get(id) {
            Some(ancestor) if filter.is_visible(ancestor.category) => parent = ancestor.parent_id,
            _ => return false,
        }
    }
    true
}
