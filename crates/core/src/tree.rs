//! Trace tree types for hierarchical visualization
//!
//! A [`TraceTreeNode`] is a span enriched with its ordered children. A parent
//! exclusively owns its children; there are no back-references beyond the
//! `parent_id` already present on the flat span record.

use crate::run::SpanStatus;
use crate::span::Span;
use crate::types::SpanId;
use serde::{Deserialize, Serialize};

/// A span with its children, recursively
///
/// Children are ordered by start time ascending with `span_id` as the
/// tiebreak, so identical input always yields an identical tree.
///
/// Dropping a node never recurses, whatever the depth. `Clone`,
/// `PartialEq` and serialization do recurse once per level; the engine
/// caps tree depth (`max_tree_depth`) to keep them within the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceTreeNode {
    /// The span at this node
    #[serde(flatten)]
    pub span: Span,
    /// Status resolved from the span's error and end time
    pub status: SpanStatus,
    /// Span latency in milliseconds, absent if not ended
    pub latency_ms: Option<u64>,
    /// Child nodes in start-time order
    pub children: Vec<TraceTreeNode>,
}

impl TraceTreeNode {
    /// Total number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal (parent before children)
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Find a node by span id within this subtree
    pub fn find(&self, span_id: &SpanId) -> Option<&TraceTreeNode> {
        self.iter().find(|node| &node.span.span_id == span_id)
    }
}

impl Drop for TraceTreeNode {
    fn drop(&mut self) {
        // Flatten descendants onto a heap stack; each popped node has no
        // children left by the time it is dropped
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a [`TraceTreeNode`] subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a TraceTreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TraceTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
