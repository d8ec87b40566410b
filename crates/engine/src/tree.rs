//! Tree reconstruction from flat span records
//!
//! ## Algorithm
//!
//! 1. Index spans by id (duplicate ids and foreign run ids are rejected)
//! 2. Find the single root (a span with no parent)
//! 3. Resolve every parent reference to an index, building child lists
//! 4. Sort each child list by start time, then span id
//! 5. Walk from the root; any span not reached sits on a parent cycle
//! 6. Assemble owned nodes bottom-up in post-order
//!
//! Every step is iterative, so a deep chain of spans cannot exhaust the
//! stack. Cost is O(n log n) in the number of spans, from the sorts.
//!
//! ## Child order
//!
//! | Key | Direction |
//! |-----|-----------|
//! | has a valid start time | timed spans first |
//! | start time | ascending |
//! | span id | ascending |

use crate::status;
use runscope_core::{Error, MalformedReason, Result, RunId, Span, SpanId, TraceTreeNode};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Build the tree of one run from its spans
///
/// Input order does not affect the result.
///
/// # Errors
///
/// `MalformedTrace` when the spans do not form exactly one tree:
/// - a span belongs to another run
/// - two spans share an id
/// - zero or several roots
/// - a parent id that resolves to no span
/// - spans unreachable from the root
pub fn build_tree(run_id: &RunId, spans: Vec<Span>) -> Result<TraceTreeNode> {
    let malformed = |reason| Error::malformed(run_id.clone(), reason);

    let mut index: FxHashMap<&SpanId, usize> = FxHashMap::default();
    index.reserve(spans.len());
    for (i, span) in spans.iter().enumerate() {
        if &span.run_id != run_id {
            return Err(malformed(MalformedReason::ForeignSpan {
                span_id: span.span_id.clone(),
                run_id: span.run_id.clone(),
            }));
        }
        if index.insert(&span.span_id, i).is_some() {
            return Err(malformed(MalformedReason::DuplicateSpanId(span.span_id.clone())));
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); spans.len()];
    for (i, span) in spans.iter().enumerate() {
        match &span.parent_id {
            None => roots.push(i),
            Some(parent_id) => match index.get(parent_id) {
                Some(&p) => children[p].push(i),
                None => {
                    return Err(malformed(MalformedReason::DanglingParent {
                        span_id: span.span_id.clone(),
                        parent_id: parent_id.clone(),
                    }))
                }
            },
        }
    }

    let root = match roots.as_slice() {
        [] => return Err(malformed(MalformedReason::NoRoot)),
        [only] => *only,
        many => {
            let mut ids: Vec<SpanId> = many.iter().map(|&i| spans[i].span_id.clone()).collect();
            ids.sort();
            return Err(malformed(MalformedReason::MultipleRoots(ids)));
        }
    };

    for list in &mut children {
        list.sort_by(|&a, &b| child_order(&spans[a], &spans[b]));
    }

    let post_order = post_order(root, &children);
    if post_order.len() != spans.len() {
        let mut reached = vec![false; spans.len()];
        for &i in &post_order {
            reached[i] = true;
        }
        let mut stranded: Vec<SpanId> = (0..spans.len())
            .filter(|&i| !reached[i])
            .map(|i| spans[i].span_id.clone())
            .collect();
        stranded.sort();
        return Err(malformed(MalformedReason::Cycle(stranded)));
    }

    drop(index);
    let mut slots: Vec<Option<Span>> = spans.into_iter().map(Some).collect();
    let mut built: Vec<Option<TraceTreeNode>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);

    for &i in &post_order {
        let Some(span) = slots[i].take() else {
            continue;
        };
        let kids = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(TraceTreeNode {
            status: status::resolve(&span),
            latency_ms: span.latency_ms(),
            span,
            children: kids,
        });
    }

    built[root]
        .take()
        .ok_or_else(|| malformed(MalformedReason::NoRoot))
}

/// Sibling ordering: timed spans by start, then untimed, ties on span id
pub fn child_order(a: &Span, b: &Span) -> Ordering {
    let (ta, tb) = (a.start_instant(), b.start_instant());
    ta.is_none()
        .cmp(&tb.is_none())
        .then(ta.cmp(&tb))
        .then_with(|| a.span_id.cmp(&b.span_id))
}

/// Indices reachable from `root`, children before parents
fn post_order(root: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut seen = vec![false; children.len()];
    let mut stack: Vec<(usize, bool)> = vec![(root, false)];
    seen[root] = true;

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        stack.push((node, true));
        for &child in children[node].iter().rev() {
            if !seen[child] {
                seen[child] = true;
                stack.push((child, false));
            }
        }
    }
    order
}
