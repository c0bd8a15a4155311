//! Reduction Engine: the single entry point through which every internal
//! node is created, and the bottom-up normalization that removes redundant
//! tests from an already-built diagram. See spec §4.3.

use crate::decision::DecisionId;
use crate::error::{InvariantViolationError, XaddError};
use crate::node::{Node, NodeId, NodeStore};
use std::collections::HashMap;

/// Get-or-create an internal node, applying the one reduction rule that acts
/// at construction time: a test whose branches are already identical is
/// redundant and collapses to that shared branch. Every other caller in this
/// crate that wants an internal node goes through here rather than
/// `NodeStore::intern_internal` directly, mirroring the teacher's
/// `BddManager::make_node` precedent.
pub fn make_node(store: &mut NodeStore, decision: DecisionId, low: NodeId, high: NodeId) -> NodeId {
    if low == high {
        return low;
    }
    store.intern_internal(decision, low, high)
}

/// Like `make_node`, but checks the collapse invariant it relies on instead
/// of trusting it: a non-collapsed result must have come back with distinct
/// `low`/`high`, since equal branches are supposed to short-circuit above
/// before ever reaching `NodeStore::intern_internal`. Used by callers that
/// already propagate `XaddError`, so a broken invariant surfaces as a typed
/// error rather than a silently malformed diagram.
pub fn make_node_checked(
    store: &mut NodeStore,
    decision: DecisionId,
    low: NodeId,
    high: NodeId,
) -> Result<NodeId, XaddError> {
    let id = make_node(store, decision, low, high);
    if let Node::Internal { low: got_low, high: got_high, .. } = store.get(id) {
        let (got_low, got_high) = (*got_low, *got_high);
        debug_assert_ne!(
            got_low, got_high,
            "make_node collapse invariant broken: internal node {} has low == high",
            id
        );
        if got_low == got_high {
            return Err(InvariantViolationError {
                detail: format!(
                    "make_node({}, {}, {}) produced internal node {} with low == high",
                    decision, low, high, id
                ),
            }
            .into());
        }
    }
    Ok(id)
}

/// Bottom-up structural reduction: rebuilds `id` from its leaves upward,
/// re-running every node through `make_node` so any redundant test exposed by
/// prior transformations (substitution, LP pruning) collapses away. Diagrams
/// produced directly by `apply`/`unary` are already reduced by construction;
/// this is for diagrams whose shape changed without going through those
/// paths (e.g. a caller rebuilding a diagram from the textual format).
pub fn reduce(store: &mut NodeStore, id: NodeId) -> NodeId {
    let mut memo = HashMap::new();
    reduce_memo(store, id, &mut memo)
}

fn reduce_memo(store: &mut NodeStore, id: NodeId, memo: &mut HashMap<NodeId, NodeId>) -> NodeId {
    if let Some(&cached) = memo.get(&id) {
        return cached;
    }
    let result = match store.get(id).clone() {
        Node::Leaf(_) => id,
        Node::Internal { decision, low, high } => {
            let low_r = reduce_memo(store, low, memo);
            let high_r = reduce_memo(store, high, memo);
            make_node(store, decision, low_r, high_r)
        }
    };
    memo.insert(id, result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionId;
    use crate::expr::Expr;

    #[test]
    fn identical_branches_collapse() {
        let mut store = NodeStore::new();
        let leaf = store.intern_leaf(Expr::var("v"));
        let dec = DecisionId::for_test(10_000);
        let id = make_node(&mut store, dec, leaf, leaf);
        assert_eq!(id, leaf);
    }

    #[test]
    fn distinct_branches_intern() {
        let mut store = NodeStore::new();
        let dec = DecisionId::for_test(10_000);
        let id = make_node(&mut store, dec, NodeId::FALSE, NodeId::TRUE);
        assert_eq!(
            store.get(id),
            &Node::Internal {
                decision: dec,
                low: NodeId::FALSE,
                high: NodeId::TRUE,
            }
        );
    }

    #[test]
    fn make_node_checked_agrees_with_make_node_on_the_happy_path() {
        let mut store = NodeStore::new();
        let dec = DecisionId::for_test(10_000);
        let id = make_node_checked(&mut store, dec, NodeId::FALSE, NodeId::TRUE).unwrap();
        assert_eq!(
            store.get(id),
            &Node::Internal {
                decision: dec,
                low: NodeId::FALSE,
                high: NodeId::TRUE,
            }
        );
    }

    #[test]
    fn reduce_collapses_nested_redundancy() {
        let mut store = NodeStore::new();
        let dec_inner = DecisionId::for_test(10_001);
        let dec_outer = DecisionId::for_test(10_000);
        // inner node tests dec_inner but both branches agree -> collapses to
        // NodeId::TRUE, which then makes the outer node's branches equal too.
        let inner = store.intern_internal(dec_inner, NodeId::TRUE, NodeId::TRUE);
        let outer = store.intern_internal(dec_outer, inner, NodeId::TRUE);
        let reduced = reduce(&mut store, outer);
        assert_eq!(reduced, NodeId::TRUE);
    }
}
