//! Node Store: hash-conses every leaf and internal node behind a stable
//! integer identity. See spec §4.1.
//!
//! Modeled directly on the teacher's `BddManager`: one append-only `Vec` of
//! nodes plus unique tables keyed by structural content, so that identical
//! constructions always return the same id (spec invariant 1) and ids are
//! never reused or reordered (spec invariant "lifecycle").

use crate::decision::DecisionId;
use crate::expr::Expr;
use std::collections::HashMap;

/// Stable identity of a node in the store. `NodeId(0)`/`NodeId(1)` are the
/// reserved constant leaves `false`/`0` and `true`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const FALSE: NodeId = NodeId(0);
    pub const TRUE: NodeId = NodeId(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node in the DAG: either a terminal carrying a symbolic expression, or
/// an internal decision node `(decision, low, high)` where `high` is taken
/// when the decision evaluates true.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Leaf(Expr),
    Internal {
        decision: DecisionId,
        low: NodeId,
        high: NodeId,
    },
}

/// Which variant a node is, without borrowing its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Internal,
}

#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    leaf_table: HashMap<Expr, NodeId>,
    internal_table: HashMap<(DecisionId, NodeId, NodeId), NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        let mut store = NodeStore {
            nodes: Vec::new(),
            leaf_table: HashMap::new(),
            internal_table: HashMap::new(),
        };
        let false_id = store.intern_leaf(Expr::constant(0.0));
        let true_id = store.intern_leaf(Expr::constant(1.0));
        debug_assert_eq!(false_id, NodeId::FALSE);
        debug_assert_eq!(true_id, NodeId::TRUE);
        store
    }

    pub fn intern_leaf(&mut self, expr: Expr) -> NodeId {
        if let Some(&id) = self.leaf_table.get(&expr) {
            debug_assert_eq!(
                self.nodes[id.index()],
                Node::Leaf(expr.clone()),
                "leaf hash-consing table returned id {} whose stored node disagrees with the lookup key",
                id
            );
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::Leaf(expr.clone()));
        self.leaf_table.insert(expr, id);
        id
    }

    /// Precondition: `low != high` (the Reduction Engine's `make_node` is the
    /// only sanctioned caller; it enforces this before delegating here).
    pub fn intern_internal(&mut self, decision: DecisionId, low: NodeId, high: NodeId) -> NodeId {
        debug_assert_ne!(low, high, "intern_internal requires low != high");
        let key = (decision, low, high);
        if let Some(&id) = self.internal_table.get(&key) {
            debug_assert_eq!(
                self.nodes[id.index()],
                Node::Internal { decision, low, high },
                "internal hash-consing table returned id {} whose stored node disagrees with the lookup key",
                id
            );
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::Internal {
            decision,
            low,
            high,
        });
        self.internal_table.insert(key, id);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.get(id) {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Internal { .. } => NodeKind::Internal,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_constants_are_stable() {
        let store = NodeStore::new();
        assert_eq!(store.get(NodeId::FALSE), &Node::Leaf(Expr::constant(0.0)));
        assert_eq!(store.get(NodeId::TRUE), &Node::Leaf(Expr::constant(1.0)));
    }

    #[test]
    fn hash_consing_leaves() {
        let mut store = NodeStore::new();
        let a = store.intern_leaf(Expr::var("x"));
        let b = store.intern_leaf(Expr::var("x"));
        assert_eq!(a, b);
        let before = store.len();
        let c = store.intern_leaf(Expr::var("x"));
        assert_eq!(c, a);
        assert_eq!(store.len(), before);
    }

    #[test]
    fn hash_consing_internals() {
        let mut store = NodeStore::new();
        let leaf = store.intern_leaf(Expr::var("x"));
        let dec = DecisionId::for_test(10_000);
        let a = store.intern_internal(dec, NodeId::FALSE, leaf);
        let b = store.intern_internal(dec, NodeId::FALSE, leaf);
        assert_eq!(a, b);
    }
}
