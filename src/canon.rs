//! Canonicalizer: reinstates ordering after a transformation (substitution,
//! unary rewriting) that may have introduced an out-of-order decision. See
//! spec §4.7.
//!
//! The reinsertion step is a three-operand if-then-else, which is exactly
//! the teacher's `BddManager::ite` generalized from Boolean terminals to
//! arbitrary leaves: cofactor all three operands on their shared minimum
//! decision and recurse.

use crate::apply::{cofactor, root_decision};
use crate::error::XaddError;
use crate::node::{Node, NodeId};
use crate::reduce::{make_node, make_node_checked};
use crate::store::Store;
use std::collections::HashMap;

pub fn make_canonical(store: &mut Store, id: NodeId) -> Result<NodeId, XaddError> {
    let mut memo = HashMap::new();
    let mut ite_memo = HashMap::new();
    canon_rec(store, id, &mut memo, &mut ite_memo)
}

fn canon_rec(
    store: &mut Store,
    id: NodeId,
    memo: &mut HashMap<NodeId, NodeId>,
    ite_memo: &mut HashMap<(NodeId, NodeId, NodeId), NodeId>,
) -> Result<NodeId, XaddError> {
    if let Some(&cached) = memo.get(&id) {
        return Ok(cached);
    }
    let result = match store.nodes.get(id).clone() {
        Node::Leaf(_) => id,
        Node::Internal { decision, low, high } => {
            let lo = canon_rec(store, low, memo, ite_memo)?;
            let hi = canon_rec(store, high, memo, ite_memo)?;
            let indicator = make_node_checked(&mut store.nodes, decision, NodeId::FALSE, NodeId::TRUE)?;
            ite(store, indicator, hi, lo, ite_memo)?
        }
    };
    memo.insert(id, result);
    Ok(result)
}

/// `if f then g else h`, cofactoring on the minimum decision among the three
/// roots until one side collapses.
fn ite(
    store: &mut Store,
    f: NodeId,
    g: NodeId,
    h: NodeId,
    memo: &mut HashMap<(NodeId, NodeId, NodeId), NodeId>,
) -> Result<NodeId, XaddError> {
    if f == NodeId::TRUE {
        return Ok(g);
    }
    if f == NodeId::FALSE {
        return Ok(h);
    }
    if g == h {
        return Ok(g);
    }

    let key = (f, g, h);
    if let Some(&cached) = memo.get(&key) {
        return Ok(cached);
    }

    let f_dec = root_decision(store.nodes.get(f));
    let g_dec = root_decision(store.nodes.get(g));
    let h_dec = root_decision(store.nodes.get(h));
    let top = [f_dec, g_dec, h_dec]
        .into_iter()
        .flatten()
        .min()
        .expect("at least one of f, g, h is internal: all-leaf case handled by g == h above");

    let (f_lo, f_hi) = cofactor(store, f, top);
    let (g_lo, g_hi) = cofactor(store, g, top);
    let (h_lo, h_hi) = cofactor(store, h, top);

    let lo = ite(store, f_lo, g_lo, h_lo, memo)?;
    let hi = ite(store, f_hi, g_hi, h_hi, memo)?;
    let result = make_node_checked(&mut store.nodes, top, lo, hi)?;
    memo.insert(key, result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionId;
    use crate::expr::Expr;

    #[test]
    fn already_canonical_diagram_is_unchanged() {
        let mut store = Store::new();
        let dec = DecisionId::for_test(10_000);
        let leaf_a = store.nodes.intern_leaf(Expr::constant(1.0));
        let leaf_b = store.nodes.intern_leaf(Expr::constant(2.0));
        let id = make_node(&mut store.nodes, dec, leaf_a, leaf_b);
        let canon = make_canonical(&mut store, id).unwrap();
        assert_eq!(canon, id);
    }

    #[test]
    fn leaf_is_its_own_canonical_form() {
        let mut store = Store::new();
        let leaf = store.nodes.intern_leaf(Expr::var("x"));
        let canon = make_canonical(&mut store, leaf).unwrap();
        assert_eq!(canon, leaf);
    }
}
