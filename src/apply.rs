//! Apply Engine: binary composition of two diagrams under a scalar or
//! relational operator, by recursive Shannon expansion on the minimum
//! decision id of the two roots. See spec §4.4.
//!
//! Grounded on the teacher's `BddManager::ite`: same minimum-variable
//! cofactor split, same memoization-by-operand-tuple shape, generalized from
//! a single three-argument ITE to a family of binary operators and to leaves
//! that carry symbolic expressions rather than bare Boolean terminals.

use crate::canon::make_canonical;
use crate::decision::{DecisionId, RegisterOutcome, RelOp};
use crate::error::XaddError;
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::reduce::make_node_checked;
use crate::store::Store;
use std::collections::HashMap;

/// The closed set of binary operators `apply` supports (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyOp {
    Add,
    Subtract,
    Prod,
    Div,
    Min,
    Max,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl ApplyOp {
    /// Commutative operators canonicalize operand order before memo lookup.
    fn is_commutative(self) -> bool {
        matches!(
            self,
            ApplyOp::Add
                | ApplyOp::Prod
                | ApplyOp::Min
                | ApplyOp::Max
                | ApplyOp::And
                | ApplyOp::Or
                | ApplyOp::Eq
                | ApplyOp::Neq
        )
    }

    /// Operators that may introduce new decisions (via leaf comparison or a
    /// Boolean coercion) and therefore require a post-pass through
    /// `make_canonical` once the recursion settles (spec §4.4 step 4).
    fn needs_canonicalization(self) -> bool {
        matches!(
            self,
            ApplyOp::Min
                | ApplyOp::Max
                | ApplyOp::Eq
                | ApplyOp::Neq
                | ApplyOp::Lt
                | ApplyOp::Leq
                | ApplyOp::Gt
                | ApplyOp::Geq
                | ApplyOp::And
                | ApplyOp::Or
        )
    }

    fn is_relational(self) -> bool {
        matches!(
            self,
            ApplyOp::Eq
                | ApplyOp::Neq
                | ApplyOp::Lt
                | ApplyOp::Leq
                | ApplyOp::Gt
                | ApplyOp::Geq
        )
    }
}

/// Parse an operator name from the textual format / CLI surface.
impl std::str::FromStr for ApplyOp {
    type Err = crate::error::UnknownOperatorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "add" | "+" => ApplyOp::Add,
            "subtract" | "-" => ApplyOp::Subtract,
            "prod" | "*" => ApplyOp::Prod,
            "div" | "/" => ApplyOp::Div,
            "min" => ApplyOp::Min,
            "max" => ApplyOp::Max,
            "and" | "&&" => ApplyOp::And,
            "or" | "||" => ApplyOp::Or,
            "==" => ApplyOp::Eq,
            "!=" => ApplyOp::Neq,
            "<" => ApplyOp::Lt,
            "<=" | "\u{2264}" => ApplyOp::Leq,
            ">" => ApplyOp::Gt,
            ">=" | "\u{2265}" => ApplyOp::Geq,
            other => {
                return Err(crate::error::UnknownOperatorError {
                    operator: other.to_string(),
                })
            }
        })
    }
}

type MemoKey = (u8, NodeId, NodeId);
type MemoTable = HashMap<MemoKey, NodeId>;

fn op_tag(op: ApplyOp) -> u8 {
    op as u8 // discriminants are distinct; only used as a memo-key component
}

pub fn apply(store: &mut Store, lhs: NodeId, rhs: NodeId, op: ApplyOp) -> Result<NodeId, XaddError> {
    let mut memo = MemoTable::new();
    let result = apply_rec(store, lhs, rhs, op, &mut memo)?;
    if op.needs_canonicalization() {
        make_canonical(store, result)
    } else {
        Ok(result)
    }
}

fn apply_rec(
    store: &mut Store,
    lhs: NodeId,
    rhs: NodeId,
    op: ApplyOp,
    memo: &mut MemoTable,
) -> Result<NodeId, XaddError> {
    let (lhs, rhs) = if op.is_commutative() && rhs < lhs {
        (rhs, lhs)
    } else {
        (lhs, rhs)
    };

    let key = (op_tag(op), lhs, rhs);
    if let Some(&cached) = memo.get(&key) {
        return Ok(cached);
    }

    let lhs_node = store.nodes.get(lhs).clone();
    let rhs_node = store.nodes.get(rhs).clone();

    let result = match (lhs_node, rhs_node) {
        (Node::Leaf(l), Node::Leaf(r)) => apply_leaves(store, &l, &r, op)?,
        _ => {
            let lhs_decision = root_decision(&lhs_node_ref(store, lhs));
            let rhs_decision = root_decision(&lhs_node_ref(store, rhs));
            let split_on = match (lhs_decision, rhs_decision) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => unreachable!("handled by the leaf/leaf base case above"),
            };

            let (lhs_lo, lhs_hi) = cofactor(store, lhs, split_on);
            let (rhs_lo, rhs_hi) = cofactor(store, rhs, split_on);

            let lo = apply_rec(store, lhs_lo, rhs_lo, op, memo)?;
            let hi = apply_rec(store, lhs_hi, rhs_hi, op, memo)?;
            make_node_checked(&mut store.nodes, split_on, lo, hi)?
        }
    };

    memo.insert(key, result);
    Ok(result)
}

fn lhs_node_ref(store: &Store, id: NodeId) -> Node {
    store.nodes.get(id).clone()
}

pub(crate) fn root_decision(node: &Node) -> Option<DecisionId> {
    match node {
        Node::Leaf(_) => None,
        Node::Internal { decision, .. } => Some(*decision),
    }
}

/// Cofactor `id` on `decision`: if `id`'s root tests `decision`, return its
/// two children; otherwise `id` is independent of `decision` along this
/// path and is passed through unchanged on both branches.
pub(crate) fn cofactor(store: &Store, id: NodeId, decision: DecisionId) -> (NodeId, NodeId) {
    match store.nodes.get(id) {
        Node::Internal { decision: d, low, high } if *d == decision => (*low, *high),
        _ => (id, id),
    }
}

fn apply_leaves(store: &mut Store, l: &Expr, r: &Expr, op: ApplyOp) -> Result<NodeId, XaddError> {
    if op.is_relational() {
        return apply_relational_leaves(store, l, r, op);
    }
    let combined = match op {
        ApplyOp::Add => l.add(r),
        ApplyOp::Subtract => l.sub(r),
        ApplyOp::Prod => l.mul(r),
        ApplyOp::Div => {
            if r.as_const() == Some(0.0) {
                return Err(XaddError::LeafEvaluation(crate::expr::EvalError::DivisionByZero));
            }
            l.div(r)
        }
        ApplyOp::Min => return apply_min_max(store, l, r, true),
        ApplyOp::Max => return apply_min_max(store, l, r, false),
        ApplyOp::And => return Ok(bool_leaf(l.is_truthy() && r.is_truthy())),
        ApplyOp::Or => return Ok(bool_leaf(l.is_truthy() || r.is_truthy())),
        _ => unreachable!("relational ops handled above"),
    };
    Ok(store.nodes.intern_leaf(combined))
}

fn bool_leaf(value: bool) -> NodeId {
    if value {
        NodeId::TRUE
    } else {
        NodeId::FALSE
    }
}

/// `min`/`max` of two leaf expressions: if both are constants, fold directly.
/// Otherwise the comparison is symbolic, so a fresh decision `l - r <= 0` is
/// registered and a two-branch node built around it.
fn apply_min_max(store: &mut Store, l: &Expr, r: &Expr, is_min: bool) -> Result<NodeId, XaddError> {
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        let winner = if is_min { a.min(b) } else { a.max(b) };
        return Ok(store.nodes.intern_leaf(Expr::constant(winner)));
    }
    // "l <= r" decides whether l is the lesser operand.
    let outcome = store
        .decisions
        .register_inequality(l, RelOp::Le, r, true)?;
    let (dec_id, reversed) = match outcome {
        RegisterOutcome::Registered { id, reversed } => (id, reversed),
        RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
    };
    let l_leaf = store.nodes.intern_leaf(l.clone());
    let r_leaf = store.nodes.intern_leaf(r.clone());
    // High branch is taken when the decision is true (`l <= r`).
    let (low, high) = if is_min {
        (r_leaf, l_leaf)
    } else {
        (l_leaf, r_leaf)
    };
    let (low, high) = if reversed { (high, low) } else { (low, high) };
    make_node_checked(&mut store.nodes, dec_id, low, high)
}

/// Relational comparison of two leaves. `==`/`!=` are not single linear
/// inequalities, so they decompose into a conjunction/disjunction of two
/// `<=` decisions built recursively through `apply` itself, rather than as a
/// new kind of `Decision` (spec §4.4 numeric semantics).
fn apply_relational_leaves(store: &mut Store, l: &Expr, r: &Expr, op: ApplyOp) -> Result<NodeId, XaddError> {
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        let truth = match op {
            ApplyOp::Eq => a == b,
            ApplyOp::Neq => a != b,
            ApplyOp::Lt => a < b,
            ApplyOp::Leq => a <= b,
            ApplyOp::Gt => a > b,
            ApplyOp::Geq => a >= b,
            _ => unreachable!(),
        };
        return Ok(bool_leaf(truth));
    }

    match op {
        ApplyOp::Lt | ApplyOp::Leq | ApplyOp::Gt | ApplyOp::Geq => {
            let relop = match op {
                ApplyOp::Lt => RelOp::Lt,
                ApplyOp::Leq => RelOp::Le,
                ApplyOp::Gt => RelOp::Gt,
                ApplyOp::Geq => RelOp::Ge,
                _ => unreachable!(),
            };
            let outcome = store.decisions.register_inequality(l, relop, r, true)?;
            let (dec_id, reversed) = match outcome {
                RegisterOutcome::Registered { id, reversed } => (id, reversed),
                RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
            };
            let (low, high) = if reversed {
                (NodeId::TRUE, NodeId::FALSE)
            } else {
                (NodeId::FALSE, NodeId::TRUE)
            };
            make_node_checked(&mut store.nodes, dec_id, low, high)
        }
        ApplyOp::Eq => {
            let le = apply(store, leaf_id(store, l), leaf_id(store, r), ApplyOp::Leq)?;
            let ge = apply(store, leaf_id(store, l), leaf_id(store, r), ApplyOp::Geq)?;
            apply(store, le, ge, ApplyOp::And)
        }
        ApplyOp::Neq => {
            let eq = apply(store, leaf_id(store, l), leaf_id(store, r), ApplyOp::Eq)?;
            crate::unary::apply_not(store, eq)
        }
        _ => unreachable!("non-relational op routed to apply_leaves"),
    }
}

fn leaf_id(store: &mut Store, e: &Expr) -> NodeId {
    store.nodes.intern_leaf(e.clone())
}

impl Expr {
    fn is_truthy(&self) -> bool {
        self.as_const().map(|v| v != 0.0).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn add_then_min_builds_expected_shape() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let y = store.nodes.intern_leaf(Expr::var("y"));

        let sum = apply(&mut store, x, y, ApplyOp::Add).unwrap();
        assert_eq!(store.nodes.get(sum), &Node::Leaf(Expr::var("x").add(&Expr::var("y"))));

        let min_result = apply(&mut store, sum, y, ApplyOp::Min).unwrap();
        match store.nodes.get(min_result) {
            Node::Internal { low, high, .. } => {
                assert_eq!(store.nodes.get(*low), &Node::Leaf(Expr::var("y")));
                assert_eq!(store.nodes.get(*high), &Node::Leaf(Expr::var("x").add(&Expr::var("y"))));
            }
            Node::Leaf(_) => panic!("expected an internal decision node"),
        }
    }

    #[test]
    fn subtract_self_is_zero() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let zero = apply(&mut store, x, x, ApplyOp::Subtract).unwrap();
        assert_eq!(store.nodes.get(zero), &Node::Leaf(Expr::constant(0.0)));
    }

    #[test]
    fn add_identity() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let zero = store.nodes.intern_leaf(Expr::constant(0.0));
        let result = apply(&mut store, x, zero, ApplyOp::Add).unwrap();
        assert_eq!(result, x);
    }

    #[test]
    fn commutative_ops_share_memo_entries() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let y = store.nodes.intern_leaf(Expr::var("y"));
        let ab = apply(&mut store, x, y, ApplyOp::Add).unwrap();
        let ba = apply(&mut store, y, x, ApplyOp::Add).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn division_by_literal_zero_fails() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let zero = store.nodes.intern_leaf(Expr::constant(0.0));
        let err = apply(&mut store, x, zero, ApplyOp::Div).unwrap_err();
        assert!(matches!(
            err,
            XaddError::LeafEvaluation(crate::expr::EvalError::DivisionByZero)
        ));
    }
}
