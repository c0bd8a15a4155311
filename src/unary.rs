//! Unary Engine: leaf-wise rewriting of a diagram under an elementary
//! function, sign test, or Boolean negation. See spec §4.5.

use crate::canon::make_canonical;
use crate::decision::{RegisterOutcome, RelOp};
use crate::error::XaddError;
use crate::expr::{Expr, UnaryFn};
use crate::node::{Node, NodeId};
use crate::reduce::{make_node, make_node_checked};
use crate::store::Store;
use std::collections::HashMap;

/// The closed set of unary operators (spec §4.5). `Pow` carries its exponent
/// inline rather than as a separate `arg` parameter, which keeps the memo
/// key (`op`, `id`) exhaustive without a floating "maybe-present" argument.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Fn(UnaryFn),
    Pow(i32),
    PowExpr(Expr),
    Neg,
    Pos,
    Sgn,
    Not,
}

impl std::str::FromStr for UnaryOp {
    type Err = crate::error::UnknownOperatorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sin" => UnaryOp::Fn(UnaryFn::Sin),
            "cos" => UnaryOp::Fn(UnaryFn::Cos),
            "tan" => UnaryOp::Fn(UnaryFn::Tan),
            "sinh" => UnaryOp::Fn(UnaryFn::Sinh),
            "cosh" => UnaryOp::Fn(UnaryFn::Cosh),
            "tanh" => UnaryOp::Fn(UnaryFn::Tanh),
            "exp" => UnaryOp::Fn(UnaryFn::Exp),
            "log" => UnaryOp::Fn(UnaryFn::Log),
            "log2" => UnaryOp::Fn(UnaryFn::Log2),
            "log10" => UnaryOp::Fn(UnaryFn::Log10),
            "log1p" => UnaryOp::Fn(UnaryFn::Log1p),
            "floor" => UnaryOp::Fn(UnaryFn::Floor),
            "ceil" => UnaryOp::Fn(UnaryFn::Ceil),
            "sqrt" => UnaryOp::Fn(UnaryFn::Sqrt),
            "neg" => UnaryOp::Neg,
            "pos" => UnaryOp::Pos,
            "sgn" => UnaryOp::Sgn,
            "not" => UnaryOp::Not,
            other => {
                return Err(crate::error::UnknownOperatorError {
                    operator: other.to_string(),
                })
            }
        })
    }
}

type MemoTable = HashMap<NodeId, NodeId>;

pub fn unary(store: &mut Store, id: NodeId, op: &UnaryOp) -> Result<NodeId, XaddError> {
    let result = match op {
        UnaryOp::Not => apply_not(store, id)?,
        UnaryOp::Sgn => {
            let mut memo = MemoTable::new();
            apply_sgn(store, id, &mut memo)?
        }
        _ => {
            let mut memo = MemoTable::new();
            apply_leafwise(store, id, op, &mut memo)?
        }
    };
    make_canonical(store, result)
}

/// Leaf-wise descent: rewrite every leaf's expression with `op`, rebuilding
/// internal nodes unchanged. Covers every operator except `sgn` (which turns
/// a single leaf into a fresh three-way decision) and `not` (which acts on
/// the Boolean structure rather than on leaf expressions).
fn apply_leafwise(store: &mut Store, id: NodeId, op: &UnaryOp, memo: &mut MemoTable) -> Result<NodeId, XaddError> {
    if let Some(&cached) = memo.get(&id) {
        return Ok(cached);
    }
    let result = match store.nodes.get(id).clone() {
        Node::Leaf(expr) => {
            let rewritten = apply_leaf_expr(&expr, op)?;
            store.nodes.intern_leaf(rewritten)
        }
        Node::Internal { decision, low, high } => {
            let lo = apply_leafwise(store, low, op, memo)?;
            let hi = apply_leafwise(store, high, op, memo)?;
            make_node_checked(&mut store.nodes, decision, lo, hi)?
        }
    };
    memo.insert(id, result);
    Ok(result)
}

fn apply_leaf_expr(expr: &Expr, op: &UnaryOp) -> Result<Expr, XaddError> {
    Ok(match op {
        UnaryOp::Fn(f) => expr.unary(*f),
        UnaryOp::Pow(n) => expr.pow_i32(*n),
        UnaryOp::PowExpr(e) => expr.pow_expr(e),
        UnaryOp::Neg => expr.neg(),
        UnaryOp::Pos => expr.clone(),
        UnaryOp::Sgn | UnaryOp::Not => unreachable!("dispatched separately in `unary`"),
    })
}

/// `sgn`: wrap each leaf in a fresh decision `leaf <= 0`, producing −1 for
/// strictly negative, 0 on the boundary, +1 otherwise. When the leaf is a
/// constant the branch collapses immediately rather than registering a
/// decision that could never take both values.
fn apply_sgn(store: &mut Store, id: NodeId, memo: &mut MemoTable) -> Result<NodeId, XaddError> {
    if let Some(&cached) = memo.get(&id) {
        return Ok(cached);
    }
    let result = match store.nodes.get(id).clone() {
        Node::Leaf(expr) => {
            if let Some(v) = expr.as_const() {
                let sign = if v < 0.0 {
                    -1.0
                } else if v > 0.0 {
                    1.0
                } else {
                    0.0
                };
                store.nodes.intern_leaf(Expr::constant(sign))
            } else {
                build_sgn_decision(store, &expr)?
            }
        }
        Node::Internal { decision, low, high } => {
            let lo = apply_sgn(store, low, memo)?;
            let hi = apply_sgn(store, high, memo)?;
            make_node_checked(&mut store.nodes, decision, lo, hi)?
        }
    };
    memo.insert(id, result);
    Ok(result)
}

fn build_sgn_decision(store: &mut Store, expr: &Expr) -> Result<NodeId, XaddError> {
    // Two nested decisions: `expr <= 0` (negative-or-zero vs positive), then
    // split the negative-or-zero branch on `expr == 0` via a second `<= 0`
    // test on the negated expression (`-expr <= 0`, i.e. `expr >= 0`).
    let zero = Expr::zero();
    let outer = match store
        .decisions
        .register_inequality(expr, RelOp::Le, &zero, true)?
    {
        RegisterOutcome::Registered { id, reversed } => (id, reversed),
        RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
    };
    let inner = match store
        .decisions
        .register_inequality(expr, RelOp::Ge, &zero, true)?
    {
        RegisterOutcome::Registered { id, reversed } => (id, reversed),
        RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
    };

    let neg_one = store.nodes.intern_leaf(Expr::constant(-1.0));
    let zero_leaf = store.nodes.intern_leaf(Expr::constant(0.0));
    let pos_one = store.nodes.intern_leaf(Expr::constant(1.0));

    // Inner test distinguishes "== 0" (true) from "< 0" (false) within the
    // `expr <= 0` branch.
    let (inner_low, inner_high) = (neg_one, zero_leaf);
    let (inner_low, inner_high) = if inner.1 {
        (inner_high, inner_low)
    } else {
        (inner_low, inner_high)
    };
    let nonpositive_branch = make_node_checked(&mut store.nodes, inner.0, inner_low, inner_high)?;

    let (outer_low, outer_high) = (nonpositive_branch, pos_one);
    let (outer_low, outer_high) = if outer.1 {
        (outer_high, outer_low)
    } else {
        (outer_low, outer_high)
    };
    make_node_checked(&mut store.nodes, outer.0, outer_low, outer_high)
}

/// `not`: swap every `(low, high)` pair and invert the 0/1 leaves. Defined
/// only on Boolean-valued diagrams; a leaf that is neither `0` nor `1` is an
/// invariant violation by the caller's contract, not something this function
/// validates (the engine never constructs such a diagram through the
/// Boolean operators).
pub fn apply_not(store: &mut Store, id: NodeId) -> Result<NodeId, XaddError> {
    let mut memo = MemoTable::new();
    apply_not_rec(store, id, &mut memo)
}

fn apply_not_rec(store: &mut Store, id: NodeId, memo: &mut MemoTable) -> Result<NodeId, XaddError> {
    if let Some(&cached) = memo.get(&id) {
        return Ok(cached);
    }
    let result = match store.nodes.get(id).clone() {
        Node::Leaf(expr) => {
            let inverted = if expr.as_const() == Some(0.0) {
                Expr::constant(1.0)
            } else {
                Expr::constant(0.0)
            };
            store.nodes.intern_leaf(inverted)
        }
        Node::Internal { decision, low, high } => {
            let lo = apply_not_rec(store, low, memo)?;
            let hi = apply_not_rec(store, high, memo)?;
            make_node_checked(&mut store.nodes, decision, hi, lo)?
        }
    };
    memo.insert(id, result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionId;

    #[test]
    fn neg_rewrites_leaves() {
        let mut store = Store::new();
        let x = store.nodes.intern_leaf(Expr::var("x"));
        let result = unary(&mut store, x, &UnaryOp::Neg).unwrap();
        assert_eq!(store.nodes.get(result), &Node::Leaf(Expr::var("x").neg()));
    }

    #[test]
    fn not_inverts_boolean_leaves_and_swaps_branches() {
        let mut store = Store::new();
        let dec = DecisionId::for_test(10_000);
        let id = make_node(&mut store.nodes, dec, NodeId::FALSE, NodeId::TRUE);
        let negated = apply_not(&mut store, id).unwrap();
        match store.nodes.get(negated) {
            Node::Internal { low, high, .. } => {
                assert_eq!(*low, NodeId::TRUE);
                assert_eq!(*high, NodeId::FALSE);
            }
            Node::Leaf(_) => panic!("expected an internal node"),
        }
    }

    #[test]
    fn sgn_of_constant_collapses_immediately() {
        let mut store = Store::new();
        let five = store.nodes.intern_leaf(Expr::constant(5.0));
        let result = unary(&mut store, five, &UnaryOp::Sgn).unwrap();
        assert_eq!(store.nodes.get(result), &Node::Leaf(Expr::constant(1.0)));
    }
}
