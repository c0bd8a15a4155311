//! Substitution and evaluation: rewriting a diagram under a variable
//! assignment, and walking it down to a single numeric leaf under a full
//! one. See spec §4.6.

use crate::canon::make_canonical;
use crate::decision::{Decision, RegisterOutcome, RelOp};
use crate::error::{PartialAssignmentError, XaddError};
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::reduce::{make_node, make_node_checked};
use crate::store::Store;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Substitute every variable named in `subs` with its bound expression,
/// short-circuiting decisions that become trivially true/false and
/// re-canonicalizing the few that survive substitution in non-canonical
/// form. Boolean atoms only short-circuit on a constant 0/1 binding; a
/// non-constant binding for a Boolean variable is left unsubstituted (a
/// diagram never carries a genuinely symbolic Boolean leaf, so this case
/// does not arise from any operation this crate performs internally).
pub fn substitute(store: &mut Store, id: NodeId, subs: &BTreeMap<Arc<str>, Expr>) -> Result<NodeId, XaddError> {
    let mut memo = HashMap::new();
    let result = substitute_rec(store, id, subs, &mut memo)?;
    make_canonical(store, result)
}

fn substitute_rec(
    store: &mut Store,
    id: NodeId,
    subs: &BTreeMap<Arc<str>, Expr>,
    memo: &mut HashMap<NodeId, NodeId>,
) -> Result<NodeId, XaddError> {
    if let Some(&cached) = memo.get(&id) {
        return Ok(cached);
    }
    let result = match store.nodes.get(id).clone() {
        Node::Leaf(expr) => {
            let rewritten = subs
                .iter()
                .fold(expr, |acc, (name, value)| acc.substitute_var(name, value));
            store.nodes.intern_leaf(rewritten)
        }
        Node::Internal { decision, low, high } => {
            let lo = substitute_rec(store, low, subs, memo)?;
            let hi = substitute_rec(store, high, subs, memo)?;
            substitute_decision(store, decision, lo, hi, subs)?
        }
    };
    memo.insert(id, result);
    Ok(result)
}

fn substitute_decision(
    store: &mut Store,
    decision: crate::decision::DecisionId,
    lo: NodeId,
    hi: NodeId,
    subs: &BTreeMap<Arc<str>, Expr>,
) -> Result<NodeId, XaddError> {
    match store.decisions.get(decision).clone() {
        Decision::BoolAtom(name) => match subs.get(&name).and_then(Expr::as_const) {
            Some(v) if v != 0.0 => Ok(hi),
            Some(_) => Ok(lo),
            None => make_node_checked(&mut store.nodes, decision, lo, hi),
        },
        Decision::Inequality(form) => {
            let rewritten = subs
                .iter()
                .fold(form.to_expr(), |acc, (name, value)| acc.substitute_var(name, value));

            if let Some(v) = rewritten.as_const() {
                return Ok(if v <= 0.0 { hi } else { lo });
            }

            let zero = Expr::zero();
            let outcome = store
                .decisions
                .register_inequality(&rewritten, RelOp::Le, &zero, true)?;
            match outcome {
                RegisterOutcome::Registered { id: new_id, reversed } => {
                    let (new_lo, new_hi) = if reversed { (hi, lo) } else { (lo, hi) };
                    make_node_checked(&mut store.nodes, new_id, new_lo, new_hi)
                }
                RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
            }
        }
    }
}

/// The union of free Boolean and continuous variables reachable from `id`,
/// split because evaluation needs to know which assignment map to consult.
pub fn collect_vars(store: &Store, id: NodeId) -> (BTreeSet<Arc<str>>, BTreeSet<Arc<str>>) {
    let mut memo = HashMap::new();
    collect_vars_rec(store, id, &mut memo)
}

fn collect_vars_rec(
    store: &Store,
    id: NodeId,
    memo: &mut HashMap<NodeId, (BTreeSet<Arc<str>>, BTreeSet<Arc<str>>)>,
) -> (BTreeSet<Arc<str>>, BTreeSet<Arc<str>>) {
    if let Some(cached) = memo.get(&id) {
        return cached.clone();
    }
    let result = match store.nodes.get(id) {
        Node::Leaf(expr) => {
            let mut conts = BTreeSet::new();
            expr.collect_vars(&mut conts);
            (BTreeSet::new(), conts)
        }
        Node::Internal { decision, low, high } => {
            let (mut bools, mut conts) = collect_vars_rec(store, *low, memo);
            let (hi_bools, hi_conts) = collect_vars_rec(store, *high, memo);
            bools.extend(hi_bools);
            conts.extend(hi_conts);
            let dec = store.decisions.get(*decision);
            let target = if dec.is_bool_atom() { &mut bools } else { &mut conts };
            dec.free_vars(target);
            (bools, conts)
        }
    };
    memo.insert(id, result.clone());
    result
}

/// Walk the DAG under a full variable assignment, returning the leaf value.
/// With `strict = true`, a missing binding fails with `PartialAssignment`;
/// with `strict = false`, it returns `Ok(None)` instead.
pub fn evaluate(
    store: &Store,
    id: NodeId,
    bool_assign: &BTreeMap<String, bool>,
    cont_assign: &BTreeMap<String, f64>,
    strict: bool,
) -> Result<Option<f64>, XaddError> {
    let (bool_vars, cont_vars) = collect_vars(store, id);
    let missing: Vec<String> = bool_vars
        .iter()
        .filter(|v| !bool_assign.contains_key(v.as_ref()))
        .chain(cont_vars.iter().filter(|v| !cont_assign.contains_key(v.as_ref())))
        .map(|v| v.to_string())
        .collect();

    if !missing.is_empty() {
        if strict {
            return Err(PartialAssignmentError { missing }.into());
        }
        return Ok(None);
    }

    Ok(Some(evaluate_rec(store, id, bool_assign, cont_assign)?))
}

fn evaluate_rec(
    store: &Store,
    id: NodeId,
    bool_assign: &BTreeMap<String, bool>,
    cont_assign: &BTreeMap<String, f64>,
) -> Result<f64, XaddError> {
    match store.nodes.get(id) {
        Node::Leaf(expr) => Ok(expr.eval(cont_assign)?),
        Node::Internal { decision, low, high } => {
            let truth = match store.decisions.get(*decision) {
                Decision::BoolAtom(name) => bool_assign[name.as_ref()],
                Decision::Inequality(form) => {
                    let value: f64 = form
                        .coeffs
                        .iter()
                        .map(|(v, c)| c * cont_assign[v.as_ref()])
                        .sum::<f64>()
                        + form.constant;
                    value <= 0.0
                }
            };
            if truth {
                evaluate_rec(store, *high, bool_assign, cont_assign)
            } else {
                evaluate_rec(store, *low, bool_assign, cont_assign)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::RelOp;

    #[test]
    fn substitute_collapses_constant_decision() {
        let mut store = Store::new();
        let x = Expr::var("x");
        let zero = Expr::zero();
        let outcome = store
            .decisions
            .register_inequality(&x, RelOp::Le, &zero, true)
            .unwrap();
        let dec_id = match outcome {
            crate::decision::RegisterOutcome::Registered { id, .. } => id,
            _ => unreachable!(),
        };
        let leaf_lo = store.nodes.intern_leaf(Expr::constant(0.0));
        let leaf_hi = store.nodes.intern_leaf(Expr::constant(1.0));
        let id = make_node(&mut store.nodes, dec_id, leaf_lo, leaf_hi);

        let mut subs = BTreeMap::new();
        subs.insert(Arc::from("x"), Expr::constant(-5.0));
        let result = substitute(&mut store, id, &subs).unwrap();
        assert_eq!(store.nodes.get(result), &Node::Leaf(Expr::constant(1.0)));
    }

    #[test]
    fn evaluate_reports_missing_bindings() {
        let mut store = Store::new();
        let leaf = store.nodes.intern_leaf(Expr::var("x"));
        let bool_assign = BTreeMap::new();
        let cont_assign = BTreeMap::new();
        let err = evaluate(&store, leaf, &bool_assign, &cont_assign, true).unwrap_err();
        assert!(matches!(err, XaddError::PartialAssignment(_)));

        let lenient = evaluate(&store, leaf, &bool_assign, &cont_assign, false).unwrap();
        assert_eq!(lenient, None);
    }

    #[test]
    fn evaluate_walks_to_correct_branch() {
        let mut store = Store::new();
        let b = match store.decisions.register_bool("b", true).unwrap() {
            crate::decision::RegisterOutcome::Registered { id, .. } => id,
            _ => unreachable!(),
        };
        let leaf_false = store.nodes.intern_leaf(Expr::constant(0.0));
        let leaf_true = store.nodes.intern_leaf(Expr::constant(1.0));
        let id = make_node(&mut store.nodes, b, leaf_false, leaf_true);

        let mut bool_assign = BTreeMap::new();
        bool_assign.insert("b".to_string(), true);
        let cont_assign = BTreeMap::new();
        let value = evaluate(&store, id, &bool_assign, &cont_assign, true)
            .unwrap()
            .unwrap();
        assert_eq!(value, 1.0);
    }
}
