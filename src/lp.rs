//! LP Reducer: eliminates branches whose guard is infeasible under the
//! accumulated path context, discharged by an external LP solver. See spec
//! §4.8.

use crate::decision::{Decision, DecisionId, RegisterOutcome, RelOp};
use crate::expr::{Expr, LinearForm};
use crate::node::{Node, NodeId};
use crate::reduce::make_node;
use crate::store::Store;
use std::collections::{BTreeMap, HashMap};

/// A conjunction of linear inequalities implied by the path taken through
/// the diagram so far, identified by `(decision, polarity)` pairs — `true`
/// meaning the decision's own canonical form holds, `false` meaning its
/// negation does. Decisions are already interned by the Decision Registry,
/// so this pair is a cheap, stable fingerprint for the memo table (spec
/// §4.8: "the sorted multiset of active constraint ids").
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathContext {
    constraints: BTreeMap<DecisionId, bool>,
}

impl PathContext {
    pub fn empty() -> Self {
        PathContext::default()
    }

    fn extend(&self, decision: DecisionId, polarity: bool) -> Self {
        let mut next = self.clone();
        next.constraints.insert(decision, polarity);
        next
    }

    fn fingerprint(&self) -> Vec<(DecisionId, bool)> {
        self.constraints.iter().map(|(k, v)| (*k, *v)).collect()
    }
}

/// Feasibility oracle over a conjunction of linear constraints, each meaning
/// `form <= 0`. The reducer is written against this trait rather than
/// against any specific solver so that a missing or misbehaving backend
/// degrades to "no pruning" instead of poisoning the whole operation (spec
/// §4.9).
pub trait LpSolver {
    fn is_feasible(&self, constraints: &[LinearForm]) -> Result<bool, LpSolverError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpSolverError {
    pub detail: String,
}

impl std::fmt::Display for LpSolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl std::error::Error for LpSolverError {}

/// Concrete feasibility oracle backed by `good_lp`'s bundled `microlp`
/// solver (pure Rust, no external LP binary to locate or shell out to).
#[derive(Debug, Default)]
pub struct MicroLpSolver;

impl LpSolver for MicroLpSolver {
    fn is_feasible(&self, constraints: &[LinearForm]) -> Result<bool, LpSolverError> {
        use good_lp::{variable, Expression, ProblemVariables, Solution, SolverModel};

        if constraints.is_empty() {
            return Ok(true);
        }

        let mut names: Vec<std::sync::Arc<str>> = constraints
            .iter()
            .flat_map(|c| c.coeffs.keys().cloned())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        names.sort();

        let mut problem = ProblemVariables::new();
        let mut var_of = HashMap::new();
        for name in &names {
            let v = problem.add(variable().min(f64::NEG_INFINITY));
            var_of.insert(name.clone(), v);
        }

        // Feasibility only, no preference among feasible points: minimise a
        // constant objective.
        let objective = Expression::from(0.0);
        let mut model = problem.minimise(objective).using(good_lp::microlp);
        for form in constraints {
            let mut expr = Expression::from(form.constant);
            for (name, coeff) in &form.coeffs {
                expr += var_of[name] * *coeff;
            }
            model = model.with(expr.leq(0.0));
        }

        match model.solve() {
            Ok(_) => Ok(true),
            Err(good_lp::ResolutionError::Infeasible) => Ok(false),
            Err(good_lp::ResolutionError::Unbounded) => Ok(true),
            Err(other) => Err(LpSolverError {
                detail: other.to_string(),
            }),
        }
    }
}

/// Prune `id` under the empty path context plus any externally supplied
/// preconditions, themselves given as already-extracted linear forms
/// (each meaning `form <= 0`).
pub fn reduce_lp(
    store: &mut Store,
    id: NodeId,
    solver: &dyn LpSolver,
    preconditions: &[LinearForm],
) -> NodeId {
    let mut context = PathContext::empty();
    for form in preconditions {
        let outcome = store.decisions.register_inequality(
            &form.to_expr(),
            RelOp::Le,
            &Expr::zero(),
            true,
        );
        if let Ok(RegisterOutcome::Registered { id: dec_id, reversed }) = outcome {
            context = context.extend(dec_id, !reversed);
        }
    }
    let mut memo = HashMap::new();
    reduce_lp_ctx(store, id, &context, solver, &mut memo)
}

fn reduce_lp_ctx(
    store: &mut Store,
    id: NodeId,
    context: &PathContext,
    solver: &dyn LpSolver,
    memo: &mut HashMap<(NodeId, Vec<(DecisionId, bool)>), NodeId>,
) -> NodeId {
    let key = (id, context.fingerprint());
    if let Some(&cached) = memo.get(&key) {
        return cached;
    }

    let result = match store.nodes.get(id).clone() {
        Node::Leaf(_) => id,
        Node::Internal { decision, low, high } => match store.decisions.get(decision).clone() {
            // Boolean-atom decisions add no linear constraint; both
            // branches are explored unconditionally (spec §4.8).
            Decision::BoolAtom(_) => {
                let lo = reduce_lp_ctx(store, low, context, solver, memo);
                let hi = reduce_lp_ctx(store, high, context, solver, memo);
                make_node(&mut store.nodes, decision, lo, hi)
            }
            Decision::Inequality(_) => {
                let with_true = context.extend(decision, true);
                let with_false = context.extend(decision, false);
                let true_feasible = check_feasible(store, &with_true, solver);
                let false_feasible = check_feasible(store, &with_false, solver);

                if !true_feasible {
                    reduce_lp_ctx(store, low, &with_false, solver, memo)
                } else if !false_feasible {
                    reduce_lp_ctx(store, high, &with_true, solver, memo)
                } else {
                    let lo = reduce_lp_ctx(store, low, &with_false, solver, memo);
                    let hi = reduce_lp_ctx(store, high, &with_true, solver, memo);
                    make_node(&mut store.nodes, decision, lo, hi)
                }
            }
        },
    };
    memo.insert(key, result);
    result
}

fn check_feasible(store: &Store, context: &PathContext, solver: &dyn LpSolver) -> bool {
    let mut forms = Vec::with_capacity(context.constraints.len());
    for (&dec_id, &polarity) in &context.constraints {
        if let Decision::Inequality(form) = store.decisions.get(dec_id) {
            forms.push(if polarity { form.clone() } else { negate_form(form) });
        }
    }
    match solver.is_feasible(&forms) {
        Ok(feasible) => feasible,
        Err(e) => {
            log::warn!("LP solver unavailable ({e}); skipping pruning at this node");
            true
        }
    }
}

fn negate_form(form: &LinearForm) -> LinearForm {
    LinearForm {
        coeffs: form.coeffs.iter().map(|(k, v)| (k.clone(), -v)).collect(),
        constant: -form.constant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::RelOp;

    /// A deterministic stand-in for `MicroLpSolver` in unit tests, so the
    /// reducer's branch-selection logic is tested independently of the LP
    /// backend's numerics.
    struct AlwaysInfeasibleBeyond(f64);

    impl LpSolver for AlwaysInfeasibleBeyond {
        fn is_feasible(&self, constraints: &[LinearForm]) -> Result<bool, LpSolverError> {
            // Single-variable-only toy solver: each constraint is `c*x + k <= 0`;
            // feasible iff the implied bound on `x` is non-empty, checked by
            // testing `self.0` and `-self.0` as witnesses.
            let satisfies = |x: f64| {
                constraints.iter().all(|form| {
                    let coeff = form.coeffs.values().next().copied().unwrap_or(0.0);
                    coeff * x + form.constant <= 1e-9
                })
            };
            Ok(satisfies(self.0) || satisfies(-self.0) || constraints.is_empty())
        }
    }

    #[test]
    fn infeasible_true_branch_collapses_to_low() {
        let mut store = Store::new();
        let x = Expr::var("x");
        let zero = Expr::zero();
        // decision: x <= 0
        let dec = match store
            .decisions
            .register_inequality(&x, RelOp::Le, &zero, true)
            .unwrap()
        {
            RegisterOutcome::Registered { id, .. } => id,
            _ => unreachable!(),
        };
        let leaf_lo = store.nodes.intern_leaf(Expr::constant(1.0));
        let leaf_hi = store.nodes.intern_leaf(Expr::constant(2.0));
        let id = make_node(&mut store.nodes, dec, leaf_lo, leaf_hi);

        // precondition: x >= 10 (i.e. -x + 10 <= 0), so "x <= 0" (high
        // branch) is infeasible and only the low branch (leaf 1) survives.
        let precondition = LinearForm {
            coeffs: [(std::sync::Arc::from("x"), -1.0)].into_iter().collect(),
            constant: 10.0,
        };
        let solver = AlwaysInfeasibleBeyond(10.0);
        let reduced = reduce_lp(&mut store, id, &solver, &[precondition]);
        assert_eq!(store.nodes.get(reduced), &Node::Leaf(Expr::constant(1.0)));
    }

    #[test]
    fn solver_error_disables_pruning_for_that_node() {
        struct AlwaysErrors;
        impl LpSolver for AlwaysErrors {
            fn is_feasible(&self, _: &[LinearForm]) -> Result<bool, LpSolverError> {
                Err(LpSolverError {
                    detail: "backend unavailable".to_string(),
                })
            }
        }

        let mut store = Store::new();
        let x = Expr::var("x");
        let zero = Expr::zero();
        let dec = match store
            .decisions
            .register_inequality(&x, RelOp::Le, &zero, true)
            .unwrap()
        {
            RegisterOutcome::Registered { id, .. } => id,
            _ => unreachable!(),
        };
        let leaf_lo = store.nodes.intern_leaf(Expr::constant(1.0));
        let leaf_hi = store.nodes.intern_leaf(Expr::constant(2.0));
        let id = make_node(&mut store.nodes, dec, leaf_lo, leaf_hi);

        let reduced = reduce_lp(&mut store, id, &AlwaysErrors, &[]);
        assert_eq!(reduced, id, "identity reduction when the solver errors");
    }
}
