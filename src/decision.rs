//! Decision Registry: interns decisions (linear inequality or Boolean atom)
//! behind stable identities, enforcing canonical form. See spec §4.2.

use crate::error::MalformedDecisionError;
use crate::expr::{Expr, LinearForm};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Stable identity of a decision, distinct from `crate::node::NodeId`'s
/// numeric space purely as a debugging convention (spec §3: "decisions ≥
/// 10000, nodes < 10000... conventional, not semantic").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionId(u32);

const DECISION_ID_BASE: u32 = 10_000;

impl DecisionId {
    fn from_index(index: usize) -> Self {
        DecisionId(DECISION_ID_BASE + index as u32)
    }

    fn index(self) -> usize {
        (self.0 - DECISION_ID_BASE) as usize
    }

    #[cfg(test)]
    pub(crate) fn for_test(raw: u32) -> Self {
        DecisionId(raw)
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// What a decision tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A single Boolean variable.
    BoolAtom(Arc<str>),
    /// A canonical linear inequality `Σ aᵢ·xᵢ + c ≤ 0`.
    Inequality(LinearForm),
}

impl Decision {
    /// Whether this decision's own variable belongs to the Boolean set
    /// rather than the continuous one.
    pub fn is_bool_atom(&self) -> bool {
        matches!(self, Decision::BoolAtom(_))
    }

    /// Insert this decision's free variable(s) into `out`.
    pub fn free_vars(&self, out: &mut std::collections::BTreeSet<Arc<str>>) {
        match self {
            Decision::BoolAtom(name) => {
                out.insert(Arc::clone(name));
            }
            Decision::Inequality(form) => {
                out.extend(form.coeffs.keys().cloned());
            }
        }
    }
}

/// A relation operator appearing in the textual grammar (spec §6). Strict and
/// non-strict relations collapse to the same canonical decision: over reals
/// the boundary has measure zero, and the source format makes no further
/// distinction once a decision is registered. This is a deliberate
/// simplification, recorded in `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
    Ne,
}

/// Hashable, bit-exact key used for interning canonical inequalities.
/// `f64` has no `Eq`/`Hash`; canonicalization already fixes the
/// representation bit-for-bit, so bitwise comparison is exact here
/// (mirrors `crate::expr::ast::Real`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InequalityKey {
    terms: BTreeMap<Arc<str>, u64>,
    constant: u64,
}

impl InequalityKey {
    fn from_form(form: &LinearForm) -> Self {
        InequalityKey {
            terms: form
                .coeffs
                .iter()
                .map(|(name, coeff)| (Arc::clone(name), coeff.to_bits()))
                .collect(),
            constant: form.constant.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarKind {
    Boolean,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { id: DecisionId, reversed: bool },
    NotPresent,
}

#[derive(Debug, Default)]
pub struct DecisionRegistry {
    decisions: Vec<Decision>,
    bool_table: HashMap<Arc<str>, DecisionId>,
    ineq_table: HashMap<InequalityKey, DecisionId>,
    var_kinds: HashMap<Arc<str>, VarKind>,
}

impl DecisionRegistry {
    pub fn new() -> Self {
        DecisionRegistry::default()
    }

    pub fn get(&self, id: DecisionId) -> &Decision {
        &self.decisions[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Register a Boolean atom.
    pub fn register_bool(
        &mut self,
        name: &str,
        create: bool,
    ) -> Result<RegisterOutcome, MalformedDecisionError> {
        self.check_var_kind(name, VarKind::Boolean)?;
        if let Some(&id) = self.bool_table.get(name) {
            return Ok(RegisterOutcome::Registered {
                id,
                reversed: false,
            });
        }
        if !create {
            return Ok(RegisterOutcome::NotPresent);
        }
        let id = DecisionId::from_index(self.decisions.len());
        let key: Arc<str> = Arc::from(name);
        self.decisions.push(Decision::BoolAtom(Arc::clone(&key)));
        self.bool_table.insert(key, id);
        Ok(RegisterOutcome::Registered {
            id,
            reversed: false,
        })
    }

    /// Register the inequality `lhs relop rhs`, canonicalizing to
    /// `Σ aᵢ·xᵢ + c ≤ 0`. Returns whether canonicalization flipped the
    /// inequality's effective direction (`reversed`); callers must then swap
    /// their intended low/high children before calling `make_node` (spec
    /// §4.2: "this is the only place where polarity is handled").
    pub fn register_inequality(
        &mut self,
        lhs: &Expr,
        relop: RelOp,
        rhs: &Expr,
        create: bool,
    ) -> Result<RegisterOutcome, MalformedDecisionError> {
        // `==`/`!=` are not single linear inequalities; callers decompose
        // them into a conjunction/disjunction of `<=` decisions before
        // reaching the registry (see `crate::apply`).
        debug_assert!(!matches!(relop, RelOp::Eq | RelOp::Ne));

        // Equivalence-preserving rewrite into "canonical-sense" `<= 0` form:
        // `lhs >= rhs` and `lhs > rhs` negate-and-flip to `rhs - lhs <= 0`.
        // Strict relations collapse into their non-strict counterpart (the
        // boundary has measure zero over reals; see DESIGN.md).
        let relop_flip = matches!(relop, RelOp::Ge | RelOp::Gt);
        let diff = if relop_flip {
            rhs.sub(lhs)
        } else {
            lhs.sub(rhs)
        };

        let form = diff
            .linear_form()
            .ok_or_else(|| MalformedDecisionError::Nonlinear {
                expression: diff.to_string(),
            })?;

        for var in form.coeffs.keys() {
            self.check_var_kind(var, VarKind::Continuous)?;
        }

        // Scale/sign canonicalization for hash-consing: this is independent
        // of `relop_flip` above (which already made the statement
        // equivalence-preserving); `reversed` is the XOR of both flips,
        // since each is an independent negation of the stored decision's
        // "true" sense relative to the caller's original request.
        let (canonical, sign_flip) = canonicalize_sign(form);
        let reversed = relop_flip ^ sign_flip;
        let key = InequalityKey::from_form(&canonical);

        if let Some(&id) = self.ineq_table.get(&key) {
            return Ok(RegisterOutcome::Registered { id, reversed });
        }
        if !create {
            return Ok(RegisterOutcome::NotPresent);
        }
        let id = DecisionId::from_index(self.decisions.len());
        self.decisions.push(Decision::Inequality(canonical));
        self.ineq_table.insert(key, id);
        Ok(RegisterOutcome::Registered { id, reversed })
    }

    fn check_var_kind(&mut self, name: &str, kind: VarKind) -> Result<(), MalformedDecisionError> {
        match self.var_kinds.get(name) {
            Some(existing) if *existing != kind => {
                Err(MalformedDecisionError::BooleanInArithmeticPosition {
                    variable: name.to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.var_kinds.insert(Arc::from(name), kind);
                Ok(())
            }
        }
    }
}

/// Normalize a linear form's sign so its leading nonzero coefficient
/// (in variable-name order) is exactly `1.0`. Returns `(form, reversed)`
/// where `reversed` is true iff this required negating the form (i.e. the
/// original leading coefficient was negative).
fn canonicalize_sign(form: LinearForm) -> (LinearForm, bool) {
    match form.leading_coeff() {
        None => (form, false),
        Some(lc) if lc == 1.0 => (form, false),
        Some(lc) => {
            let scaled = LinearForm {
                coeffs: form
                    .coeffs
                    .into_iter()
                    .map(|(k, v)| (k, v / lc))
                    .collect(),
                constant: form.constant / lc,
            };
            (scaled, lc < 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_vars_of_a_bool_atom_is_its_own_name() {
        let dec = Decision::BoolAtom(Arc::from("b"));
        assert!(dec.is_bool_atom());
        let mut out = std::collections::BTreeSet::new();
        dec.free_vars(&mut out);
        assert_eq!(out, std::collections::BTreeSet::from([Arc::from("b")]));
    }

    #[test]
    fn free_vars_of_an_inequality_is_its_coefficient_keys() {
        let mut reg = DecisionRegistry::new();
        let expr = Expr::var("x").add(&Expr::var("y"));
        let zero = Expr::zero();
        let outcome = reg
            .register_inequality(&expr, RelOp::Le, &zero, true)
            .unwrap();
        let id = match outcome {
            RegisterOutcome::Registered { id, .. } => id,
            RegisterOutcome::NotPresent => panic!("expected registration"),
        };
        let dec = reg.get(id);
        assert!(!dec.is_bool_atom());
        let mut out = std::collections::BTreeSet::new();
        dec.free_vars(&mut out);
        assert_eq!(
            out,
            std::collections::BTreeSet::from([Arc::from("x"), Arc::from("y")])
        );
    }

    #[test]
    fn scale_invariant_inequalities_share_an_id() {
        let mut reg = DecisionRegistry::new();
        let x = Expr::var("x");
        let zero = Expr::zero();
        let two_x = Expr::constant(2.0).mul(&x);

        let a = reg
            .register_inequality(&x, RelOp::Le, &zero, true)
            .unwrap();
        let b = reg
            .register_inequality(&two_x, RelOp::Le, &zero, true)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_leading_coefficient_is_reported_reversed() {
        let mut reg = DecisionRegistry::new();
        let x = Expr::var("x");
        let y = Expr::var("y");
        let zero = Expr::zero();

        // -x - y >= 0  canonicalizes to  x + y <= 0, reversed.
        let neg_sum = x.add(&y).neg();
        let outcome = reg
            .register_inequality(&neg_sum, RelOp::Ge, &zero, true)
            .unwrap();
        match outcome {
            RegisterOutcome::Registered { reversed, .. } => assert!(reversed),
            RegisterOutcome::NotPresent => panic!("expected registration"),
        }

        let canonical = x.add(&y);
        let outcome2 = reg
            .register_inequality(&canonical, RelOp::Le, &zero, true)
            .unwrap();
        assert_eq!(outcome, outcome2);
    }

    #[test]
    fn bool_var_reused_in_arithmetic_is_malformed() {
        let mut reg = DecisionRegistry::new();
        reg.register_bool("b", true).unwrap();
        let b_as_real = Expr::var("b");
        let zero = Expr::zero();
        let err = reg
            .register_inequality(&b_as_real, RelOp::Le, &zero, true)
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedDecisionError::BooleanInArithmeticPosition { .. }
        ));
    }

    #[test]
    fn create_false_does_not_allocate() {
        let mut reg = DecisionRegistry::new();
        let x = Expr::var("x");
        let zero = Expr::zero();
        let outcome = reg
            .register_inequality(&x, RelOp::Le, &zero, false)
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::NotPresent);
        assert_eq!(reg.len(), 0);
    }
}
