//! Linear-form extraction: `Σ aᵢ·xᵢ + c`, used by the Decision Registry to
//! canonicalize inequality decisions.

use super::ast::{Expr, ExprInner};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A linear combination of continuous variables plus a constant term.
///
/// Terms are kept in a `BTreeMap` ordered by variable name, which is what
/// gives the canonical form of a decision its stable term order (spec
/// invariant 4: "two decisions equal modulo algebraic rewriting collide to
/// the same id").
#[derive(Debug, Clone, PartialEq)]
pub struct LinearForm {
    pub coeffs: BTreeMap<Arc<str>, f64>,
    pub constant: f64,
}

impl LinearForm {
    fn constant_only(value: f64) -> Self {
        LinearForm {
            coeffs: BTreeMap::new(),
            constant: value,
        }
    }

    fn single_var(name: &Arc<str>) -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(Arc::clone(name), 1.0);
        LinearForm {
            coeffs,
            constant: 0.0,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.values().all(|c| *c == 0.0)
    }

    fn add(mut self, other: LinearForm, sign: f64) -> LinearForm {
        for (var, coeff) in other.coeffs {
            *self.coeffs.entry(var).or_insert(0.0) += sign * coeff;
        }
        self.coeffs.retain(|_, c| *c != 0.0);
        self.constant += sign * other.constant;
        self
    }

    fn scale(mut self, factor: f64) -> LinearForm {
        for c in self.coeffs.values_mut() {
            *c *= factor;
        }
        self.constant *= factor;
        self
    }

    /// Leading nonzero coefficient in variable-name order, used by the
    /// Decision Registry's sign normalization.
    pub fn leading_coeff(&self) -> Option<f64> {
        self.coeffs.values().copied().find(|c| *c != 0.0)
    }

    /// Rebuild an `Expr` from this linear form, e.g. to print a canonicalized
    /// decision or to build the `lhs - rhs` operand of a fresh `min`/`max` decision.
    pub fn to_expr(&self) -> Expr {
        let mut terms: Vec<Expr> = self
            .coeffs
            .iter()
            .map(|(var, coeff)| {
                if *coeff == 1.0 {
                    Expr::var(var)
                } else {
                    Expr::constant(*coeff).mul(&Expr::var(var))
                }
            })
            .collect();
        if self.constant != 0.0 || terms.is_empty() {
            terms.push(Expr::constant(self.constant));
        }
        terms
            .into_iter()
            .reduce(|acc, t| acc.add(&t))
            .unwrap_or_else(Expr::zero)
    }
}

impl Expr {
    /// Extract this expression's linear form, or `None` if it is nonlinear
    /// in its free variables (a product or quotient of two non-constant
    /// subexpressions, a non-unit power, or a transcendental function of a
    /// non-constant argument).
    pub fn linear_form(&self) -> Option<LinearForm> {
        match self.inner() {
            ExprInner::Const(c) => Some(LinearForm::constant_only(c.0)),
            ExprInner::Var(name) => Some(LinearForm::single_var(name)),
            ExprInner::Add(a, b) => Some(a.linear_form()?.add(b.linear_form()?, 1.0)),
            ExprInner::Sub(a, b) => Some(a.linear_form()?.add(b.linear_form()?, -1.0)),
            ExprInner::Neg(a) => Some(a.linear_form()?.scale(-1.0)),
            ExprInner::Mul(a, b) => {
                let (la, lb) = (a.linear_form()?, b.linear_form()?);
                if la.is_constant() {
                    Some(lb.scale(la.constant))
                } else if lb.is_constant() {
                    Some(la.scale(lb.constant))
                } else {
                    None
                }
            }
            ExprInner::Div(a, b) => {
                let lb = b.linear_form()?;
                if lb.is_constant() && lb.constant != 0.0 {
                    Some(a.linear_form()?.scale(1.0 / lb.constant))
                } else {
                    None
                }
            }
            ExprInner::Pow(a, 1) => a.linear_form(),
            ExprInner::Pow(_, 0) => Some(LinearForm::constant_only(1.0)),
            ExprInner::Pow(..) | ExprInner::PowExpr(..) | ExprInner::Unary(..) => None,
        }
    }
}
