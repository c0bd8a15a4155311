//! Scalar evaluation of expressions under a full variable assignment.

use super::ast::{Expr, ExprInner, UnaryFn};
use super::error::EvalError;
use std::collections::BTreeMap;

impl Expr {
    /// Evaluate to a scalar given bindings for every free continuous variable.
    ///
    /// Returns `EvalError::UnboundVariable` if a variable occurring in the
    /// expression is missing from `assignment` (callers that already checked
    /// full coverage via `collect_vars`, e.g. `crate::subst::evaluate`, will
    /// never observe this variant in practice).
    pub fn eval(&self, assignment: &BTreeMap<String, f64>) -> Result<f64, EvalError> {
        match self.inner() {
            ExprInner::Const(c) => Ok(c.0),
            ExprInner::Var(name) => assignment
                .get(name.as_ref())
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable {
                    name: name.to_string(),
                }),
            ExprInner::Add(a, b) => Ok(a.eval(assignment)? + b.eval(assignment)?),
            ExprInner::Sub(a, b) => Ok(a.eval(assignment)? - b.eval(assignment)?),
            ExprInner::Mul(a, b) => Ok(a.eval(assignment)? * b.eval(assignment)?),
            ExprInner::Div(a, b) => {
                let denom = b.eval(assignment)?;
                if denom == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(a.eval(assignment)? / denom)
            }
            ExprInner::Neg(a) => Ok(-a.eval(assignment)?),
            ExprInner::Pow(a, e) => Ok(a.eval(assignment)?.powi(*e)),
            ExprInner::PowExpr(a, e) => Ok(a.eval(assignment)?.powf(e.eval(assignment)?)),
            ExprInner::Unary(func, a) => {
                let x = a.eval(assignment)?;
                check_domain(*func, x)?;
                Ok(func.apply_f64(x))
            }
        }
    }
}

fn check_domain(func: UnaryFn, x: f64) -> Result<(), EvalError> {
    let bad = match func {
        UnaryFn::Log | UnaryFn::Log2 | UnaryFn::Log10 => x <= 0.0,
        UnaryFn::Log1p => x <= -1.0,
        UnaryFn::Sqrt => x < 0.0,
        _ => false,
    };
    if bad {
        Err(EvalError::DomainError {
            function: func.symbol(),
            argument: x,
        })
    } else {
        Ok(())
    }
}
