//! `Display` for expressions, producing the arithmetic syntax `format::parse_expr` reads back.

use super::ast::{Expr, ExprInner};
use std::fmt;

/// Binding power used to decide when a child needs parentheses.
fn precedence(e: &Expr) -> u8 {
    match e.inner() {
        ExprInner::Add(..) | ExprInner::Sub(..) => 1,
        ExprInner::Mul(..) | ExprInner::Div(..) => 2,
        ExprInner::Neg(..) => 3,
        ExprInner::Pow(..) | ExprInner::PowExpr(..) => 4,
        ExprInner::Unary(..) | ExprInner::Var(_) | ExprInner::Const(_) => 5,
    }
}

fn fmt_child(e: &Expr, parent_prec: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let child_prec = precedence(e);
    if child_prec < parent_prec {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner() {
            ExprInner::Var(name) => write!(f, "{}", name),
            ExprInner::Const(c) => {
                if c.0.fract() == 0.0 && c.0.is_finite() {
                    write!(f, "{}", c.0 as i64)
                } else {
                    write!(f, "{}", c.0)
                }
            }
            ExprInner::Add(a, b) => {
                fmt_child(a, 1, f)?;
                write!(f, " + ")?;
                fmt_child(b, 2, f)
            }
            ExprInner::Sub(a, b) => {
                fmt_child(a, 1, f)?;
                write!(f, " - ")?;
                fmt_child(b, 2, f)
            }
            ExprInner::Mul(a, b) => {
                fmt_child(a, 2, f)?;
                write!(f, "*")?;
                fmt_child(b, 3, f)
            }
            ExprInner::Div(a, b) => {
                fmt_child(a, 2, f)?;
                write!(f, "/")?;
                fmt_child(b, 3, f)
            }
            ExprInner::Neg(a) => {
                write!(f, "-")?;
                fmt_child(a, 4, f)
            }
            ExprInner::Pow(a, e) => {
                fmt_child(a, 5, f)?;
                write!(f, "^{}", e)
            }
            ExprInner::PowExpr(a, e) => {
                fmt_child(a, 5, f)?;
                write!(f, "^")?;
                fmt_child(e, 5, f)
            }
            ExprInner::Unary(func, a) => {
                write!(f, "{}({})", func.symbol(), a)
            }
        }
    }
}
