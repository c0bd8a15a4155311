//! Symbolic real-valued expressions used as XADD leaves and inside decisions.
//!
//! This module is the in-crate stand-in for what the specification treats as
//! an external "expression oracle": a facility supplying canonical symbolic
//! expressions, linear-form extraction, substitution, and free-variable
//! queries. It follows the same shape the teacher crate uses for `BoolExpr`:
//! an `Arc`-shared, structurally-compared expression tree with operator
//! overloading and a hand-written parser, generalized from booleans to
//! real-valued arithmetic with transcendental functions.

mod ast;
mod display;
mod error;
mod eval;
mod linear;
mod parser;

pub use ast::{Expr, ExprInner};
pub use error::{EvalError, ParseExprError};
pub use linear::LinearForm;

#[cfg(test)]
mod tests;
