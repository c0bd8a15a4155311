//! # XADD: eXtended Algebraic Decision Diagrams
//!
//! A hash-consed decision-diagram engine over mixed Boolean and real-valued
//! variables. Internal nodes test a linear inequality or a Boolean atom;
//! leaves carry symbolic algebraic expressions. Every diagram is kept in a
//! unique, reduced, ordered form, so two diagrams that are structurally
//! identical are always the same node identity.
//!
//! ## Layout
//!
//! - [`node`] — the Node Store: hash-conses every leaf and internal node.
//! - [`decision`] — the Decision Registry: canonicalizes and interns
//!   decisions (linear inequalities, Boolean atoms).
//! - [`reduce`] — the Reduction Engine: the sole path through which internal
//!   nodes are created.
//! - [`apply`] — binary composition of two diagrams under an arithmetic,
//!   relational, or Boolean operator.
//! - [`unary`] — leaf-wise application of an elementary function, sign test,
//!   or Boolean negation.
//! - [`subst`] — partial substitution and full evaluation.
//! - [`canon`] — reinstates ordering after a transformation that may have
//!   broken it.
//! - [`lp`] — LP-backed pruning of infeasible branches.
//! - [`format`] — the textual import/export grammar.
//! - [`expr`] — the symbolic real-expression layer leaves and decisions are
//!   built from.
//! - [`manager`] — [`manager::XaddContext`], the handle tying everything
//!   together; most callers only need this module.
//!
//! ## Example
//!
//! ```
//! use xadd_core::manager::XaddContext;
//! use xadd_core::apply::ApplyOp;
//! use xadd_core::expr::Expr;
//!
//! let ctx = XaddContext::new();
//! let x = ctx.intern_leaf(Expr::var("x"));
//! let y = ctx.intern_leaf(Expr::var("y"));
//! let sum = ctx.apply(x, y, ApplyOp::Add).unwrap();
//! assert_eq!(ctx.print(sum), "([x + y])");
//! ```

pub mod apply;
pub mod canon;
pub mod decision;
pub mod error;
pub mod expr;
pub mod format;
pub mod lp;
pub mod manager;
pub mod node;
pub mod reduce;
pub mod store;
pub mod subst;
pub mod unary;

pub use apply::ApplyOp;
pub use decision::{Decision, DecisionId};
pub use error::{XaddError, XaddResult};
pub use expr::Expr;
pub use manager::XaddContext;
pub use node::{Node, NodeId};
pub use unary::UnaryOp;
