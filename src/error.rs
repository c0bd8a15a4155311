//! Error types for the XADD engine.
//!
//! One enum per error source, and a wrapper enum (`XaddError`) that unifies
//! everything a public engine operation can fail with. This mirrors the
//! teacher crate's approach of per-source error enums rather than a single
//! `thiserror`-derived tree: each source's `Display` carries the detail
//! specific to that failure, and the wrapper just forwards.

use std::fmt;

/// A decision expression that is neither a Boolean atom nor a linear
/// inequality, or an inequality whose sides are not jointly linear.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedDecisionError {
    /// The relation operator is not one of `<= < >= > == !=`.
    UnsupportedRelation { relation: String },
    /// One or both sides of the inequality are nonlinear in the free variables.
    Nonlinear { expression: String },
    /// A Boolean variable occurred inside an arithmetic subexpression rather
    /// than as a bare decision atom.
    BooleanInArithmeticPosition { variable: String },
}

impl fmt::Display for MalformedDecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedDecisionError::UnsupportedRelation { relation } => {
                write!(f, "unsupported relation operator '{}'", relation)
            }
            MalformedDecisionError::Nonlinear { expression } => {
                write!(f, "decision expression '{}' is not linear", expression)
            }
            MalformedDecisionError::BooleanInArithmeticPosition { variable } => write!(
                f,
                "boolean variable '{}' used in a non-atomic (arithmetic) position",
                variable
            ),
        }
    }
}

impl std::error::Error for MalformedDecisionError {}

/// An operator string outside the closed sets of `crate::apply::ApplyOp` or
/// `crate::unary::UnaryOp`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownOperatorError {
    pub operator: String,
}

impl fmt::Display for UnknownOperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator '{}'", self.operator)
    }
}

impl std::error::Error for UnknownOperatorError {}

/// `evaluate` was called without a binding for every free variable.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAssignmentError {
    pub missing: Vec<String>,
}

impl fmt::Display for PartialAssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evaluation is missing assignments for: {}",
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for PartialAssignmentError {}

/// An internal invariant (hash-consing, reducedness, ordering) was found
/// broken. This should never be observable outside of a bug in the engine
/// itself; the teacher crate's precedent is to `.expect()`/panic at the
/// analogous point in `BddManager::ite`, but this crate surfaces it as a
/// typed error at the public boundary and reserves panics for truly
/// unreachable match arms.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolationError {
    pub detail: String,
}

impl fmt::Display for InvariantViolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal invariant violated: {}", self.detail)
    }
}

impl std::error::Error for InvariantViolationError {}

/// Unifies every error an engine-level operation can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum XaddError {
    MalformedDecision(MalformedDecisionError),
    UnknownOperator(UnknownOperatorError),
    LeafEvaluation(crate::expr::EvalError),
    PartialAssignment(PartialAssignmentError),
    InvariantViolation(InvariantViolationError),
    Parse(crate::expr::ParseExprError),
}

impl fmt::Display for XaddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XaddError::MalformedDecision(e) => write!(f, "{}", e),
            XaddError::UnknownOperator(e) => write!(f, "{}", e),
            XaddError::LeafEvaluation(e) => write!(f, "{}", e),
            XaddError::PartialAssignment(e) => write!(f, "{}", e),
            XaddError::InvariantViolation(e) => write!(f, "{}", e),
            XaddError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for XaddError {}

impl From<MalformedDecisionError> for XaddError {
    fn from(e: MalformedDecisionError) -> Self {
        XaddError::MalformedDecision(e)
    }
}
impl From<UnknownOperatorError> for XaddError {
    fn from(e: UnknownOperatorError) -> Self {
        XaddError::UnknownOperator(e)
    }
}
impl From<crate::expr::EvalError> for XaddError {
    fn from(e: crate::expr::EvalError) -> Self {
        XaddError::LeafEvaluation(e)
    }
}
impl From<PartialAssignmentError> for XaddError {
    fn from(e: PartialAssignmentError) -> Self {
        XaddError::PartialAssignment(e)
    }
}
impl From<InvariantViolationError> for XaddError {
    fn from(e: InvariantViolationError) -> Self {
        XaddError::InvariantViolation(e)
    }
}
impl From<crate::expr::ParseExprError> for XaddError {
    fn from(e: crate::expr::ParseExprError) -> Self {
        XaddError::Parse(e)
    }
}

/// Result alias used throughout the engine.
pub type XaddResult<T> = Result<T, XaddError>;
