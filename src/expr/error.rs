//! Error types for expression evaluation and parsing.

use std::fmt;

/// Errors raised while evaluating a leaf expression to a scalar.
///
/// Corresponds to the `LeafEvaluationError` kind of the engine-wide error
/// taxonomy (`crate::error::XaddError`).
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Division by the literal zero constant.
    DivisionByZero,
    /// A transcendental function was applied outside its domain,
    /// e.g. `log` of a non-positive constant.
    DomainError {
        function: &'static str,
        argument: f64,
    },
    /// A free variable had no entry in the assignment supplied to `evaluate`.
    UnboundVariable { name: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "division by zero while evaluating leaf expression"),
            EvalError::DomainError { function, argument } => write!(
                f,
                "{} is outside the domain of {} (got {})",
                argument, function, argument
            ),
            EvalError::UnboundVariable { name } => {
                write!(f, "variable '{}' has no assigned value", name)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Errors raised while parsing the arithmetic expression syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseExprError {
    /// Parsing failed at the given byte offset in the input.
    InvalidSyntax {
        message: String,
        input: String,
        position: Option<usize>,
    },
}

impl fmt::Display for ParseExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseExprError::InvalidSyntax {
                message,
                input,
                position,
            } => match position {
                Some(pos) => write!(
                    f,
                    "failed to parse expression at byte {}: {} (input: {:?})",
                    pos, message, input
                ),
                None => write!(f, "failed to parse expression: {} (input: {:?})", message, input),
            },
        }
    }
}

impl std::error::Error for ParseExprError {}
