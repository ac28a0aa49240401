//! Error kinds shared by every component of the crate.

use thiserror::Error;

/// Errors raised while building, encoding, or exhaustively solving an
/// assignment instance.
///
/// Evaluation of a candidate never produces one of these: a bad candidate
/// is described by its [`EvaluationReport`](crate::evaluate::EvaluationReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    /// Structural mismatch in the input tables or constraint set.
    #[error("malformed instance: {0}")]
    MalformedInstance(String),

    /// A constraint cannot be encoded as a penalty as stated.
    #[error("cannot encode constraint `{constraint}`: {reason}")]
    UnboundedPenalty { constraint: String, reason: String },

    /// No assignment satisfies all hard constraints.
    #[error("infeasible instance: {0}")]
    InfeasibleInstance(String),

    /// The exhaustive candidate space exceeds the configured guard.
    #[error("enumeration space of {candidates} candidates exceeds limit {limit}")]
    EnumerationTooLarge { candidates: u128, limit: u128 },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AssignError>;

impl AssignError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        AssignError::MalformedInstance(msg.into())
    }

    pub(crate) fn unbounded(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        AssignError::UnboundedPenalty {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn infeasible(msg: impl Into<String>) -> Self {
        AssignError::InfeasibleInstance(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        AssignError::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = AssignError::unbounded("budget", "inverted interval [5, 3]");
        assert_eq!(
            e.to_string(),
            "cannot encode constraint `budget`: inverted interval [5, 3]"
        );

        let e = AssignError::EnumerationTooLarge {
            candidates: 1_000,
            limit: 10,
        };
        assert!(e.to_string().contains("1000"));
    }
}
