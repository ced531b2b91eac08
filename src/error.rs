//! Error taxonomy for the partitioning core

use thiserror::Error;

/// Errors raised while partitioning a connectome
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// A criterion or parameter token was not recognized
    #[error("unknown {kind} `{token}`")]
    UnknownCriterion {
        /// Which argument carried the token ("criterion" or "parameter")
        kind: &'static str,
        token: String,
    },

    /// A partition does not label every node exactly once
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// No partition satisfies the independence invariant
    #[error("no valid partition: {reason}")]
    NoValidPartition {
        reason: String,
        /// Edges that blocked resolution, rendered as `u -> v`
        blocking_edges: Vec<String>,
    },
}

impl ClusterError {
    pub(crate) fn unknown_criterion(token: &str) -> Self {
        ClusterError::UnknownCriterion {
            kind: "criterion",
            token: token.to_string(),
        }
    }

    pub(crate) fn unknown_parameter(token: &str) -> Self {
        ClusterError::UnknownCriterion {
            kind: "parameter",
            token: token.to_string(),
        }
    }

    pub(crate) fn no_valid_partition(reason: impl Into<String>) -> Self {
        ClusterError::NoValidPartition {
            reason: reason.into(),
            blocking_edges: Vec::new(),
        }
    }
}

/// Result alias used throughout the core
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::ClusterError;

    #[test]
    fn test_messages_name_the_offending_token() {
        let err = ClusterError::unknown_criterion("speed");
        assert_eq!(err.to_string(), "unknown criterion `speed`");

        let err = ClusterError::unknown_parameter("most");
        assert_eq!(err.to_string(), "unknown parameter `most`");
    }
}
