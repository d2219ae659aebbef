//! Error types for joint construction.
//!
//! These are fatal input/construction errors. Design-rule findings do not
//! go through here; they are reported as [`crate::Warnings`].

use thiserror::Error;

/// Errors raised while planning, pairing, rendering or assembling joints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JointError {
    /// A finger plan or joint request is malformed.
    #[error("Invalid joint: {0}")]
    InvalidJoint(String),

    /// Direction or normal vectors are not axis-aligned, unit or perpendicular.
    #[error("Geometry precondition violated: {0}")]
    GeometryPrecondition(String),

    /// Two edges declared as mates disagree on length or binding.
    #[error("Topology mismatch: {0}")]
    TopologyMismatch(String),

    /// An edge references a pair that does not exist, or a pair side was
    /// never bound to an edge.
    #[error("Unbound edge pair: {0}")]
    UnboundPair(String),

    /// The assembled outline has fewer than four points or no area.
    #[error("Degenerate panel '{panel}': {reason}")]
    DegeneratePanel { panel: String, reason: String },
}

/// Result type alias for joint operations.
pub type JointResult<T> = Result<T, JointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_error_display() {
        let err = JointError::InvalidJoint("explicit finger count must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid joint: explicit finger count must be >= 1"
        );

        let err = JointError::TopologyMismatch("BOTTOM.top 100 != BACK.bottom 99".to_string());
        assert_eq!(
            err.to_string(),
            "Topology mismatch: BOTTOM.top 100 != BACK.bottom 99"
        );
    }

    #[test]
    fn test_degenerate_panel_display() {
        let err = JointError::DegeneratePanel {
            panel: "LID".to_string(),
            reason: "3 points".to_string(),
        };
        assert_eq!(err.to_string(), "Degenerate panel 'LID': 3 points");
    }
}
