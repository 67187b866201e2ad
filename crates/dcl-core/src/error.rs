//! Error types for cost calculation and governance configuration.

use crate::types::Division;

/// Errors raised by the cost engine. Configuration problems surface when a
/// value is constructed; calculation problems name the repository involved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CostError {
    /// Weights or manual boost outside their allowed ranges.
    #[error("invalid cost factors: {reason}")]
    InvalidCostFactors { reason: String },

    /// Thresholds or priority boost of a division outside their allowed ranges.
    #[error("invalid metadata for division {division}: {reason}")]
    InvalidDivisionMetadata { division: Division, reason: String },

    #[error("unknown division: {0}")]
    UnknownDivision(String),

    #[error("unknown project status: {0}")]
    UnknownStatus(String),

    /// Scoring a single repository failed; other repositories are unaffected.
    #[error("cost calculation failed for {repository}: {reason}")]
    Calculation { repository: String, reason: String },
}

impl CostError {
    /// Repository a calculation failure belongs to, if any.
    pub fn repository(&self) -> Option<&str> {
        match self {
            CostError::Calculation { repository, .. } => Some(repository),
            _ => None,
        }
    }
}
