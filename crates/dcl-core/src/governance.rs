use crate::types::DivisionMetadata;

/// Global ceiling that always demands structural intervention. Not
/// configurable per division.
pub const REORGANIZATION_THRESHOLD: f64 = 1.0;

/// Threshold tiers, lowest first. A score crossing a higher tier has also
/// crossed every tier below it, so alerts accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GovernanceTier {
    Governance,
    Isolation,
    Reorganization,
}

impl GovernanceTier {
    pub const ALL: [GovernanceTier; 3] = [
        GovernanceTier::Governance,
        GovernanceTier::Isolation,
        GovernanceTier::Reorganization,
    ];

    pub fn threshold(&self, division: &DivisionMetadata) -> f64 {
        match self {
            GovernanceTier::Governance => division.governance_threshold(),
            GovernanceTier::Isolation => division.isolation_threshold(),
            GovernanceTier::Reorganization => REORGANIZATION_THRESHOLD,
        }
    }

    /// Alert text for a score that crossed this tier.
    pub fn alert(&self, score: f64, threshold: f64) -> String {
        let label = match self {
            GovernanceTier::Governance => "Governance threshold exceeded",
            GovernanceTier::Isolation => "Isolation threshold exceeded",
            GovernanceTier::Reorganization => "Architectural reorganization required",
        };
        format!("{label}: {score:.2} >= {threshold:?}")
    }
}

/// Tiers crossed by an unclamped raw score, in ascending order.
pub fn crossed_tiers(raw_score: f64, division: &DivisionMetadata) -> Vec<GovernanceTier> {
    GovernanceTier::ALL
        .into_iter()
        .filter(|tier| raw_score >= tier.threshold(division))
        .collect()
}

/// Governance alerts for an unclamped raw score: zero to three messages.
pub fn classify(raw_score: f64, division: &DivisionMetadata) -> Vec<String> {
    crossed_tiers(raw_score, division)
        .into_iter()
        .map(|tier| tier.alert(raw_score, tier.threshold(division)))
        .collect()
}

/// Whether the division's isolation threshold is crossed.
pub fn crosses_isolation(raw_score: f64, division: &DivisionMetadata) -> bool {
    raw_score >= division.isolation_threshold()
}
