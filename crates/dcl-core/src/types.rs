use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CostError;

/// Organizational division a repository belongs to.
///
/// Serializes as its display name. Deserialization goes through
/// [`FromStr`](std::str::FromStr), so every spelling `parse` accepts is
/// accepted in config files too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Division {
    Computing,
    #[serde(rename = "UCHE Nnamdi")]
    UcheNnamdi,
    #[serde(rename = "Aegis Engineering")]
    AegisEngineering,
    #[serde(rename = "OBIAxis R&D")]
    ObiaxisRd,
    #[serde(rename = "TDA")]
    Tda,
    Publishing,
    #[serde(rename = "Nkwakọba")]
    Nkwakoba,
}

impl Division {
    pub const ALL: [Division; 7] = [
        Division::Computing,
        Division::UcheNnamdi,
        Division::AegisEngineering,
        Division::ObiaxisRd,
        Division::Tda,
        Division::Publishing,
        Division::Nkwakoba,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Division::Computing => "Computing",
            Division::UcheNnamdi => "UCHE Nnamdi",
            Division::AegisEngineering => "Aegis Engineering",
            Division::ObiaxisRd => "OBIAxis R&D",
            Division::Tda => "TDA",
            Division::Publishing => "Publishing",
            Division::Nkwakoba => "Nkwakọba",
        }
    }

    /// Organizational weighting applied to every score in this division.
    pub fn priority_boost(&self) -> f64 {
        match self {
            Division::Computing => 1.2,
            Division::UcheNnamdi => 1.5,
            Division::AegisEngineering => 1.3,
            Division::ObiaxisRd => 1.1,
            Division::Tda => 1.0,
            Division::Publishing => 0.9,
            Division::Nkwakoba => 1.0,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercases and drops everything but letters and digits so that
/// "UCHE Nnamdi", "uche_nnamdi" and "UCHE-NNAMDI" compare equal.
fn identifier_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl std::str::FromStr for Division {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = identifier_key(s);
        // ASCII spelling used in identifiers and environment variables
        if key == "nkwakoba" {
            return Ok(Division::Nkwakoba);
        }
        Division::ALL
            .into_iter()
            .find(|d| identifier_key(d.name()) == key)
            .ok_or_else(|| CostError::UnknownDivision(s.to_string()))
    }
}

impl TryFrom<String> for Division {
    type Error = CostError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle status of a repository.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum ProjectStatus {
    Core,
    #[default]
    Active,
    Incubator,
    Legacy,
    Experimental,
    Isolated,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Core,
        ProjectStatus::Active,
        ProjectStatus::Incubator,
        ProjectStatus::Legacy,
        ProjectStatus::Experimental,
        ProjectStatus::Isolated,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProjectStatus::Core => "Core",
            ProjectStatus::Active => "Active",
            ProjectStatus::Incubator => "Incubator",
            ProjectStatus::Legacy => "Legacy",
            ProjectStatus::Experimental => "Experimental",
            ProjectStatus::Isolated => "Isolated",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = identifier_key(s);
        ProjectStatus::ALL
            .into_iter()
            .find(|status| identifier_key(status.name()) == key)
            .ok_or_else(|| CostError::UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = CostError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Raw activity and health metrics for one repository, as extracted by
/// whatever collector talks to GitHub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub name: String,
    #[serde(default)]
    pub stars_count: u64,
    #[serde(default)]
    pub commits_last_30_days: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub size_kb: u64,
    #[serde(default)]
    pub build_time_minutes: Option<f64>,
    #[serde(default)]
    pub test_coverage_percent: Option<f64>,
    #[serde(default)]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    #[serde(default)]
    pub has_readme: bool,
    #[serde(default)]
    pub has_license: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub has_ci: bool,
    #[serde(default)]
    pub last_commit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepositoryMetrics {
    /// A record with every counter at zero and nothing known.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stars_count: 0,
            commits_last_30_days: 0,
            open_issues_count: 0,
            forks_count: 0,
            watchers_count: 0,
            size_kb: 0,
            build_time_minutes: None,
            test_coverage_percent: None,
            primary_language: None,
            languages: BTreeMap::new(),
            has_readme: false,
            has_license: false,
            is_fork: false,
            is_archived: false,
            has_ci: false,
            last_commit_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Reject records that cannot be scored.
    pub fn validate(&self) -> Result<(), CostError> {
        let fail = |reason: String| CostError::Calculation {
            repository: self.name.clone(),
            reason,
        };

        if let Some(coverage) = self.test_coverage_percent {
            if !coverage.is_finite() || !(0.0..=100.0).contains(&coverage) {
                return Err(fail(format!(
                    "test coverage {coverage} is outside 0..=100"
                )));
            }
        }
        if let Some(minutes) = self.build_time_minutes {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(fail(format!("build time {minutes} minutes is not valid")));
            }
        }
        Ok(())
    }
}

const WEIGHT_SUM_MIN: f64 = 0.8;
const WEIGHT_SUM_MAX: f64 = 1.2;
const BOOST_MIN: f64 = 0.1;
const BOOST_MAX: f64 = 3.0;
// Absorbs float error when weights are summed at exactly a bound.
const BOUND_EPSILON: f64 = 1e-9;

fn default_stars_weight() -> f64 {
    0.2
}
fn default_commit_weight() -> f64 {
    0.3
}
fn default_build_weight() -> f64 {
    0.2
}
fn default_size_weight() -> f64 {
    0.2
}
fn default_coverage_weight() -> f64 {
    0.1
}
fn default_boost() -> f64 {
    1.0
}

/// Unvalidated cost factors as they appear in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCostFactors {
    #[serde(default = "default_stars_weight")]
    pub stars_weight: f64,
    #[serde(default = "default_commit_weight")]
    pub commit_activity_weight: f64,
    #[serde(default = "default_build_weight")]
    pub build_time_weight: f64,
    #[serde(default = "default_size_weight")]
    pub size_weight: f64,
    #[serde(default = "default_coverage_weight")]
    pub test_coverage_weight: f64,
    #[serde(default = "default_boost")]
    pub manual_boost: f64,
}

impl Default for RawCostFactors {
    fn default() -> Self {
        Self {
            stars_weight: default_stars_weight(),
            commit_activity_weight: default_commit_weight(),
            build_time_weight: default_build_weight(),
            size_weight: default_size_weight(),
            test_coverage_weight: default_coverage_weight(),
            manual_boost: default_boost(),
        }
    }
}

impl RawCostFactors {
    pub fn weights(&self) -> [(&'static str, f64); 5] {
        [
            ("stars_weight", self.stars_weight),
            ("commit_activity_weight", self.commit_activity_weight),
            ("build_time_weight", self.build_time_weight),
            ("size_weight", self.size_weight),
            ("test_coverage_weight", self.test_coverage_weight),
        ]
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights().iter().map(|(_, w)| w).sum()
    }
}

/// Validated scoring weights. The five weights each lie in [0, 1] and sum
/// to a value in [0.8, 1.2]; the manual boost lies in [0.1, 3.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCostFactors")]
pub struct CostFactors {
    stars_weight: f64,
    commit_activity_weight: f64,
    build_time_weight: f64,
    size_weight: f64,
    test_coverage_weight: f64,
    manual_boost: f64,
}

impl CostFactors {
    pub fn new(
        stars_weight: f64,
        commit_activity_weight: f64,
        build_time_weight: f64,
        size_weight: f64,
        test_coverage_weight: f64,
    ) -> Result<Self, CostError> {
        Self::try_from(RawCostFactors {
            stars_weight,
            commit_activity_weight,
            build_time_weight,
            size_weight,
            test_coverage_weight,
            manual_boost: default_boost(),
        })
    }

    /// Same weights with a different manual boost.
    pub fn with_manual_boost(&self, manual_boost: f64) -> Result<Self, CostError> {
        let mut raw = self.to_raw();
        raw.manual_boost = manual_boost;
        Self::try_from(raw)
    }

    pub fn stars_weight(&self) -> f64 {
        self.stars_weight
    }
    pub fn commit_activity_weight(&self) -> f64 {
        self.commit_activity_weight
    }
    pub fn build_time_weight(&self) -> f64 {
        self.build_time_weight
    }
    pub fn size_weight(&self) -> f64 {
        self.size_weight
    }
    pub fn test_coverage_weight(&self) -> f64 {
        self.test_coverage_weight
    }
    pub fn manual_boost(&self) -> f64 {
        self.manual_boost
    }

    pub fn weight_sum(&self) -> f64 {
        self.to_raw().weight_sum()
    }

    pub fn to_raw(&self) -> RawCostFactors {
        RawCostFactors {
            stars_weight: self.stars_weight,
            commit_activity_weight: self.commit_activity_weight,
            build_time_weight: self.build_time_weight,
            size_weight: self.size_weight,
            test_coverage_weight: self.test_coverage_weight,
            manual_boost: self.manual_boost,
        }
    }
}

impl Default for CostFactors {
    fn default() -> Self {
        let raw = RawCostFactors::default();
        Self {
            stars_weight: raw.stars_weight,
            commit_activity_weight: raw.commit_activity_weight,
            build_time_weight: raw.build_time_weight,
            size_weight: raw.size_weight,
            test_coverage_weight: raw.test_coverage_weight,
            manual_boost: raw.manual_boost,
        }
    }
}

impl TryFrom<RawCostFactors> for CostFactors {
    type Error = CostError;

    fn try_from(raw: RawCostFactors) -> Result<Self, Self::Error> {
        let invalid = |reason: String| CostError::InvalidCostFactors { reason };

        for (field, weight) in raw.weights() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(invalid(format!(
                    "{field} must be between 0.0 and 1.0, got {weight}"
                )));
            }
        }
        let sum = raw.weight_sum();
        if sum < WEIGHT_SUM_MIN - BOUND_EPSILON || sum > WEIGHT_SUM_MAX + BOUND_EPSILON {
            return Err(invalid(format!(
                "weights sum to {sum:.2}, expected between {WEIGHT_SUM_MIN} and {WEIGHT_SUM_MAX}"
            )));
        }
        if !raw.manual_boost.is_finite() || !(BOOST_MIN..=BOOST_MAX).contains(&raw.manual_boost)
        {
            return Err(invalid(format!(
                "manual_boost must be between {BOOST_MIN} and {BOOST_MAX}, got {}",
                raw.manual_boost
            )));
        }

        Ok(Self {
            stars_weight: raw.stars_weight,
            commit_activity_weight: raw.commit_activity_weight,
            build_time_weight: raw.build_time_weight,
            size_weight: raw.size_weight,
            test_coverage_weight: raw.test_coverage_weight,
            manual_boost: raw.manual_boost,
        })
    }
}

pub const DEFAULT_GOVERNANCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_ISOLATION_THRESHOLD: f64 = 0.8;

/// Unvalidated division metadata, the serialized shape of [`DivisionMetadata`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDivisionMetadata {
    pub division: Division,
    pub description: String,
    pub governance_threshold: f64,
    pub isolation_threshold: f64,
    pub priority_boost: f64,
    #[serde(default)]
    pub responsible_architect: Option<String>,
}

/// Governance parameters of one division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDivisionMetadata")]
pub struct DivisionMetadata {
    division: Division,
    description: String,
    governance_threshold: f64,
    isolation_threshold: f64,
    priority_boost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    responsible_architect: Option<String>,
}

impl DivisionMetadata {
    pub fn new(
        division: Division,
        description: impl Into<String>,
        governance_threshold: f64,
        isolation_threshold: f64,
        priority_boost: f64,
    ) -> Result<Self, CostError> {
        Self::try_from(RawDivisionMetadata {
            division,
            description: description.into(),
            governance_threshold,
            isolation_threshold,
            priority_boost,
            responsible_architect: None,
        })
    }

    /// Metadata used when nothing is configured for a division.
    pub fn default_for(division: Division) -> Self {
        Self {
            division,
            description: format!("{division} Division"),
            governance_threshold: DEFAULT_GOVERNANCE_THRESHOLD,
            isolation_threshold: DEFAULT_ISOLATION_THRESHOLD,
            priority_boost: division.priority_boost(),
            responsible_architect: None,
        }
    }

    pub fn with_responsible_architect(mut self, architect: impl Into<String>) -> Self {
        self.responsible_architect = Some(architect.into());
        self
    }

    pub fn division(&self) -> Division {
        self.division
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn governance_threshold(&self) -> f64 {
        self.governance_threshold
    }
    pub fn isolation_threshold(&self) -> f64 {
        self.isolation_threshold
    }
    pub fn priority_boost(&self) -> f64 {
        self.priority_boost
    }
    pub fn responsible_architect(&self) -> Option<&str> {
        self.responsible_architect.as_deref()
    }
}

impl TryFrom<RawDivisionMetadata> for DivisionMetadata {
    type Error = CostError;

    fn try_from(raw: RawDivisionMetadata) -> Result<Self, Self::Error> {
        let invalid = |reason: String| CostError::InvalidDivisionMetadata {
            division: raw.division,
            reason,
        };

        for (field, value) in [
            ("governance_threshold", raw.governance_threshold),
            ("isolation_threshold", raw.isolation_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!(
                    "{field} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if raw.governance_threshold > raw.isolation_threshold {
            return Err(invalid(format!(
                "governance_threshold {} exceeds isolation_threshold {}",
                raw.governance_threshold, raw.isolation_threshold
            )));
        }
        if !raw.priority_boost.is_finite()
            || !(BOOST_MIN..=BOOST_MAX).contains(&raw.priority_boost)
        {
            return Err(invalid(format!(
                "priority_boost must be between {BOOST_MIN} and {BOOST_MAX}, got {}",
                raw.priority_boost
            )));
        }

        Ok(Self {
            division: raw.division,
            description: raw.description,
            governance_threshold: raw.governance_threshold,
            isolation_threshold: raw.isolation_threshold,
            priority_boost: raw.priority_boost,
            responsible_architect: raw.responsible_architect,
        })
    }
}

fn default_true() -> bool {
    true
}

/// Per-repository governance overrides, usually read from `<repo>.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_division")]
    pub division: Division,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub cost_factors: CostFactors,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default = "default_true")]
    pub sinphase_compliance: bool,
    #[serde(default)]
    pub isolation_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_override: Option<BTreeMap<String, serde_json::Value>>,
}

fn default_division() -> Division {
    Division::Computing
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            division: default_division(),
            status: ProjectStatus::default(),
            cost_factors: CostFactors::default(),
            tags: Vec::new(),
            dependencies: Vec::new(),
            sinphase_compliance: true,
            isolation_required: false,
            manual_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_priority_table() {
        assert_eq!(Division::Computing.priority_boost(), 1.2);
        assert_eq!(Division::UcheNnamdi.priority_boost(), 1.5);
        assert_eq!(Division::AegisEngineering.priority_boost(), 1.3);
        assert_eq!(Division::ObiaxisRd.priority_boost(), 1.1);
        assert_eq!(Division::Tda.priority_boost(), 1.0);
        assert_eq!(Division::Publishing.priority_boost(), 0.9);
        assert_eq!(Division::Nkwakoba.priority_boost(), 1.0);
    }

    #[test]
    fn test_division_parse() {
        assert_eq!("Computing".parse::<Division>().unwrap(), Division::Computing);
        assert_eq!(
            "UCHE Nnamdi".parse::<Division>().unwrap(),
            Division::UcheNnamdi
        );
        assert_eq!(
            "uche_nnamdi".parse::<Division>().unwrap(),
            Division::UcheNnamdi
        );
        assert_eq!(
            "OBIAxis R&D".parse::<Division>().unwrap(),
            Division::ObiaxisRd
        );
        assert_eq!("OBIAXIS_RD".parse::<Division>().unwrap(), Division::ObiaxisRd);
        assert_eq!("Nkwakọba".parse::<Division>().unwrap(), Division::Nkwakoba);
        assert!(matches!(
            "InvalidDivision".parse::<Division>(),
            Err(CostError::UnknownDivision(_))
        ));
        assert!("".parse::<Division>().is_err());
    }

    #[test]
    fn test_division_serde_uses_display_names() {
        let json = serde_json::to_string(&Division::UcheNnamdi).unwrap();
        assert_eq!(json, "\"UCHE Nnamdi\"");
        let parsed: Division = serde_json::from_str("\"AEGIS_ENGINEERING\"").unwrap();
        assert_eq!(parsed, Division::AegisEngineering);
    }

    #[test]
    fn test_division_deserializes_every_parse_spelling() {
        for (spelling, expected) in [
            ("UCHE_Nnamdi", Division::UcheNnamdi),
            ("uche nnamdi", Division::UcheNnamdi),
            ("Aegis_Engineering", Division::AegisEngineering),
            ("OBIAxis_RD", Division::ObiaxisRd),
            ("Nkwakoba", Division::Nkwakoba),
            ("Nkwakọba", Division::Nkwakoba),
        ] {
            let config: RepositoryConfig =
                toml::from_str(&format!("division = \"{spelling}\"")).unwrap();
            assert_eq!(config.division, expected, "{spelling}");
            assert_eq!(spelling.parse::<Division>().unwrap(), expected);
        }

        let err = toml::from_str::<RepositoryConfig>("division = \"Marketing\"").unwrap_err();
        assert!(err.to_string().contains("unknown division"));
    }

    #[test]
    fn test_status_deserializes_any_case() {
        let config: RepositoryConfig = toml::from_str("status = \"INCUBATOR\"").unwrap();
        assert_eq!(config.status, ProjectStatus::Incubator);
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Incubator).unwrap(),
            "\"Incubator\""
        );
        assert!(toml::from_str::<RepositoryConfig>("status = \"Retired\"").is_err());
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.to_string().parse::<ProjectStatus>().unwrap(), status);
        }
        assert_eq!(
            "isolated".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Isolated
        );
        assert!("Retired".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_default_cost_factors_within_bound() {
        let factors = CostFactors::default();
        assert!((factors.weight_sum() - 1.0).abs() < 1e-9);
        assert_eq!(factors.manual_boost(), 1.0);
        assert_eq!(factors.commit_activity_weight(), 0.3);
    }

    #[test]
    fn test_cost_factors_reject_weight_sum_outside_bound() {
        let too_low = CostFactors::new(0.1, 0.1, 0.1, 0.1, 0.1);
        assert!(matches!(too_low, Err(CostError::InvalidCostFactors { .. })));

        let too_high = CostFactors::new(0.5, 0.5, 0.2, 0.1, 0.1);
        assert!(too_high.is_err(), "sum of 1.4 should be rejected");

        let at_edges = CostFactors::new(0.2, 0.2, 0.2, 0.1, 0.1);
        assert!(at_edges.is_ok(), "sum of 0.8 is inside the bound");
        let upper_edge = CostFactors::new(0.3, 0.3, 0.2, 0.2, 0.2);
        assert!(upper_edge.is_ok(), "sum of 1.2 is inside the bound");
    }

    #[test]
    fn test_cost_factors_reject_weight_outside_unit_interval() {
        assert!(CostFactors::new(1.1, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(CostFactors::new(-0.1, 0.4, 0.3, 0.2, 0.2).is_err());
        assert!(CostFactors::new(f64::NAN, 0.3, 0.2, 0.2, 0.1).is_err());
    }

    #[test]
    fn test_manual_boost_bounds() {
        let factors = CostFactors::default();
        assert!(factors.with_manual_boost(2.0).is_ok());
        assert!(factors.with_manual_boost(0.1).is_ok());
        assert!(factors.with_manual_boost(3.0).is_ok());
        assert!(factors.with_manual_boost(0.05).is_err());
        assert!(factors.with_manual_boost(3.5).is_err());
    }

    #[test]
    fn test_cost_factors_deserialize_validates() {
        let ok: CostFactors = toml::from_str("manual_boost = 1.5").unwrap();
        assert_eq!(ok.manual_boost(), 1.5);
        assert_eq!(ok.stars_weight(), 0.2);

        let bad = toml::from_str::<CostFactors>("stars_weight = 0.9");
        assert!(bad.is_err(), "sum of 1.7 must fail deserialization");
    }

    #[test]
    fn test_division_metadata_validation() {
        assert!(DivisionMetadata::new(Division::Computing, "c", 0.6, 0.8, 1.2).is_ok());
        assert!(DivisionMetadata::new(Division::Computing, "c", 0.9, 0.8, 1.2).is_err());
        assert!(DivisionMetadata::new(Division::Computing, "c", 0.6, 1.1, 1.2).is_err());
        assert!(DivisionMetadata::new(Division::Computing, "c", -0.1, 0.8, 1.2).is_err());
        assert!(DivisionMetadata::new(Division::Computing, "c", 0.6, 0.8, 0.0).is_err());
        assert!(DivisionMetadata::new(Division::Computing, "c", 0.6, 0.8, 3.1).is_err());
        // Equal thresholds are allowed
        assert!(DivisionMetadata::new(Division::Tda, "t", 0.7, 0.7, 1.0).is_ok());
    }

    #[test]
    fn test_default_division_metadata() {
        let meta = DivisionMetadata::default_for(Division::Computing);
        assert_eq!(meta.description(), "Computing Division");
        assert_eq!(meta.governance_threshold(), 0.6);
        assert_eq!(meta.isolation_threshold(), 0.8);
        assert_eq!(meta.priority_boost(), 1.2);
        assert!(meta.responsible_architect().is_none());
    }

    #[test]
    fn test_metrics_validate() {
        let mut metrics = RepositoryMetrics::new("repo");
        assert!(metrics.validate().is_ok());

        metrics.test_coverage_percent = Some(120.0);
        let err = metrics.validate().unwrap_err();
        assert!(err.to_string().contains("repo"));

        metrics.test_coverage_percent = Some(85.0);
        metrics.build_time_minutes = Some(-3.0);
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn test_repository_config_defaults() {
        let config: RepositoryConfig = toml::from_str("").unwrap();
        assert_eq!(config, RepositoryConfig::default());
        assert_eq!(config.division, Division::Computing);
        assert_eq!(config.status, ProjectStatus::Active);
        assert!(config.sinphase_compliance);
        assert!(!config.isolation_required);
    }

    #[test]
    fn test_repository_config_from_toml() {
        let toml_str = r#"
division = "Aegis Engineering"
status = "Core"
tags = ["build", "toolchain"]
dependencies = ["nlink", "polybuild"]
sinphase_compliance = false

[cost_factors]
manual_boost = 2.0
"#;
        let config: RepositoryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.division, Division::AegisEngineering);
        assert_eq!(config.status, ProjectStatus::Core);
        assert_eq!(config.dependencies.len(), 2);
        assert!(!config.sinphase_compliance);
        assert_eq!(config.cost_factors.manual_boost(), 2.0);
    }
}
