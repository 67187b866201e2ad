use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::CostError;
use crate::types::{
    CostFactors, Division, DivisionMetadata, RawCostFactors, RawDivisionMetadata,
    RepositoryConfig, Severity, DEFAULT_GOVERNANCE_THRESHOLD, DEFAULT_ISOLATION_THRESHOLD,
};

pub const CONFIG_FILE_NAME: &str = "dcl.toml";

/// Top-level configuration from `dcl.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub cost_factors: RawCostFactors,
    /// Keyed by division display name, e.g. `[divisions."UCHE Nnamdi"]`.
    #[serde(default)]
    pub divisions: BTreeMap<String, DivisionSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: None,
            version: default_version(),
        }
    }
}

/// Governance parameters for one division. Omitted values fall back to the
/// built-in defaults for that division.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivisionSettings {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub governance_threshold: Option<f64>,
    #[serde(default)]
    pub isolation_threshold: Option<f64>,
    #[serde(default)]
    pub priority_boost: Option<f64>,
    #[serde(default)]
    pub responsible_architect: Option<String>,
}

impl DivisionSettings {
    /// Validated metadata for `division` with defaults filled in.
    pub fn to_metadata(&self, division: Division) -> Result<DivisionMetadata, CostError> {
        DivisionMetadata::try_from(RawDivisionMetadata {
            division,
            description: self
                .description
                .clone()
                .unwrap_or_else(|| format!("{division} Division")),
            governance_threshold: self
                .governance_threshold
                .unwrap_or(DEFAULT_GOVERNANCE_THRESHOLD),
            isolation_threshold: self
                .isolation_threshold
                .unwrap_or(DEFAULT_ISOLATION_THRESHOLD),
            priority_boost: self.priority_boost.unwrap_or(division.priority_boost()),
            responsible_architect: self.responsible_architect.clone(),
        })
    }
}

/// A problem found while validating configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

fn org_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,37}[A-Za-z0-9_])?$").expect("valid regex")
    })
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"))
}

/// GitHub organization names: 1-39 characters, letters, digits, `-` and `_`,
/// not starting or ending with `-`.
pub fn is_valid_org_name(name: &str) -> bool {
    org_name_pattern().is_match(name)
}

impl Config {
    /// Load configuration from a `dcl.toml` file, rejecting invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;

        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|issue| issue.severity == Severity::Error)
            .map(|issue| issue.to_string())
            .collect();
        if !errors.is_empty() {
            anyhow::bail!(
                "invalid configuration in '{}':\n  {}",
                path.display(),
                errors.join("\n  ")
            );
        }
        Ok(config)
    }

    /// Read and parse a config file without validating its values.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `dcl init` to create a valid config file",
                path.display()
            )
        })
    }

    /// Find `dcl.toml` in the given directory or any ancestor.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        start
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest `dcl.toml`, or return defaults when there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Every issue in the configuration, not just the first.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        match self.organization.name.as_deref() {
            None => issues.push(ConfigIssue::warning(
                "organization.name",
                "no organization name configured",
            )),
            Some(name) if !is_valid_org_name(name) => issues.push(ConfigIssue::error(
                "organization.name",
                format!("invalid GitHub organization name: {name}"),
            )),
            Some(_) => {}
        }

        if !version_pattern().is_match(&self.organization.version) {
            issues.push(ConfigIssue::error(
                "organization.version",
                format!("invalid version format: {}", self.organization.version),
            ));
        }

        let mut weight_issues = 0;
        for (field, weight) in self.cost_factors.weights() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                weight_issues += 1;
                issues.push(ConfigIssue::error(
                    format!("cost_factors.{field}"),
                    format!("weight must be between 0.0 and 1.0, got {weight}"),
                ));
            }
        }
        // Sum and boost are only checked once every weight is in range
        if weight_issues == 0 {
            if let Err(e) = CostFactors::try_from(self.cost_factors.clone()) {
                issues.push(ConfigIssue::error("cost_factors", e.to_string()));
            }
        }

        for (name, settings) in &self.divisions {
            let field = format!("divisions.{name}");
            match name.parse::<Division>() {
                Ok(division) => {
                    if let Err(e) = settings.to_metadata(division) {
                        issues.push(ConfigIssue::error(field, e.to_string()));
                    }
                }
                Err(e) => issues.push(ConfigIssue::error(field, e.to_string())),
            }
        }

        issues
    }

    /// Validated default cost factors.
    pub fn cost_factors(&self) -> Result<CostFactors, CostError> {
        CostFactors::try_from(self.cost_factors.clone())
    }

    /// Validated metadata for every configured division.
    pub fn division_metadata(&self) -> Result<Vec<DivisionMetadata>, CostError> {
        self.divisions
            .iter()
            .map(|(name, settings)| settings.to_metadata(name.parse()?))
            .collect()
    }

    /// SHA-256 of the normalized configuration: keys sorted, floats rounded
    /// to six decimals, scalar lists sorted.
    pub fn fingerprint(&self) -> Result<String> {
        let value = serde_json::to_value(self).context("failed to serialize configuration")?;
        let normalized = normalize_for_hashing(value);
        let canonical =
            serde_json::to_string(&normalized).context("failed to serialize configuration")?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Generate default TOML content for `dcl init`.
    pub fn default_toml() -> String {
        r#"# dcl - Division-aware cost scoring configuration

[organization]
name = "obinexus"
version = "1.0.0"

[cost_factors]
# Weights must each be within 0.0..=1.0 and sum to between 0.8 and 1.2
stars_weight = 0.2
commit_activity_weight = 0.3
build_time_weight = 0.2
size_weight = 0.2
test_coverage_weight = 0.1
manual_boost = 1.0

# Per-division governance parameters.
# governance_threshold <= isolation_threshold, both within 0.0..=1.0
# priority_boost within 0.1..=3.0

[divisions."Computing"]
description = "Core technical infrastructure and toolchain development"
governance_threshold = 0.6
isolation_threshold = 0.8
priority_boost = 1.2
responsible_architect = "Nnamdi Michael Okpala"

[divisions."UCHE Nnamdi"]
description = "Strategic leadership and architectural oversight"
governance_threshold = 0.5
isolation_threshold = 0.7
priority_boost = 1.5
responsible_architect = "Nnamdi Michael Okpala"

[divisions."Aegis Engineering"]
description = "Core engineering systems and build orchestration"
governance_threshold = 0.6
isolation_threshold = 0.8
priority_boost = 1.3
responsible_architect = "Aegis Engineering Team"

[divisions."OBIAxis R&D"]
description = "Research and development initiatives"
governance_threshold = 0.7
isolation_threshold = 0.9
priority_boost = 1.1

[divisions."TDA"]
description = "Tactical defense and security applications"
governance_threshold = 0.6
isolation_threshold = 0.8
priority_boost = 1.0

[divisions."Publishing"]
description = "Documentation and content management"
governance_threshold = 0.7
isolation_threshold = 0.9
priority_boost = 0.9

[divisions."Nkwakọba"]
description = "Packaging and presentation systems"
governance_threshold = 0.6
isolation_threshold = 0.8
priority_boost = 1.0
"#
        .to_string()
    }
}

fn normalize_for_hashing(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_for_hashing(v)))
                .collect(),
        ),
        Value::Array(items) => {
            let mut items: Vec<Value> = items.into_iter().map(normalize_for_hashing).collect();
            if items
                .iter()
                .all(|v| v.is_string() || v.is_number() || v.is_boolean())
            {
                items.sort_by_key(|v| v.to_string());
            }
            Value::Array(items)
        }
        Value::Number(n) if n.is_f64() => {
            let rounded = n.as_f64().map(|f| (f * 1e6).round() / 1e6);
            rounded
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Number(n))
        }
        other => other,
    }
}

/// Per-repository configs found under an overrides directory.
#[derive(Debug, Default)]
pub struct RepositoryOverrides {
    /// Keyed by repository name (the file stem).
    pub configs: HashMap<String, RepositoryConfig>,
    /// Files that could not be read or parsed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

/// Read every `<repository>.toml` under `dir`. A bad file is recorded in
/// `failures` and does not stop discovery.
pub fn load_repository_overrides(dir: &Path) -> Result<RepositoryOverrides> {
    if !dir.is_dir() {
        anyhow::bail!("overrides directory '{}' does not exist", dir.display());
    }

    let mut overrides = RepositoryOverrides::default();
    let files = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"));

    for path in files {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        match read_repository_config(&path) {
            Ok(config) => {
                overrides.configs.insert(name, config);
            }
            Err(e) => overrides.failures.push((path, format!("{e:#}"))),
        }
    }

    Ok(overrides)
}

fn read_repository_config(path: &Path) -> Result<RepositoryConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse '{}'", path.display()))
}
