//! Configuration for the triage engine.
//!
//! Reference ranges, the danger-symptom subset, the symptom-count cutoff and
//! hospital search settings are tunable. A configuration is loaded once and
//! then shared read-only by every classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::util::safe_read_to_string;
use crate::error::{Result, TriageError};
use crate::models::lab::LabName;
use crate::models::symptom::Symptom;

/// Reference range for one lab, in the lab's canonical unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Values below this are critically low
    pub critical_low: f64,
    /// Values below this are low
    pub low: f64,
    /// Values above this are high
    pub high: f64,
    /// Values above this are critically high
    pub critical_high: f64,
}

impl ReferenceRange {
    /// Create a reference range
    #[must_use]
    pub const fn new(critical_low: f64, low: f64, high: f64, critical_high: f64) -> Self {
        Self {
            critical_low,
            low,
            high,
            critical_high,
        }
    }

    /// Check that bounds are finite, non-negative and ordered
    pub fn validate(&self, lab: LabName) -> Result<()> {
        let bounds = [self.critical_low, self.low, self.high, self.critical_high];
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(TriageError::ConfigError(format!(
                "{lab} reference range must be finite and non-negative"
            )));
        }
        if !bounds.windows(2).all(|w| w[0] <= w[1]) {
            return Err(TriageError::ConfigError(format!(
                "{lab} reference range must satisfy critical_low <= low <= high <= critical_high"
            )));
        }
        Ok(())
    }
}

/// Reference ranges for every measured lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabThresholds {
    /// Platelets, ×10³/µL
    pub platelet: ReferenceRange,
    /// White cells, ×10³/µL
    pub wbc: ReferenceRange,
    /// Red cells, ×10⁶/µL
    pub rbc: ReferenceRange,
}

impl Default for LabThresholds {
    fn default() -> Self {
        Self {
            platelet: ReferenceRange::new(50.0, 150.0, 450.0, 1000.0),
            wbc: ReferenceRange::new(2.0, 4.0, 11.0, 30.0),
            rbc: ReferenceRange::new(2.5, 4.2, 5.9, 7.5),
        }
    }
}

impl LabThresholds {
    /// Range for a lab
    #[must_use]
    pub const fn range(&self, lab: LabName) -> &ReferenceRange {
        match lab {
            LabName::Platelet => &self.platelet,
            LabName::Wbc => &self.wbc,
            LabName::Rbc => &self.rbc,
        }
    }

    /// Replace the range for a lab
    pub fn set_range(&mut self, lab: LabName, range: ReferenceRange) {
        match lab {
            LabName::Platelet => self.platelet = range,
            LabName::Wbc => self.wbc = range,
            LabName::Rbc => self.rbc = range,
        }
    }
}

/// Settings for the hospital finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalSearchConfig {
    /// Search radius around the patient, in km
    pub radius_km: f64,
    /// Maximum number of candidates returned
    pub max_results: usize,
    /// Upper bound on a provider call, in milliseconds
    pub timeout_ms: u64,
}

impl Default for HospitalSearchConfig {
    fn default() -> Self {
        Self {
            radius_km: 10.0,
            max_results: 3,
            timeout_ms: 3000,
        }
    }
}

impl HospitalSearchConfig {
    /// Provider timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_danger_symptoms() -> BTreeSet<Symptom> {
    [
        Symptom::Bleeding,
        Symptom::SevereDehydration,
        Symptom::AlteredConsciousness,
        Symptom::BreathingDifficulty,
    ]
    .into_iter()
    .collect()
}

/// Longest accepted follow-up delay (one year)
pub const MAX_FOLLOW_UP_HOURS: i64 = 24 * 365;

/// Configuration for the triage engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Lab reference ranges
    pub lab_thresholds: LabThresholds,
    /// Symptoms whose presence alone makes a case critical
    pub danger_symptoms: BTreeSet<Symptom>,
    /// Symptom count at or above which a case is at least moderate
    pub moderate_symptom_threshold: usize,
    /// Hospital finder settings
    pub hospital_search: HospitalSearchConfig,
    /// Delay before the follow-up of a reviewed critical case, in hours
    pub follow_up_hours: i64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            lab_thresholds: LabThresholds::default(),
            danger_symptoms: default_danger_symptoms(),
            moderate_symptom_threshold: 4,
            hospital_search: HospitalSearchConfig::default(),
            follow_up_hours: 8,
        }
    }
}

impl TriageConfig {
    /// Create a new instance with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder
    #[must_use]
    pub fn builder() -> TriageConfigBuilder {
        TriageConfigBuilder::new()
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TriageError::ConfigError(format!("Invalid triage config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "triage configuration")?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded triage configuration from {}", path.display());
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        for lab in LabName::ALL {
            self.lab_thresholds.range(lab).validate(lab)?;
        }
        if self.moderate_symptom_threshold == 0 {
            return Err(TriageError::ConfigError(
                "moderate_symptom_threshold must be at least 1".to_string(),
            ));
        }
        let search = &self.hospital_search;
        if !search.radius_km.is_finite() || search.radius_km <= 0.0 {
            return Err(TriageError::ConfigError(
                "hospital_search.radius_km must be positive".to_string(),
            ));
        }
        if search.max_results == 0 {
            return Err(TriageError::ConfigError(
                "hospital_search.max_results must be at least 1".to_string(),
            ));
        }
        if search.timeout_ms == 0 {
            return Err(TriageError::ConfigError(
                "hospital_search.timeout_ms must be at least 1".to_string(),
            ));
        }
        if !(0..=MAX_FOLLOW_UP_HOURS).contains(&self.follow_up_hours) {
            return Err(TriageError::ConfigError(format!(
                "follow_up_hours must be between 0 and {MAX_FOLLOW_UP_HOURS}, got {}",
                self.follow_up_hours
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TriageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triage Configuration:")?;
        for lab in LabName::ALL {
            let r = self.lab_thresholds.range(lab);
            writeln!(
                f,
                "  {lab}: critical <{} | low <{} | high >{} | critical >{} ({})",
                r.critical_low,
                r.low,
                r.high,
                r.critical_high,
                lab.canonical_unit().symbol()
            )?;
        }
        let danger: Vec<_> = self.danger_symptoms.iter().map(|s| s.identifier()).collect();
        writeln!(f, "  Danger Symptoms: {}", danger.join(", "))?;
        writeln!(
            f,
            "  Moderate Symptom Threshold: {}",
            self.moderate_symptom_threshold
        )?;
        writeln!(
            f,
            "  Hospital Search: {} km, top {}, timeout {} ms",
            self.hospital_search.radius_km,
            self.hospital_search.max_results,
            self.hospital_search.timeout_ms
        )?;
        writeln!(f, "  Follow-up Delay: {} h", self.follow_up_hours)?;
        Ok(())
    }
}

/// Builder for constructing a triage configuration
#[derive(Debug, Clone, Default)]
pub struct TriageConfigBuilder {
    config: TriageConfig,
}

impl TriageConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference range for a lab
    #[must_use]
    pub fn lab_range(mut self, lab: LabName, range: ReferenceRange) -> Self {
        self.config.lab_thresholds.set_range(lab, range);
        self
    }

    /// Replace the danger-symptom subset
    #[must_use]
    pub fn danger_symptoms(mut self, symptoms: impl IntoIterator<Item = Symptom>) -> Self {
        self.config.danger_symptoms = symptoms.into_iter().collect();
        self
    }

    /// Set the moderate symptom-count threshold
    #[must_use]
    pub fn moderate_symptom_threshold(mut self, threshold: usize) -> Self {
        self.config.moderate_symptom_threshold = threshold;
        self
    }

    /// Set the hospital search radius
    #[must_use]
    pub fn search_radius_km(mut self, radius_km: f64) -> Self {
        self.config.hospital_search.radius_km = radius_km;
        self
    }

    /// Set the maximum number of hospital candidates
    #[must_use]
    pub fn max_hospitals(mut self, max_results: usize) -> Self {
        self.config.hospital_search.max_results = max_results;
        self
    }

    /// Set the provider timeout
    #[must_use]
    pub fn provider_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.hospital_search.timeout_ms = timeout_ms;
        self
    }

    /// Set the follow-up delay for critical cases
    #[must_use]
    pub fn follow_up_hours(mut self, hours: i64) -> Self {
        self.config.follow_up_hours = hours;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<TriageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

static GLOBAL_CONFIG: OnceLock<TriageConfig> = OnceLock::new();

/// Install the process-wide configuration; may only happen once
pub fn install(config: TriageConfig) -> Result<()> {
    config.validate()?;
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| TriageError::ConfigError("Triage configuration already installed".to_string()))
}

/// The process-wide configuration (defaults if none was installed)
pub fn global() -> &'static TriageConfig {
    GLOBAL_CONFIG.get_or_init(TriageConfig::default)
}
