//! Severity classification for fever cases
//!
//! Rules are evaluated in strict priority order and the first match wins:
//!
//! 1. any critical lab signal, or any danger symptom → Critical
//! 2. two or more low/high lab signals, or a symptom count at the configured
//!    threshold → Moderate
//! 3. otherwise → Mild
//!
//! Disease identity is accepted but never changes the tier.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::lab_signal::LabSignals;
use super::symptoms::SymptomAggregate;
use crate::models::disease::Disease;
use crate::models::severity::SeverityTier;

/// The rule that decided a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityRule {
    /// A lab value was critically low or high
    CriticalSignal,
    /// A danger symptom was reported
    DangerSymptom,
    /// Two or more labs were out of range
    MultipleAbnormalLabs,
    /// Symptom count reached the configured threshold
    SymptomBurden,
    /// Nothing raised the tier
    Default,
}

impl SeverityRule {
    /// Short explanation for display
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CriticalSignal => "critical lab value",
            Self::DangerSymptom => "danger symptom reported",
            Self::MultipleAbnormalLabs => "multiple abnormal lab values",
            Self::SymptomBurden => "high symptom count",
            Self::Default => "no escalating findings",
        }
    }
}

impl fmt::Display for SeverityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Result of severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    /// Assigned tier
    pub tier: SeverityTier,
    /// Rule that fired
    pub rule: SeverityRule,
    /// No lab values and no symptoms were available
    pub insufficient_data: bool,
}

/// Classify a case into a severity tier
///
/// # Arguments
/// * `signals` - Lab signal per lab
/// * `symptoms` - Symptom aggregate
/// * `_disease` - Tentative disease; consumed by the recommendation composer, not here
/// * `moderate_symptom_threshold` - Symptom count that makes a case at least moderate
#[must_use]
pub fn classify_severity(
    signals: &LabSignals,
    symptoms: &SymptomAggregate,
    _disease: Disease,
    moderate_symptom_threshold: usize,
) -> SeverityAssessment {
    let insufficient_data = signals.all_unknown() && symptoms.count == 0;

    let (tier, rule) = if signals.any_critical() {
        (SeverityTier::Critical, SeverityRule::CriticalSignal)
    } else if symptoms.has_danger_symptom {
        (SeverityTier::Critical, SeverityRule::DangerSymptom)
    } else if signals.abnormal_count() >= 2 {
        (SeverityTier::Moderate, SeverityRule::MultipleAbnormalLabs)
    } else if symptoms.count >= moderate_symptom_threshold {
        (SeverityTier::Moderate, SeverityRule::SymptomBurden)
    } else {
        (SeverityTier::Mild, SeverityRule::Default)
    };

    SeverityAssessment {
        tier,
        rule,
        insufficient_data,
    }
}
