//! Severity tiers for triaged fever cases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriageError;

/// Severity tier, the primary triage output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    /// Home care is sufficient
    Mild = 1,
    /// Consultation within 24-48 hours
    Moderate = 2,
    /// Immediate care required
    Critical = 3,
}

impl SeverityTier {
    /// All tiers, least severe first
    pub const ALL: [Self; 3] = [Self::Mild, Self::Moderate, Self::Critical];

    /// Convert a numeric tier (1-3) to `SeverityTier`
    #[must_use]
    pub const fn from_i32(level: i32) -> Option<Self> {
        match level {
            1 => Some(Self::Mild),
            2 => Some(Self::Moderate),
            3 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Get the numeric value for this tier
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get a descriptive name for this tier
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Critical => "Critical",
        }
    }

    /// Whether this tier triggers a hospital referral lookup
    #[must_use]
    pub const fn needs_referral(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl FromStr for SeverityTier {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "critical" | "severe" => Ok(Self::Critical),
            other => Err(TriageError::validation(format!(
                "Unknown severity tier: {other}"
            ))),
        }
    }
}
