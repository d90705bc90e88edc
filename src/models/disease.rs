//! Disease identities
//!
//! The tentative diagnosis category that drives disease-specific recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriageError;

/// Tentative disease identification for a fever case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    /// Dengue fever
    Dengue,
    /// Malaria
    Malaria,
    /// Typhoid fever
    Typhoid,
    /// Unspecified viral fever
    ViralFever,
    /// Any other cause; contributes no disease-specific guidance
    Other,
}

impl Disease {
    /// All disease identities
    pub const ALL: [Self; 5] = [
        Self::Dengue,
        Self::Malaria,
        Self::Typhoid,
        Self::ViralFever,
        Self::Other,
    ];

    /// Get the display name for this disease
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Dengue => "Dengue",
            Self::Malaria => "Malaria",
            Self::Typhoid => "Typhoid",
            Self::ViralFever => "Viral Fever",
            Self::Other => "Other",
        }
    }

    /// Whether this disease has its own recommendation block
    #[must_use]
    pub fn is_recognized(self) -> bool {
        self != Self::Other
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Disease {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "dengue" | "dengue fever" => Ok(Self::Dengue),
            "malaria" => Ok(Self::Malaria),
            "typhoid" | "typhoid fever" => Ok(Self::Typhoid),
            "viral" | "viral fever" | "viralfever" => Ok(Self::ViralFever),
            "other" => Ok(Self::Other),
            _ => Err(TriageError::validation(format!("Unknown disease code: {s}"))),
        }
    }
}
