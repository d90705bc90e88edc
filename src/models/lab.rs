//! Lab panel model
//!
//! A fever intake carries up to three blood counts. Each value is unit-tagged
//! and missing values stay missing (`None`), they are never read as zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TriageError};

/// Measured blood counts, in the fixed order used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabName {
    /// Platelet count
    Platelet,
    /// White blood cell count
    Wbc,
    /// Red blood cell count
    Rbc,
}

impl LabName {
    /// All lab names in reporting order (platelet, WBC, RBC)
    pub const ALL: [Self; 3] = [Self::Platelet, Self::Wbc, Self::Rbc];

    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Platelet => "Platelet count",
            Self::Wbc => "White blood cell count",
            Self::Rbc => "Red blood cell count",
        }
    }

    /// Unit the reference ranges are expressed in
    #[must_use]
    pub const fn canonical_unit(self) -> LabUnit {
        match self {
            Self::Platelet | Self::Wbc => LabUnit::ThousandPerMicroliter,
            Self::Rbc => LabUnit::MillionPerMicroliter,
        }
    }
}

impl fmt::Display for LabName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Count units accepted on intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabUnit {
    /// Cells per microliter
    PerMicroliter,
    /// Thousand cells per microliter (×10³/µL)
    ThousandPerMicroliter,
    /// Million cells per microliter (×10⁶/µL)
    MillionPerMicroliter,
}

impl LabUnit {
    const fn cells_per_microliter(self) -> f64 {
        match self {
            Self::PerMicroliter => 1.0,
            Self::ThousandPerMicroliter => 1_000.0,
            Self::MillionPerMicroliter => 1_000_000.0,
        }
    }

    /// Short unit symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::PerMicroliter => "/µL",
            Self::ThousandPerMicroliter => "×10³/µL",
            Self::MillionPerMicroliter => "×10⁶/µL",
        }
    }
}

/// A single measured value with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    /// Numeric value, finite and non-negative
    pub value: f64,
    /// Unit the value was reported in
    pub unit: LabUnit,
}

impl LabValue {
    /// Create a validated lab value
    pub fn new(value: f64, unit: LabUnit) -> Result<Self> {
        if !value.is_finite() {
            return Err(TriageError::validation(format!(
                "Lab value must be a finite number, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(TriageError::validation(format!(
                "Lab value must be non-negative, got {value}"
            )));
        }
        Ok(Self { value, unit })
    }

    /// Express the value in another count unit
    #[must_use]
    pub fn in_unit(self, unit: LabUnit) -> f64 {
        self.value * self.unit.cells_per_microliter() / unit.cells_per_microliter()
    }
}

impl fmt::Display for LabValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}

/// Blood counts reported with a fever intake
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    /// Platelet count
    pub platelet: Option<LabValue>,
    /// White blood cell count
    pub wbc: Option<LabValue>,
    /// Red blood cell count
    pub rbc: Option<LabValue>,
}

impl LabPanel {
    /// Create an empty panel (every value missing)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            platelet: None,
            wbc: None,
            rbc: None,
        }
    }

    /// Set the platelet count
    pub fn with_platelet(mut self, value: f64, unit: LabUnit) -> Result<Self> {
        self.platelet = Some(LabValue::new(value, unit)?);
        Ok(self)
    }

    /// Set the white blood cell count
    pub fn with_wbc(mut self, value: f64, unit: LabUnit) -> Result<Self> {
        self.wbc = Some(LabValue::new(value, unit)?);
        Ok(self)
    }

    /// Set the red blood cell count
    pub fn with_rbc(mut self, value: f64, unit: LabUnit) -> Result<Self> {
        self.rbc = Some(LabValue::new(value, unit)?);
        Ok(self)
    }

    /// Get the value for a lab, if measured
    #[must_use]
    pub const fn get(&self, lab: LabName) -> Option<LabValue> {
        match lab {
            LabName::Platelet => self.platelet,
            LabName::Wbc => self.wbc,
            LabName::Rbc => self.rbc,
        }
    }

    /// Re-check every present value (used for deserialized panels)
    pub fn validate(&self) -> Result<()> {
        for lab in LabName::ALL {
            if let Some(v) = self.get(lab) {
                LabValue::new(v.value, v.unit)
                    .map_err(|e| TriageError::validation(format!("{lab}: {e}")))?;
            }
        }
        Ok(())
    }

    /// Number of measured values
    #[must_use]
    pub fn measured_count(&self) -> usize {
        LabName::ALL
            .iter()
            .filter(|lab| self.get(**lab).is_some())
            .count()
    }
}
