//! Raw triage intake
//!
//! The shape callers hand to the engine (e.g. parsed from JSON). Nothing in an
//! intake is trusted until [`TriageIntake::validate`] has turned it into typed
//! values; malformed input is rejected, never coerced.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::models::disease::Disease;
use crate::models::hospital::Coordinates;
use crate::models::lab::{LabPanel, LabUnit, LabValue};
use crate::models::symptom::SymptomSet;

/// A lab value as reported, before validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLabValue {
    /// Reported number
    pub value: f64,
    /// Reported unit; canonical unit for the lab when omitted
    #[serde(default)]
    pub unit: Option<LabUnit>,
}

/// Unvalidated intake data for one fever case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageIntake {
    /// Reference to the patient
    pub patient_ref: String,
    /// Disease code (e.g. "dengue", "Viral Fever")
    pub disease: String,
    /// Platelet count
    #[serde(default)]
    pub platelet_count: Option<RawLabValue>,
    /// White blood cell count
    #[serde(default)]
    pub wbc_count: Option<RawLabValue>,
    /// Red blood cell count
    #[serde(default)]
    pub rbc_count: Option<RawLabValue>,
    /// Symptom identifiers
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Patient position, if the patient shared it
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Typed, validated intake
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntake {
    /// Reference to the patient
    pub patient_ref: String,
    /// Disease identity
    pub disease: Disease,
    /// Lab values
    pub labs: LabPanel,
    /// Symptoms
    pub symptoms: SymptomSet,
    /// Patient position
    pub coordinates: Option<Coordinates>,
}

fn lab_value(raw: Option<RawLabValue>, default_unit: LabUnit, field: &str) -> Result<Option<LabValue>> {
    raw.map(|raw| {
        LabValue::new(raw.value, raw.unit.unwrap_or(default_unit))
            .map_err(|e| TriageError::validation(format!("{field}: {e}")))
    })
    .transpose()
}

impl TriageIntake {
    /// Validate every field and produce typed values
    pub fn validate(&self) -> Result<ValidatedIntake> {
        if self.patient_ref.trim().is_empty() {
            return Err(TriageError::validation("Missing patient reference"));
        }

        let disease = self.disease.parse::<Disease>()?;

        let labs = LabPanel {
            platelet: lab_value(self.platelet_count, LabUnit::ThousandPerMicroliter, "platelet_count")?,
            wbc: lab_value(self.wbc_count, LabUnit::ThousandPerMicroliter, "wbc_count")?,
            rbc: lab_value(self.rbc_count, LabUnit::MillionPerMicroliter, "rbc_count")?,
        };

        let symptoms = SymptomSet::from_identifiers(&self.symptoms, self.notes.clone())?;

        if let Some(coords) = &self.coordinates {
            coords.validate()?;
        }

        Ok(ValidatedIntake {
            patient_ref: self.patient_ref.trim().to_string(),
            disease,
            labs,
            symptoms,
            coordinates: self.coordinates,
        })
    }
}
