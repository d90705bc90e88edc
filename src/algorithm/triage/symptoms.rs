//! Symptom aggregation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::symptom::{Symptom, SymptomSet};

/// Summary of a symptom set used by the severity classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomAggregate {
    /// Number of distinct symptoms reported
    pub count: usize,
    /// Whether any configured danger symptom was reported
    pub has_danger_symptom: bool,
    /// The danger symptoms that were reported
    pub danger_symptoms: Vec<Symptom>,
}

/// Count symptoms and detect danger symptoms
#[must_use]
pub fn aggregate_symptoms(symptoms: &SymptomSet, danger: &BTreeSet<Symptom>) -> SymptomAggregate {
    let danger_symptoms: Vec<_> = symptoms.iter().filter(|s| danger.contains(s)).collect();
    SymptomAggregate {
        count: symptoms.len(),
        has_danger_symptom: !danger_symptoms.is_empty(),
        danger_symptoms,
    }
}
