//! Symptom vocabulary and symptom sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TriageError};

/// Fixed symptom vocabulary accepted on intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    /// Headache
    Headache,
    /// Joint pain
    JointPain,
    /// Leg pain
    LegPain,
    /// Muscle ache
    MusclePain,
    /// Skin rash
    Rash,
    /// Nausea with or without vomiting
    NauseaVomiting,
    /// Repeated vomiting
    Vomiting,
    /// Bleeding from gums, nose or skin
    Bleeding,
    /// Fatigue or weakness
    Fatigue,
    /// Cough
    Cough,
    /// Chills or shivering
    Chills,
    /// Heavy sweating
    Sweating,
    /// Loss of appetite
    LossOfAppetite,
    /// Abdominal pain
    AbdominalPain,
    /// Severe dehydration
    SevereDehydration,
    /// Confusion or drowsiness
    AlteredConsciousness,
    /// Difficulty breathing
    BreathingDifficulty,
}

impl Symptom {
    /// Every identifier in the vocabulary
    pub const ALL: [Self; 17] = [
        Self::Headache,
        Self::JointPain,
        Self::LegPain,
        Self::MusclePain,
        Self::Rash,
        Self::NauseaVomiting,
        Self::Vomiting,
        Self::Bleeding,
        Self::Fatigue,
        Self::Cough,
        Self::Chills,
        Self::Sweating,
        Self::LossOfAppetite,
        Self::AbdominalPain,
        Self::SevereDehydration,
        Self::AlteredConsciousness,
        Self::BreathingDifficulty,
    ];

    /// Wire identifier (snake_case)
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Headache => "headache",
            Self::JointPain => "joint_pain",
            Self::LegPain => "leg_pain",
            Self::MusclePain => "muscle_pain",
            Self::Rash => "rash",
            Self::NauseaVomiting => "nausea_vomiting",
            Self::Vomiting => "vomiting",
            Self::Bleeding => "bleeding",
            Self::Fatigue => "fatigue",
            Self::Cough => "cough",
            Self::Chills => "chills",
            Self::Sweating => "sweating",
            Self::LossOfAppetite => "loss_of_appetite",
            Self::AbdominalPain => "abdominal_pain",
            Self::SevereDehydration => "severe_dehydration",
            Self::AlteredConsciousness => "altered_consciousness",
            Self::BreathingDifficulty => "breathing_difficulty",
        }
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Symptom {
    type Err = TriageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-', '/'], "_");
        Self::ALL
            .into_iter()
            .find(|symptom| symptom.identifier() == normalized)
            .ok_or_else(|| TriageError::validation(format!("Unknown symptom identifier: {s}")))
    }
}

/// Reported symptoms plus free-text notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSet {
    symptoms: BTreeSet<Symptom>,
    /// Free-text notes from the intake
    pub notes: Option<String>,
}

impl SymptomSet {
    /// Create an empty symptom set
    #[must_use]
    pub const fn new() -> Self {
        Self {
            symptoms: BTreeSet::new(),
            notes: None,
        }
    }

    /// Build a set from wire identifiers
    ///
    /// Unknown identifiers and repeated identifiers are rejected rather than
    /// dropped or merged.
    pub fn from_identifiers<S: AsRef<str>>(identifiers: &[S], notes: Option<String>) -> Result<Self> {
        let mut symptoms = BTreeSet::new();
        for id in identifiers {
            let symptom: Symptom = id.as_ref().parse()?;
            if !symptoms.insert(symptom) {
                return Err(TriageError::validation(format!(
                    "Duplicate symptom identifier: {}",
                    id.as_ref()
                )));
            }
        }
        Ok(Self { symptoms, notes })
    }

    /// Add a symptom; returns `false` if it was already present
    pub fn insert(&mut self, symptom: Symptom) -> bool {
        self.symptoms.insert(symptom)
    }

    /// Attach free-text notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check whether a symptom was reported
    #[must_use]
    pub fn contains(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(&symptom)
    }

    /// Number of distinct symptoms
    #[must_use]
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    /// Whether no symptoms were reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Iterate symptoms in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = Symptom> + '_ {
        self.symptoms.iter().copied()
    }
}

impl FromIterator<Symptom> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = Symptom>>(iter: I) -> Self {
        Self {
            symptoms: iter.into_iter().collect(),
            notes: None,
        }
    }
}
