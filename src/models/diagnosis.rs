//! Diagnosis record model
//!
//! A diagnosis record carries the intake, the triage outcome and the workflow
//! state of one fever case. Records are created by a clinician, changed only
//! through lifecycle transitions, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriageError;
use crate::models::disease::Disease;
use crate::models::lab::LabPanel;
use crate::models::recommendation::RecommendationList;
use crate::models::severity::SeverityTier;
use crate::models::symptom::SymptomSet;

/// Workflow stage of a diagnosis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Intake recorded and triaged, awaiting review
    Created,
    /// Reviewed by a doctor
    Reviewed,
    /// Prescription issued
    Prescribed,
    /// Medication dispensed (terminal)
    Dispensed,
    /// Rejected by a doctor (terminal)
    Rejected,
}

impl LifecycleState {
    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dispensed | Self::Rejected)
    }

    /// Get the wire name for this state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Reviewed => "reviewed",
            Self::Prescribed => "prescribed",
            Self::Dispensed => "dispensed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "reviewed" => Ok(Self::Reviewed),
            "prescribed" => Ok(Self::Prescribed),
            "dispensed" => Ok(Self::Dispensed),
            "rejected" => Ok(Self::Rejected),
            other => Err(TriageError::validation(format!(
                "Unknown lifecycle state: {other}"
            ))),
        }
    }
}

/// Role of an authenticated actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Records intakes
    Clinician,
    /// Reviews, rejects and prescribes
    Doctor,
    /// Dispenses medication
    Chemist,
    /// Patient; may read but not transition records
    Patient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clinician => "clinician",
            Self::Doctor => "doctor",
            Self::Chemist => "chemist",
            Self::Patient => "patient",
        };
        write!(f, "{name}")
    }
}

/// An authenticated actor, as resolved by the session collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identity (e.g. e-mail)
    pub id: String,
    /// Role used for transition gating
    pub role: Role,
}

impl Actor {
    /// Create a new actor
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// One entry of the append-only transition history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    /// Source state (`None` for creation)
    pub from: Option<LifecycleState>,
    /// Target state
    pub to: LifecycleState,
    /// Identity of the actor
    pub actor_id: String,
    /// Role the actor acted in
    pub role: Role,
    /// When the transition happened
    pub at: DateTime<Utc>,
}

/// A single prescribed drug
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrescriptionItem {
    /// Drug name, matched against inventory case-insensitively
    pub drug: String,
    /// Units to dispense
    pub quantity: u32,
}

impl PrescriptionItem {
    /// Create a new prescription item
    #[must_use]
    pub fn new(drug: impl Into<String>, quantity: u32) -> Self {
        Self {
            drug: drug.into(),
            quantity,
        }
    }
}

/// Prescription attached to a record by a doctor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    /// Prescribed drugs, in order
    pub items: Vec<PrescriptionItem>,
    /// Dosage and usage instructions
    pub instructions: Option<String>,
}

impl Prescription {
    /// Create a prescription from items
    #[must_use]
    pub fn new(items: Vec<PrescriptionItem>) -> Self {
        Self {
            items,
            instructions: None,
        }
    }

    /// Attach instructions
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// A scheduled follow-up for a critical case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    /// When the follow-up is due
    pub scheduled_at: DateTime<Utc>,
    /// Notes for whoever performs the follow-up
    pub notes: String,
}

/// Kind of patient-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Case approved after review
    Approved,
    /// Severity or recommendations changed by the reviewer
    Corrected,
    /// Case rejected
    Rejected,
    /// Prescription issued
    Prescribed,
    /// Medication handed over
    Dispensed,
}

/// Patient-facing message produced by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Kind of message
    pub kind: NotificationKind,
    /// Message text
    pub message: String,
    /// Actor that caused it
    pub from_actor: String,
    /// When it was produced
    pub created_at: DateTime<Utc>,
}

/// Representation of a triaged fever case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    /// Record identifier
    pub id: u64,
    /// Reference to the patient (opaque to the engine)
    pub patient_ref: String,
    /// Tentative disease identification
    pub disease: Disease,
    /// Lab values from the intake
    pub labs: LabPanel,
    /// Reported symptoms
    pub symptoms: SymptomSet,
    /// Current severity tier
    pub severity: SeverityTier,
    /// Classified without any lab values or symptoms
    pub insufficient_data: bool,
    /// Current recommendation list
    pub recommendations: RecommendationList,
    /// Current lifecycle state
    pub state: LifecycleState,
    /// Optimistic concurrency version, bumped on every write
    pub version: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last transition
    pub updated_at: DateTime<Utc>,
    /// Append-only transition history
    pub history: Vec<TransitionEntry>,
    /// Reviewer notes
    pub doctor_notes: Option<String>,
    /// Identity of the reviewing doctor
    pub verified_by: Option<String>,
    /// Prescription, once issued
    pub prescription: Option<Prescription>,
    /// Follow-up, for reviewed critical cases
    pub follow_up: Option<FollowUp>,
    /// Patient-facing messages
    pub notifications: Vec<Notification>,
}

impl DiagnosisRecord {
    /// Actor who performed the most recent transition into `state`
    #[must_use]
    pub fn actor_for(&self, state: LifecycleState) -> Option<&TransitionEntry> {
        self.history.iter().rev().find(|entry| entry.to == state)
    }

    /// Whether the record has reached a terminal state
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }
}
