//! Domain models for fever triage
//!
//! Intake data (labs, symptoms, disease), triage outputs (severity,
//! recommendations, hospital candidates) and the diagnosis record with its
//! lifecycle types.

pub mod diagnosis;
pub mod disease;
pub mod hospital;
pub mod intake;
pub mod inventory;
pub mod lab;
pub mod recommendation;
pub mod severity;
pub mod symptom;

pub use diagnosis::{
    Actor, DiagnosisRecord, FollowUp, LifecycleState, Notification, NotificationKind,
    Prescription, PrescriptionItem, Role, TransitionEntry,
};
pub use disease::Disease;
pub use hospital::{CandidateSource, Coordinates, Facility, HospitalCandidate};
pub use intake::{RawLabValue, TriageIntake, ValidatedIntake};
pub use inventory::{Inventory, InventoryItem};
pub use lab::{LabName, LabPanel, LabUnit, LabValue};
pub use recommendation::{Recommendation, RecommendationList, RecommendationOrigin};
pub use severity::SeverityTier;
pub use symptom::{Symptom, SymptomSet};
