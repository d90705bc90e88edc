//! A deterministic rules engine for fever triage.
//!
//! Intake data (lab values, symptoms and a tentative disease) is classified into
//! a severity tier with an ordered list of recommendations. Critical cases are
//! referred to nearby hospitals, and every case is tracked through a role-gated
//! diagnosis lifecycle.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Core types
pub use config::TriageConfig;
pub use error::{Result, TriageError};

// Domain model
pub use models::{
    Actor, Coordinates, DiagnosisRecord, Disease, HospitalCandidate, Inventory, InventoryItem,
    LabName, LabPanel, LabUnit, LifecycleState, Prescription, PrescriptionItem, RecommendationList,
    Role, SeverityTier, Symptom, SymptomSet, TriageIntake, ValidatedIntake,
};

// Classification
pub use algorithm::triage::{
    LabSignal, LabSignals, SeverityRule, TriageOutcome, classify, classify_batch, classify_intake,
    classify_with,
};

// Referrals
pub use algorithm::hospital::{
    GeolocationProvider, HospitalFinder, HospitalSearch, StaticDirectoryProvider,
};

// Lifecycle
pub use algorithm::lifecycle::{
    DiagnosisLifecycleManager, DiagnosisStore, InMemoryDiagnosisStore, SessionResolver,
    StaticSessionResolver, TransitionCommand,
};

// Analytics
pub use algorithm::analytics::{CaseSummary, DiseaseTrend, ReviewerStats, rising_diseases};
