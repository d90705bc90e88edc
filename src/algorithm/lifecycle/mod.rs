//! Diagnosis lifecycle management
//!
//! Owns the state machine of every diagnosis record. Records are created by a
//! clinician and then move through role-gated transitions:
//!
//! ```text
//! Created ──doctor──▶ Reviewed ──doctor──▶ Prescribed ──chemist──▶ Dispensed
//!    │                   │
//!    └──────doctor───────┴──────▶ Rejected
//! ```
//!
//! Writes use optimistic concurrency: a transition is computed against a loaded
//! snapshot and committed with a compare-and-swap on the record version. When
//! another writer wins, the record is reloaded and the move is checked again,
//! so two concurrent reviews of the same record cannot both succeed.

pub mod session;
pub mod store;
pub mod transitions;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithm::triage::{
    classify_validated, compose_recommendations, evaluate_labs, suggested_medicines,
};
use crate::config::TriageConfig;
use crate::error::{Result, TriageError};
use crate::models::diagnosis::{
    Actor, DiagnosisRecord, FollowUp, LifecycleState, Notification, NotificationKind,
    Prescription, PrescriptionItem, TransitionEntry,
};
use crate::models::disease::Disease;
use crate::models::intake::ValidatedIntake;
use crate::models::inventory::Inventory;
use crate::models::recommendation::{RecommendationList, RecommendationOrigin};
use crate::models::severity::SeverityTier;
use crate::utils::logging::log_warning;

pub use session::{SessionResolver, StaticSessionResolver};
pub use store::{DiagnosisStore, InMemoryDiagnosisStore};
pub use transitions::{CREATOR_ROLE, TRANSITIONS, allowed_targets, is_allowed};

/// Attempts made before a contended transition gives up
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// Units per drug on a default prescription
pub const DEFAULT_PRESCRIPTION_QUANTITY: u32 = 1;

/// A transition plus its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransitionCommand {
    /// Doctor review; overrides are optional
    Review {
        /// Replacement severity tier
        severity_override: Option<SeverityTier>,
        /// Replacement recommendation texts
        recommendations_override: Option<Vec<String>>,
        /// Reviewer notes
        notes: Option<String>,
    },
    /// Doctor rejection
    Reject {
        /// Reason shown to the patient
        notes: Option<String>,
    },
    /// Prescription; the disease's suggested medicines when `None`
    Prescribe {
        /// Explicit prescription
        prescription: Option<Prescription>,
    },
    /// Chemist hands over the prescribed medication
    Dispense,
}

impl TransitionCommand {
    /// State the command moves a record to
    #[must_use]
    pub const fn target(&self) -> LifecycleState {
        match self {
            Self::Review { .. } => LifecycleState::Reviewed,
            Self::Reject { .. } => LifecycleState::Rejected,
            Self::Prescribe { .. } => LifecycleState::Prescribed,
            Self::Dispense => LifecycleState::Dispensed,
        }
    }

    /// Command with default payload for a target state
    ///
    /// `Created` has no command; records enter it only through creation.
    #[must_use]
    pub const fn for_target(target: LifecycleState) -> Option<Self> {
        match target {
            LifecycleState::Created => None,
            LifecycleState::Reviewed => Some(Self::Review {
                severity_override: None,
                recommendations_override: None,
                notes: None,
            }),
            LifecycleState::Rejected => Some(Self::Reject { notes: None }),
            LifecycleState::Prescribed => Some(Self::Prescribe { prescription: None }),
            LifecycleState::Dispensed => Some(Self::Dispense),
        }
    }
}

/// Default prescription built from a disease's suggested medicines
#[must_use]
pub fn default_prescription(disease: Disease) -> Prescription {
    Prescription::new(
        suggested_medicines(disease)
            .iter()
            .map(|drug| PrescriptionItem::new(*drug, DEFAULT_PRESCRIPTION_QUANTITY))
            .collect(),
    )
    .with_instructions("Take as directed by your doctor")
}

fn validate_prescription(prescription: &Prescription) -> Result<()> {
    if prescription.items.is_empty() {
        return Err(TriageError::validation("Prescription has no items"));
    }
    for item in &prescription.items {
        if item.drug.trim().is_empty() {
            return Err(TriageError::validation("Prescription item without a drug name"));
        }
        if item.quantity == 0 {
            return Err(TriageError::validation(format!(
                "Prescription quantity for {} must be positive",
                item.drug
            )));
        }
    }
    Ok(())
}

fn notify(
    record: &mut DiagnosisRecord,
    kind: NotificationKind,
    message: String,
    actor: &Actor,
    at: DateTime<Utc>,
) {
    record.notifications.push(Notification {
        kind,
        message,
        from_actor: actor.id.clone(),
        created_at: at,
    });
}

/// Owns diagnosis records and every change made to them
pub struct DiagnosisLifecycleManager {
    store: Arc<dyn DiagnosisStore>,
    inventory: Arc<Inventory>,
    sessions: Option<Arc<dyn SessionResolver>>,
    config: TriageConfig,
}

impl DiagnosisLifecycleManager {
    /// Create a manager over a store and an inventory
    #[must_use]
    pub fn new(
        store: Arc<dyn DiagnosisStore>,
        inventory: Arc<Inventory>,
        config: TriageConfig,
    ) -> Self {
        Self {
            store,
            inventory,
            sessions: None,
            config,
        }
    }

    /// Create a manager with an in-memory store, empty inventory and the global config
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryDiagnosisStore::new()),
            Arc::new(Inventory::new()),
            crate::config::global().clone(),
        )
    }

    /// Attach a session resolver for token-based transitions
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionResolver>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Inventory decremented on dispense
    #[must_use]
    pub const fn inventory(&self) -> &Arc<Inventory> {
        &self.inventory
    }

    /// Configuration used for classification and follow-ups
    #[must_use]
    pub const fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Classify an intake and store it as a new `Created` record
    ///
    /// # Errors
    /// Returns `InvalidTransition` when the actor is not a clinician
    pub fn create(&self, actor: &Actor, intake: &ValidatedIntake) -> Result<DiagnosisRecord> {
        if actor.role != CREATOR_ROLE {
            return Err(TriageError::InvalidTransition {
                from: LifecycleState::Created,
                to: LifecycleState::Created,
                role: actor.role,
            });
        }

        let outcome = classify_validated(&self.config, intake);
        let now = Utc::now();
        let id = self.store.next_id();

        let record = DiagnosisRecord {
            id,
            patient_ref: intake.patient_ref.clone(),
            disease: intake.disease,
            labs: intake.labs,
            symptoms: intake.symptoms.clone(),
            severity: outcome.severity,
            insufficient_data: outcome.insufficient_data,
            recommendations: outcome.recommendations,
            state: LifecycleState::Created,
            version: 1,
            created_at: now,
            updated_at: now,
            history: vec![TransitionEntry {
                from: None,
                to: LifecycleState::Created,
                actor_id: actor.id.clone(),
                role: actor.role,
                at: now,
            }],
            doctor_notes: None,
            verified_by: None,
            prescription: None,
            follow_up: None,
            notifications: Vec::new(),
        };

        self.store.insert(record.clone())?;
        info!(
            "Created diagnosis record {} for {} ({}, {})",
            id, record.patient_ref, record.disease, record.severity
        );
        Ok(record)
    }

    /// Load a record
    pub fn get(&self, id: u64) -> Result<DiagnosisRecord> {
        self.store.load(id)
    }

    /// All records, ordered by identifier
    #[must_use]
    pub fn records(&self) -> Vec<DiagnosisRecord> {
        self.store.list()
    }

    /// Move a record to `target` using the default payload for that state
    ///
    /// # Errors
    /// Returns `InvalidTransition` when the role or current state does not allow it
    pub fn transition(
        &self,
        id: u64,
        target: LifecycleState,
        actor: &Actor,
    ) -> Result<DiagnosisRecord> {
        match TransitionCommand::for_target(target) {
            Some(command) => self.apply(id, command, actor),
            None => {
                let record = self.store.load(id)?;
                Err(TriageError::InvalidTransition {
                    from: record.state,
                    to: target,
                    role: actor.role,
                })
            }
        }
    }

    /// Resolve a session token, then transition
    ///
    /// # Errors
    /// Returns `ValidationError` for unknown tokens or when no resolver is attached
    pub fn transition_with_token(
        &self,
        id: u64,
        target: LifecycleState,
        token: &str,
    ) -> Result<DiagnosisRecord> {
        let sessions = self
            .sessions
            .as_ref()
            .ok_or_else(|| TriageError::validation("No session resolver configured"))?;
        let actor = sessions
            .resolve(token)
            .ok_or_else(|| TriageError::validation("Unknown session token"))?;
        self.transition(id, target, &actor)
    }

    /// Apply a transition command on behalf of an actor
    ///
    /// The record is left unchanged on any error.
    ///
    /// # Errors
    /// * `InvalidTransition` - role or current state does not allow the move
    /// * `InsufficientInventory` - dispensing would overdraw stock
    /// * `ValidationError` - malformed payload
    /// * `ConcurrentModification` - the record kept changing across retries
    pub fn apply(
        &self,
        id: u64,
        command: TransitionCommand,
        actor: &Actor,
    ) -> Result<DiagnosisRecord> {
        let target = command.target();

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.store.load(id)?;
            if !is_allowed(current.state, actor.role, target) {
                debug!(
                    "Rejected move of record {} from {} to {} by {}",
                    id, current.state, target, actor.role
                );
                return Err(TriageError::InvalidTransition {
                    from: current.state,
                    to: target,
                    role: actor.role,
                });
            }

            let now = Utc::now();
            let mut next = current.clone();
            let reserved = self.apply_effects(&mut next, &command, actor, now)?;
            next.history.push(TransitionEntry {
                from: Some(current.state),
                to: target,
                actor_id: actor.id.clone(),
                role: actor.role,
                at: now,
            });
            next.state = target;
            next.version = current.version + 1;
            next.updated_at = now;

            match self.store.compare_and_swap(current.version, next.clone()) {
                Ok(true) => {
                    info!(
                        "Diagnosis record {} moved from {} to {} by {} ({})",
                        id, current.state, target, actor.id, actor.role
                    );
                    return Ok(next);
                }
                Ok(false) => {
                    if let Some(items) = reserved {
                        self.inventory.return_items(&items);
                    }
                    debug!("Version conflict on record {id}, attempt {attempt}");
                }
                Err(e) => {
                    if let Some(items) = reserved {
                        self.inventory.return_items(&items);
                    }
                    return Err(e);
                }
            }
        }

        Err(TriageError::ConcurrentModification(id))
    }

    /// Mutate `record` for `command`; returns stock taken from inventory, if any
    fn apply_effects(
        &self,
        record: &mut DiagnosisRecord,
        command: &TransitionCommand,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<PrescriptionItem>>> {
        match command {
            TransitionCommand::Review {
                severity_override,
                recommendations_override,
                notes,
            } => {
                self.review(
                    record,
                    *severity_override,
                    recommendations_override.as_deref(),
                    notes.as_deref(),
                    actor,
                    now,
                )?;
                Ok(None)
            }
            TransitionCommand::Reject { notes } => {
                record.verified_by = Some(actor.id.clone());
                if let Some(notes) = notes {
                    record.doctor_notes = Some(notes.clone());
                }
                let message = notes.clone().unwrap_or_else(|| {
                    format!(
                        "Your diagnosis has been reviewed by {}. Please consult a healthcare provider for further evaluation.",
                        actor.id
                    )
                });
                notify(record, NotificationKind::Rejected, message, actor, now);
                Ok(None)
            }
            TransitionCommand::Prescribe { prescription } => {
                let prescription = prescription
                    .clone()
                    .unwrap_or_else(|| default_prescription(record.disease));
                validate_prescription(&prescription)?;
                let drugs: Vec<&str> = prescription.items.iter().map(|i| i.drug.as_str()).collect();
                let message = format!("A prescription has been issued: {}", drugs.join(", "));
                record.prescription = Some(prescription);
                notify(record, NotificationKind::Prescribed, message, actor, now);
                Ok(None)
            }
            TransitionCommand::Dispense => {
                let items = record
                    .prescription
                    .as_ref()
                    .map(|p| p.items.clone())
                    .ok_or_else(|| {
                        TriageError::validation(format!("Record {} has no prescription", record.id))
                    })?;
                let low = self.inventory.dispense(&items)?;
                for item in &low {
                    log_warning(
                        &format!("Low stock after dispensing, {} {} left", item.quantity, item.unit),
                        Some(&item.drug_name),
                    );
                }
                notify(
                    record,
                    NotificationKind::Dispensed,
                    "Your medication has been dispensed".to_string(),
                    actor,
                    now,
                );
                Ok(Some(items))
            }
        }
    }

    fn review(
        &self,
        record: &mut DiagnosisRecord,
        severity_override: Option<SeverityTier>,
        recommendations_override: Option<&[String]>,
        notes: Option<&str>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut corrected = false;

        if let Some(tier) = severity_override {
            if tier != record.severity {
                record.severity = tier;
                corrected = true;
                if recommendations_override.is_none() {
                    let signals = evaluate_labs(&record.labs, &self.config.lab_thresholds);
                    record.recommendations = compose_recommendations(tier, record.disease, &signals);
                }
            }
        }

        if let Some(texts) = recommendations_override {
            if texts.is_empty() {
                return Err(TriageError::validation("Recommendation override is empty"));
            }
            if let Some(position) = texts.iter().position(|t| t.trim().is_empty()) {
                return Err(TriageError::validation(format!(
                    "Recommendation override entry {position} is blank"
                )));
            }
            let mut list = RecommendationList::new();
            list.extend_block(RecommendationOrigin::Reviewer, texts.iter().cloned());
            record.recommendations = list;
            corrected = true;
        }

        if let Some(notes) = notes {
            record.doctor_notes = Some(notes.to_string());
        }
        record.verified_by = Some(actor.id.clone());

        if record.severity == SeverityTier::Critical {
            let scheduled_at = TimeDelta::try_hours(self.config.follow_up_hours)
                .and_then(|delay| now.checked_add_signed(delay))
                .ok_or_else(|| {
                    TriageError::ConfigError(format!(
                        "follow_up_hours {} is out of range",
                        self.config.follow_up_hours
                    ))
                })?;
            record.follow_up = Some(FollowUp {
                scheduled_at,
                notes: format!("Automated follow-up for critical {} case", record.disease),
            });
        }

        let (kind, default_message) = if corrected {
            (
                NotificationKind::Corrected,
                format!(
                    "{} has reviewed and updated your diagnosis. Please review the updated information.",
                    actor.id
                ),
            )
        } else {
            (
                NotificationKind::Approved,
                format!("Your diagnosis has been approved by {}.", actor.id),
            )
        };
        let message = notes.map_or(default_message, str::to_string);
        notify(record, kind, message, actor, now);
        Ok(())
    }
}

impl std::fmt::Debug for DiagnosisLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisLifecycleManager")
            .field("inventory", &self.inventory)
            .field("has_sessions", &self.sessions.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
