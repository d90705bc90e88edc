//! Error handling for the triage engine.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation problems
//! are rejected before classification, lifecycle problems leave the record
//! untouched, and provider problems are recovered by the hospital finder.

pub mod util;

use std::io;

use crate::models::diagnosis::{LifecycleState, Role};

/// Errors that can occur while triaging a case or moving a diagnosis through its lifecycle
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// Malformed lab value, unknown symptom identifier or unknown disease code
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The actor's role or the record's current state does not permit the move
    #[error("Invalid transition: role {role} cannot move diagnosis from {from} to {to}")]
    InvalidTransition {
        /// State the record was in
        from: LifecycleState,
        /// State that was requested
        to: LifecycleState,
        /// Role of the actor attempting the move
        role: Role,
    },

    /// Geolocation provider failed or timed out
    #[error("Geolocation provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No diagnosis record with this identifier
    #[error("Diagnosis record {0} not found")]
    RecordNotFound(u64),

    /// Dispensing would take stock below zero
    #[error("Insufficient inventory for {drug}: requested {requested}, available {available}")]
    InsufficientInventory {
        /// Drug name as prescribed
        drug: String,
        /// Quantity requested by the prescription
        requested: u32,
        /// Quantity currently in stock
        available: u32,
    },

    /// The record kept changing underneath a transition attempt
    #[error("Diagnosis record {0} was modified concurrently")]
    ConcurrentModification(u64),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TriageError {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Whether the caller may retry or correct the request and try again
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::IoError(_) | Self::ConfigError(_))
    }
}

/// Result type for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;
