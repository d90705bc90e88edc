//! Decision core of the triage engine
//!
//! `triage` holds the pure classification pipeline, `hospital` the referral
//! lookup, `lifecycle` the diagnosis state machine and `analytics` reporting
//! over stored records.

pub mod analytics;
pub mod hospital;
pub mod lifecycle;
pub mod triage;
