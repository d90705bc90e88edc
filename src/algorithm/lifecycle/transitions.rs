//! Role-gated transition table
//!
//! Every permitted move is one row of [`TRANSITIONS`]. Anything not listed is
//! an invalid transition, including every move out of a terminal state.

use crate::models::diagnosis::{LifecycleState, Role};

use LifecycleState::{Created, Dispensed, Prescribed, Rejected, Reviewed};

/// `(from, role, to)` rows
pub const TRANSITIONS: &[(LifecycleState, Role, LifecycleState)] = &[
    (Created, Role::Doctor, Reviewed),
    (Created, Role::Doctor, Rejected),
    (Reviewed, Role::Doctor, Rejected),
    (Reviewed, Role::Doctor, Prescribed),
    (Prescribed, Role::Chemist, Dispensed),
];

/// Role allowed to create records
pub const CREATOR_ROLE: Role = Role::Clinician;

/// Whether `role` may move a record from `from` to `to`
#[must_use]
pub fn is_allowed(from: LifecycleState, role: Role, to: LifecycleState) -> bool {
    TRANSITIONS
        .iter()
        .any(|&(f, r, t)| f == from && r == role && t == to)
}

/// States `role` may move a record to from `from`
#[must_use]
pub fn allowed_targets(from: LifecycleState, role: Role) -> Vec<LifecycleState> {
    TRANSITIONS
        .iter()
        .filter(|&&(f, r, _)| f == from && r == role)
        .map(|&(_, _, t)| t)
        .collect()
}
