//! Session resolution
//!
//! Tokens are issued and verified elsewhere; the engine only asks which actor
//! a token belongs to and trusts the answer.

use rustc_hash::FxHashMap;

use crate::models::diagnosis::Actor;

/// Maps an opaque session token to an actor
pub trait SessionResolver: Send + Sync {
    /// Actor for the token, or `None` if the token is unknown
    fn resolve(&self, token: &str) -> Option<Actor>;
}

/// Fixed token table
#[derive(Debug, Clone, Default)]
pub struct StaticSessionResolver {
    sessions: FxHashMap<String, Actor>,
}

impl StaticSessionResolver {
    /// Create an empty resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token
    #[must_use]
    pub fn with_session(mut self, token: impl Into<String>, actor: Actor) -> Self {
        self.sessions.insert(token.into(), actor);
        self
    }
}

impl SessionResolver for StaticSessionResolver {
    fn resolve(&self, token: &str) -> Option<Actor> {
        self.sessions.get(token).cloned()
    }
}
