//! Identifier wrappers shared across the integration.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque export session token.
///
/// Generated once per host-initiated export and carried through every
/// subsequent hook call tied to that export. Tokens must stay unique for
/// the lifetime of the host process; a UUIDv4 makes collisions negligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(format!("fb_{}", Uuid::new_v4().simple()))
    }

    /// Wrap a token received from the host. The host may hand back tokens
    /// this process never issued (leftovers from a previous engine
    /// instance); dispatch treats those as no-ops, so no validation here.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the farm assigns to an accepted job.
///
/// Opaque to the engine; only ever echoed back verbatim as a dependency
/// argument when chaining submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
