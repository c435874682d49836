use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(Uuid);

impl IdentityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| DomainError::InvalidIdentityId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Driver,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
        }
    }
}

/// Metadata attached to an identity when it is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub full_name: String,
    pub role: ActorRole,
}

/// Request to create an identity
#[derive(Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub metadata: IdentityMetadata,
}

impl std::fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewIdentity")
            .field("email", &self.email)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Value object representing a hashed password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session credential handed out with a freshly created identity
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// What the identity service hands back on a successful signup.
/// Either part may be missing; callers decide what that means.
#[derive(Debug, Clone, Default)]
pub struct IdentityReceipt {
    pub identity_id: Option<IdentityId>,
    pub session: Option<SessionToken>,
}

impl IdentityReceipt {
    pub fn new(identity_id: IdentityId, session: SessionToken) -> Self {
        Self {
            identity_id: Some(identity_id),
            session: Some(session),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
