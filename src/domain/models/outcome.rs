use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{error::ValidationError, models::identity::IdentityId};

pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    DriverApplicationForm,
    DriverLogin,
}

impl NavigationTarget {
    pub fn path(&self) -> &'static str {
        match self {
            Self::DriverApplicationForm => "/driver/application",
            Self::DriverLogin => "/driver/login",
        }
    }
}

/// Why a profile insert was refused, derived from the store's error text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertFailureKind {
    /// The identity exists but the profile row could not be linked to it yet.
    LinkTimingFailure,
    SchemaMismatch,
    AccessDenied,
    GenericInsertFailure,
}

/// How the pre-insert read of the drivers collection failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableCause {
    /// The store answered with an error.
    Refused,
    /// The request never got an answer.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Success {
        navigate_to: NavigationTarget,
        identity_id: IdentityId,
    },
    ValidationFailure(ValidationError),
    IdentityFailure {
        message: String,
    },
    StoreUnreachable {
        cause: UnreachableCause,
        message: String,
    },
    ProfileInsertFailure {
        kind: InsertFailureKind,
        message: String,
    },
    UnexpectedFailure,
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Stable machine-readable name of the outcome.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::ValidationFailure(_) => "validation_failure",
            Self::IdentityFailure { .. } => "identity_failure",
            Self::StoreUnreachable { .. } => "store_unreachable",
            Self::ProfileInsertFailure { kind, .. } => match kind {
                InsertFailureKind::LinkTimingFailure => "link_timing_failure",
                InsertFailureKind::SchemaMismatch => "schema_mismatch",
                InsertFailureKind::AccessDenied => "access_denied",
                InsertFailureKind::GenericInsertFailure => "generic_insert_failure",
            },
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }

    /// Text shown to the user, `None` on success.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            Self::Success { .. } => return None,
            Self::ValidationFailure(reason) => reason.to_string(),
            Self::IdentityFailure { message } => message.clone(),
            Self::StoreUnreachable {
                cause: UnreachableCause::Refused,
                message,
            } => format!("Database access issue: {}", message),
            Self::StoreUnreachable {
                cause: UnreachableCause::Transport,
                ..
            } => "Cannot access drivers table. Please check database setup.".to_string(),
            Self::ProfileInsertFailure { kind, message } => match kind {
                InsertFailureKind::LinkTimingFailure => "User creation timing issue. Please try logging in instead - your account may have been created.".to_string(),
                InsertFailureKind::SchemaMismatch => {
                    "Database structure issue. Please run the drivers schema rebuild script."
                        .to_string()
                }
                InsertFailureKind::AccessDenied => {
                    "Database permission issue. Check Row Level Security policies.".to_string()
                }
                InsertFailureKind::GenericInsertFailure => {
                    let raw = if message.is_empty() {
                        "Unknown error"
                    } else {
                        message.as_str()
                    };
                    format!("Failed to create driver profile: {}", raw)
                }
            },
            Self::UnexpectedFailure => UNEXPECTED_FAILURE_MESSAGE.to_string(),
        };
        Some(message)
    }

    pub(crate) fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::ValidationFailure(_) => Some(FailureKind::Validation),
            Self::IdentityFailure { .. } => Some(FailureKind::Identity),
            Self::StoreUnreachable { .. } => Some(FailureKind::StoreUnreachable),
            Self::ProfileInsertFailure { kind, .. } => Some(FailureKind::ProfileInsert(*kind)),
            Self::UnexpectedFailure => Some(FailureKind::Unexpected),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Identity,
    StoreUnreachable,
    ProfileInsert(InsertFailureKind),
    Unexpected,
}

/// Steps of a single registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase {
    Idle,
    Validating,
    CreatingIdentity,
    Settling,
    ProbingStore,
    InsertingProfile,
    Succeeded,
    Failed(FailureKind),
}

impl RegistrationPhase {
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

impl std::fmt::Display for RegistrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::CreatingIdentity => f.write_str("creating identity"),
            Self::Settling => f.write_str("settling"),
            Self::ProbingStore => f.write_str("probing store"),
            Self::InsertingProfile => f.write_str("inserting profile"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(kind) => write!(f, "failed ({:?})", kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledNavigation {
    pub target: NavigationTarget,
    pub delay: Duration,
}

/// Everything one call to `submit` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub outcome: RegistrationOutcome,
    pub phases: Vec<RegistrationPhase>,
    pub scheduled_navigation: Option<ScheduledNavigation>,
}

impl RegistrationReport {
    pub fn message(&self) -> Option<String> {
        self.outcome.user_message()
    }

    pub fn final_phase(&self) -> RegistrationPhase {
        self.phases.last().copied().unwrap_or(RegistrationPhase::Idle)
    }
}
