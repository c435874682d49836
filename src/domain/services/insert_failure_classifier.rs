//! Maps a record store rejection of a driver insert onto an [`InsertFailureKind`].
//!
//! The store only gives us free-form text, so classification is an ordered
//! table of predicates. Rules are evaluated top to bottom and the first match
//! wins; anything unmatched is a generic failure.

use crate::domain::{error::StoreFailure, models::outcome::InsertFailureKind};

/// Name of the constraint linking `drivers.user_id` to the identity
pub const IDENTITY_LINK_CONSTRAINT: &str = "user_id_fkey";

const UNAUTHORIZED: u16 = 401;

pub struct ClassificationRule {
    pub kind: InsertFailureKind,
    pub matches: fn(&StoreFailure) -> bool,
}

pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        kind: InsertFailureKind::LinkTimingFailure,
        matches: is_link_timing,
    },
    ClassificationRule {
        kind: InsertFailureKind::SchemaMismatch,
        matches: is_schema_mismatch,
    },
    ClassificationRule {
        kind: InsertFailureKind::AccessDenied,
        matches: is_access_denied,
    },
];

fn mentions_any(failure: &StoreFailure, needles: &[&str]) -> bool {
    needles.iter().any(|needle| failure.message.contains(needle))
}

fn is_link_timing(failure: &StoreFailure) -> bool {
    mentions_any(failure, &["foreign key constraint", IDENTITY_LINK_CONSTRAINT])
}

fn is_schema_mismatch(failure: &StoreFailure) -> bool {
    mentions_any(failure, &["does not exist", "schema cache", "column"])
}

fn is_access_denied(failure: &StoreFailure) -> bool {
    mentions_any(failure, &["permission", "policy"]) || failure.status_code == Some(UNAUTHORIZED)
}

pub fn classify(failure: &StoreFailure) -> InsertFailureKind {
    RULES
        .iter()
        .find(|rule| (rule.matches)(failure))
        .map(|rule| rule.kind)
        .unwrap_or(InsertFailureKind::GenericInsertFailure)
}
