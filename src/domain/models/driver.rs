use serde::{Deserialize, Serialize};

use crate::domain::models::identity::IdentityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Pending,
    Approved,
    Rejected,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Driver profile row linked to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    identity_id: IdentityId,
    full_name: String,
    phone_number: String,
    status: DriverStatus,
}

impl DriverProfile {
    /// New applications always start out pending review.
    pub fn pending(identity_id: IdentityId, full_name: String, phone_number: String) -> Self {
        Self {
            identity_id,
            full_name,
            phone_number,
            status: DriverStatus::Pending,
        }
    }

    pub fn identity_id(&self) -> &IdentityId {
        &self.identity_id
    }
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }
    pub fn status(&self) -> DriverStatus {
        self.status
    }
}
