use async_trait::async_trait;

use crate::domain::{
    error::IdentityError,
    models::identity::{IdentityId, IdentityReceipt, NewIdentity, SessionToken},
};

/// Issues authenticated identities from credentials
#[async_trait]
pub trait IdentityService {
    async fn create_identity(&self, request: &NewIdentity) -> Result<IdentityReceipt, IdentityError>;

    /// Resolve the identity a session belongs to. `Ok(None)` means the
    /// identity is not visible yet.
    async fn confirm_identity(
        &self,
        session: &SessionToken,
    ) -> Result<Option<IdentityId>, IdentityError>;
}
