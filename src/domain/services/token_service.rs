use crate::domain::{
    error::IdentityError,
    models::identity::{IdentityId, SessionToken},
};

/// Issues and reads back session tokens bound to an identity
pub trait SessionIssuer: Clone + Send + Sync {
    fn issue(&self, identity_id: &IdentityId) -> Result<SessionToken, IdentityError>;

    fn verify(&self, session: &SessionToken) -> Result<IdentityId, IdentityError>;
}
