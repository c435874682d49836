use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
};

use crate::domain::{
    error::IdentityError,
    models::identity::{IdentityId, IdentityReceipt, NewIdentity, SessionToken},
    services::{
        identity_service::IdentityService, password_service::PasswordHasher,
        token_service::SessionIssuer,
    },
};
use crate::infrastructure::entity::identities;

const ALREADY_REGISTERED: &str = "User already registered";
const INVALID_EMAIL: &str = "Unable to validate email address: invalid format";

/// Identity service backed by the `identities` table
#[derive(Clone)]
pub struct PostgresIdentityService<P: PasswordHasher, S: SessionIssuer> {
    db: DatabaseConnection,
    password_hasher: P,
    session_issuer: S,
}

impl<P: PasswordHasher, S: SessionIssuer> PostgresIdentityService<P, S> {
    pub fn new(db: DatabaseConnection, password_hasher: P, session_issuer: S) -> Self {
        Self {
            db,
            password_hasher,
            session_issuer,
        }
    }
}

fn unavailable(err: DbErr) -> IdentityError {
    IdentityError::Unavailable(err.to_string())
}

/// Minimal shape check: something on both sides of a single '@'
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[async_trait]
impl<P, S> IdentityService for PostgresIdentityService<P, S>
where
    P: PasswordHasher + Send + Sync,
    S: SessionIssuer,
{
    async fn create_identity(&self, request: &NewIdentity) -> Result<IdentityReceipt, IdentityError> {
        if !looks_like_email(&request.email) {
            return Err(IdentityError::rejected(INVALID_EMAIL));
        }

        let existing = identities::Entity::find()
            .filter(identities::Column::Email.eq(request.email.as_str()))
            .one(&self.db)
            .await
            .map_err(unavailable)?;
        if existing.is_some() {
            return Err(IdentityError::rejected(ALREADY_REGISTERED));
        }

        let password_hash = self.password_hasher.hash(&request.password)?;
        let identity_id = IdentityId::new();

        let model = identities::ActiveModel {
            id: Set(*identity_id.as_uuid()),
            email: Set(request.email.clone()),
            password_hash: Set(password_hash.as_str().to_string()),
            full_name: Set(request.metadata.full_name.clone()),
            actor_role: Set(request.metadata.role.as_str().to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        // a concurrent signup may still win the race on the unique email index
        identities::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    IdentityError::rejected(ALREADY_REGISTERED)
                }
                _ => unavailable(e),
            })?;

        let session = self.session_issuer.issue(&identity_id)?;

        Ok(IdentityReceipt::new(identity_id, session))
    }

    async fn confirm_identity(
        &self,
        session: &SessionToken,
    ) -> Result<Option<IdentityId>, IdentityError> {
        let identity_id = self.session_issuer.verify(session)?;

        let identity = identities::Entity::find_by_id(*identity_id.as_uuid())
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(identity.map(|model| IdentityId::from_uuid(model.id)))
    }
}
