use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::IdentityError,
    models::identity::{ActorRole, IdentityId, SessionToken},
    services::token_service::SessionIssuer,
};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,  // Subject (identity ID)
    role: String, // Actor role
    exp: i64,     // Expiration time
    iat: i64,     // Issued at
}

#[derive(Clone)]
pub struct JwtSessionIssuer {
    secret: String,
    expiration_hours: i64,
}

impl JwtSessionIssuer {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 24, // 24h
        }
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, identity_id: &IdentityId) -> Result<SessionToken, IdentityError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: identity_id.to_string(),
            role: ActorRole::Driver.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map(SessionToken::new)
        .map_err(|e| IdentityError::Unavailable(format!("Failed to issue session: {}", e)))
    }

    fn verify(&self, session: &SessionToken) -> Result<IdentityId, IdentityError> {
        let data = decode::<Claims>(
            session.as_str(),
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| IdentityError::rejected(format!("Invalid session: {}", e)))?;

        IdentityId::parse(&data.claims.sub)
            .map_err(|e| IdentityError::rejected(format!("Invalid session: {}", e)))
    }
}
