use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Minimum password length, counted in UTF-16 code units as browser forms do.
/// Characters outside the Basic Multilingual Plane (most emoji) count as two.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Form data submitted by a prospective driver
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub full_name: String,
    pub phone_number: String,
}

impl RegistrationInput {
    /// Pure pre-flight check. Confirmation mismatch is reported before length.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }

        if self.password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(())
    }
}

// keep passwords out of logs and panic messages
impl std::fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}
