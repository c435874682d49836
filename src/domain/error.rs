use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("A registration for this email is already in progress")]
    SubmissionInProgress,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid identity id: {0}")]
    InvalidIdentityId(String),
}

/// Local input validation failures. The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identity service answered and refused the request.
    #[error("{message}")]
    Rejected { message: String },

    /// The identity service could not be reached or answered garbage.
    #[error("Identity service unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Error payload reported by the record store for a failed request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFailure {
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
    pub code: Option<String>,
    pub status_code: Option<u16>,
}

impl StoreFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[cfg(test)]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{}", .0.message)]
    Rejected(StoreFailure),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(StoreFailure::new(message))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Rejected(failure) => &failure.message,
            Self::Unavailable(message) => message,
        }
    }
}

impl From<StoreFailure> for StoreError {
    fn from(failure: StoreFailure) -> Self {
        Self::Rejected(failure)
    }
}
