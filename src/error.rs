// src/error.rs
//! Client error taxonomy. Every variant is recoverable: callers surface it
//! as an alert and let the user retry.

use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client-side precondition failures, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter a job title")]
    EmptyTitle,

    #[error("File too large. Maximum size: 10MB")]
    FileTooLarge { size_bytes: u64 },
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingFields | ValidationError::MissingCredentials => {
                "Missing Fields"
            }
            ValidationError::InvalidEmail => "Invalid Email",
            ValidationError::WeakPassword => "Weak Password",
            ValidationError::PasswordMismatch => "Password Mismatch",
            ValidationError::EmptyTitle => "Missing Information",
            ValidationError::FileTooLarge { .. } => "Error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Auth(String),

    /// The identity provider rejected the credentials.
    #[error("{0}")]
    LoginFailed(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Delete(String),

    #[error("{0}")]
    Search(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("This email is already registered. Please sign in instead.")]
    AccountExists,

    #[error("{0}")]
    Registration(String),

    #[error("Local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn not_signed_in() -> Self {
        ClientError::Auth("No authentication token. Please login.".to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
