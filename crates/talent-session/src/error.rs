//! Session and storage error types.

use thiserror::Error;

/// Result type for credential storage.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for session transitions.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from the persisted credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// User-facing outcome of a failed session transition.
///
/// The `Display` text is the fixed notification shown to the user; the
/// underlying cause is logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("Error fetching user profile. Please try again.")]
    ProfileUnavailable,

    #[error("Registration failed. Please try again.")]
    RegistrationFailed,

    /// A logout or a newer login started while this operation was in flight.
    #[error("Sign-in was interrupted. Please try again.")]
    Superseded,

    #[error("Could not access saved credentials.")]
    Storage,
}

impl SessionError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
