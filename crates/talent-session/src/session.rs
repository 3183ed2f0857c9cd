//! Session snapshot.

use talent_models::{Credential, Profile, UserType};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No credential held
    #[default]
    Unauthenticated,
    /// A stored credential is being checked against the backend
    Restoring,
    /// Credential and profile are both present
    Authenticated,
    /// Restore failed; no credential held
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Unauthenticated => "unauthenticated",
            SessionStatus::Restoring => "restoring",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Error => "error",
        }
    }
}

/// Client-local view of the current user's authentication state.
///
/// `status == Authenticated` implies both `credential` and `profile` are
/// present. While `loading` is set, `profile` and `error` may be stale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub profile: Option<Profile>,
    pub credential: Option<Credential>,
    pub status: SessionStatus,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Session for a process that found `credential` in storage at start-up.
    pub fn restoring(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            status: SessionStatus::Restoring,
            loading: true,
            ..Self::default()
        }
    }

    pub fn authenticated(profile: Profile, credential: Credential) -> Self {
        Self {
            profile: Some(profile),
            credential: Some(credential),
            status: SessionStatus::Authenticated,
            loading: false,
            error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Role of the signed-in user.
    pub fn user_type(&self) -> Option<UserType> {
        if !self.is_authenticated() {
            return None;
        }
        self.profile.as_ref().map(|p| p.user_type)
    }

    pub fn is_business(&self) -> bool {
        self.user_type() == Some(UserType::Business)
    }

    /// Drop credential and profile, leaving `status` as given.
    pub(crate) fn signed_out(status: SessionStatus, error: Option<String>) -> Self {
        Self {
            profile: None,
            credential: None,
            status,
            loading: false,
            error,
        }
    }
}
