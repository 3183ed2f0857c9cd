//! Session store: the single owner of the authentication state machine.
//!
//! States: `Unauthenticated`, `Restoring`, `Authenticated`, `Error`.
//!
//! Every auth operation takes a ticket from a monotonically increasing epoch;
//! logout advances it too. Persisting a credential or publishing a new session
//! only happens while the ticket is still current, checked under the same lock
//! that guards storage writes. An operation overtaken by a logout or by a newer
//! login therefore never writes its credential back, and storage is empty
//! after a logout even with a login in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use talent_client::ApiClient;
use talent_models::{LoginRequest, Profile, RegisterRequest};

use crate::credentials::CredentialStore;
use crate::error::{SessionError, SessionResult};
use crate::session::{Session, SessionStatus};

/// Owns the process-wide [`Session`] and the persisted credential.
pub struct SessionStore {
    api: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<Session>,
    epoch: AtomicU64,
    commit_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("api", &self.api)
            .field("session", &*self.state.borrow())
            .finish()
    }
}

impl SessionStore {
    /// Create the store. Starts `Restoring` if a credential is persisted,
    /// `Unauthenticated` otherwise; call [`SessionStore::restore`] to settle.
    pub fn new(api: ApiClient, credentials: Arc<dyn CredentialStore>) -> Self {
        let initial = match credentials.load() {
            Ok(Some(credential)) => Session::restoring(credential),
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(error = %e, "Could not read saved credential, starting signed out");
                Session::default()
            }
        };
        debug!(status = initial.status.as_str(), "Session store created");

        let (state, _) = watch::channel(initial);
        Self {
            api: api.anonymous(),
            credentials,
            state,
            epoch: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// API client bound to the session's credential, or anonymous without one.
    pub fn client(&self) -> ApiClient {
        match &self.state.borrow().credential {
            Some(credential) => self.api.with_credential(credential.clone()),
            None => self.api.anonymous(),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Validate the persisted credential by fetching the profile.
    ///
    /// Returns `Ok(None)` when nothing is stored. Any fetch failure is treated
    /// as an expired credential: storage is cleared and the session ends in
    /// `Error`.
    pub async fn restore(&self) -> SessionResult<Option<Profile>> {
        let ticket = self.begin();

        let stored = match self.credentials.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Could not read saved credential, discarding it");
                self.commit(ticket, || self.clear_credential());
                None
            }
        };

        let Some(credential) = stored else {
            self.commit(ticket, || {
                self.state.send_modify(|s| {
                    if s.status == SessionStatus::Restoring {
                        *s = Session::default();
                    }
                    s.loading = false;
                })
            });
            return Ok(None);
        };

        self.commit(ticket, || {
            self.state.send_replace(Session::restoring(credential.clone()));
        })
        .ok_or(SessionError::Superseded)?;

        match self.api.with_credential(credential.clone()).get_profile().await {
            Ok(profile) => {
                self.commit(ticket, || {
                    self.state
                        .send_replace(Session::authenticated(profile.clone(), credential));
                })
                .ok_or(SessionError::Superseded)?;

                info!(email = %profile.email, user_type = %profile.user_type, "Session restored");
                Ok(Some(profile))
            }
            Err(e) => {
                warn!(error = %e, "Stored credential rejected, clearing session");
                self.commit(ticket, || {
                    self.clear_credential();
                    self.state.send_replace(Session::signed_out(
                        SessionStatus::Error,
                        Some(SessionError::SessionExpired.message()),
                    ));
                })
                .ok_or(SessionError::Superseded)?;

                Err(SessionError::SessionExpired)
            }
        }
    }

    /// Exchange credentials for a token, persist it, then load the profile.
    ///
    /// A successful token exchange followed by a failed profile fetch leaves
    /// the session unauthenticated with storage cleared.
    pub async fn login(&self, request: &LoginRequest) -> SessionResult<Profile> {
        let ticket = self.begin();
        self.start_loading();
        self.sign_in(ticket, request, |e| e).await
    }

    /// Create an account, then log in with the same username and password.
    ///
    /// The registration response carries no session data; the follow-up login
    /// is what yields the credential. Any failure surfaces as
    /// [`SessionError::RegistrationFailed`].
    pub async fn register(&self, request: &RegisterRequest) -> SessionResult<Profile> {
        let ticket = self.begin();
        self.start_loading();

        if let Err(e) = self.api.register(request).await {
            warn!(error = %e, email = %request.email, "Registration rejected");
            return self.fail(ticket, SessionError::RegistrationFailed);
        }
        info!(email = %request.email, "Registered, signing in");

        self.sign_in(ticket, &request.login_request(), |e| match e {
            SessionError::Superseded => SessionError::Superseded,
            _ => SessionError::RegistrationFailed,
        })
        .await
    }

    /// Clear the persisted credential and reset the session. No backend call.
    pub fn logout(&self) {
        let _guard = self.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.clear_credential();
        self.state.send_replace(Session::default());
        info!("Signed out");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn sign_in(
        &self,
        ticket: u64,
        request: &LoginRequest,
        map_error: impl Fn(SessionError) -> SessionError,
    ) -> SessionResult<Profile> {
        let token = match self.api.login(request).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, username = %request.username, "Login failed");
                return self.fail(ticket, map_error(SessionError::InvalidCredentials));
            }
        };
        let credential = token.credential();

        match self.commit(ticket, || self.credentials.save(&credential)) {
            None => return Err(SessionError::Superseded),
            Some(Err(e)) => {
                warn!(error = %e, "Could not persist credential");
                return self.fail(ticket, map_error(SessionError::Storage));
            }
            Some(Ok(())) => {}
        }

        match self.api.with_credential(credential.clone()).get_profile().await {
            Ok(profile) => {
                self.commit(ticket, || {
                    self.state
                        .send_replace(Session::authenticated(profile.clone(), credential));
                })
                .ok_or(SessionError::Superseded)?;

                info!(email = %profile.email, user_type = %profile.user_type, "Signed in");
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed after login, discarding credential");
                let error = map_error(SessionError::ProfileUnavailable);
                self.commit(ticket, || {
                    self.clear_credential();
                    self.state.send_replace(Session::signed_out(
                        SessionStatus::Unauthenticated,
                        Some(error.message()),
                    ));
                })
                .ok_or(SessionError::Superseded)?;

                Err(error)
            }
        }
    }

    /// Record `error` on the session, keeping the current credential/profile.
    fn fail<T>(&self, ticket: u64, error: SessionError) -> SessionResult<T> {
        let message = error.message();
        self.commit(ticket, || {
            self.state.send_modify(|s| {
                // An overtaken restore leaves nothing trustworthy behind.
                if s.status == SessionStatus::Restoring {
                    *s = Session::default();
                }
                s.loading = false;
                s.error = Some(message);
            })
        })
        .ok_or(SessionError::Superseded)?;

        Err(error)
    }

    fn start_loading(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn begin(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `f` under the commit lock if `ticket` is still the latest.
    fn commit<T>(&self, ticket: u64, f: impl FnOnce() -> T) -> Option<T> {
        let _guard = self.lock();
        if self.epoch.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Auth operation superseded, dropping result");
            return None;
        }
        Some(f())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.commit_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_credential(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Could not clear saved credential");
        }
    }
}
