//! Session management
//!
//! Owns the sign-in/sign-out state machine and exposes the current
//! authenticated identity:
//! - `{Unauthenticated, Authenticated(identity)}`, starting
//!   `Unauthenticated` until the provider's first state report
//! - one event per transition, no self-transitions
//! - exactly one initial-state report per event stream
//!
//! Auth-state callbacks from the provider become a typed event stream
//! with an explicit handle instead of ambient global callbacks.

use crate::error::AuthError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// An authenticated identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned unique id; keys the user's store namespace
    pub uid: String,
    /// Display name, when the provider has one
    pub display_name: Option<String>,
    /// Email, when the provider has one
    pub email: Option<String>,
}

impl Identity {
    /// Identity with only a uid
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }
}

/// Client-side session state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No authenticated identity
    #[default]
    Unauthenticated,
    /// Signed in as the carried identity
    Authenticated(Identity),
}

impl Session {
    /// The identity, when authenticated
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Unauthenticated => None,
        }
    }

    /// Whether a session is active
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Provider-reported auth state: `Some` identity or signed out
pub type AuthState = Option<Identity>;

/// The identity-provider collaborator
///
/// `sign_in`/`sign_out` results surface through the auth-state stream,
/// not through return values; the `Result` here reports only immediate
/// provider rejection.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Initiate authentication (interactive or anonymous per provider
    /// policy)
    ///
    /// # Errors
    /// `AuthError::SignIn` when the provider rejects the attempt.
    async fn sign_in(&self) -> Result<(), AuthError>;

    /// Clear the provider-side session
    ///
    /// # Errors
    /// `AuthError::SignOut` when the provider rejects the attempt.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Current identity, if any
    fn current_identity(&self) -> AuthState;

    /// Auth-state change stream
    ///
    /// One element per provider-side transition, including out-of-band
    /// session expiry.
    fn auth_state(&self) -> broadcast::Receiver<AuthState>;
}

/// Session transition events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session became active
    SignedIn(Identity),
    /// The session ended (explicit sign-out or provider-side expiry)
    SignedOut,
    /// The provider rejected a sign-in/out attempt; state is unchanged
    AuthFailed(AuthError),
}

/// Owns session state and fans out transition events
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<RwLock<Session>>,
    events: broadcast::Sender<SessionEvent>,
    listener: tokio::task::JoinHandle<()>,
}

impl SessionManager {
    /// Attach to a provider and start tracking its auth state
    ///
    /// The provider's current identity seeds the state; subsequent
    /// provider transitions update it and emit events.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let state = Arc::new(RwLock::new(match provider.current_identity() {
            Some(identity) => Session::Authenticated(identity),
            None => Session::Unauthenticated,
        }));
        let (events, _) = broadcast::channel(64);

        let mut rx = provider.auth_state();
        let listener = tokio::spawn({
            let state = Arc::clone(&state);
            let events = events.clone();
            async move {
                loop {
                    match rx.recv().await {
                        Ok(auth) => apply_auth_state(&state, &events, auth),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(missed, "auth-state stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        Self {
            provider,
            state,
            events,
            listener,
        }
    }

    /// Initiate authentication
    ///
    /// No return value: success arrives as `SessionEvent::SignedIn`,
    /// rejection as `SessionEvent::AuthFailed`.
    pub async fn sign_in(&self) {
        if let Err(err) = self.provider.sign_in().await {
            tracing::warn!(%err, "sign-in rejected by provider");
            let _ = self.events.send(SessionEvent::AuthFailed(err));
        }
    }

    /// Clear the session; same async-notify pattern as [`Self::sign_in`]
    pub async fn sign_out(&self) {
        if let Err(err) = self.provider.sign_out().await {
            tracing::warn!(%err, "sign-out rejected by provider");
            let _ = self.events.send(SessionEvent::AuthFailed(err));
        }
    }

    /// Snapshot of the current session
    #[must_use]
    pub fn current(&self) -> Session {
        self.state.read().clone()
    }

    /// New event stream handle
    ///
    /// Reports the current state exactly once up front, then one event
    /// per transition. Consecutive duplicate state reports (the initial
    /// report racing its own transition) are collapsed.
    #[must_use]
    pub fn events(&self) -> SessionEvents {
        // Subscribe before snapshotting so no transition can fall in
        // between; the dedup in SessionEvents absorbs the overlap case.
        let rx = self.events.subscribe();
        let initial = match self.current() {
            Session::Authenticated(identity) => SessionEvent::SignedIn(identity),
            Session::Unauthenticated => SessionEvent::SignedOut,
        };
        SessionEvents {
            pending: Some(initial),
            last_state: None,
            rx,
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

fn apply_auth_state(
    state: &RwLock<Session>,
    events: &broadcast::Sender<SessionEvent>,
    auth: AuthState,
) {
    let next = match auth {
        Some(identity) => Session::Authenticated(identity),
        None => Session::Unauthenticated,
    };
    {
        let mut guard = state.write();
        if *guard == next {
            // No self-transitions.
            return;
        }
        *guard = next.clone();
    }
    let event = match next {
        Session::Authenticated(identity) => {
            tracing::info!(uid = %identity.uid, "session established");
            SessionEvent::SignedIn(identity)
        }
        Session::Unauthenticated => {
            tracing::info!("session ended");
            SessionEvent::SignedOut
        }
    };
    let _ = events.send(event);
}

/// Handle on the session event stream
pub struct SessionEvents {
    pending: Option<SessionEvent>,
    last_state: Option<SessionEvent>,
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionEvents {
    /// Next event, or `None` once the manager is gone
    ///
    /// `AuthFailed` passes through verbatim; state events that repeat
    /// the previous state report are skipped.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            let event = match self.pending.take() {
                Some(event) => event,
                None => match self.rx.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "session event stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            };
            if matches!(event, SessionEvent::AuthFailed(_)) {
                return Some(event);
            }
            if self.last_state.as_ref() == Some(&event) {
                continue;
            }
            self.last_state = Some(event.clone());
            return Some(event);
        }
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents").finish_non_exhaustive()
    }
}
