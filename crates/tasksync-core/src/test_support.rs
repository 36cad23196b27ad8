//! Scripted identity provider for unit tests

use crate::error::AuthError;
use crate::session::{AuthState, Identity, IdentityProvider};
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// Provider whose transitions are driven by the test
pub(crate) struct ScriptedProvider {
    grants: Mutex<Identity>,
    current: Mutex<AuthState>,
    fail_sign_in: Mutex<Option<AuthError>>,
    tx: broadcast::Sender<AuthState>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            grants: Mutex::new(Identity::new("anon")),
            current: Mutex::new(None),
            fail_sign_in: Mutex::new(None),
            tx,
        }
    }

    /// Identity granted on the next successful sign-in
    pub(crate) fn with_identity(self, identity: Identity) -> Self {
        *self.grants.lock() = identity;
        self
    }

    /// Start with the granted identity already signed in
    pub(crate) fn signed_in(self) -> Self {
        let identity = self.grants.lock().clone();
        *self.current.lock() = Some(identity);
        self
    }

    /// Reject sign-in attempts with `err`
    pub(crate) fn failing_sign_in(self, err: AuthError) -> Self {
        *self.fail_sign_in.lock() = Some(err);
        self
    }

    /// Push an auth-state report, as the provider would out-of-band
    pub(crate) fn emit(&self, auth: AuthState) {
        *self.current.lock() = auth.clone();
        let _ = self.tx.send(auth);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn sign_in(&self) -> Result<(), AuthError> {
        if let Some(err) = self.fail_sign_in.lock().clone() {
            return Err(err);
        }
        let identity = self.grants.lock().clone();
        self.emit(Some(identity));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(None);
        Ok(())
    }

    fn current_identity(&self) -> AuthState {
        self.current.lock().clone()
    }

    fn auth_state(&self) -> broadcast::Receiver<AuthState> {
        self.tx.subscribe()
    }
}
