//! Authentication session shared by the API client and the views

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shared::models::UserProfile;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
    requires_login: bool,
}

/// Bearer token and signed-in user.
///
/// Cloning shares the same session. A 401 from the backend clears it and
/// flags it so the front end can send the user back to the login screen.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    state: Arc<RwLock<SessionState>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn requires_login(&self) -> bool {
        self.read().requires_login
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut state = self.write();
        state.token = Some(token.into());
        state.requires_login = false;
    }

    /// Store the result of a successful login
    pub fn sign_in(&self, token: impl Into<String>, user: UserProfile) {
        let mut state = self.write();
        state.token = Some(token.into());
        state.user = Some(user);
        state.requires_login = false;
    }

    pub fn set_user(&self, user: UserProfile) {
        self.write().user = Some(user);
    }

    /// Forget the token and user (explicit logout)
    pub fn clear(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    /// Forget the token and user because the backend rejected them
    pub fn expire(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
        state.requires_login = true;
    }
}
