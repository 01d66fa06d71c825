//! Process-wide authentication state.
//!
//! A successful login stores the token together with the viewer it belongs
//! to; logout clears both. The context is cloned into whatever needs it
//! (the API gateway attaches the token, order sessions read the role).

use crate::errors::AuthError;
use crate::types::user_role::UserRole;
use std::sync::{Arc, RwLock};

/// The logged-in user as returned by the `me` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: u64,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    viewer: Viewer,
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful login. Replaces any previous credentials.
    pub fn login(&self, token: impl Into<String>, viewer: Viewer) -> Result<(), AuthError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Credentials { token, viewer });
        Ok(())
    }

    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.read(|c| c.is_some())
    }

    pub fn token(&self) -> Result<String, AuthError> {
        self.read(|c| c.map(|c| c.token.clone()))
            .ok_or(AuthError::NotLoggedIn)
    }

    pub fn viewer(&self) -> Result<Viewer, AuthError> {
        self.read(|c| c.map(|c| c.viewer.clone()))
            .ok_or(AuthError::NotLoggedIn)
    }

    fn read<T>(&self, f: impl FnOnce(Option<&Credentials>) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
        f(guard.as_ref())
    }
}
