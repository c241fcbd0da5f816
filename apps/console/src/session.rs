//! Session/auth gate.
//!
//! `Session` is owned by the console loop and handed to the router and screens by
//! reference. It is resolved once at startup; a failed check means "not logged in".

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::{Credentials, Registration, Role, User};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The startup session check has not answered yet.
    Loading,
    Anonymous,
    Authenticated(User),
}

pub struct Session {
    api: Arc<dyn RecruitingApi>,
    state: SessionState,
}

impl Session {
    pub fn new(api: Arc<dyn RecruitingApi>) -> Self {
        Self {
            api,
            state: SessionState::Loading,
        }
    }

    /// Asks the backend for the current session. Never fails: any error,
    /// auth or network, leaves the session anonymous.
    pub async fn initialize(&mut self) -> &SessionState {
        self.state = match self.api.current_user().await {
            Ok(user) => {
                info!("Resumed session for {} ({})", user.username, user.role);
                SessionState::Authenticated(user)
            }
            Err(e) if e.is_auth() => {
                debug!("No active session: {e}");
                SessionState::Anonymous
            }
            Err(e) => {
                warn!("Session check failed, continuing signed out: {e}");
                SessionState::Anonymous
            }
        };
        &self.state
    }

    /// On failure the previous state is kept.
    pub async fn login(&mut self, credentials: &Credentials) -> ClientResult<User> {
        let user = self.api.login(credentials).await?;
        info!("Logged in as {} ({})", user.username, user.role);
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    pub async fn register(&mut self, registration: &Registration) -> ClientResult<User> {
        let user = self.api.register(registration).await?;
        info!("Registered {} ({})", user.username, user.role);
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Clears the local user even when the backend call fails.
    pub async fn logout(&mut self) -> ClientResult<()> {
        let result = self.api.logout().await;
        if let Err(e) = &result {
            warn!("Logout request failed, clearing local session anyway: {e}");
        }
        self.state = SessionState::Anonymous;
        result
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn api(&self) -> &Arc<dyn RecruitingApi> {
        &self.api
    }
}
