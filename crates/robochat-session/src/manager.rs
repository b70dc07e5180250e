use crate::session::Session;
use robochat_core::wire::{LoginRequest, SessionRequest};
use robochat_core::{Credentials, QaService, RobochatError, RobochatResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the one active [`Session`] of a client.
///
/// All mutations go through an async mutex that is held across the remote
/// call, so two callers racing on [`SessionManager::acquire`] end up with a
/// single session.
pub struct SessionManager {
    service: Arc<dyn QaService>,
    use_token: bool,
    state: Mutex<Session>,
}

impl SessionManager {
    /// A manager for `user_id`/`user_name` with no session yet.
    ///
    /// When `use_token` is set, calls carry the token obtained through
    /// [`SessionManager::login`].
    pub fn new(
        service: Arc<dyn QaService>,
        user_id: i64,
        user_name: impl Into<String>,
        use_token: bool,
    ) -> Self {
        Self {
            service,
            use_token,
            state: Mutex::new(Session::new(user_id, user_name)),
        }
    }

    /// Return the current session id, creating a session if there is none.
    ///
    /// On failure nothing is stored and the error is
    /// [`RobochatError::AcquisitionFailed`].
    pub async fn acquire(&self) -> RobochatResult<String> {
        let mut state = self.state.lock().await;
        if let Some(id) = &state.session_id {
            return Ok(id.clone());
        }

        let request = SessionRequest {
            user_id: state.user_id,
            user_name: state.user_name.clone(),
        };
        let auth = self.auth_from(&state);
        let response = self
            .service
            .create_session(&request, auth.as_ref())
            .await
            .map_err(|e| RobochatError::AcquisitionFailed(e.to_string()))?;

        if !response.status.is_success() {
            warn!(status = %response.status, msg = %response.msg, "Session creation refused");
            return Err(RobochatError::AcquisitionFailed(format!(
                "[{}] {}",
                response.status, response.msg
            )));
        }
        let session_id = response.session_id.ok_or_else(|| {
            RobochatError::AcquisitionFailed("response carried no session_id".into())
        })?;

        info!(session_id = %session_id, user_id = state.user_id, "Session acquired");
        *state = state.with_session_id(session_id.clone());
        Ok(session_id)
    }

    /// Forget the session id after the service declared it unknown.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if let Some(id) = &state.session_id {
            debug!(session_id = %id, "Session invalidated");
        }
        *state = state.without_session_id();
    }

    /// Refresh the auth token. The session id is never touched, and a
    /// failure leaves the current token in place.
    pub async fn renew_token(&self) -> RobochatResult<()> {
        let mut state = self.state.lock().await;
        let credentials = state
            .credentials()
            .ok_or_else(|| RobochatError::Config("no token to renew, log in first".into()))?;

        let response = self.service.generate_token(&credentials).await?;
        if !response.status.is_success() {
            warn!(status = %response.status, msg = %response.msg, "Token renewal refused");
            return Err(RobochatError::application(response.status, response.msg));
        }
        let token = response
            .token
            .ok_or_else(|| RobochatError::Transport("token renewal returned no token".into()))?;

        debug!(user_id = state.user_id, "Token renewed");
        *state = state.with_token(token);
        Ok(())
    }

    /// Authenticate and switch to the returned user. Any session of the
    /// previous user is dropped.
    pub async fn login(&self, user_name: &str, password: &str) -> RobochatResult<()> {
        let request = LoginRequest {
            username: user_name.to_string(),
            password: password.to_string(),
        };
        let response = self.service.login(&request).await?;
        if !response.status.is_success() {
            return Err(RobochatError::application(response.status, response.msg));
        }
        let user_id = response
            .user_id
            .ok_or_else(|| RobochatError::Transport("login returned no user_id".into()))?;
        let token = response
            .token
            .ok_or_else(|| RobochatError::Transport("login returned no token".into()))?;

        let mut state = self.state.lock().await;
        *state = Session::new(user_id, user_name).with_token(token);
        info!(user_id, "Logged in");
        Ok(())
    }

    /// Credentials to attach to a call, if token auth is on and a token is known.
    pub async fn auth(&self) -> Option<Credentials> {
        let state = self.state.lock().await;
        self.auth_from(&state)
    }

    /// A copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.clone()
    }

    /// Id of the current user.
    pub async fn user_id(&self) -> i64 {
        self.state.lock().await.user_id
    }

    /// Display name of the current user.
    pub async fn user_name(&self) -> String {
        self.state.lock().await.user_name.clone()
    }

    fn auth_from(&self, state: &Session) -> Option<Credentials> {
        if self.use_token {
            state.credentials()
        } else {
            None
        }
    }
}
