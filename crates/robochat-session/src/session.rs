use chrono::{DateTime, Utc};
use robochat_core::Credentials;
use serde::{Deserialize, Serialize};

/// The conversational context the service tracks for this client.
///
/// Replaced wholesale whenever it changes; an absent `session_id` means no
/// session has been acquired yet (or the last one was invalidated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Id assigned by the service.
    pub session_id: Option<String>,
    /// User the session belongs to.
    pub user_id: i64,
    /// Display name of that user.
    pub user_name: String,
    /// Token from the last login or renewal.
    pub auth_token: Option<String>,
    /// When `session_id` was obtained.
    pub acquired_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A user without a session.
    pub fn new(user_id: i64, user_name: impl Into<String>) -> Self {
        Self {
            session_id: None,
            user_id,
            user_name: user_name.into(),
            auth_token: None,
            acquired_at: None,
        }
    }

    /// Same user and credentials with a freshly acquired `session_id`.
    pub fn with_session_id(&self, session_id: String) -> Self {
        Self {
            session_id: Some(session_id),
            acquired_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Same user and session with a new token.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            auth_token: Some(token),
            ..self.clone()
        }
    }

    /// Same user and credentials without a session id.
    pub fn without_session_id(&self) -> Self {
        Self {
            session_id: None,
            acquired_at: None,
            ..self.clone()
        }
    }

    /// Header credentials, available once a token is known.
    pub fn credentials(&self) -> Option<Credentials> {
        self.auth_token.as_ref().map(|token| Credentials {
            user_id: self.user_id,
            token: token.clone(),
        })
    }

    /// Whether a session id is held.
    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }
}
