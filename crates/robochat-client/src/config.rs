use robochat_core::{RobochatError, RobochatResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and behaviour settings of a [`crate::ChatClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, e.g. `http://127.0.0.1:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User the client talks as until a login says otherwise.
    #[serde(default = "default_user_id")]
    pub user_id: i64,
    /// Display name of that user.
    #[serde(default = "default_user_name")]
    pub user_name: String,
    /// Send `UserId` / `Authorization: JWT` headers on every call.
    #[serde(default)]
    pub use_token: bool,
    /// Credentials to log in with at startup.
    #[serde(default)]
    pub login: Option<LoginConfig>,
    /// Operator account used to reply to complaints and left messages.
    #[serde(default)]
    pub operator: Option<LoginConfig>,
    /// Per-request timeout. Must be positive.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Period of the poll cycle. Must be positive.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Delay between accepting a question and submitting it.
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
}

/// Account name and password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Account name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_user_id() -> i64 {
    1
}

fn default_user_name() -> String {
    "guest".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_submit_delay_ms() -> u64 {
    1
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
            user_name: default_user_name(),
            use_token: false,
            login: None,
            operator: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            submit_delay_ms: default_submit_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// A default configuration pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> RobochatResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(RobochatError::Config("base_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(RobochatError::Config("timeout_secs must be at least 1".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(RobochatError::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Period of the poll cycle.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Delay before a question accepted by `ask` is submitted.
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}
