use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by the service when the session id is unknown or expired.
pub const SESSION_UNKNOWN: &str = "10002";

/// Status reported on plain success.
pub const SUCCESS: &str = "00000";

/// Five-digit status code returned by every endpoint of the service.
///
/// Codes form a two-tier scheme: a leading `0` is the success family
/// (`00000` one answer, `00001` a choice list), any other leading digit is an
/// application failure identified by the full code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(String);

/// Coarse classification of a [`StatusCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Leading digit `0`.
    Success,
    /// The reserved session-unknown code.
    SessionUnknown,
    /// Any other code.
    Failure,
}

impl StatusCode {
    /// Wraps a raw status string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The raw code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the code.
    pub fn class(&self) -> StatusClass {
        if self.0 == SESSION_UNKNOWN {
            StatusClass::SessionUnknown
        } else if self.0.starts_with('0') {
            StatusClass::Success
        } else {
            StatusClass::Failure
        }
    }

    /// `true` for the success family.
    pub fn is_success(&self) -> bool {
        self.class() == StatusClass::Success
    }

    /// `true` for the reserved session-unknown code.
    pub fn is_session_unknown(&self) -> bool {
        self.class() == StatusClass::SessionUnknown
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::new(SUCCESS)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_is_success() {
        assert!(StatusCode::from("00000").is_success());
        assert!(StatusCode::from("00001").is_success());
    }

    #[test]
    fn other_leading_digits_fail() {
        assert_eq!(StatusCode::from("10000").class(), StatusClass::Failure);
        assert_eq!(StatusCode::from("10001").class(), StatusClass::Failure);
        assert_eq!(StatusCode::from("20001").class(), StatusClass::Failure);
    }

    #[test]
    fn session_unknown_is_distinct() {
        let code = StatusCode::from(SESSION_UNKNOWN);
        assert!(code.is_session_unknown());
        assert!(!code.is_success());
    }

    #[test]
    fn empty_code_is_failure() {
        assert_eq!(StatusCode::from("").class(), StatusClass::Failure);
    }
}
