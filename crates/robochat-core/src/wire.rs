//! JSON bodies exchanged with the question-answering service.
//!
//! Every response carries a `status` and, on failure, a `msg`. Responses are
//! decoded leniently (missing optional fields default) so that the status can
//! always be inspected; interpretation of the status is left to the caller.

use crate::error::{RobochatError, RobochatResult};
use crate::status::{StatusClass, StatusCode};
use serde::{Deserialize, Serialize};

// ── Requests ───────────────────────────────────────────────────────────────

/// `POST /api/Client/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// `POST /api/Qa/GetSessionId`
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    /// User the session is opened for.
    pub user_id: i64,
    /// Display name of that user.
    pub user_name: String,
}

/// `POST /api/Qa/SearchAnswer`
///
/// Absent optional fields are sent as `null`, as the service expects.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Session the question belongs to.
    pub session_id: String,
    /// Question text or direct-action payload.
    pub question: String,
    /// Topic collection to search in.
    pub collection: Option<String>,
    /// Pinned answer id.
    pub std_question_id: Option<i64>,
    /// Plugin action tag.
    pub std_question_tag: Option<String>,
}

/// Body of the pending-count and pending-list calls.
#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    /// User whose pending messages are queried.
    pub user_id: i64,
}

/// `POST /api/Qa/ConfirmMessageList`
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmRequest {
    /// User the messages were delivered to.
    pub user_id: i64,
    /// Ids of the messages that were shown.
    pub message_ids: Vec<i64>,
}

/// `POST /api/ComplaintFormServer/RespMsg`
///
/// Sent with operator credentials in the body rather than auth headers.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintReplyRequest {
    /// Operator account.
    pub user_name: String,
    /// Operator password.
    pub password: String,
    /// Complaint being answered.
    pub form_id: i64,
    /// Reply text.
    pub resp_msg: String,
    /// New processing state of the complaint.
    pub upd_status: String,
}

/// `POST /api/LeaveMessagePluginServer/RespMsg`
#[derive(Debug, Clone, Serialize)]
pub struct LeaveMessageReplyRequest {
    /// Operator account.
    pub user_name: String,
    /// Operator password.
    pub password: String,
    /// Message being answered.
    pub msg_id: i64,
    /// Reply text.
    pub resp_msg: String,
    /// New processing state of the message.
    pub upd_status: String,
}

/// `POST /api/Client/AddSendMessage`
///
/// Queues a message for `user_id`; it is later collected by polling.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// Recipient.
    pub user_id: i64,
    /// Sender name shown with the message.
    pub from_user_name: String,
    /// Message text.
    pub msg: String,
}

// ── Responses ──────────────────────────────────────────────────────────────

/// Reply to [`LoginRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// Id of the authenticated user.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Token for the `Authorization` header.
    #[serde(default)]
    pub token: Option<String>,
}

/// Reply to `GET /api/Qa/GenerateToken`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// The renewed token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Reply to [`SessionRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// The new session id.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply to [`SearchRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// `text` or `json`; absent on failure.
    #[serde(default)]
    pub answer_type: Option<String>,
    /// Payload, decoded according to `answer_type`.
    #[serde(default)]
    pub answers: serde_json::Value,
}

/// Reply to the pending-count call.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// Number of undelivered messages.
    #[serde(default)]
    pub message_count: u64,
}

/// Reply to the pending-list call.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
    /// Undelivered messages, oldest first.
    #[serde(default)]
    pub messages: Vec<PendingMessage>,
}

/// One message pushed by the service out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMessage {
    /// Id to confirm once shown.
    pub id: i64,
    /// `text` or `json`.
    pub msg_type: String,
    /// Payload, decoded according to `msg_type`.
    pub msg: serde_json::Value,
    /// Queue time as formatted by the service.
    #[serde(default)]
    pub create_time: String,
}

/// Reply carrying only an outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Outcome.
    pub status: StatusCode,
    /// Failure description.
    #[serde(default)]
    pub msg: String,
}

/// Maps a response status onto the error taxonomy.
///
/// The session-unknown code becomes [`RobochatError::SessionExpired`] so that
/// callers able to recover from it can match on it directly.
pub fn ensure_success(status: &StatusCode, msg: &str) -> RobochatResult<()> {
    match status.class() {
        StatusClass::Success => Ok(()),
        StatusClass::SessionUnknown => Err(RobochatError::SessionExpired(msg.to_string())),
        StatusClass::Failure => Err(RobochatError::application(status.clone(), msg)),
    }
}
