use crate::error::RobochatResult;
use crate::wire::{
    ComplaintReplyRequest, ConfirmRequest, CountResponse, LeaveMessageReplyRequest, ListResponse,
    LoginRequest, LoginResponse, SearchRequest, SearchResponse, SendMessageRequest,
    SessionRequest, SessionResponse, StatusResponse, TokenResponse, UserRequest,
};
use async_trait::async_trait;

/// Token credentials attached to calls when token auth is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Sent as the `UserId` header.
    pub user_id: i64,
    /// Sent as `Authorization: JWT <token>`.
    pub token: String,
}

/// The remote question-answering service.
///
/// Implementations return the decoded response whatever its status;
/// `Err` is reserved for transport-level failures (connect, timeout,
/// undecodable body). Status interpretation belongs to the caller.
#[async_trait]
pub trait QaService: Send + Sync {
    /// Authenticate a user and obtain a token.
    async fn login(&self, request: &LoginRequest) -> RobochatResult<LoginResponse>;

    /// Exchange the current token for a fresh one.
    async fn generate_token(&self, auth: &Credentials) -> RobochatResult<TokenResponse>;

    /// Open a conversation session.
    async fn create_session(
        &self,
        request: &SessionRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<SessionResponse>;

    /// Submit a question within a session.
    async fn search_answer(
        &self,
        request: &SearchRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<SearchResponse>;

    /// Count messages waiting for the user.
    async fn message_count(
        &self,
        request: &UserRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<CountResponse>;

    /// Fetch messages waiting for the user.
    async fn message_list(
        &self,
        request: &UserRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<ListResponse>;

    /// Mark fetched messages as delivered.
    async fn confirm_messages(
        &self,
        request: &ConfirmRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse>;

    /// Post an operator reply to a complaint.
    async fn reply_complaint(
        &self,
        request: &ComplaintReplyRequest,
    ) -> RobochatResult<StatusResponse>;

    /// Post an operator reply to a left message.
    async fn reply_leave_message(
        &self,
        request: &LeaveMessageReplyRequest,
    ) -> RobochatResult<StatusResponse>;

    /// Queue a message for a user, to be collected by polling.
    async fn send_message(
        &self,
        request: &SendMessageRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse>;
}
