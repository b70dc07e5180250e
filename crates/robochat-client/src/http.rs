use crate::config::ClientConfig;
use async_trait::async_trait;
use robochat_core::wire::{
    ComplaintReplyRequest, ConfirmRequest, CountResponse, LeaveMessageReplyRequest, ListResponse,
    LoginRequest, LoginResponse, SearchRequest, SearchResponse, SendMessageRequest,
    SessionRequest, SessionResponse, StatusResponse, TokenResponse, UserRequest,
};
use robochat_core::{Credentials, QaService, RobochatError, RobochatResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const LOGIN_PATH: &str = "/api/Client/login";
const TOKEN_PATH: &str = "/api/Qa/GenerateToken";
const SESSION_PATH: &str = "/api/Qa/GetSessionId";
const SEARCH_PATH: &str = "/api/Qa/SearchAnswer";
const COUNT_PATH: &str = "/api/Qa/GetMessageCount";
const LIST_PATH: &str = "/api/Qa/GetMessageList";
const CONFIRM_PATH: &str = "/api/Qa/ConfirmMessageList";
const COMPLAINT_REPLY_PATH: &str = "/api/ComplaintFormServer/RespMsg";
const LEAVE_MESSAGE_REPLY_PATH: &str = "/api/LeaveMessagePluginServer/RespMsg";
const SEND_MESSAGE_PATH: &str = "/api/Client/AddSendMessage";

/// [`QaService`] over HTTP/JSON.
///
/// Every request shares the client-wide timeout; an expired timeout, a
/// connection failure, a non-2xx HTTP status and an undecodable body all
/// surface as [`RobochatError::Transport`].
pub struct HttpQaService {
    base_url: String,
    http: reqwest::Client,
}

impl HttpQaService {
    /// Build the HTTP client for `config.base_url` with the configured timeout.
    pub fn new(config: &ClientConfig) -> RobochatResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RobochatError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B, R>(
        &self,
        path: &str,
        body: &B,
        auth: Option<&Credentials>,
    ) -> RobochatResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let request = with_auth(self.http.post(self.url(path)).json(body), auth);
        send(path, request).await
    }
}

fn with_auth(
    request: reqwest::RequestBuilder,
    auth: Option<&Credentials>,
) -> reqwest::RequestBuilder {
    match auth {
        Some(credentials) => request
            .header("UserId", credentials.user_id.to_string())
            .header("Authorization", format!("JWT {}", credentials.token)),
        None => request,
    }
}

async fn send<R: DeserializeOwned>(
    path: &str,
    request: reqwest::RequestBuilder,
) -> RobochatResult<R> {
    let resp = request
        .send()
        .await
        .map_err(|e| RobochatError::Transport(e.to_string()))?;

    let status = resp.status();
    debug!(path, http_status = status.as_u16(), "Service call returned");
    if !status.is_success() {
        return Err(RobochatError::Transport(format!("HTTP {status} from {path}")));
    }

    resp.json::<R>()
        .await
        .map_err(|e| RobochatError::Transport(format!("invalid body from {path}: {e}")))
}

#[async_trait]
impl QaService for HttpQaService {
    async fn login(&self, request: &LoginRequest) -> RobochatResult<LoginResponse> {
        self.post(LOGIN_PATH, request, None).await
    }

    async fn generate_token(&self, auth: &Credentials) -> RobochatResult<TokenResponse> {
        let request = with_auth(self.http.get(self.url(TOKEN_PATH)), Some(auth));
        send(TOKEN_PATH, request).await
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<SessionResponse> {
        self.post(SESSION_PATH, request, auth).await
    }

    async fn search_answer(
        &self,
        request: &SearchRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<SearchResponse> {
        self.post(SEARCH_PATH, request, auth).await
    }

    async fn message_count(
        &self,
        request: &UserRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<CountResponse> {
        self.post(COUNT_PATH, request, auth).await
    }

    async fn message_list(
        &self,
        request: &UserRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<ListResponse> {
        self.post(LIST_PATH, request, auth).await
    }

    async fn confirm_messages(
        &self,
        request: &ConfirmRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse> {
        self.post(CONFIRM_PATH, request, auth).await
    }

    async fn reply_complaint(
        &self,
        request: &ComplaintReplyRequest,
    ) -> RobochatResult<StatusResponse> {
        self.post(COMPLAINT_REPLY_PATH, request, None).await
    }

    async fn reply_leave_message(
        &self,
        request: &LeaveMessageReplyRequest,
    ) -> RobochatResult<StatusResponse> {
        self.post(LEAVE_MESSAGE_REPLY_PATH, request, None).await
    }

    async fn send_message(
        &self,
        request: &SendMessageRequest,
        auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse> {
        self.post(SEND_MESSAGE_PATH, request, auth).await
    }
}
