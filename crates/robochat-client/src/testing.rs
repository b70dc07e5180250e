//! In-memory collaborators shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use parking_lot::Mutex;
use robochat_core::wire::*;
use robochat_core::{
    ComplaintView, Credentials, QaService, Renderable, Renderer, RobochatError, RobochatResult,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One renderer call, as observed by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ShowPending,
    HidePending,
    Question(Renderable),
    Answer(Renderable),
    ComplaintForm(ComplaintView),
    DisableLeaveMessage(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Event>>,
    fail_appends: AtomicBool,
}

impl RecordingRenderer {
    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.lock().iter().filter(|e| *e == wanted).count()
    }

    pub fn answers(&self) -> Vec<Renderable> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Answer(item) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Error(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) -> RobochatResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RobochatError::Render("renderer closed".into()));
        }
        self.events.lock().push(event);
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn show_pending(&self) {
        self.events.lock().push(Event::ShowPending);
    }

    fn hide_pending(&self) {
        self.events.lock().push(Event::HidePending);
    }

    fn append_question(&self, item: Renderable) -> RobochatResult<()> {
        self.record(Event::Question(item))
    }

    fn append_answer(&self, item: Renderable) -> RobochatResult<()> {
        self.record(Event::Answer(item))
    }

    fn open_complaint_form(&self, view: ComplaintView) -> RobochatResult<()> {
        self.record(Event::ComplaintForm(view))
    }

    fn disable_leave_message(&self, context_id: &str) -> RobochatResult<()> {
        self.record(Event::DisableLeaveMessage(context_id.to_string()))
    }

    fn notify_error(&self, error: &RobochatError) {
        self.events.lock().push(Event::Error(error.to_string()));
    }
}

type Script<T> = Mutex<VecDeque<RobochatResult<T>>>;

/// A [`QaService`] replaying queued responses. An empty queue answers with
/// a transport error.
#[derive(Default)]
pub struct ScriptedService {
    pub sessions: Script<SessionResponse>,
    pub searches: Script<SearchResponse>,
    pub counts: Script<CountResponse>,
    pub lists: Script<ListResponse>,
    pub confirms: Script<StatusResponse>,
    /// Shared by the two operator replies and the queued test message.
    pub replies: Script<StatusResponse>,
    pub complaint_replies: Mutex<Vec<ComplaintReplyRequest>>,
    pub leave_message_replies: Mutex<Vec<LeaveMessageReplyRequest>>,
    pub sent_messages: Mutex<Vec<SendMessageRequest>>,
    pub search_requests: Mutex<Vec<SearchRequest>>,
    pub confirm_requests: Mutex<Vec<ConfirmRequest>>,
    pub session_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

fn next<T>(script: &Script<T>, what: &str) -> RobochatResult<T> {
    script
        .lock()
        .pop_front()
        .unwrap_or_else(|| Err(RobochatError::Transport(format!("no {what} scripted"))))
}

impl ScriptedService {
    pub fn session(&self, id: &str) {
        self.sessions.lock().push_back(Ok(SessionResponse {
            status: "00000".into(),
            msg: String::new(),
            session_id: Some(id.into()),
        }));
    }

    pub fn answer_text(&self, line: &str) {
        self.answer("text", json!([line]));
    }

    pub fn answer(&self, answer_type: &str, answers: Value) {
        self.searches.lock().push_back(Ok(SearchResponse {
            status: "00000".into(),
            msg: String::new(),
            answer_type: Some(answer_type.into()),
            answers,
        }));
    }

    pub fn search_status(&self, status: &str, msg: &str) {
        self.searches.lock().push_back(Ok(SearchResponse {
            status: status.into(),
            msg: msg.into(),
            answer_type: None,
            answers: Value::Null,
        }));
    }

    pub fn count(&self, n: u64) {
        self.counts.lock().push_back(Ok(CountResponse {
            status: "00000".into(),
            msg: String::new(),
            message_count: n,
        }));
    }

    pub fn list(&self, messages: Vec<PendingMessage>) {
        self.lists.lock().push_back(Ok(ListResponse {
            status: "00000".into(),
            msg: String::new(),
            messages,
        }));
    }

    pub fn confirm_ok(&self) {
        self.confirms.lock().push_back(Ok(StatusResponse {
            status: "00000".into(),
            msg: String::new(),
        }));
    }

    pub fn reply_status(&self, status: &str, msg: &str) {
        self.replies.lock().push_back(Ok(StatusResponse {
            status: status.into(),
            msg: msg.into(),
        }));
    }

    pub fn searched_sessions(&self) -> Vec<String> {
        self.search_requests
            .lock()
            .iter()
            .map(|r| r.session_id.clone())
            .collect()
    }
}

pub fn pending_text(id: i64, line: &str) -> PendingMessage {
    PendingMessage {
        id,
        msg_type: "text".into(),
        msg: json!([line]),
        create_time: String::new(),
    }
}

#[async_trait]
impl QaService for ScriptedService {
    async fn login(&self, request: &LoginRequest) -> RobochatResult<LoginResponse> {
        Ok(LoginResponse {
            status: "00000".into(),
            msg: String::new(),
            user_id: Some(99),
            token: Some(format!("token-{}", request.username)),
        })
    }

    async fn generate_token(&self, _auth: &Credentials) -> RobochatResult<TokenResponse> {
        Err(RobochatError::Transport("no token scripted".into()))
    }

    async fn create_session(
        &self,
        _request: &SessionRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<SessionResponse> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.sessions, "session")
    }

    async fn search_answer(
        &self,
        request: &SearchRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<SearchResponse> {
        self.search_requests.lock().push(request.clone());
        next(&self.searches, "answer")
    }

    async fn message_count(
        &self,
        _request: &UserRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<CountResponse> {
        next(&self.counts, "count")
    }

    async fn message_list(
        &self,
        _request: &UserRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<ListResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.lists, "list")
    }

    async fn confirm_messages(
        &self,
        request: &ConfirmRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse> {
        self.confirm_requests.lock().push(request.clone());
        next(&self.confirms, "confirm")
    }

    async fn reply_complaint(
        &self,
        request: &ComplaintReplyRequest,
    ) -> RobochatResult<StatusResponse> {
        self.complaint_replies.lock().push(request.clone());
        next(&self.replies, "reply")
    }

    async fn reply_leave_message(
        &self,
        request: &LeaveMessageReplyRequest,
    ) -> RobochatResult<StatusResponse> {
        self.leave_message_replies.lock().push(request.clone());
        next(&self.replies, "reply")
    }

    async fn send_message(
        &self,
        request: &SendMessageRequest,
        _auth: Option<&Credentials>,
    ) -> RobochatResult<StatusResponse> {
        self.sent_messages.lock().push(request.clone());
        next(&self.replies, "reply")
    }
}
