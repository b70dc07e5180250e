use crate::answer::{AnswerClient, AnswerReply};
use crate::config::{ClientConfig, LoginConfig};
use crate::dispatch::Dispatcher;
use crate::http::HttpQaService;
use crate::poll::{PollLoop, PollOutcome};
use parking_lot::Mutex;
use robochat_core::wire::{
    ensure_success, ComplaintReplyRequest, LeaveMessageReplyRequest, SendMessageRequest,
};
use robochat_core::{
    FollowUp, KnowledgeNav, OutboundQuestion, QaService, Renderable, Renderer, RobochatError,
    RobochatResult,
};
use robochat_session::{Session, SessionManager};
use robochat_timer::TimerRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timer id of the deferred question submission.
pub const SUBMIT_TIMER: &str = "search_answer";
/// Timer id of the repeating poll cycle.
pub const POLL_TIMER: &str = "poll_messages";
/// Status a complaint or left message is moved to by an operator reply.
pub const REPLIED_STATUS: &str = "treated";

/// One conversation with the question-answering service.
///
/// Owns every piece of client state. Dropping it stops polling and any
/// deferred submission; call [`ChatClient::flush`] first to keep the last
/// question.
pub struct ChatClient {
    config: ClientConfig,
    service: Arc<dyn QaService>,
    sessions: Arc<SessionManager>,
    dispatcher: Arc<Dispatcher>,
    answers: Arc<AnswerClient>,
    poller: Arc<PollLoop>,
    renderer: Arc<dyn Renderer>,
    deferred: Arc<Deferred>,
    timers: TimerRegistry,
}

/// The question accepted by `ask` and not yet submitted.
#[derive(Default)]
struct Deferred {
    question: Mutex<Option<OutboundQuestion>>,
    /// Held for the whole submission of a deferred question.
    submitting: tokio::sync::Mutex<()>,
}

impl Deferred {
    /// Submits the waiting question, if any. Returns whether one was sent.
    async fn submit(&self, answers: &AnswerClient) -> RobochatResult<bool> {
        let _guard = self.submitting.lock().await;
        let question = self.question.lock().take();
        match question {
            Some(question) => answers.submit(question).await.map(|_| true),
            None => Ok(false),
        }
    }
}

impl ChatClient {
    /// Client talking HTTP to `config.base_url`. Logs in first when the
    /// configuration carries credentials.
    pub async fn connect(
        config: ClientConfig,
        renderer: Arc<dyn Renderer>,
    ) -> RobochatResult<Self> {
        config.validate()?;
        let service: Arc<dyn QaService> = Arc::new(HttpQaService::new(&config)?);
        let login = config.login.clone();
        let client = Self::with_service(config, service, renderer);
        if let Some(login) = login {
            client.login(&login.user_name, &login.password).await?;
        }
        Ok(client)
    }

    /// Client over an arbitrary [`QaService`].
    pub fn with_service(
        config: ClientConfig,
        service: Arc<dyn QaService>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(
            service.clone(),
            config.user_id,
            config.user_name.clone(),
            config.use_token,
        ));
        let dispatcher = Arc::new(Dispatcher::new(renderer.clone()));
        let answers = Arc::new(AnswerClient::new(
            service.clone(),
            sessions.clone(),
            dispatcher.clone(),
            renderer.clone(),
        ));
        let poller = Arc::new(PollLoop::new(
            service.clone(),
            sessions.clone(),
            dispatcher.clone(),
        ));

        Self {
            config,
            service,
            sessions,
            dispatcher,
            answers,
            poller,
            renderer,
            deferred: Arc::new(Deferred::default()),
            timers: TimerRegistry::new(),
        }
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Log in as `user_name` and talk as the returned user from now on.
    pub async fn login(&self, user_name: &str, password: &str) -> RobochatResult<()> {
        self.sessions.login(user_name, password).await
    }

    /// Current session, for diagnostics.
    pub async fn session(&self) -> Session {
        self.sessions.snapshot().await
    }

    /// Echo `text` to the transcript and submit it after the configured delay.
    ///
    /// Blank input is ignored and `false` returned. A question asked before
    /// the previous one was submitted replaces it.
    pub fn ask(&self, text: &str) -> RobochatResult<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        self.renderer.append_question(Renderable::text(text))?;
        *self.deferred.question.lock() = Some(OutboundQuestion::new(text));

        let answers = self.answers.clone();
        let deferred = self.deferred.clone();
        self.timers.schedule_once(SUBMIT_TIMER, self.config.submit_delay(), move || {
            let answers = answers.clone();
            let deferred = deferred.clone();
            async move { deferred.submit(&answers).await.map(|_| ()) }
        });
        Ok(true)
    }

    /// Submit the question still waiting after [`ChatClient::ask`] now, or
    /// wait for the one already being submitted.
    ///
    /// Returns `true` if this call submitted a question.
    pub async fn flush(&self) -> RobochatResult<bool> {
        if self.timers.cancel(SUBMIT_TIMER) {
            debug!("Submitting deferred question early");
        }
        self.deferred.submit(&self.answers).await
    }

    /// Submit `question` now and wait for the answer.
    pub async fn submit(&self, question: OutboundQuestion) -> RobochatResult<AnswerReply> {
        self.answers.submit(question).await
    }

    /// Submit the question behind a follow-up the user picked.
    pub async fn follow_up(&self, follow_up: &FollowUp) -> RobochatResult<AnswerReply> {
        debug!(label = %follow_up.label, "Following up");
        self.submit(follow_up.question.clone()).await
    }

    /// Pick option `text` pinned to `std_question_id`.
    pub async fn select_option(
        &self,
        text: &str,
        std_question_id: i64,
    ) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::pinned(text, std_question_id)).await
    }

    /// Move through the knowledge chapters around `chapter_id`.
    pub async fn knowledge_action(
        &self,
        nav: KnowledgeNav,
        chapter_id: i64,
    ) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::knowledge(nav, chapter_id)).await
    }

    /// Fetch and show the full record of complaint `form_id`.
    pub async fn complaint_detail(&self, form_id: i64) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::complaint_detail(form_id)).await
    }

    /// File a complaint as the session user, in the name of `complainant`.
    pub async fn save_complaint(
        &self,
        complainant: &str,
        content: &str,
    ) -> RobochatResult<AnswerReply> {
        let session = self.sessions.snapshot().await;
        self.submit(OutboundQuestion::save_complaint(
            session.user_id,
            &session.user_name,
            complainant,
            content,
        ))
        .await
    }

    /// Abandon the leave-a-message flow `context_id`.
    pub async fn cancel_leave_message(&self, context_id: &str) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::cancel_leave_message(context_id)).await
    }

    /// Tell the service that `url` was uploaded for the flow `context_id`.
    pub async fn leave_message_uploaded(
        &self,
        context_id: &str,
        url: &str,
    ) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::leave_message_upload(context_id, url))
            .await
    }

    /// Continue the thread of left message `msg_id`.
    pub async fn append_leave_message(&self, msg_id: i64) -> RobochatResult<AnswerReply> {
        self.submit(OutboundQuestion::append_leave_message(msg_id)).await
    }

    /// Post `resp_msg` as the operator reply to the last complaint filed in
    /// this conversation.
    pub async fn respond_to_last_complaint(&self, resp_msg: &str) -> RobochatResult<()> {
        let result = self.reply_complaint(resp_msg).await;
        self.report(result)
    }

    /// Post `resp_msg` as the operator reply to the last message left in
    /// this conversation.
    pub async fn respond_to_last_leave_message(&self, resp_msg: &str) -> RobochatResult<()> {
        let result = self.reply_leave_message(resp_msg).await;
        self.report(result)
    }

    /// Queue `msg` from `from_user_name` for the current user. It shows up
    /// on a later poll cycle.
    pub async fn send_message(&self, from_user_name: &str, msg: &str) -> RobochatResult<()> {
        let request = SendMessageRequest {
            user_id: self.sessions.user_id().await,
            from_user_name: from_user_name.to_string(),
            msg: msg.to_string(),
        };
        let auth = self.sessions.auth().await;
        let result = match self.service.send_message(&request, auth.as_ref()).await {
            Ok(response) => ensure_success(&response.status, &response.msg),
            Err(e) => Err(e),
        };
        self.report(result)
    }

    async fn reply_complaint(&self, resp_msg: &str) -> RobochatResult<()> {
        let form_id = self.dispatcher.last_complaint_form_id().ok_or_else(|| {
            RobochatError::Config("no complaint in this conversation, submit one first".into())
        })?;
        let operator = self.operator()?;
        let request = ComplaintReplyRequest {
            user_name: operator.user_name.clone(),
            password: operator.password.clone(),
            form_id,
            resp_msg: resp_msg.to_string(),
            upd_status: REPLIED_STATUS.to_string(),
        };
        let response = self.service.reply_complaint(&request).await?;
        ensure_success(&response.status, &response.msg)?;
        info!(form_id, "Complaint reply posted");
        Ok(())
    }

    async fn reply_leave_message(&self, resp_msg: &str) -> RobochatResult<()> {
        let msg_id = self.dispatcher.last_leave_message_id().ok_or_else(|| {
            RobochatError::Config("no message left in this conversation, leave one first".into())
        })?;
        let operator = self.operator()?;
        let request = LeaveMessageReplyRequest {
            user_name: operator.user_name.clone(),
            password: operator.password.clone(),
            msg_id,
            resp_msg: resp_msg.to_string(),
            upd_status: REPLIED_STATUS.to_string(),
        };
        let response = self.service.reply_leave_message(&request).await?;
        ensure_success(&response.status, &response.msg)?;
        info!(msg_id, "Leave-message reply posted");
        Ok(())
    }

    fn operator(&self) -> RobochatResult<&LoginConfig> {
        self.config
            .operator
            .as_ref()
            .ok_or_else(|| RobochatError::Config("no [operator] account configured".into()))
    }

    fn report(&self, result: RobochatResult<()>) -> RobochatResult<()> {
        if let Err(e) = &result {
            warn!(error = %e, "Request failed");
            self.renderer.notify_error(e);
        }
        result
    }

    /// Start the repeating poll cycle at the configured interval.
    pub fn start_polling(&self) {
        self.start_polling_every(self.config.poll_interval());
    }

    /// Start the repeating poll cycle every `interval`, replacing a running one.
    pub fn start_polling_every(&self, interval: Duration) {
        let poller = self.poller.clone();
        self.timers.schedule_repeating(POLL_TIMER, interval, move || {
            let poller = poller.clone();
            async move {
                poller.poll_once().await;
                Ok::<(), RobochatError>(())
            }
        });
        info!(interval_ms = interval.as_millis() as u64, "Polling started");
    }

    /// Returns `false` if polling was not running.
    pub fn stop_polling(&self) -> bool {
        self.timers.cancel(POLL_TIMER)
    }

    /// Whether the poll cycle is scheduled.
    pub fn is_polling(&self) -> bool {
        self.timers.contains(POLL_TIMER)
    }

    /// Run one poll cycle now.
    pub async fn poll_once(&self) -> PollOutcome {
        self.poller.poll_once().await
    }

    /// Form id the next complaint reply goes to.
    pub fn last_complaint_form_id(&self) -> Option<i64> {
        self.dispatcher.last_complaint_form_id()
    }

    /// Message id the next leave-a-message reply goes to.
    pub fn last_leave_message_id(&self) -> Option<i64> {
        self.dispatcher.last_leave_message_id()
    }
}
