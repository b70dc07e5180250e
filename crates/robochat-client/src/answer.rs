use crate::dispatch::Dispatcher;
use robochat_core::wire::ensure_success;
use robochat_core::{
    InboundMessage, Origin, OutboundQuestion, QaService, Renderer, RobochatError, RobochatResult,
};
use robochat_session::SessionManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// How many times a question is re-submitted after the service reports its
/// session as unknown.
pub const MAX_SESSION_RETRIES: u32 = 1;

/// A successful answer together with the question that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReply {
    /// The question as submitted.
    pub question: OutboundQuestion,
    /// The decoded answer.
    pub message: InboundMessage,
}

/// Submits questions and hands the answers to the [`Dispatcher`].
///
/// Only one question is outstanding at a time; a second caller waits for
/// the first to finish.
pub struct AnswerClient {
    service: Arc<dyn QaService>,
    sessions: Arc<SessionManager>,
    dispatcher: Arc<Dispatcher>,
    renderer: Arc<dyn Renderer>,
    in_flight: Mutex<()>,
}

impl AnswerClient {
    /// A client submitting through `service` and rendering through `dispatcher`.
    pub fn new(
        service: Arc<dyn QaService>,
        sessions: Arc<SessionManager>,
        dispatcher: Arc<Dispatcher>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            service,
            sessions,
            dispatcher,
            renderer,
            in_flight: Mutex::new(()),
        }
    }

    /// Submit `question`, display the answer and return it.
    ///
    /// The pending indicator is shown once before the first request and
    /// hidden once after the answer was rendered, whatever the outcome.
    /// Errors are also reported through [`Renderer::notify_error`].
    pub async fn submit(&self, question: OutboundQuestion) -> RobochatResult<AnswerReply> {
        let _guard = self.in_flight.lock().await;

        self.renderer.show_pending();
        let outcome = self.request(&question).await;
        let result = match outcome {
            Ok(message) => {
                let user_name = self.sessions.user_name().await;
                self.dispatcher
                    .dispatch(&message, Origin::Response, &user_name)
                    .map(|()| AnswerReply { question, message })
            }
            Err(e) => Err(e),
        };
        self.renderer.hide_pending();

        if let Err(e) = &result {
            warn!(error = %e, "Question failed");
            self.renderer.notify_error(e);
        }
        result
    }

    async fn request(&self, question: &OutboundQuestion) -> RobochatResult<InboundMessage> {
        let mut last_err: Option<RobochatError> = None;

        for attempt in 0..=MAX_SESSION_RETRIES {
            let session_id = self.sessions.acquire().await?;
            let auth = self.sessions.auth().await;
            let response = self
                .service
                .search_answer(&question.to_request(&session_id), auth.as_ref())
                .await?;

            match ensure_success(&response.status, &response.msg) {
                Ok(()) => {
                    let kind = response.answer_type.as_deref().unwrap_or("text");
                    return Ok(InboundMessage::decode(kind, response.answers));
                }
                Err(RobochatError::SessionExpired(msg)) => {
                    if attempt < MAX_SESSION_RETRIES {
                        info!(session_id = %session_id, attempt, "Session expired, renewing");
                        self.sessions.invalidate().await;
                    }
                    last_err = Some(RobochatError::application(response.status, msg));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            RobochatError::SessionExpired("session retry budget exhausted".into())
        }))
    }
}
