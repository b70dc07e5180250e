use crate::dispatch::Dispatcher;
use robochat_core::wire::{ensure_success, ConfirmRequest, UserRequest};
use robochat_core::{Credentials, InboundMessage, Origin, QaService};
use robochat_session::SessionManager;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing pending.
    Idle,
    /// The count or list call failed; nothing was shown or confirmed.
    Skipped,
    /// Pending messages were fetched and shown.
    Delivered {
        /// Ids shown successfully, in the order received.
        dispatched: Vec<i64>,
        /// Ids the renderer refused.
        failed: Vec<i64>,
        /// Whether the service accepted the confirmation.
        confirmed: bool,
    },
}

/// Collects pushed messages with a count → list → confirm cycle.
pub struct PollLoop {
    service: Arc<dyn QaService>,
    sessions: Arc<SessionManager>,
    dispatcher: Arc<Dispatcher>,
}

impl PollLoop {
    /// A loop polling for the user held by `sessions`.
    pub fn new(
        service: Arc<dyn QaService>,
        sessions: Arc<SessionManager>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            service,
            sessions,
            dispatcher,
        }
    }

    /// Run one cycle. Never fails: problems are logged and the cycle ends.
    ///
    /// Messages are confirmed only after they were shown, so a lost
    /// confirmation means they are shown again on a later cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        let user_id = self.sessions.user_id().await;
        let auth = self.sessions.auth().await;
        let request = UserRequest { user_id };

        let count = match self.service.message_count(&request, auth.as_ref()).await {
            Ok(resp) => match ensure_success(&resp.status, &resp.msg) {
                Ok(()) => resp.message_count,
                Err(e) => {
                    warn!(error = %e, "Pending message count refused");
                    return PollOutcome::Skipped;
                }
            },
            Err(e) => {
                warn!(error = %e, "Pending message count failed");
                return PollOutcome::Skipped;
            }
        };
        if count == 0 {
            return PollOutcome::Idle;
        }

        let messages = match self.service.message_list(&request, auth.as_ref()).await {
            Ok(resp) => match ensure_success(&resp.status, &resp.msg) {
                Ok(()) => resp.messages,
                Err(e) => {
                    warn!(error = %e, "Pending message list refused");
                    return PollOutcome::Skipped;
                }
            },
            Err(e) => {
                warn!(error = %e, "Pending message list failed");
                return PollOutcome::Skipped;
            }
        };
        debug!(count, fetched = messages.len(), "Fetched pending messages");

        let user_name = self.sessions.user_name().await;
        let mut dispatched = Vec::with_capacity(messages.len());
        let mut failed = Vec::new();
        for pending in messages {
            let message = InboundMessage::decode(&pending.msg_type, pending.msg);
            match self.dispatcher.dispatch(&message, Origin::Push, &user_name) {
                Ok(()) => dispatched.push(pending.id),
                Err(e) => {
                    warn!(message_id = pending.id, error = %e, "Pushed message not shown");
                    failed.push(pending.id);
                }
            }
        }

        let confirmed =
            !dispatched.is_empty() && self.confirm(user_id, &dispatched, auth.as_ref()).await;
        PollOutcome::Delivered {
            dispatched,
            failed,
            confirmed,
        }
    }

    async fn confirm(&self, user_id: i64, ids: &[i64], auth: Option<&Credentials>) -> bool {
        let request = ConfirmRequest {
            user_id,
            message_ids: ids.to_vec(),
        };
        match self.service.confirm_messages(&request, auth).await {
            Ok(resp) => match ensure_success(&resp.status, &resp.msg) {
                Ok(()) => {
                    info!(count = ids.len(), "Pushed messages confirmed");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Confirmation refused, messages may be shown again");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "Confirmation failed, messages may be shown again");
                false
            }
        }
    }
}
