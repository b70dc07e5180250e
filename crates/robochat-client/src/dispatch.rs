//! Message dispatch.
//!
//! [`route`] turns one decoded [`InboundMessage`] into the renderer calls it
//! requires, without side effects. [`Dispatcher`] applies the result to a
//! [`Renderer`] and keeps the two ids later follow-ups refer to.

use parking_lot::Mutex;
use robochat_core::message::{ComplaintDetail, ComplaintPreview, KnowledgeContent, OptionList};
use robochat_core::{
    ComplaintMessage, ComplaintView, FollowUp, InboundMessage, KnowledgeNav, LeaveMessage, Origin,
    OutboundQuestion, Renderable, Renderer, RobochatResult,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// One renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// [`Renderer::append_question`].
    AppendQuestion(Renderable),
    /// [`Renderer::append_answer`].
    AppendAnswer(Renderable),
    /// [`Renderer::open_complaint_form`].
    OpenComplaintForm(ComplaintView),
    /// [`Renderer::disable_leave_message`] for a context id.
    DisableLeaveMessage(String),
}

/// An id the dispatcher keeps after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remember {
    /// Target of the next complaint reply.
    ComplaintForm(i64),
    /// Target of the next leave-a-message reply.
    LeaveMessage(i64),
}

/// Everything a message asks for, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    /// Renderer calls, applied in order.
    pub actions: Vec<Action>,
    /// Id stored once every action succeeded.
    pub remember: Option<Remember>,
}

impl Dispatch {
    fn single(action: Action) -> Self {
        Self {
            actions: vec![action],
            remember: None,
        }
    }
}

/// Decides how `message` is presented.
///
/// `user_name` pre-fills a new complaint when the service sends no name.
pub fn route(message: &InboundMessage, origin: Origin, user_name: &str) -> Dispatch {
    match message {
        InboundMessage::Text(lines) => Dispatch::single(Action::AppendAnswer(Renderable::Text {
            lines: lines.clone(),
        })),
        InboundMessage::Knowledge(content) => {
            Dispatch::single(Action::AppendAnswer(knowledge_card(content)))
        }
        InboundMessage::Complaint(form) => route_complaint(form, origin, user_name),
        InboundMessage::Options(options) => {
            Dispatch::single(Action::AppendAnswer(option_list(options)))
        }
        InboundMessage::LeaveMessage(step) => route_leave_message(step),
        InboundMessage::Unrecognized(raw) => {
            Dispatch::single(Action::AppendAnswer(Renderable::Fallback { raw: raw.clone() }))
        }
    }
}

fn knowledge_card(content: &KnowledgeContent) -> Renderable {
    let chapter = content.current_id;
    let mut follow_ups = vec![FollowUp::new(
        "Previous",
        OutboundQuestion::knowledge(KnowledgeNav::Prev, chapter),
    )];
    if content.more {
        follow_ups.push(FollowUp::new(
            "More",
            OutboundQuestion::knowledge(KnowledgeNav::More, chapter),
        ));
    }
    follow_ups.push(FollowUp::new(
        "Next",
        OutboundQuestion::knowledge(KnowledgeNav::Next, chapter),
    ));

    Renderable::Knowledge {
        title: content.title.clone(),
        sections: content.contents.clone(),
        follow_ups,
    }
}

fn option_list(options: &OptionList) -> Renderable {
    Renderable::Options {
        tips: options.tips.clone(),
        follow_ups: options
            .options
            .iter()
            .map(|option| {
                FollowUp::new(
                    option.option_str.clone(),
                    OutboundQuestion::pinned(option.index_text(), option.std_question_id),
                )
            })
            .collect(),
    }
}

fn route_complaint(form: &ComplaintMessage, origin: Origin, user_name: &str) -> Dispatch {
    match form {
        ComplaintMessage::Create(draft) => {
            let name = draft
                .defaults
                .user_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(user_name);
            Dispatch::single(Action::OpenComplaintForm(ComplaintView {
                editable: true,
                form_id: None,
                user_name: name.to_string(),
                content: draft.defaults.content.clone().unwrap_or_default(),
                status: None,
                create_time: None,
                response: None,
            }))
        }
        ComplaintMessage::Preview(preview) => {
            let summary = complaint_summary(preview);
            match origin {
                Origin::Response => Dispatch {
                    actions: vec![Action::AppendQuestion(summary)],
                    remember: Some(Remember::ComplaintForm(preview.form_id)),
                },
                Origin::Push => Dispatch::single(Action::AppendAnswer(summary)),
            }
        }
        ComplaintMessage::Detail(detail) => {
            Dispatch::single(Action::OpenComplaintForm(complaint_record(detail)))
        }
    }
}

fn complaint_summary(preview: &ComplaintPreview) -> Renderable {
    Renderable::ComplaintSummary {
        form_id: preview.form_id,
        status: preview.status.clone(),
        content: preview.preview.content.clone(),
        details: FollowUp::new("Details", OutboundQuestion::complaint_detail(preview.form_id)),
    }
}

fn complaint_record(detail: &ComplaintDetail) -> ComplaintView {
    ComplaintView {
        editable: false,
        form_id: detail.form_id,
        user_name: detail.data.user_name.clone(),
        content: detail.data.content.clone(),
        status: Some(detail.status.clone()),
        create_time: Some(detail.create_time.clone()),
        response: detail.data.response.clone(),
    }
}

fn route_leave_message(step: &LeaveMessage) -> Dispatch {
    match step {
        LeaveMessage::Add { tips, context_id } => {
            Dispatch::single(Action::AppendAnswer(Renderable::LeaveMessagePrompt {
                context_id: context_id.clone(),
                tips: tips.clone(),
                cancel: FollowUp::new("Cancel", OutboundQuestion::cancel_leave_message(context_id)),
            }))
        }
        LeaveMessage::Success {
            tips,
            context_id,
            msg_id,
        } => Dispatch {
            actions: vec![
                Action::DisableLeaveMessage(context_id.clone()),
                Action::AppendAnswer(Renderable::text(tips.clone())),
            ],
            remember: Some(Remember::LeaveMessage(*msg_id)),
        },
        LeaveMessage::Cancel { tips, context_id } => Dispatch {
            actions: vec![
                Action::DisableLeaveMessage(context_id.clone()),
                Action::AppendAnswer(Renderable::text(tips.clone())),
            ],
            remember: None,
        },
        LeaveMessage::Resp {
            msg,
            tips,
            msg_id,
            resp_pic_urls,
        } => Dispatch::single(Action::AppendAnswer(Renderable::LeaveMessageReply {
            reply: msg.clone(),
            tips: tips.clone(),
            attachments: resp_pic_urls
                .iter()
                .filter(|url| !url.is_empty())
                .cloned()
                .collect(),
            append: FollowUp::new(
                "Append message",
                OutboundQuestion::append_leave_message(*msg_id),
            ),
        })),
    }
}

#[derive(Debug, Default)]
struct Remembered {
    complaint_form_id: Option<i64>,
    leave_message_id: Option<i64>,
}

/// Applies routed messages to a [`Renderer`].
pub struct Dispatcher {
    renderer: Arc<dyn Renderer>,
    remembered: Mutex<Remembered>,
}

impl Dispatcher {
    /// A dispatcher with nothing remembered yet.
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            remembered: Mutex::new(Remembered::default()),
        }
    }

    /// Presents `message`. Fails if the renderer refuses one of the calls;
    /// ids are only remembered once every call succeeded.
    pub fn dispatch(
        &self,
        message: &InboundMessage,
        origin: Origin,
        user_name: &str,
    ) -> RobochatResult<()> {
        if let InboundMessage::Unrecognized(raw) = message {
            warn!(payload = %raw, ?origin, "Unrecognized message, showing raw payload");
        } else {
            debug!(kind = message.kind(), ?origin, "Dispatching message");
        }

        let routed = route(message, origin, user_name);
        for action in routed.actions {
            self.apply(action)?;
        }

        if let Some(remember) = routed.remember {
            let mut remembered = self.remembered.lock();
            match remember {
                Remember::ComplaintForm(id) => remembered.complaint_form_id = Some(id),
                Remember::LeaveMessage(id) => remembered.leave_message_id = Some(id),
            }
        }
        Ok(())
    }

    fn apply(&self, action: Action) -> RobochatResult<()> {
        match action {
            Action::AppendQuestion(item) => self.renderer.append_question(item),
            Action::AppendAnswer(item) => self.renderer.append_answer(item),
            Action::OpenComplaintForm(view) => self.renderer.open_complaint_form(view),
            Action::DisableLeaveMessage(context_id) => {
                self.renderer.disable_leave_message(&context_id)
            }
        }
    }

    /// Form id of the last complaint preview received as an answer.
    pub fn last_complaint_form_id(&self) -> Option<i64> {
        self.remembered.lock().complaint_form_id
    }

    /// Id of the last leave-a-message that was stored successfully.
    pub fn last_leave_message_id(&self) -> Option<i64> {
        self.remembered.lock().leave_message_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{Event, RecordingRenderer};
    use serde_json::json;

    fn decode(payload: serde_json::Value) -> InboundMessage {
        InboundMessage::decode("json", payload)
    }

    #[test]
    fn text_lines_become_one_answer() {
        let msg = InboundMessage::decode("text", json!(["hello", "there"]));
        let routed = route(&msg, Origin::Response, "amy");
        assert_eq!(
            routed.actions,
            vec![Action::AppendAnswer(Renderable::Text {
                lines: vec!["hello".into(), "there".into()]
            })]
        );
        assert!(routed.remember.is_none());
    }

    #[test]
    fn knowledge_card_offers_more_only_when_available() {
        let card = |more: bool| {
            let msg = decode(json!({
                "data_type": "knowledge_content",
                "current_id": 5,
                "more": more,
                "title": "Shipping",
                "contents": []
            }));
            match route(&msg, Origin::Push, "amy").actions.remove(0) {
                Action::AppendAnswer(item) => item
                    .follow_ups()
                    .iter()
                    .map(|f| f.label.clone())
                    .collect::<Vec<_>>(),
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(card(true), vec!["Previous", "More", "Next"]);
        assert_eq!(card(false), vec!["Previous", "Next"]);
    }

    #[test]
    fn complaint_create_falls_back_to_session_user() {
        let msg = decode(json!({
            "data_type": "form",
            "form_type": "complaint",
            "action": "create",
            "default": {"user_name": "", "content": "broken"}
        }));
        match route(&msg, Origin::Response, "amy").actions.remove(0) {
            Action::OpenComplaintForm(view) => {
                assert!(view.editable);
                assert_eq!(view.user_name, "amy");
                assert_eq!(view.content, "broken");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn complaint_preview_side_depends_on_origin() {
        let msg = decode(json!({
            "data_type": "form",
            "form_type": "complaint",
            "action": "preview",
            "form_id": 31,
            "status": "untreated",
            "preview": {"content": "late"}
        }));

        let response = route(&msg, Origin::Response, "amy");
        assert!(matches!(response.actions[0], Action::AppendQuestion(_)));
        assert_eq!(response.remember, Some(Remember::ComplaintForm(31)));

        let push = route(&msg, Origin::Push, "amy");
        assert!(matches!(push.actions[0], Action::AppendAnswer(_)));
        assert!(push.remember.is_none());
    }

    #[test]
    fn complaint_detail_opens_read_only_view() {
        let msg = decode(json!({
            "data_type": "form",
            "form_type": "complaint",
            "action": "detail",
            "form_id": 31,
            "status": "treated",
            "create_time": "2024-01-02 10:00:00",
            "data": {"user_name": "amy", "content": "late", "response": {"msg": "sorry"}}
        }));
        match route(&msg, Origin::Response, "bob").actions.remove(0) {
            Action::OpenComplaintForm(view) => {
                assert!(!view.editable);
                assert_eq!(view.user_name, "amy");
                assert_eq!(view.status.as_deref(), Some("treated"));
                assert_eq!(view.response, Some(json!({"msg": "sorry"})));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn options_pin_each_choice() {
        let msg = decode(json!({
            "data_type": "options",
            "tips": "Did you mean:",
            "options": [
                {"index": "1", "std_question_id": 11, "option_str": "Refunds"},
                {"index": "2", "std_question_id": 12, "option_str": "Returns"}
            ]
        }));
        match route(&msg, Origin::Response, "amy").actions.remove(0) {
            Action::AppendAnswer(Renderable::Options { tips, follow_ups }) => {
                assert_eq!(tips, "Did you mean:");
                assert_eq!(follow_ups[1].label, "Returns");
                assert_eq!(follow_ups[1].question, OutboundQuestion::pinned("2", 12));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn leave_message_success_disables_then_remembers() {
        let msg = decode(json!({
            "data_type": "leave_message",
            "action": "success",
            "tips": "Saved",
            "context_id": "c1",
            "msg_id": 77
        }));
        let routed = route(&msg, Origin::Response, "amy");
        assert_eq!(
            routed.actions,
            vec![
                Action::DisableLeaveMessage("c1".into()),
                Action::AppendAnswer(Renderable::text("Saved")),
            ]
        );
        assert_eq!(routed.remember, Some(Remember::LeaveMessage(77)));
    }

    #[test]
    fn leave_message_reply_skips_empty_attachments() {
        let msg = decode(json!({
            "data_type": "leave_message",
            "action": "resp",
            "msg": "Fixed",
            "tips": "",
            "msg_id": 3,
            "resp_pic_urls": ["", "http://x/a.png"]
        }));
        match route(&msg, Origin::Push, "amy").actions.remove(0) {
            Action::AppendAnswer(Renderable::LeaveMessageReply {
                attachments,
                append,
                ..
            }) => {
                assert_eq!(attachments, vec!["http://x/a.png".to_string()]);
                assert_eq!(append.question, OutboundQuestion::append_leave_message(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_leave_message_action_falls_back() {
        let payload = json!({"data_type": "leave_message", "action": "archive", "context_id": "c1"});
        let routed = route(&decode(payload.clone()), Origin::Push, "amy");
        assert_eq!(
            routed.actions,
            vec![Action::AppendAnswer(Renderable::Fallback { raw: payload })]
        );
    }

    #[test]
    fn dispatcher_records_ids_and_calls_renderer() {
        let renderer = Arc::new(RecordingRenderer::default());
        let dispatcher = Dispatcher::new(renderer.clone());

        let preview = decode(json!({
            "data_type": "form",
            "form_type": "complaint",
            "action": "preview",
            "form_id": 8,
            "status": "new",
            "preview": {"content": "x"}
        }));
        dispatcher.dispatch(&preview, Origin::Response, "amy").unwrap();
        assert_eq!(dispatcher.last_complaint_form_id(), Some(8));
        assert!(dispatcher.last_leave_message_id().is_none());
        assert!(matches!(renderer.events()[0], Event::Question(_)));
    }

    #[test]
    fn renderer_failure_keeps_previous_ids() {
        let renderer = Arc::new(RecordingRenderer::default());
        renderer.fail_appends();
        let dispatcher = Dispatcher::new(renderer);

        let success = decode(json!({
            "data_type": "leave_message",
            "action": "success",
            "tips": "ok",
            "context_id": "c1",
            "msg_id": 5
        }));
        assert!(dispatcher.dispatch(&success, Origin::Push, "amy").is_err());
        assert!(dispatcher.last_leave_message_id().is_none());
    }
}
