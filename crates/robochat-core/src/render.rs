use crate::error::{RobochatError, RobochatResult};
use crate::message::KnowledgeSection;
use crate::question::OutboundQuestion;
use serde::Serialize;

/// Where an inbound message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Direct answer to a question this client submitted.
    Response,
    /// Pushed by the service and collected by the poll loop.
    Push,
}

/// A question attached to a rendered item, submitted if the user picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUp {
    /// Text of the link or button.
    pub label: String,
    /// Question submitted when it is picked.
    pub question: OutboundQuestion,
}

impl FollowUp {
    /// A follow-up labelled `label` that submits `question`.
    pub fn new(label: impl Into<String>, question: OutboundQuestion) -> Self {
        Self {
            label: label.into(),
            question,
        }
    }
}

/// Presentation-neutral transcript entry handed to the [`Renderer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Renderable {
    /// Plain lines.
    Text {
        /// Lines in display order.
        lines: Vec<String>,
    },
    /// A knowledge chapter card.
    Knowledge {
        /// Chapter title.
        title: String,
        /// Paragraphs.
        sections: Vec<KnowledgeSection>,
        /// Previous, more (when available) and next.
        follow_ups: Vec<FollowUp>,
    },
    /// Summary of a submitted complaint.
    ComplaintSummary {
        /// Complaint id.
        form_id: i64,
        /// Processing state.
        status: String,
        /// Complaint text.
        content: String,
        /// Opens the full record.
        details: FollowUp,
    },
    /// A prompt with selectable options.
    Options {
        /// Prompt text.
        tips: String,
        /// One per option.
        follow_ups: Vec<FollowUp>,
    },
    /// An open leave-a-message flow accepting uploads.
    LeaveMessagePrompt {
        /// Flow id.
        context_id: String,
        /// Prompt text.
        tips: String,
        /// Abandons the flow.
        cancel: FollowUp,
    },
    /// An operator reply to a left message.
    LeaveMessageReply {
        /// Reply text.
        reply: String,
        /// Extra hint.
        tips: String,
        /// Attached picture urls, none empty.
        attachments: Vec<String>,
        /// Continues the thread.
        append: FollowUp,
    },
    /// Payload this client could not interpret, shown verbatim.
    Fallback {
        /// The payload as received.
        raw: serde_json::Value,
    },
}

impl Renderable {
    /// A single line of text.
    pub fn text(line: impl Into<String>) -> Self {
        Self::Text {
            lines: vec![line.into()],
        }
    }

    /// Every follow-up the item offers, in display order.
    pub fn follow_ups(&self) -> Vec<&FollowUp> {
        match self {
            Self::Knowledge { follow_ups, .. } | Self::Options { follow_ups, .. } => {
                follow_ups.iter().collect()
            }
            Self::ComplaintSummary { details, .. } => vec![details],
            Self::LeaveMessagePrompt { cancel, .. } => vec![cancel],
            Self::LeaveMessageReply { append, .. } => vec![append],
            Self::Text { .. } | Self::Fallback { .. } => Vec::new(),
        }
    }
}

/// Contents of the complaint dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintView {
    /// `true` for a new complaint, `false` for a read-only record.
    pub editable: bool,
    /// Id of an existing record.
    pub form_id: Option<i64>,
    /// Complainant name.
    pub user_name: String,
    /// Complaint text, or the suggested text of a new one.
    pub content: String,
    /// Processing state of an existing record.
    pub status: Option<String>,
    /// Submission time of an existing record.
    pub create_time: Option<String>,
    /// Operator response, if any.
    pub response: Option<serde_json::Value>,
}

/// The presentation collaborator.
///
/// The protocol core never formats output itself; it only calls these
/// methods. Implementations serialize transcript updates internally, the
/// poll loop and answer requests may call them from different tasks.
pub trait Renderer: Send + Sync {
    /// A request is in flight.
    fn show_pending(&self);

    /// The request started by the matching [`Renderer::show_pending`] ended.
    fn hide_pending(&self);

    /// Adds an entry on the user side of the transcript.
    fn append_question(&self, item: Renderable) -> RobochatResult<()>;

    /// Adds an entry on the service side of the transcript.
    fn append_answer(&self, item: Renderable) -> RobochatResult<()>;

    /// Opens the complaint dialog.
    fn open_complaint_form(&self, view: ComplaintView) -> RobochatResult<()>;

    /// Disables upload/cancel for a finished leave-a-message flow.
    fn disable_leave_message(&self, context_id: &str) -> RobochatResult<()>;

    /// Blocking user-visible error notification.
    fn notify_error(&self, error: &RobochatError);
}
