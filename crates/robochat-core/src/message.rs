//! Typed inbound messages.
//!
//! Answers and pushed messages arrive as a `(type, payload)` pair where the
//! type is `text` (a list of lines) or `json` (an object tagged by
//! `data_type` and, for some kinds, a second-level tag). Decoding happens once
//! here; anything that does not fit a known shape becomes
//! [`InboundMessage::Unrecognized`] so it can still be shown.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded message from the service.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Plain answer text, one entry per line.
    Text(Vec<String>),
    /// A chapter of knowledge-base content.
    Knowledge(KnowledgeContent),
    /// A complaint form in one of its states.
    Complaint(ComplaintMessage),
    /// A multiple-choice prompt.
    Options(OptionList),
    /// A step of the leave-a-message flow.
    LeaveMessage(LeaveMessage),
    /// Anything this client does not understand, kept verbatim.
    Unrecognized(Value),
}

impl InboundMessage {
    /// Decodes a payload given its wire type (`answer_type` / `msg_type`).
    pub fn decode(kind: &str, payload: Value) -> Self {
        if kind == "text" {
            return match payload {
                Value::Array(items) => Self::Text(items.iter().map(line_of).collect()),
                Value::String(line) => Self::Text(vec![line]),
                other => Self::Unrecognized(other),
            };
        }

        match serde_json::from_value::<JsonPayload>(payload.clone()) {
            Ok(decoded) => decoded.into(),
            Err(e) => {
                tracing::debug!(kind, error = %e, "Payload does not match a known shape");
                Self::Unrecognized(payload)
            }
        }
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Knowledge(_) => "knowledge_content",
            Self::Complaint(_) => "form",
            Self::Options(_) => "options",
            Self::LeaveMessage(_) => "leave_message",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

fn line_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── JSON payload shapes ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
enum JsonPayload {
    KnowledgeContent(KnowledgeContent),
    Form(FormPayload),
    Options(OptionList),
    LeaveMessage(LeaveMessage),
}

#[derive(Deserialize)]
#[serde(tag = "form_type", rename_all = "snake_case")]
enum FormPayload {
    Complaint(ComplaintMessage),
}

impl From<JsonPayload> for InboundMessage {
    fn from(payload: JsonPayload) -> Self {
        match payload {
            JsonPayload::KnowledgeContent(content) => Self::Knowledge(content),
            JsonPayload::Form(FormPayload::Complaint(form)) => Self::Complaint(form),
            JsonPayload::Options(options) => Self::Options(options),
            JsonPayload::LeaveMessage(step) => Self::LeaveMessage(step),
        }
    }
}

/// A knowledge chapter and the id used to navigate from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeContent {
    /// Chapter id the navigation follow-ups refer to.
    pub current_id: i64,
    /// Whether the chapter has further pages.
    #[serde(default)]
    pub more: bool,
    /// Chapter title.
    #[serde(default)]
    pub title: String,
    /// Body paragraphs in display order.
    #[serde(default)]
    pub contents: Vec<KnowledgeSection>,
}

/// One paragraph of a knowledge chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSection {
    /// Paragraph text.
    #[serde(default)]
    pub content: String,
    /// Illustration shown next to the paragraph.
    #[serde(default)]
    pub images: Option<KnowledgeImage>,
}

/// Image attached to a knowledge paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeImage {
    /// Full-size image.
    pub url: String,
    /// Thumbnail, empty when the service has none.
    #[serde(default)]
    pub thumbnail: String,
    /// Caption.
    #[serde(default)]
    pub notes: String,
    /// Placement hint, `left` or `right`.
    #[serde(default)]
    pub para: String,
}

/// Complaint form states, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ComplaintMessage {
    /// Ask the user to fill in a new complaint.
    Create(ComplaintDraft),
    /// Compact summary of a submitted complaint.
    Preview(ComplaintPreview),
    /// Full record, including the operator response if any.
    Detail(ComplaintDetail),
}

/// A new complaint the user is asked to fill in.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComplaintDraft {
    /// Values to pre-fill the form with.
    #[serde(default, rename = "default")]
    pub defaults: ComplaintDefaults,
}

/// Pre-filled values of a [`ComplaintDraft`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComplaintDefaults {
    /// Complainant name; the session user is used when absent or empty.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Suggested complaint text.
    #[serde(default)]
    pub content: Option<String>,
}

/// Summary of a submitted complaint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComplaintPreview {
    /// Id later replies and detail requests refer to.
    pub form_id: i64,
    /// Processing state, e.g. `untreated`.
    #[serde(default)]
    pub status: String,
    /// Shortened complaint text.
    #[serde(default)]
    pub preview: ComplaintPreviewBody,
}

/// Body of a [`ComplaintPreview`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComplaintPreviewBody {
    /// Complaint text, possibly truncated.
    #[serde(default)]
    pub content: String,
}

/// Full record of a complaint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComplaintDetail {
    /// Form id, when the service sends it.
    #[serde(default)]
    pub form_id: Option<i64>,
    /// Processing state.
    #[serde(default)]
    pub status: String,
    /// Submission time as formatted by the service.
    #[serde(default)]
    pub create_time: String,
    /// What was filed and how it was answered.
    #[serde(default)]
    pub data: ComplaintData,
}

/// Contents of a [`ComplaintDetail`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComplaintData {
    /// Complainant name.
    #[serde(default)]
    pub user_name: String,
    /// Complaint text.
    #[serde(default)]
    pub content: String,
    /// Operator response, kept as sent.
    #[serde(default)]
    pub response: Option<Value>,
}

/// A tip line followed by selectable options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionList {
    /// Prompt shown above the options.
    #[serde(default)]
    pub tips: String,
    /// Choices in display order.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

/// One choice of an [`OptionList`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerOption {
    /// Echoed back as the question text when selected.
    #[serde(default)]
    pub index: Value,
    /// Answer the option is pinned to.
    pub std_question_id: i64,
    /// Label.
    #[serde(default)]
    pub option_str: String,
}

impl AnswerOption {
    /// The index as question text (strings unquoted).
    pub fn index_text(&self) -> String {
        line_of(&self.index)
    }
}

/// Leave-a-message flow steps, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LeaveMessage {
    /// The flow started; offer upload and cancel for `context_id`.
    Add {
        /// Prompt text.
        #[serde(default)]
        tips: String,
        /// Flow id used by upload and cancel.
        context_id: String,
    },
    /// The message was stored as `msg_id`.
    Success {
        /// Confirmation text.
        #[serde(default)]
        tips: String,
        /// Flow that is now closed.
        context_id: String,
        /// Id of the stored message.
        msg_id: i64,
    },
    /// The user abandoned the flow.
    #[serde(rename = "cancle", alias = "cancel")]
    Cancel {
        /// Confirmation text.
        #[serde(default)]
        tips: String,
        /// Flow that is now closed.
        context_id: String,
    },
    /// An operator replied to message `msg_id`.
    Resp {
        /// Operator reply.
        #[serde(default)]
        msg: String,
        /// Extra hint shown under the reply.
        #[serde(default)]
        tips: String,
        /// Message the reply belongs to.
        msg_id: i64,
        /// Attached pictures; empty entries are skipped when shown.
        #[serde(default)]
        resp_pic_urls: Vec<String>,
    },
}
