use crate::wire::SearchRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Collection handling chat plugins (forms, leave-a-message).
pub const CHAT_COLLECTION: &str = "chat";
/// Collection holding knowledge-base chapters.
pub const KNOWLEDGE_COLLECTION: &str = "knowledge";

const KNOWLEDGE_ACTION_TAG: &str = "knowledge_direct_action";
const FORM_ACTION_TAG: &str = "form_direct_action";
const LEAVE_MESSAGE_ACTION_TAG: &str = "leave_message_direct_action";

/// A question to submit. Constructed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundQuestion {
    /// Free text, an option index or a JSON direct-action payload.
    pub text: String,
    /// Restricts matching to one topic collection.
    pub collection: Option<String>,
    /// Selects a pinned answer instead of free-text matching.
    pub std_question_id: Option<i64>,
    /// Routes the question to a plugin action.
    pub std_question_tag: Option<String>,
}

/// Navigation inside a knowledge chapter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeNav {
    /// Previous chapter.
    Prev,
    /// Next chapter.
    Next,
    /// Further pages of the current chapter.
    More,
}

impl KnowledgeNav {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prev => "prev",
            Self::Next => "next",
            Self::More => "more",
        }
    }
}

impl OutboundQuestion {
    /// A free-text question.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            collection: None,
            std_question_id: None,
            std_question_tag: None,
        }
    }

    /// Restricts the question to `collection`.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Pins the answer to `std_question_id` (selecting a listed option).
    pub fn pinned(text: impl Into<String>, std_question_id: i64) -> Self {
        Self {
            std_question_id: Some(std_question_id),
            ..Self::new(text)
        }
    }

    /// Requests the previous, next or following page of a knowledge chapter.
    pub fn knowledge(nav: KnowledgeNav, chapter_id: i64) -> Self {
        Self::direct_action(
            json!({"action": nav.as_str(), "chapter_id": chapter_id}),
            KNOWLEDGE_COLLECTION,
            KNOWLEDGE_ACTION_TAG,
        )
    }

    /// Fetches the full record of a complaint form.
    pub fn complaint_detail(form_id: i64) -> Self {
        Self::direct_action(
            json!({"form_type": "complaint", "action": "get", "form_id": form_id}),
            CHAT_COLLECTION,
            FORM_ACTION_TAG,
        )
    }

    /// Submits a filled-in complaint form on behalf of `user_id`.
    pub fn save_complaint(
        user_id: i64,
        user_name: &str,
        complainant: &str,
        content: &str,
    ) -> Self {
        Self::direct_action(
            json!({
                "form_type": "complaint",
                "action": "save",
                "user_id": user_id,
                "user_name": user_name,
                "data": {"user_name": complainant, "content": content},
            }),
            CHAT_COLLECTION,
            FORM_ACTION_TAG,
        )
    }

    /// Abandons the leave-a-message flow identified by `context_id`.
    pub fn cancel_leave_message(context_id: &str) -> Self {
        Self::direct_action(
            json!({"action": "cancle", "context_id": context_id}),
            CHAT_COLLECTION,
            LEAVE_MESSAGE_ACTION_TAG,
        )
    }

    /// Attaches an uploaded file `url` to the flow identified by `context_id`.
    pub fn leave_message_upload(context_id: &str, url: &str) -> Self {
        Self::direct_action(
            json!({"action": "upload_file", "context_id": context_id, "url": url}),
            CHAT_COLLECTION,
            LEAVE_MESSAGE_ACTION_TAG,
        )
    }

    /// Starts a follow-up message on the thread of `msg_id`.
    pub fn append_leave_message(msg_id: i64) -> Self {
        Self::direct_action(
            json!({"ref_id": msg_id}),
            CHAT_COLLECTION,
            LEAVE_MESSAGE_ACTION_TAG,
        )
    }

    fn direct_action(payload: serde_json::Value, collection: &str, tag: &str) -> Self {
        Self {
            text: payload.to_string(),
            collection: Some(collection.to_string()),
            std_question_id: None,
            std_question_tag: Some(tag.to_string()),
        }
    }

    /// Builds the submission body for `session_id`.
    pub fn to_request(&self, session_id: &str) -> SearchRequest {
        SearchRequest {
            session_id: session_id.to_string(),
            question: self.text.clone(),
            collection: self.collection.clone(),
            std_question_id: self.std_question_id,
            std_question_tag: self.std_question_tag.clone(),
        }
    }
}
