//! Line-oriented [`Renderer`] for the interactive client.
//!
//! Follow-ups get a running number as they are printed; the user picks one
//! with `/N`.

use parking_lot::Mutex;
use robochat_core::{ComplaintView, FollowUp, Renderable, Renderer, RobochatError, RobochatResult};
use std::collections::HashSet;
use std::fmt::Write as _;

#[derive(Default)]
struct State {
    follow_ups: Vec<FollowUp>,
    closed_flows: HashSet<String>,
    complaint_name: Option<String>,
}

/// Prints the transcript to stdout and remembers what later commands refer to.
#[derive(Default)]
pub struct TerminalRenderer {
    state: Mutex<State>,
}

impl TerminalRenderer {
    /// A renderer with an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow-up printed as number `n`.
    pub fn follow_up(&self, n: usize) -> Option<FollowUp> {
        let index = n.checked_sub(1)?;
        self.state.lock().follow_ups.get(index).cloned()
    }

    /// Whether the leave-a-message flow `context_id` was closed.
    pub fn is_closed(&self, context_id: &str) -> bool {
        self.state.lock().closed_flows.contains(context_id)
    }

    /// Name pre-filled by the last complaint form the service opened.
    pub fn complaint_name(&self) -> Option<String> {
        self.state.lock().complaint_name.clone()
    }

    /// Formats `item`, numbering its follow-ups.
    pub fn format(&self, item: &Renderable) -> String {
        let mut out = String::new();
        match item {
            Renderable::Text { lines } => out.push_str(&lines.join("\n")),
            Renderable::Knowledge {
                title, sections, ..
            } => {
                let _ = writeln!(out, "== {title} ==");
                for section in sections {
                    if let Some(image) = &section.images {
                        let _ = writeln!(out, "[image] {} {}", image.url, image.notes);
                    }
                    let _ = writeln!(out, "{}", section.content);
                }
            }
            Renderable::ComplaintSummary {
                form_id,
                status,
                content,
                ..
            } => {
                let _ = writeln!(out, "Complaint #{form_id} [{status}]");
                out.push_str(content);
            }
            Renderable::Options { tips, .. } => out.push_str(tips),
            Renderable::LeaveMessagePrompt {
                context_id, tips, ..
            } => {
                let _ = writeln!(out, "{tips}");
                let _ = write!(out, "(attach files with /upload {context_id} <url>)");
            }
            Renderable::LeaveMessageReply {
                reply,
                tips,
                attachments,
                ..
            } => {
                let _ = write!(out, "Reply: {reply}");
                if !tips.is_empty() {
                    let _ = write!(out, "\n{tips}");
                }
                for (i, url) in attachments.iter().enumerate() {
                    let _ = write!(out, "\nattachment {}: {url}", i + 1);
                }
            }
            Renderable::Fallback { raw } => {
                let _ = write!(out, "Unsupported message: {raw}");
            }
        }

        let follow_ups = item.follow_ups();
        if !follow_ups.is_empty() {
            let mut state = self.state.lock();
            for follow_up in follow_ups {
                state.follow_ups.push(follow_up.clone());
                let _ = write!(out, "\n  [{}] {}", state.follow_ups.len(), follow_up.label);
            }
        }
        out.trim_end().to_string()
    }

    fn format_form(&self, view: &ComplaintView) -> String {
        let mut out = String::new();
        if view.editable {
            let _ = writeln!(out, "New complaint for {}", view.user_name);
            if !view.content.is_empty() {
                let _ = writeln!(out, "Suggested text: {}", view.content);
            }
            out.push_str("Submit it with /complaint <text>");
        } else {
            let _ = writeln!(
                out,
                "Complaint #{} by {}",
                view.form_id.unwrap_or_default(),
                view.user_name
            );
            if let (Some(status), Some(created)) = (&view.status, &view.create_time) {
                let _ = writeln!(out, "Status: {status}, filed {created}");
            }
            out.push_str(&view.content);
            if let Some(response) = &view.response {
                let _ = write!(out, "\nResponse: {response}");
            }
        }
        out
    }
}

impl Renderer for TerminalRenderer {
    fn show_pending(&self) {
        println!("  ...");
    }

    // Nothing to erase on a line terminal.
    fn hide_pending(&self) {}

    fn append_question(&self, item: Renderable) -> RobochatResult<()> {
        println!("you> {}", self.format(&item));
        Ok(())
    }

    fn append_answer(&self, item: Renderable) -> RobochatResult<()> {
        println!("bot> {}", self.format(&item));
        Ok(())
    }

    fn open_complaint_form(&self, view: ComplaintView) -> RobochatResult<()> {
        if view.editable {
            self.state.lock().complaint_name = Some(view.user_name.clone());
        }
        println!("{}", self.format_form(&view));
        Ok(())
    }

    fn disable_leave_message(&self, context_id: &str) -> RobochatResult<()> {
        self.state.lock().closed_flows.insert(context_id.to_string());
        Ok(())
    }

    fn notify_error(&self, error: &RobochatError) {
        eprintln!("error: {error}");
    }
}
