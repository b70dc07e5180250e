/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text to ask.
    Ask(String),
    /// `/N`: submit follow-up number `N`.
    FollowUp(usize),
    /// `/complaint <text>`: file a complaint.
    Complaint(String),
    /// `/upload <context_id> <url>`: attach a file to a leave-a-message flow.
    Upload {
        /// Flow the file belongs to.
        context_id: String,
        /// Where the file was uploaded.
        url: String,
    },
    /// `/reply-complaint <text>`: answer the last complaint as the operator.
    ReplyComplaint(String),
    /// `/reply-message <text>`: answer the last left message as the operator.
    ReplyMessage(String),
    /// `/push <text>`: queue a message for this user from the service side.
    Push(String),
    /// `/help`.
    Help,
    /// `/quit` or `/exit`.
    Quit,
    /// A blank line.
    Empty,
    /// A slash command that could not be parsed, with a hint.
    Invalid(String),
}

/// Text printed by `/help`.
pub const HELP: &str = "\
Type a question and press enter.
  /N                          pick follow-up number N
  /complaint <text>           file a complaint
  /upload <context_id> <url>  attach an uploaded file to a message
  /reply-complaint <text>     answer the last complaint as the operator
  /reply-message <text>       answer the last left message as the operator
  /push <text>                queue a service message for yourself
  /help                       show this help
  /quit                       leave";

impl Command {
    /// Interpret one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        match name {
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            "complaint" if !args.is_empty() => Self::Complaint(args.to_string()),
            "complaint" => Self::Invalid("usage: /complaint <text>".into()),
            "reply-complaint" if !args.is_empty() => Self::ReplyComplaint(args.to_string()),
            "reply-complaint" => Self::Invalid("usage: /reply-complaint <text>".into()),
            "reply-message" if !args.is_empty() => Self::ReplyMessage(args.to_string()),
            "reply-message" => Self::Invalid("usage: /reply-message <text>".into()),
            "push" if !args.is_empty() => Self::Push(args.to_string()),
            "push" => Self::Invalid("usage: /push <text>".into()),
            "upload" => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(context_id), Some(url), None) => Self::Upload {
                        context_id: context_id.to_string(),
                        url: url.to_string(),
                    },
                    _ => Self::Invalid("usage: /upload <context_id> <url>".into()),
                }
            }
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 && args.is_empty() => Self::FollowUp(n),
                _ => Self::Invalid(format!("unknown command '/{other}', try /help")),
            },
        }
    }
}
