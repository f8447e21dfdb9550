//! Line-oriented terminal front end.
//!
//! Renders conversation snapshots and turns typed lines into submissions or
//! feedback. Plain text is sent to the assistant; lines starting with `/`
//! are commands.

use adkar_chat::{ConversationController, FeedbackRecorder, IgnoreReason, SubmitOutcome};
use adkar_core::types::{FeedbackCategory, Message, Role, RATING_MAX};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Type a question to chat. Commands:
  /rate <1-5> [category,...] [comment]  rate the latest reply
  /categories                           list feedback categories
  /history                              show the conversation
  /help                                 show this help
  /quit                                 exit
";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Rate {
        rating: u8,
        categories: Vec<String>,
        comment: String,
    },
    Categories,
    History,
    Help,
    Quit,
    Invalid(String),
}

/// Parse one line of user input.
///
/// For `/rate`, the token after the rating is taken as a category list only
/// when every comma-separated id is a known category; otherwise it starts
/// the comment.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Command::Say(trimmed.to_string());
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match name {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/history" => Command::History,
        "/categories" => Command::Categories,
        "/rate" => parse_rate(rest),
        other => Command::Invalid(format!("unknown command {}", other)),
    }
}

fn parse_rate(args: &str) -> Command {
    let mut parts = args.splitn(2, char::is_whitespace);
    let rating = match parts.next().map(str::parse::<u8>) {
        Some(Ok(r)) if r <= RATING_MAX => r,
        _ => return Command::Invalid(format!("rating must be 0-{}", RATING_MAX)),
    };
    let mut rest = parts.next().unwrap_or_default().trim();

    let mut categories = Vec::new();
    if let Some(first) = rest.split_whitespace().next() {
        let ids: Vec<&str> = first.split(',').filter(|s| !s.is_empty()).collect();
        if !ids.is_empty() && ids.iter().all(|id| FeedbackCategory::is_known(id)) {
            categories = ids.into_iter().map(str::to_string).collect();
            rest = rest[first.len()..].trim();
        }
    }

    Command::Rate {
        rating,
        categories,
        comment: rest.to_string(),
    }
}

/// Terminal session state: the chat core plus the feedback recorder.
pub struct Session {
    controller: ConversationController,
    recorder: FeedbackRecorder,
}

impl Session {
    pub fn new(controller: ConversationController, recorder: FeedbackRecorder) -> Self {
        Self {
            controller,
            recorder,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Read lines until EOF or `/quit`.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(b"How can I help you today? (/help for commands)\n")
            .await?;
        writer.flush().await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let keep_going = self.handle(parse_command(&line), &mut writer).await?;
            writer.flush().await?;
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command. Returns `false` when the session should end.
    pub async fn handle<W>(&self, command: Command, writer: &mut W) -> std::io::Result<bool>
    where
        W: AsyncWrite + Unpin,
    {
        match command {
            Command::Say(text) => match self.controller.submit(&text).await {
                SubmitOutcome::Replied { assistant, .. } => {
                    write_message(writer, &assistant).await?;
                }
                SubmitOutcome::Failed { .. } => {
                    // Nothing to render: the user message stays, no reply.
                }
                SubmitOutcome::Ignored(IgnoreReason::Busy) => {
                    writer.write_all(b"(still answering, please wait)\n").await?;
                }
                SubmitOutcome::Ignored(IgnoreReason::EmptyInput) => {}
            },
            Command::Rate {
                rating,
                categories,
                comment,
            } => {
                let state = self.controller.state();
                let Some(target) = state.last_assistant() else {
                    writer.write_all(b"(no reply to rate yet)\n").await?;
                    return Ok(true);
                };
                match self
                    .recorder
                    .record(target.id(), rating, categories, comment)
                    .await
                {
                    Ok(_) => writer.write_all(b"(thanks for the feedback)\n").await?,
                    Err(e) => {
                        let line = format!("(feedback not sent: {})\n", e);
                        writer.write_all(line.as_bytes()).await?;
                    }
                }
            }
            Command::Categories => {
                for category in FeedbackCategory::all() {
                    let line = format!("  {:<13} {}\n", category.id, category.label);
                    writer.write_all(line.as_bytes()).await?;
                }
            }
            Command::History => {
                for message in &self.controller.state().messages {
                    write_message(writer, message).await?;
                }
            }
            Command::Help => writer.write_all(HELP.as_bytes()).await?,
            Command::Quit => return Ok(false),
            Command::Invalid(reason) => {
                let line = format!("({}; /help for commands)\n", reason);
                writer.write_all(line.as_bytes()).await?;
            }
        }
        Ok(true)
    }
}

async fn write_message<W>(writer: &mut W, message: &Message) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let prefix = match message.role() {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let line = format!("{}> {}\n", prefix, message.content());
    writer.write_all(line.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use adkar_chat::{ConversationStore, JsonFileSink, KeywordResolver, LogSink};

    fn session() -> Session {
        let controller = ConversationController::new(
            Arc::new(ConversationStore::new()),
            Arc::new(KeywordResolver::default()),
        );
        Session::new(controller, FeedbackRecorder::new(Arc::new(LogSink)))
    }

    // ---- Parsing ----

    #[test]
    fn test_plain_text_is_say() {
        assert_eq!(
            parse_command("  What is ADKAR? "),
            Command::Say("What is ADKAR?".to_string())
        );
        assert_eq!(parse_command("   "), Command::Say(String::new()));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("/categories"), Command::Categories);
        assert!(matches!(parse_command("/dance"), Command::Invalid(_)));
    }

    #[test]
    fn test_rate_with_categories_and_comment() {
        assert_eq!(
            parse_command("/rate 2 clarity,completeness too vague"),
            Command::Rate {
                rating: 2,
                categories: vec!["clarity".to_string(), "completeness".to_string()],
                comment: "too vague".to_string(),
            }
        );
    }

    #[test]
    fn test_rate_comment_only() {
        assert_eq!(
            parse_command("/rate 5 spot on"),
            Command::Rate {
                rating: 5,
                categories: vec![],
                comment: "spot on".to_string(),
            }
        );
    }

    #[test]
    fn test_rate_bare() {
        assert_eq!(
            parse_command("/rate 0"),
            Command::Rate {
                rating: 0,
                categories: vec![],
                comment: String::new(),
            }
        );
    }

    #[test]
    fn test_rate_invalid_rating() {
        assert!(matches!(parse_command("/rate 9"), Command::Invalid(_)));
        assert!(matches!(parse_command("/rate lots"), Command::Invalid(_)));
        assert!(matches!(parse_command("/rate"), Command::Invalid(_)));
    }

    // ---- Session ----

    #[tokio::test]
    async fn test_run_chats_and_quits() {
        let session = session();
        let input: &[u8] = b"Tell me about Kotter\n\n/quit\nhello\n";
        let mut output = Vec::new();

        session.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("assistant> Kotter's 8-Step Process"));
        // Nothing after /quit is processed.
        assert_eq!(session.controller().state().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_before_any_reply() {
        let session = session();
        let mut output = Vec::new();
        session
            .handle(parse_command("/rate 4"), &mut output)
            .await
            .unwrap();
        assert!(String::from_utf8(output).unwrap().contains("no reply to rate"));
    }

    #[tokio::test]
    async fn test_rate_writes_feedback_for_latest_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let controller = ConversationController::new(
            Arc::new(ConversationStore::new()),
            Arc::new(KeywordResolver::default()),
        );
        let session = Session::new(
            controller,
            FeedbackRecorder::new(Arc::new(JsonFileSink::new(&path))),
        );

        let input: &[u8] = b"Lewin\n/rate 3 accuracy needs examples\n";
        let mut output = Vec::new();
        session.run(input, &mut output).await.unwrap();

        let reply_id = session
            .controller()
            .state()
            .last_assistant()
            .unwrap()
            .id()
            .to_string();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(&reply_id));
        assert!(written.contains("needs examples"));
        assert!(String::from_utf8(output).unwrap().contains("thanks"));
    }

    #[tokio::test]
    async fn test_history_and_categories_render() {
        let session = session();
        let mut output = Vec::new();
        session
            .handle(Command::Say("hello".to_string()), &mut output)
            .await
            .unwrap();
        session.handle(Command::History, &mut output).await.unwrap();
        session.handle(Command::Categories, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("you> hello"));
        assert!(text.contains("Response Accuracy"));
    }
}
