use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::protocol::InboundFrame;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{Message, MessageStatus, Sender};

pub const PARSE_ERROR_TEXT: &str = "Error parsing response. Please try again.";
pub const SOCKET_ERROR_TEXT: &str = "WebSocket error. Please try again.";

pub type SharedTranscript = Arc<Mutex<Transcript>>;

/// Why an exchange ended without a normal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Parse,
    Socket,
}

impl FailureKind {
    pub fn text(&self) -> &'static str {
        match self {
            FailureKind::Parse => PARSE_ERROR_TEXT,
            FailureKind::Socket => SOCKET_ERROR_TEXT,
        }
    }
}

/// What applying one frame did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Ignored,
    Updated,
    Completed,
    Failed,
}

impl FrameOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FrameOutcome::Completed | FrameOutcome::Failed)
    }
}

/// Ordered conversation held by one chat view.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTranscript {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends the question and an empty bot reply under a fresh exchange id.
    pub fn begin_exchange(&mut self, question: &str) -> NavigatorResult<Uuid> {
        if question.trim().is_empty() {
            return Err(NavigatorError::validation("Message cannot be empty"));
        }

        let exchange_id = Uuid::new_v4();
        self.messages.push(Message::user(question, exchange_id));
        self.messages.push(Message::bot_placeholder(exchange_id));
        debug!(%exchange_id, "Exchange started");
        Ok(exchange_id)
    }

    pub fn apply_frame(&mut self, exchange_id: Uuid, frame: &InboundFrame) -> FrameOutcome {
        if !frame.belongs_to(exchange_id) {
            warn!(%exchange_id, echoed = frame.exchange_id(), "Dropping frame for another exchange");
            return FrameOutcome::Ignored;
        }

        let Some(message) = self.bot_reply_mut(exchange_id) else {
            warn!(%exchange_id, "No reply placeholder for exchange");
            return FrameOutcome::Ignored;
        };

        if !message.is_in_flight() {
            debug!(%exchange_id, kind = frame.kind(), "Ignoring frame after completion");
            return FrameOutcome::Ignored;
        }

        match frame {
            InboundFrame::Heartbeat => FrameOutcome::Ignored,
            InboundFrame::Unknown { kind } => {
                debug!(%exchange_id, kind = %kind, "Ignoring unknown frame type");
                FrameOutcome::Ignored
            }
            InboundFrame::Chunk { text, .. } => {
                message.content.push_str(text);
                advance(message, MessageStatus::Streaming);
                FrameOutcome::Updated
            }
            InboundFrame::Complete {
                response_text,
                citations,
                ..
            }
            | InboundFrame::Legacy {
                response_text,
                citations,
                ..
            } => {
                message.content = response_text.clone();
                message.citations = citations.clone();
                advance(message, MessageStatus::Received);
                FrameOutcome::Completed
            }
            InboundFrame::Error { message: reason, .. } => {
                warn!(%exchange_id, reason = %reason, "Chat service reported an error");
                message.content = SOCKET_ERROR_TEXT.to_string();
                advance(message, MessageStatus::Received);
                FrameOutcome::Failed
            }
        }
    }

    /// Replaces the in-flight reply with the fixed failure text. Returns false
    /// when the reply had already finished.
    pub fn fail_exchange(&mut self, exchange_id: Uuid, kind: FailureKind) -> bool {
        match self.bot_reply_mut(exchange_id) {
            Some(message) if message.is_in_flight() => {
                message.content = kind.text().to_string();
                message.citations.clear();
                advance(message, MessageStatus::Received);
                true
            }
            _ => false,
        }
    }

    pub fn reply(&self, exchange_id: Uuid) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.sender == Sender::Bot && m.exchange_id == Some(exchange_id))
    }

    fn bot_reply_mut(&mut self, exchange_id: Uuid) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.sender == Sender::Bot && m.exchange_id == Some(exchange_id))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn has_in_flight(&self) -> bool {
        self.messages.iter().any(|m| m.is_in_flight())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

fn advance(message: &mut Message, next: MessageStatus) {
    if message.status.can_transition_to(next) {
        message.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Citation, SourceReference};

    fn chunk(text: &str) -> InboundFrame {
        InboundFrame::Chunk {
            exchange_id: None,
            text: text.to_string(),
        }
    }

    fn complete(text: &str) -> InboundFrame {
        InboundFrame::Complete {
            exchange_id: None,
            response_text: text.to_string(),
            citations: vec![Citation {
                text: String::new(),
                references: vec![SourceReference::new("a.pdf", "s3://kb/a.pdf")],
            }],
        }
    }

    #[test]
    fn test_begin_exchange_rejects_whitespace() {
        let mut transcript = Transcript::new();
        assert!(transcript.begin_exchange("   \t").is_err());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_streaming_then_complete() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_exchange("What is MHFA?").unwrap();
        assert_eq!(transcript.len(), 2);

        assert_eq!(transcript.apply_frame(id, &chunk("Mental ")), FrameOutcome::Updated);
        assert_eq!(transcript.apply_frame(id, &chunk("Health")), FrameOutcome::Updated);
        let reply = transcript.reply(id).unwrap();
        assert_eq!(reply.content, "Mental Health");
        assert_eq!(reply.status, MessageStatus::Streaming);

        assert_eq!(
            transcript.apply_frame(id, &complete("Mental Health First Aid.")),
            FrameOutcome::Completed
        );
        let reply = transcript.reply(id).unwrap();
        assert_eq!(reply.content, "Mental Health First Aid.");
        assert_eq!(reply.status, MessageStatus::Received);
        assert_eq!(reply.citations.len(), 1);
    }

    #[test]
    fn test_heartbeat_is_noop() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_exchange("hi").unwrap();
        assert_eq!(transcript.apply_frame(id, &InboundFrame::Heartbeat), FrameOutcome::Ignored);
        let reply = transcript.reply(id).unwrap();
        assert_eq!(reply.status, MessageStatus::Processing);
        assert!(reply.content.is_empty());
    }

    #[test]
    fn test_first_terminal_wins() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_exchange("hi").unwrap();
        transcript.apply_frame(id, &complete("first"));

        let late = InboundFrame::Legacy {
            exchange_id: None,
            response_text: "second".to_string(),
            citations: vec![],
        };
        assert_eq!(transcript.apply_frame(id, &late), FrameOutcome::Ignored);
        assert_eq!(transcript.apply_frame(id, &chunk(" more")), FrameOutcome::Ignored);
        assert!(!transcript.fail_exchange(id, FailureKind::Socket));
        assert_eq!(transcript.reply(id).unwrap().content, "first");
    }

    #[test]
    fn test_foreign_exchange_frames_dropped() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_exchange("one").unwrap();
        let second = transcript.begin_exchange("two").unwrap();

        let stray = InboundFrame::Chunk {
            exchange_id: Some(second.to_string()),
            text: "for two".to_string(),
        };
        assert_eq!(transcript.apply_frame(first, &stray), FrameOutcome::Ignored);
        assert!(transcript.reply(first).unwrap().content.is_empty());
        assert!(transcript.reply(second).unwrap().content.is_empty());

        transcript.apply_frame(second, &stray);
        assert_eq!(transcript.reply(second).unwrap().content, "for two");
        assert_eq!(transcript.reply(first).unwrap().status, MessageStatus::Processing);
    }

    #[test]
    fn test_fail_exchange_once() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_exchange("hi").unwrap();
        transcript.apply_frame(id, &chunk("partial"));

        assert!(transcript.fail_exchange(id, FailureKind::Parse));
        assert!(!transcript.fail_exchange(id, FailureKind::Socket));
        let reply = transcript.reply(id).unwrap();
        assert_eq!(reply.content, PARSE_ERROR_TEXT);
        assert_eq!(reply.status, MessageStatus::Received);
    }

    #[test]
    fn test_error_frame() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_exchange("hi").unwrap();
        let frame = InboundFrame::Error {
            exchange_id: None,
            message: "boom".to_string(),
        };
        assert_eq!(transcript.apply_frame(id, &frame), FrameOutcome::Failed);
        assert_eq!(transcript.reply(id).unwrap().content, SOCKET_ERROR_TEXT);
        assert!(!transcript.has_in_flight());
    }
}
