use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sender {
    User,
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "USER"),
            Sender::Bot => write!(f, "BOT"),
        }
    }
}

/// Lifecycle of a chat message.
///
/// User messages are created `Sent`. Bot messages start `Processing`, move to
/// `Streaming` on the first chunk and end `Received`. The order is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Sent,
    Processing,
    Streaming,
    Received,
}

impl MessageStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, MessageStatus::Processing | MessageStatus::Streaming)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, MessageStatus::Sent | MessageStatus::Received)
    }

    /// Streaming may repeat; every other move must go forward.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        match (self, next) {
            (MessageStatus::Processing, MessageStatus::Streaming)
            | (MessageStatus::Processing, MessageStatus::Received)
            | (MessageStatus::Streaming, MessageStatus::Streaming)
            | (MessageStatus::Streaming, MessageStatus::Received) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageStatus::Sent => write!(f, "SENT"),
            MessageStatus::Processing => write!(f, "PROCESSING"),
            MessageStatus::Streaming => write!(f, "STREAMING"),
            MessageStatus::Received => write!(f, "RECEIVED"),
        }
    }
}

/// A document the answer was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    #[serde(default)]
    pub title: String,
    #[serde(alias = "uri")]
    pub source: String,
}

impl SourceReference {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
        }
    }

    /// Title, falling back to the last path segment of the source.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }
        self.source.rsplit('/').next().unwrap_or(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CitationRepr")]
pub struct Citation {
    pub text: String,
    pub references: Vec<SourceReference>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CitationRepr {
    Flat(SourceReference),
    Grouped {
        #[serde(default)]
        text: String,
        #[serde(default)]
        references: Vec<SourceReference>,
    },
}

impl From<CitationRepr> for Citation {
    fn from(repr: CitationRepr) -> Self {
        match repr {
            CitationRepr::Grouped { text, references } => Citation { text, references },
            CitationRepr::Flat(reference) => Citation {
                text: String::new(),
                references: vec![reference],
            },
        }
    }
}

/// Unique sources across a list of citations, in first-seen order.
pub fn unique_sources(citations: &[Citation]) -> Vec<&SourceReference> {
    let mut seen = std::collections::HashSet::new();
    citations
        .iter()
        .flat_map(|c| c.references.iter())
        .filter(|r| seen.insert(r.source.as_str()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Correlates a user question with the bot reply and every frame of its socket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_id: Option<Uuid>,
    pub sender: Sender,
    pub content: String,
    pub status: MessageStatus,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>, exchange_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            exchange_id: Some(exchange_id),
            sender: Sender::User,
            content: content.into(),
            status: MessageStatus::Sent,
            citations: Vec::new(),
            file_name: None,
            file_status: None,
            created_at: Utc::now(),
        }
    }

    pub fn bot_placeholder(exchange_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            exchange_id: Some(exchange_id),
            sender: Sender::Bot,
            content: String::new(),
            status: MessageStatus::Processing,
            citations: Vec::new(),
            file_name: None,
            file_status: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}
