use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{Citation, UserRole};

pub const SEND_MESSAGE_ACTION: &str = "sendMessage";

/// The single envelope sent once the socket is open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundEnvelope {
    pub action: String,
    pub querytext: String,
    pub session_id: String,
    pub user_role: UserRole,
    pub exchange_id: Uuid,
}

impl OutboundEnvelope {
    pub fn send_message(
        question: impl Into<String>,
        session_id: Uuid,
        role: UserRole,
        exchange_id: Uuid,
    ) -> Self {
        Self {
            action: SEND_MESSAGE_ACTION.to_string(),
            querytext: question.into(),
            session_id: session_id.to_string(),
            user_role: role,
            exchange_id,
        }
    }

    pub fn to_json(&self) -> NavigatorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Empty keep-alive payload.
    Heartbeat,
    Chunk {
        exchange_id: Option<String>,
        text: String,
    },
    Complete {
        exchange_id: Option<String>,
        response_text: String,
        citations: Vec<Citation>,
    },
    /// Pre-streaming reply: `{responsetext, citations}` with no `type`.
    Legacy {
        exchange_id: Option<String>,
        response_text: String,
        citations: Vec<Citation>,
    },
    Error {
        exchange_id: Option<String>,
        message: String,
    },
    /// Well-formed JSON of a `type` this client does not know.
    Unknown { kind: String },
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    chunk: Option<String>,
    responsetext: Option<String>,
    citations: Option<Value>,
    message: Option<String>,
    error: Option<String>,
    exchange_id: Option<Value>,
}

/// Keeps the citations that decode and skips the rest.
fn lenient_citations(value: Option<Value>) -> Vec<Citation> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(other) => {
            debug!("Ignoring citations that are not a list: {}", other);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Citation>(item) {
            Ok(citation) => Some(citation),
            Err(e) => {
                debug!("Skipping citation: {}", e);
                None
            }
        })
        .collect()
}

fn exchange_id_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(id) => Some(id),
        other => Some(other.to_string()),
    }
}

impl InboundFrame {
    pub fn parse(payload: &str) -> NavigatorResult<Self> {
        if payload.trim().is_empty() {
            return Ok(InboundFrame::Heartbeat);
        }

        let raw: RawFrame = serde_json::from_str(payload)
            .map_err(|e| NavigatorError::MalformedFrame(e.to_string()))?;
        let exchange_id = exchange_id_text(raw.exchange_id);

        match raw.kind.as_deref() {
            Some("chunk") => Ok(InboundFrame::Chunk {
                exchange_id,
                text: raw.chunk.unwrap_or_default(),
            }),
            Some("complete") => Ok(InboundFrame::Complete {
                exchange_id,
                response_text: raw.responsetext.unwrap_or_default(),
                citations: lenient_citations(raw.citations),
            }),
            Some("error") => Ok(InboundFrame::Error {
                exchange_id,
                message: raw.message.or(raw.error).unwrap_or_default(),
            }),
            Some(other) => Ok(InboundFrame::Unknown {
                kind: other.to_string(),
            }),
            None => match (raw.responsetext, raw.error) {
                (Some(response_text), _) => Ok(InboundFrame::Legacy {
                    exchange_id,
                    response_text,
                    citations: lenient_citations(raw.citations),
                }),
                (None, Some(message)) => Ok(InboundFrame::Error {
                    exchange_id,
                    message,
                }),
                (None, None) => Err(NavigatorError::MalformedFrame(
                    "frame has neither type nor responsetext".to_string(),
                )),
            },
        }
    }

    pub fn exchange_id(&self) -> Option<&str> {
        match self {
            InboundFrame::Chunk { exchange_id, .. }
            | InboundFrame::Complete { exchange_id, .. }
            | InboundFrame::Legacy { exchange_id, .. }
            | InboundFrame::Error { exchange_id, .. } => exchange_id.as_deref(),
            InboundFrame::Heartbeat | InboundFrame::Unknown { .. } => None,
        }
    }

    /// True when the frame carries no exchange id or echoes `exchange_id`.
    pub fn belongs_to(&self, exchange_id: Uuid) -> bool {
        match self.exchange_id() {
            None => true,
            Some(echoed) => Uuid::parse_str(echoed.trim()).is_ok_and(|id| id == exchange_id),
        }
    }

    /// Frames after which the exchange is over.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InboundFrame::Complete { .. } | InboundFrame::Legacy { .. } | InboundFrame::Error { .. }
        )
    }

    pub fn kind(&self) -> &str {
        match self {
            InboundFrame::Heartbeat => "heartbeat",
            InboundFrame::Chunk { .. } => "chunk",
            InboundFrame::Complete { .. } => "complete",
            InboundFrame::Legacy { .. } => "legacy",
            InboundFrame::Error { .. } => "error",
            InboundFrame::Unknown { kind } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let session = Uuid::new_v4();
        let exchange = Uuid::new_v4();
        let envelope =
            OutboundEnvelope::send_message("What is MHFA?", session, UserRole::Instructor, exchange);
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(value["action"], "sendMessage");
        assert_eq!(value["querytext"], "What is MHFA?");
        assert_eq!(value["session_id"], session.to_string());
        assert_eq!(value["user_role"], "instructor");
        assert_eq!(value["exchange_id"], exchange.to_string());
    }

    #[test]
    fn test_heartbeat() {
        assert_eq!(InboundFrame::parse("").unwrap(), InboundFrame::Heartbeat);
        assert_eq!(InboundFrame::parse("  \n").unwrap(), InboundFrame::Heartbeat);
    }

    #[test]
    fn test_chunk() {
        let frame = InboundFrame::parse(r#"{"type":"chunk","chunk":"Hello "}"#).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Chunk {
                exchange_id: None,
                text: "Hello ".to_string()
            }
        );
        assert!(!frame.is_terminal());
    }

    #[test]
    fn test_complete_with_citations() {
        let json = r#"{"type":"complete","responsetext":"Done.","citations":[{"text":"","references":[{"source":"s3://kb/a.pdf","title":"a.pdf"}]}]}"#;
        match InboundFrame::parse(json).unwrap() {
            InboundFrame::Complete {
                response_text,
                citations,
                ..
            } => {
                assert_eq!(response_text, "Done.");
                assert_eq!(citations[0].references[0].title, "a.pdf");
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_legacy_frame() {
        let frame = InboundFrame::parse(r#"{"responsetext":"Old style","citations":null}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Legacy { ref response_text, .. } if response_text == "Old style"));
        assert!(frame.is_terminal());
    }

    #[test]
    fn test_error_frames() {
        let typed = InboundFrame::parse(r#"{"type":"error","message":"agent down"}"#).unwrap();
        assert!(matches!(typed, InboundFrame::Error { ref message, .. } if message == "agent down"));

        let bare = InboundFrame::parse(r#"{"error":"throttled"}"#).unwrap();
        assert!(matches!(bare, InboundFrame::Error { ref message, .. } if message == "throttled"));
    }

    #[test]
    fn test_exchange_id_echo() {
        let exchange = Uuid::new_v4();
        let json = format!(r#"{{"type":"chunk","chunk":"x","exchange_id":"{}"}}"#, exchange);
        let frame = InboundFrame::parse(&json).unwrap();
        assert_eq!(frame.exchange_id(), Some(exchange.to_string().as_str()));
        assert!(frame.belongs_to(exchange));
        assert!(!frame.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn test_non_uuid_exchange_id_still_parses() {
        let frame = InboundFrame::parse(r#"{"type":"chunk","chunk":"x","exchange_id":"req-1"}"#).unwrap();
        assert_eq!(frame.exchange_id(), Some("req-1"));
        assert!(!frame.belongs_to(Uuid::new_v4()));

        let untagged = InboundFrame::parse(r#"{"type":"chunk","chunk":"x"}"#).unwrap();
        assert!(untagged.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn test_odd_citations_keep_the_answer() {
        let json = r#"{"type":"complete","responsetext":"Mental Health First Aid is...","citations":[{"text":"from the guide"},42,{"source":"s3://kb/b.pdf"},{"references":"nope"}]}"#;
        match InboundFrame::parse(json).unwrap() {
            InboundFrame::Complete {
                response_text,
                citations,
                ..
            } => {
                assert_eq!(response_text, "Mental Health First Aid is...");
                assert_eq!(citations.len(), 2);
                assert_eq!(citations[0].text, "from the guide");
                assert!(citations[0].references.is_empty());
                assert_eq!(citations[1].references[0].source, "s3://kb/b.pdf");
            }
            other => panic!("unexpected frame {:?}", other),
        }

        let not_a_list = InboundFrame::parse(r#"{"responsetext":"Still here","citations":{"a":1}}"#).unwrap();
        assert!(matches!(not_a_list, InboundFrame::Legacy { ref citations, .. } if citations.is_empty()));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            InboundFrame::parse("{not json"),
            Err(NavigatorError::MalformedFrame(_))
        ));
        assert!(matches!(
            InboundFrame::parse(r#"{"foo":1}"#),
            Err(NavigatorError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_unknown_type() {
        let frame = InboundFrame::parse(r#"{"type":"progress","pct":40}"#).unwrap();
        assert_eq!(frame.kind(), "progress");
        assert!(!frame.is_terminal());
    }
}
