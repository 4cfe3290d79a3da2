use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::NavigatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl FromStr for FeedbackKind {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "up" | "+" => Ok(FeedbackKind::Positive),
            "negative" | "down" | "-" => Ok(FeedbackKind::Negative),
            other => Err(NavigatorError::validation(format!(
                "Invalid feedback '{}'. Use: positive, negative",
                other
            ))),
        }
    }
}

/// Thumbs up/down on a bot answer. `feedback: None` clears an earlier vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub message_id: String,
    pub session_id: String,
    pub feedback: Option<FeedbackKind>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Feedback {
    pub fn new(
        message_id: Uuid,
        session_id: Uuid,
        feedback: Option<FeedbackKind>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.to_string(),
            session_id: session_id.to_string(),
            feedback,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_wire_shape() {
        let message_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let feedback = Feedback::new(
            message_id,
            session_id,
            Some(FeedbackKind::Positive),
            "Mental Health First Aid is...",
        );
        let body = serde_json::to_value(&feedback).unwrap();

        assert_eq!(body["messageId"], message_id.to_string());
        assert_eq!(body["sessionId"], session_id.to_string());
        assert_eq!(body["feedback"], "positive");
        assert!(body.get("timestamp").is_some());
    }

    #[test]
    fn test_cleared_feedback_is_null() {
        let feedback = Feedback::new(Uuid::new_v4(), Uuid::new_v4(), None, "");
        let body = serde_json::to_value(&feedback).unwrap();
        assert!(body["feedback"].is_null());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("up".parse::<FeedbackKind>().unwrap(), FeedbackKind::Positive);
        assert_eq!("Negative".parse::<FeedbackKind>().unwrap(), FeedbackKind::Negative);
        assert!("meh".parse::<FeedbackKind>().is_err());
    }
}
