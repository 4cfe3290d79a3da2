use anyhow::{Context, Result};
use colored::Colorize;
use navigator_core::{Feedback, FeedbackKind};
use uuid::Uuid;

use crate::context::CliContext;

/// `none` or `clear` withdraws an earlier vote.
fn parse_kind(kind: Option<&str>) -> Result<Option<FeedbackKind>> {
    match kind.map(|k| k.trim().to_lowercase()) {
        None => Ok(None),
        Some(k) if k == "none" || k == "clear" => Ok(None),
        Some(k) => Ok(Some(k.parse::<FeedbackKind>()?)),
    }
}

pub async fn cmd_feedback(
    ctx: &CliContext,
    message_id: String,
    session_id: String,
    kind: Option<String>,
    message: String,
) -> Result<()> {
    let message_id = Uuid::parse_str(&message_id).context("Invalid message id")?;
    let session_id = Uuid::parse_str(&session_id).context("Invalid session id")?;
    let kind = parse_kind(kind.as_deref())?;

    let client = ctx.feedback_client()?;
    let feedback = Feedback::new(message_id, session_id, kind, message);
    client.try_submit(&feedback).await?;

    match kind {
        Some(kind) => println!("{} Recorded {:?} feedback", "✓".green().bold(), kind),
        None => println!("{} Feedback cleared", "✓".green().bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind(None).unwrap(), None);
        assert_eq!(parse_kind(Some("clear")).unwrap(), None);
        assert_eq!(
            parse_kind(Some("Positive")).unwrap(),
            Some(FeedbackKind::Positive)
        );
        assert!(parse_kind(Some("meh")).is_err());
    }
}
