pub mod analytics;
pub mod auth;
pub mod chat;
pub mod documents;
pub mod feedback;
pub mod logs;
pub mod profile;
pub mod queries;

pub use analytics::{handle_analytics_command, AnalyticsCommand};
pub use auth::{cmd_guest, cmd_login, cmd_logout, cmd_whoami};
pub use chat::{cmd_chat, cmd_prompts};
pub use documents::{handle_documents_command, DocumentsCommand};
pub use feedback::cmd_feedback;
pub use logs::{handle_logs_command, LogsCommand};
pub use profile::{cmd_recommendations, handle_profile_command, ProfileCommand};
pub use queries::{handle_queries_command, QueriesCommand};

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

pub(crate) fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::White))
                .collect::<Vec<_>>(),
        );
    table
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    let single_line = s.replace('\n', " ");
    if single_line.chars().count() <= max_len {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Trims ISO-8601 timestamps to `YYYY-MM-DD HH:MM` for tables.
pub(crate) fn short_timestamp(ts: Option<&str>) -> String {
    match ts {
        Some(ts) => match chrono::DateTime::parse_from_rfc3339(ts) {
            Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            Err(_) => ts.replace('T', " ").chars().take(16).collect(),
        },
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer line", 10), "a much ...");
        assert_eq!(truncate("two\nlines", 20), "two lines");
    }

    #[test]
    fn test_short_timestamp() {
        assert_eq!(
            short_timestamp(Some("2026-03-04T10:11:12Z")),
            "2026-03-04 10:11"
        );
        assert_eq!(
            short_timestamp(Some("2026-03-04T10:11:12.123456")),
            "2026-03-04 10:11"
        );
        assert_eq!(short_timestamp(None), "-");
    }
}
