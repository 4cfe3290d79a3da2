use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use navigator_core::{ConversationLog, Sentiment, Timeframe};

use super::{new_table, print_json, short_timestamp, truncate};
use crate::context::CliContext;

#[derive(Subcommand)]
pub enum LogsCommand {
    #[command(about = "List conversations in a timeframe")]
    List {
        #[arg(
            short,
            long,
            default_value = "weekly",
            help = "Timeframe (today, weekly, monthly, yearly, custom)"
        )]
        timeframe: String,

        #[arg(long, help = "Start date for a custom timeframe (YYYY-MM-DD)")]
        start_date: Option<String>,

        #[arg(long, help = "End date for a custom timeframe (YYYY-MM-DD)")]
        end_date: Option<String>,

        #[arg(short, long, help = "Only show conversations with this sentiment")]
        sentiment: Option<String>,

        #[arg(short, long, default_value = "25", help = "Maximum rows to show")]
        limit: usize,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show every exchange of one chat session")]
    Show {
        #[arg(help = "Session ID")]
        session_id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },
}

pub async fn handle_logs_command(ctx: &CliContext, cmd: Option<LogsCommand>) -> Result<()> {
    let admin = ctx.admin()?;

    match cmd.unwrap_or(LogsCommand::List {
        timeframe: "weekly".to_string(),
        start_date: None,
        end_date: None,
        sentiment: None,
        limit: 25,
        format: "text".to_string(),
    }) {
        LogsCommand::List {
            timeframe,
            start_date,
            end_date,
            sentiment,
            limit,
            format,
        } => {
            let timeframe = Timeframe::parse_with_range(
                &timeframe,
                start_date.as_deref(),
                end_date.as_deref(),
            )?;
            let sentiment = sentiment.map(|s| s.parse::<Sentiment>()).transpose()?;

            let report = admin.session_logs(timeframe).await?;
            let conversations = report.conversations_with_sentiment(sentiment);

            if format == "json" {
                return print_json(&conversations);
            }

            println!(
                "{} {}",
                "Conversations".cyan().bold(),
                format!("({})", timeframe).dimmed()
            );
            println!();

            if conversations.is_empty() {
                println!("{}", "No conversations in this timeframe.".yellow());
                return Ok(());
            }

            print_conversations(&conversations, limit);
            if conversations.len() > limit {
                println!(
                    "{}",
                    format!(
                        "Showing {} of {}. Use --limit to see more.",
                        limit,
                        conversations.len()
                    )
                    .dimmed()
                );
            }
            Ok(())
        }
        LogsCommand::Show { session_id, format } => {
            let logs = admin.session_log(&session_id).await?;

            if format == "json" {
                return print_json(&logs);
            }

            if logs.is_empty() {
                println!("{}", "No exchanges recorded for this session.".yellow());
                return Ok(());
            }

            println!("{} {}", "Session".cyan().bold(), session_id.dimmed());
            println!("{}", "═".repeat(40).dimmed());
            for log in &logs {
                println!();
                println!(
                    "  {} {}",
                    short_timestamp(log.timestamp.as_deref()).dimmed(),
                    sentiment_label(log.sentiment())
                );
                println!("  {} {}", "Q:".green().bold(), log.query);
                println!("  {} {}", "A:".cyan().bold(), log.response);
            }
            Ok(())
        }
    }
}

fn print_conversations(conversations: &[&ConversationLog], limit: usize) {
    let mut table = new_table(&["Time", "Category", "Question", "Sentiment"]);
    for log in conversations.iter().take(limit) {
        table.add_row(vec![
            Cell::new(short_timestamp(log.timestamp.as_deref())),
            Cell::new(log.category_or_unknown()),
            Cell::new(truncate(&log.query, 50)),
            Cell::new(log.sentiment().as_str()).fg(sentiment_color(log.sentiment())),
        ]);
    }
    println!("{table}");
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
        Sentiment::Neutral => Color::DarkGrey,
    }
}

fn sentiment_label(sentiment: Sentiment) -> colored::ColoredString {
    match sentiment {
        Sentiment::Positive => sentiment.as_str().green(),
        Sentiment::Negative => sentiment.as_str().red(),
        Sentiment::Neutral => sentiment.as_str().dimmed(),
    }
}
