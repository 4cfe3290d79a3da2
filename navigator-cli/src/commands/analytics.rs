use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use navigator_core::{SessionLogReport, Timeframe, UsageTrendPoint};

use super::{new_table, print_json};
use crate::context::CliContext;

const TOP_CATEGORIES: usize = 5;
const BAR_WIDTH: usize = 30;

#[derive(Subcommand)]
pub enum AnalyticsCommand {
    #[command(about = "Usage, sentiment and category summary")]
    Summary {
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

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Questions per day over the last week")]
    Trend {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },
}

pub async fn handle_analytics_command(
    ctx: &CliContext,
    cmd: Option<AnalyticsCommand>,
) -> Result<()> {
    let admin = ctx.admin()?;

    match cmd.unwrap_or(AnalyticsCommand::Summary {
        timeframe: "weekly".to_string(),
        start_date: None,
        end_date: None,
        format: "text".to_string(),
    }) {
        AnalyticsCommand::Summary {
            timeframe,
            start_date,
            end_date,
            format,
        } => {
            let timeframe = Timeframe::parse_with_range(
                &timeframe,
                start_date.as_deref(),
                end_date.as_deref(),
            )?;
            let report = admin.session_logs(timeframe).await?;

            if format == "json" {
                return print_json(&serde_json::json!({
                    "timeframe": timeframe.to_string(),
                    "user_count": report.user_count,
                    "total_queries": report.total_queries(),
                    "sentiment": report.sentiment,
                    "avg_satisfaction": report.avg_satisfaction,
                    "top_categories": report.top_categories(TOP_CATEGORIES),
                }));
            }

            print_summary(&report, timeframe);
            Ok(())
        }
        AnalyticsCommand::Trend { format } => {
            let points = admin.usage_trend(chrono::Utc::now().date_naive()).await;

            if format == "json" {
                return print_json(&points);
            }

            print_trend(&points);
            Ok(())
        }
    }
}

fn print_summary(report: &SessionLogReport, timeframe: Timeframe) {
    println!(
        "{} {}",
        "Analytics".cyan().bold(),
        format!("({})", timeframe).dimmed()
    );
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<18} {}", "Users:".bold(), report.user_count);
    println!("  {:<18} {}", "Questions:".bold(), report.total_queries());
    println!(
        "  {:<18} {:.1}%",
        "Satisfaction:".bold(),
        report.avg_satisfaction
    );
    println!();

    let sentiment = report.sentiment;
    let total = sentiment.total();
    println!("  {}", "Sentiment".yellow().bold());
    for (label, count) in [
        ("positive".green(), sentiment.positive),
        ("neutral".dimmed(), sentiment.neutral),
        ("negative".red(), sentiment.negative),
    ] {
        println!("    {:<10} {:>6}  {}", label, count, percent(count, total));
    }
    println!();

    println!("  {}", "Top categories".yellow().bold());
    let mut table = new_table(&["Category", "Questions"]);
    for (name, count) in report.top_categories(TOP_CATEGORIES) {
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(count.to_string()),
        ]);
    }
    println!("{table}");
}

fn percent(count: u64, total: u64) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.0}%", count as f64 * 100.0 / total as f64)
    }
}

fn print_trend(points: &[UsageTrendPoint]) {
    println!("{}", "Questions per day".cyan().bold());
    println!();

    let max = points.iter().map(|p| p.queries).max().unwrap_or(0);
    for point in points {
        let bar = bar(point.queries, max);
        let day = point.date.format("%a %m-%d").to_string();
        if point.loaded {
            println!("  {}  {:>5}  {}", day, point.queries, bar.cyan());
        } else {
            println!("  {}  {:>5}  {}", day, "?".yellow(), "unavailable".dimmed());
        }
    }
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    "█".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), "25%");
        assert_eq!(percent(0, 0), "-");
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert!(bar(0, 0).is_empty());
    }
}
