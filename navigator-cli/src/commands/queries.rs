use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use navigator_core::{AdminClient, EscalatedQuery, NavigatorError, QueryStatus};

use super::{new_table, print_json, short_timestamp, truncate};
use crate::context::CliContext;

#[derive(Subcommand)]
pub enum QueriesCommand {
    #[command(about = "List escalated queries")]
    List {
        #[arg(short, long, help = "Filter by status (pending, in_progress, resolved)")]
        status: Option<String>,

        #[arg(short, long, help = "Maximum number of queries to fetch")]
        limit: Option<u32>,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show one escalated query")]
    Show {
        #[arg(help = "Query ID")]
        query_id: String,
    },

    #[command(about = "Update the status of an escalated query")]
    Update {
        #[arg(help = "Query ID")]
        query_id: String,

        #[arg(short, long, help = "New status (pending, in_progress, resolved)")]
        status: String,

        #[arg(short, long, help = "Admin notes (existing notes are kept when omitted)")]
        notes: Option<String>,
    },
}

pub async fn handle_queries_command(ctx: &CliContext, cmd: Option<QueriesCommand>) -> Result<()> {
    let admin = ctx.admin()?;

    match cmd.unwrap_or(QueriesCommand::List {
        status: None,
        limit: None,
        format: "text".to_string(),
    }) {
        QueriesCommand::List {
            status,
            limit,
            format,
        } => {
            let status = status.map(|s| s.parse::<QueryStatus>()).transpose()?;
            cmd_queries_list(&admin, status, limit, &format).await
        }
        QueriesCommand::Show { query_id } => cmd_queries_show(&admin, &query_id).await,
        QueriesCommand::Update {
            query_id,
            status,
            notes,
        } => {
            let status = status.parse::<QueryStatus>()?;
            cmd_queries_update(&admin, &query_id, status, notes).await
        }
    }
}

async fn cmd_queries_list(
    admin: &AdminClient,
    status: Option<QueryStatus>,
    limit: Option<u32>,
    format: &str,
) -> Result<()> {
    let list = admin.list_escalations(status, limit).await?;
    let queries = list.filter_by_status(status);

    if format == "json" {
        return print_json(&serde_json::json!({
            "queries": queries,
            "total": list.total,
            "summary": list.summary,
        }));
    }

    println!("{}", "Escalated Queries".cyan().bold());
    println!(
        "  {} {}   {} {}   {} {}",
        "Pending:".bold(),
        list.summary.pending.to_string().yellow(),
        "In progress:".bold(),
        list.summary.in_progress.to_string().blue(),
        "Resolved:".bold(),
        list.summary.resolved.to_string().green()
    );
    println!();

    if queries.is_empty() {
        println!("{}", "No escalated queries.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["Query ID", "Received", "User", "Question", "Status"]);
    for query in &queries {
        table.add_row(vec![
            Cell::new(truncate(&query.query_id, 12)).fg(Color::Cyan),
            Cell::new(short_timestamp(Some(&query.timestamp))),
            Cell::new(&query.user_email),
            Cell::new(truncate(&query.question, 48)),
            status_cell(query.status),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn status_cell(status: QueryStatus) -> Cell {
    let color = match status {
        QueryStatus::Pending => Color::Yellow,
        QueryStatus::InProgress => Color::Blue,
        QueryStatus::Resolved => Color::Green,
    };
    Cell::new(status.as_str()).fg(color)
}

/// The update body needs the query's timestamp, so look it up in the list first.
async fn find_query(admin: &AdminClient, query_id: &str) -> Result<EscalatedQuery> {
    let list = admin.list_escalations(None, None).await?;
    if let Some(query) = list.queries.into_iter().find(|q| q.query_id == query_id) {
        return Ok(query);
    }
    match admin.get_escalation(query_id).await {
        Ok(query) => Ok(query),
        Err(NavigatorError::NotFound(_)) => Err(NavigatorError::NotFound(format!(
            "escalated query {}",
            query_id
        ))
        .into()),
        Err(e) => Err(e.into()),
    }
}

async fn cmd_queries_show(admin: &AdminClient, query_id: &str) -> Result<()> {
    let query = find_query(admin, query_id).await?;

    println!("{}", "Escalated Query".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<12} {}", "ID:".bold(), query.query_id);
    println!("  {:<12} {}", "Received:".bold(), query.timestamp);
    println!("  {:<12} {}", "User:".bold(), query.user_email);
    println!("  {:<12} {}", "Status:".bold(), query.status);
    if let Some(updated) = &query.updated_at {
        println!("  {:<12} {}", "Updated:".bold(), updated);
    }
    println!();
    println!("  {}", "Question".yellow().bold());
    println!("    {}", query.question);
    println!();
    println!("  {}", "Agent response".yellow().bold());
    println!("    {}", query.agent_response);
    if !query.admin_notes.is_empty() {
        println!();
        println!("  {}", "Admin notes".yellow().bold());
        println!("    {}", query.admin_notes);
    }
    Ok(())
}

async fn cmd_queries_update(
    admin: &AdminClient,
    query_id: &str,
    status: QueryStatus,
    notes: Option<String>,
) -> Result<()> {
    let query = find_query(admin, query_id).await?;
    admin.update_escalation(&query, status, notes).await?;
    println!(
        "{} Query {} marked {}",
        "✓".green().bold(),
        query_id.bold(),
        status
    );
    println!();
    cmd_queries_list(admin, None, None, "text").await
}
