use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use navigator_core::models::content_type_for;
use navigator_core::{AdminClient, Document};
use std::path::PathBuf;

use super::{new_table, print_json, short_timestamp};
use crate::context::CliContext;

#[derive(Subcommand)]
pub enum DocumentsCommand {
    #[command(about = "List documents in the knowledge base")]
    List {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Upload a local file")]
    Upload {
        #[arg(help = "Path of the file to upload")]
        path: PathBuf,

        #[arg(long, help = "Start a knowledge base sync after uploading")]
        sync: bool,
    },

    #[command(about = "Download a document")]
    Download {
        #[arg(help = "Document key")]
        key: String,

        #[arg(short, long, help = "Output path (defaults to the key's file name)")]
        output: Option<PathBuf>,
    },

    #[command(about = "Delete one or more documents")]
    Delete {
        #[arg(required = true, help = "Document keys")]
        keys: Vec<String>,

        #[arg(short, long, help = "Skip confirmation")]
        yes: bool,
    },

    #[command(about = "Sync the knowledge base with the stored documents")]
    Sync,

    #[command(about = "Request a presigned upload URL")]
    PresignedUrl {
        #[arg(help = "File name to upload")]
        filename: String,

        #[arg(short, long, help = "Content type (guessed from the name when omitted)")]
        content_type: Option<String>,
    },
}

pub async fn handle_documents_command(
    ctx: &CliContext,
    cmd: Option<DocumentsCommand>,
) -> Result<()> {
    let admin = ctx.admin()?;

    match cmd.unwrap_or(DocumentsCommand::List {
        format: "text".to_string(),
    }) {
        DocumentsCommand::List { format } => cmd_documents_list(&admin, &format).await,
        DocumentsCommand::Upload { path, sync } => cmd_documents_upload(&admin, path, sync).await,
        DocumentsCommand::Download { key, output } => {
            cmd_documents_download(&admin, &key, output).await
        }
        DocumentsCommand::Delete { keys, yes } => cmd_documents_delete(&admin, &keys, yes).await,
        DocumentsCommand::Sync => cmd_documents_sync(&admin).await,
        DocumentsCommand::PresignedUrl {
            filename,
            content_type,
        } => {
            let content_type =
                content_type.unwrap_or_else(|| content_type_for(&filename).to_string());
            let upload = admin.presigned_upload_url(&filename, &content_type).await?;
            print_json(&upload)
        }
    }
}

async fn cmd_documents_list(admin: &AdminClient, format: &str) -> Result<()> {
    let documents = admin.list_documents().await?;

    if format == "json" {
        return print_json(&documents);
    }

    if documents.is_empty() {
        println!("{}", "No documents found.".yellow());
        println!(
            "{}",
            "Upload one with 'navigator documents upload <path>'.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Documents".cyan().bold());
    println!();
    print_documents_table(&documents);
    println!();
    println!("  {} {}", "Total:".bold(), documents.len());
    Ok(())
}

fn print_documents_table(documents: &[Document]) {
    let mut table = new_table(&["Name", "Type", "Size", "Last Modified"]);
    for doc in documents {
        table.add_row(vec![
            Cell::new(&doc.key).fg(Color::Cyan),
            Cell::new(doc.file_type()),
            Cell::new(doc.formatted_size()),
            Cell::new(short_timestamp(doc.last_modified.as_deref())),
        ]);
    }
    println!("{table}");
}

async fn cmd_documents_upload(admin: &AdminClient, path: PathBuf, sync: bool) -> Result<()> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    println!("  {} Uploading {}...", "→".blue(), path.display());
    let filename = admin.upload_path(&path).await?;
    println!("{} Uploaded {}", "✓".green().bold(), filename.bold());

    if sync {
        admin.sync_knowledge_base().await?;
        println!("{} Knowledge base sync started", "✓".green().bold());
    }

    println!();
    cmd_documents_list(admin, "text").await
}

async fn cmd_documents_download(
    admin: &AdminClient,
    key: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let content = admin.download_document(key).await?;
    let output = output.unwrap_or_else(|| {
        PathBuf::from(key.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or(key))
    });

    tokio::fs::write(&output, &content.bytes).await?;
    println!(
        "{} Saved {} ({} bytes, {}) to {}",
        "✓".green().bold(),
        key.bold(),
        content.bytes.len(),
        content.content_type,
        output.display()
    );
    Ok(())
}

async fn cmd_documents_delete(admin: &AdminClient, keys: &[String], yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{} This will delete {} document(s): {}",
            "!".yellow(),
            keys.len(),
            keys.join(", ")
        );
        println!("{}", "Re-run with --yes to confirm.".dimmed());
        return Ok(());
    }

    for key in keys {
        admin.delete_document(key).await?;
        println!("{} Deleted {}", "✓".green().bold(), key);
    }

    println!();
    cmd_documents_list(admin, "text").await
}

async fn cmd_documents_sync(admin: &AdminClient) -> Result<()> {
    let result = admin.sync_knowledge_base().await?;
    println!("{} Knowledge base sync started", "✓".green().bold());
    if let Some(job) = result
        .get("ingestionJobId")
        .or_else(|| result.get("ingestion_job_id"))
        .and_then(|v| v.as_str())
    {
        println!("  {} {}", "Job:".bold(), job);
    }
    Ok(())
}
