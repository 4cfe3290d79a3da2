use anyhow::{bail, Result};
use colored::Colorize;
use navigator_core::{AuthStatus, SignInOutcome};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_json;
use crate::context::CliContext;

async fn read_line(prompt: &str) -> Result<String> {
    print!("{} ", prompt);
    std::io::stdout().flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}

pub async fn cmd_login(
    ctx: &CliContext,
    username: String,
    password: Option<String>,
    new_password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_line("Password:").await?,
    };

    println!("{}", "Signing in...".cyan());

    let tokens = match ctx.gate.sign_in(&username, &password).await? {
        SignInOutcome::Authenticated(tokens) => tokens,
        SignInOutcome::NewPasswordRequired(challenge) => {
            println!(
                "  {} {}",
                "!".yellow(),
                "A new password is required for this account.".yellow()
            );
            let new_password = match new_password {
                Some(p) => p,
                None => read_line("New password:").await?,
            };
            if new_password.is_empty() {
                bail!("New password is required");
            }
            ctx.gate
                .complete_new_password(&challenge, &new_password)
                .await?
        }
    };

    println!(
        "{} Signed in as {} (session valid until {})",
        "✓".green().bold(),
        username.bold(),
        tokens.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub fn cmd_guest(ctx: &CliContext) -> Result<()> {
    ctx.gate.enter_guest_mode()?;
    println!("{} {}", "✓".green().bold(), "Guest mode enabled.".green());
    println!(
        "{}",
        "Chat is available with limited access. Sign in with 'navigator login' for admin tools."
            .dimmed()
    );
    Ok(())
}

pub async fn cmd_logout(ctx: &CliContext) -> Result<()> {
    ctx.gate.logout().await?;
    println!("{} {}", "✓".green().bold(), "Logged out.".green());
    Ok(())
}

pub async fn cmd_whoami(ctx: &CliContext, format: &str) -> Result<()> {
    let status = ctx.gate.status()?;
    let role = ctx.current_role().await.ok();

    if format == "json" {
        let value = match &status {
            AuthStatus::SignedOut => serde_json::json!({ "status": "signed_out" }),
            AuthStatus::Guest => serde_json::json!({ "status": "guest", "role": role }),
            AuthStatus::SignedIn {
                username,
                expires_at,
            } => serde_json::json!({
                "status": "signed_in",
                "username": username,
                "expires_at": expires_at.to_rfc3339(),
                "role": role,
            }),
        };
        return print_json(&value);
    }

    match status {
        AuthStatus::SignedOut => {
            println!("{}", "Not signed in.".yellow());
            println!(
                "{}",
                "Use 'navigator login <username>' or 'navigator guest'.".dimmed()
            );
        }
        AuthStatus::Guest => {
            println!("  {:<12} {}", "Status:".bold(), "Guest".cyan());
        }
        AuthStatus::SignedIn {
            username,
            expires_at,
        } => {
            println!("  {:<12} {}", "Status:".bold(), "Signed in".green());
            println!(
                "  {:<12} {}",
                "User:".bold(),
                username.as_deref().unwrap_or("-")
            );
            let expiry = expires_at.format("%Y-%m-%d %H:%M UTC").to_string();
            if expires_at <= chrono::Utc::now() {
                println!("  {:<12} {} {}", "Token:".bold(), expiry, "(expired)".red());
            } else {
                println!("  {:<12} {}", "Token:".bold(), expiry);
            }
        }
    }

    if let Some(role) = role {
        println!("  {:<12} {}", "Role:".bold(), role);
    }
    Ok(())
}
