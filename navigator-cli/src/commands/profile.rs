use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use navigator_core::UserRole;

use super::print_json;
use crate::context::CliContext;

#[derive(Subcommand)]
pub enum ProfileCommand {
    #[command(about = "Show your profile")]
    Show {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Change the role answers are tailored to")]
    SetRole {
        #[arg(help = "Role (instructor, staff, learner)")]
        role: String,
    },
}

pub async fn handle_profile_command(ctx: &CliContext, cmd: Option<ProfileCommand>) -> Result<()> {
    match cmd.unwrap_or(ProfileCommand::Show {
        format: "text".to_string(),
    }) {
        ProfileCommand::Show { format } => {
            if ctx.gate.uses_local_role()? {
                let role = ctx.current_role().await?;
                if format == "json" {
                    return print_json(&serde_json::json!({ "role": role, "local": true }));
                }
                println!("  {:<10} {}", "Role:".bold(), role);
                println!("{}", "Stored locally (guest mode).".dimmed());
                return Ok(());
            }

            let profile = ctx.admin()?.get_profile().await?;
            if format == "json" {
                return print_json(&profile);
            }

            println!("{}", "Profile".cyan().bold());
            println!("{}", "═".repeat(40).dimmed());
            println!(
                "  {:<10} {}",
                "User:".bold(),
                profile.user_id.as_deref().unwrap_or("-")
            );
            match profile.role {
                Some(role) => {
                    println!("  {:<10} {}", "Role:".bold(), role);
                    println!("  {:<10} {}", "", role.description().dimmed());
                }
                None => println!(
                    "  {:<10} {}",
                    "Role:".bold(),
                    "not set (use 'navigator profile set-role')".dimmed()
                ),
            }
            Ok(())
        }
        ProfileCommand::SetRole { role } => {
            let role = role.parse::<UserRole>()?;
            ctx.save_role(role).await?;
            println!("{} Role set to {}", "✓".green().bold(), role.to_string().bold());
            Ok(())
        }
    }
}

pub async fn cmd_recommendations(
    ctx: &CliContext,
    role: Option<String>,
    format: &str,
) -> Result<()> {
    let role = match role {
        Some(r) => r.parse::<UserRole>()?,
        None => ctx.current_role().await?,
    };

    let list = ctx.admin()?.recommendations(role).await?;

    if format == "json" {
        return print_json(&list);
    }

    if list.recommendations.is_empty() {
        println!("{}", format!("No recommendations for {}.", role).yellow());
        println!(
            "{}",
            "Try 'navigator prompts' for suggested questions.".dimmed()
        );
        return Ok(());
    }

    println!("{}", format!("Recommended for {}", role).cyan().bold());
    println!();
    for (i, rec) in list.recommendations.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), rec.title.bold());
        if !rec.description.is_empty() {
            println!("     {}", rec.description);
        }
        if !rec.prompt.is_empty() {
            println!("     {} {}", "Ask:".dimmed(), rec.prompt.dimmed());
        }
    }
    Ok(())
}
