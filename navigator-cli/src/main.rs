use clap::{Parser, Subcommand};
use colored::Colorize;
use navigator_core::{Language, UserRole};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod context;

use commands::{
    cmd_chat, cmd_feedback, cmd_guest, cmd_login, cmd_logout, cmd_prompts, cmd_recommendations,
    cmd_whoami, handle_analytics_command, handle_documents_command, handle_logs_command,
    handle_profile_command, handle_queries_command, AnalyticsCommand, DocumentsCommand,
    LogsCommand, ProfileCommand, QueriesCommand,
};
use context::CliContext;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "navigator")]
#[command(version = VERSION)]
#[command(about = "Learning Navigator - MHFA support assistant and admin dashboard")]
#[command(long_about = r#"
Learning Navigator answers questions about Mental Health First Aid training,
tailored to instructors, staff and learners. Administrators can manage the
knowledge base documents, review escalated questions and browse usage logs.

Use 'navigator login <username>' or 'navigator guest' first, then
'navigator chat' to start a conversation.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Path to a config file")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Ask a question, or start an interactive chat")]
    Chat {
        #[arg(help = "Question to ask (interactive mode when omitted)")]
        question: Option<String>,

        #[arg(short, long, help = "Role to answer for (instructor, staff, learner)")]
        role: Option<String>,

        #[arg(short, long, help = "Language of suggested prompts (en, es)")]
        lang: Option<String>,

        #[arg(short, long, help = "Ask suggested prompt N instead of a question")]
        prompt: Option<usize>,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Sign in with your account")]
    Login {
        #[arg(help = "Username or email")]
        username: String,

        #[arg(
            short,
            long,
            env = "NAVIGATOR_PASSWORD",
            hide_env_values = true,
            help = "Password (prompted when omitted)"
        )]
        password: Option<String>,

        #[arg(long, help = "New password, if the account requires one")]
        new_password: Option<String>,
    },

    #[command(about = "Continue as a guest with limited access")]
    Guest,

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show who is signed in")]
    Whoami {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Manage knowledge base documents")]
    Documents {
        #[command(subcommand)]
        action: Option<DocumentsCommand>,
    },

    #[command(about = "Review escalated questions")]
    Queries {
        #[command(subcommand)]
        action: Option<QueriesCommand>,
    },

    #[command(about = "Browse conversation logs")]
    Logs {
        #[command(subcommand)]
        action: Option<LogsCommand>,
    },

    #[command(about = "Usage analytics")]
    Analytics {
        #[command(subcommand)]
        action: Option<AnalyticsCommand>,
    },

    #[command(about = "View or change your profile")]
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommand>,
    },

    #[command(about = "Recommended questions for a role")]
    Recommendations {
        #[arg(short, long, help = "Role (defaults to your profile role)")]
        role: Option<String>,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Rate an answer")]
    Feedback {
        #[arg(help = "Message ID of the answer")]
        message_id: String,

        #[arg(help = "Chat session ID")]
        session_id: String,

        #[arg(short, long, help = "positive, negative, or none to clear")]
        kind: Option<String>,

        #[arg(short, long, default_value = "", help = "Text of the rated answer")]
        message: String,
    },

    #[command(about = "List suggested questions")]
    Prompts {
        #[arg(short, long, default_value = "learner", help = "Role (instructor, staff, learner)")]
        role: String,

        #[arg(short, long, help = "Language (en, es)")]
        lang: Option<String>,

        #[arg(short, long, help = "Also list sample queries by category")]
        samples: bool,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = CliContext::load(cli.config.clone());
    match &ctx {
        Ok(ctx) => init_logging(
            cli.verbose,
            &ctx.config.logging.level,
            ctx.config.logging.json_format,
        ),
        Err(_) => init_logging(cli.verbose, "warn", false),
    }

    match run(cli, ctx).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, level: &str, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, ctx: anyhow::Result<CliContext>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version { detailed } => return cmd_version(detailed),
        Commands::Prompts {
            role,
            lang,
            samples,
            format,
        } => {
            let language = match lang {
                Some(l) => l.parse::<Language>()?,
                None => ctx
                    .as_ref()
                    .map(|c| c.config.chat.language)
                    .unwrap_or_default(),
            };
            return cmd_prompts(role.parse::<UserRole>()?, language, samples, &format);
        }
        _ => {}
    }

    let ctx = ctx?;
    match cli.command {
        Commands::Chat {
            question,
            role,
            lang,
            prompt,
            format,
        } => cmd_chat(&ctx, question, role, lang, prompt, &format).await,
        Commands::Login {
            username,
            password,
            new_password,
        } => cmd_login(&ctx, username, password, new_password).await,
        Commands::Guest => cmd_guest(&ctx),
        Commands::Logout => cmd_logout(&ctx).await,
        Commands::Whoami { format } => cmd_whoami(&ctx, &format).await,
        Commands::Documents { action } => handle_documents_command(&ctx, action).await,
        Commands::Queries { action } => handle_queries_command(&ctx, action).await,
        Commands::Logs { action } => handle_logs_command(&ctx, action).await,
        Commands::Analytics { action } => handle_analytics_command(&ctx, action).await,
        Commands::Profile { action } => handle_profile_command(&ctx, action).await,
        Commands::Recommendations { role, format } => {
            cmd_recommendations(&ctx, role, &format).await
        }
        Commands::Feedback {
            message_id,
            session_id,
            kind,
            message,
        } => cmd_feedback(&ctx, message_id, session_id, kind, message).await,
        Commands::Prompts { .. } | Commands::Version { .. } => Ok(()),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Learning Navigator Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} {}", "Core:".bold(), navigator_core::VERSION);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Roles:".bold());
        for role in UserRole::all() {
            println!("    {:<12} {}", role.as_str(), role.description().dimmed());
        }
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("navigator {}", VERSION);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_with_prompt() {
        let cli = Cli::try_parse_from([
            "navigator", "chat", "--role", "staff", "--lang", "es", "--prompt", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Chat {
                question,
                role,
                lang,
                prompt,
                format,
            } => {
                assert!(question.is_none());
                assert_eq!(role.as_deref(), Some("staff"));
                assert_eq!(lang.as_deref(), Some("es"));
                assert_eq!(prompt, Some(2));
                assert_eq!(format, "text");
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_parse_prompts_with_samples() {
        let cli = Cli::try_parse_from(["navigator", "prompts", "-r", "instructor", "-l", "es", "-s"])
            .unwrap();
        match cli.command {
            Commands::Prompts {
                role, lang, samples, ..
            } => {
                assert_eq!(role, "instructor");
                assert_eq!(lang.as_deref(), Some("es"));
                assert!(samples);
            }
            _ => panic!("expected prompts"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "navigator",
            "queries",
            "update",
            "q-1",
            "--status",
            "resolved",
            "-v",
            "--config",
            "/tmp/navigator.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/navigator.toml")));
        assert!(matches!(cli.command, Commands::Queries { action: Some(_) }));
    }

    #[test]
    fn test_documents_delete_requires_keys() {
        assert!(Cli::try_parse_from(["navigator", "documents", "delete"]).is_err());
    }
}
