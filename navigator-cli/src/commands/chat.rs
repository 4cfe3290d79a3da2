use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use navigator_core::chat::{prompt_by_index, sample_queries};
use navigator_core::models::unique_sources;
use navigator_core::{
    suggested_prompts, ChatClient, ChatObserver, ChatSession, Feedback, FeedbackKind, Language,
    Message, NavigatorError, NoopObserver, SharedTranscript, Transcript, UserRole,
};
use serde_json::json;
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_json;
use crate::context::CliContext;

/// Streams reply text to stdout as chunks arrive.
struct TerminalObserver {
    printed: Mutex<String>,
}

impl TerminalObserver {
    fn new() -> Self {
        Self {
            printed: Mutex::new(String::new()),
        }
    }

    fn print_delta(&self, content: &str) {
        let Ok(mut printed) = self.printed.lock() else {
            return;
        };
        print!("{}", render_delta(&printed, content));
        *printed = content.to_string();
        let _ = std::io::stdout().flush();
    }
}

impl ChatObserver for TerminalObserver {
    fn on_update(&self, reply: &Message) {
        self.print_delta(&reply.content);
    }

    fn on_complete(&self, reply: &Message) {
        self.print_delta(&reply.content);
        println!();
    }

    fn on_error(&self, error: &NavigatorError) {
        tracing::debug!("Chat error: {}", error);
    }
}

/// Text to print so the terminal shows `content` after `printed`.
fn render_delta(printed: &str, content: &str) -> String {
    match content.strip_prefix(printed) {
        Some(rest) => rest.to_string(),
        // The final text replaced the streamed draft.
        None => format!("\n{} {}", "(revised)".dimmed(), content),
    }
}

struct ChatRun {
    client: ChatClient,
    session: ChatSession,
    language: Language,
    transcript: SharedTranscript,
}

impl ChatRun {
    async fn ask(&self, ctx: &CliContext, question: &str, format: &str) -> Result<Message> {
        let token = ctx
            .gate
            .id_token()
            .await
            .context("Run 'navigator login' or 'navigator guest' first")?;

        let reply = if format == "json" {
            self.client
                .ask(&token, &self.session, &self.transcript, question, &NoopObserver)
                .await?
        } else {
            print!("{} ", "Navigator:".cyan().bold());
            let _ = std::io::stdout().flush();
            let observer = TerminalObserver::new();
            self.client
                .ask(&token, &self.session, &self.transcript, question, &observer)
                .await?
        };

        if format == "json" {
            print_json(&reply.message)?;
        } else {
            print_sources(&reply.message);
            if !reply.is_success() {
                println!("{}", "The answer could not be completed.".yellow());
            }
        }

        Ok(reply.message)
    }
}

pub async fn cmd_chat(
    ctx: &CliContext,
    question: Option<String>,
    role: Option<String>,
    language: Option<String>,
    prompt: Option<usize>,
    format: &str,
) -> Result<()> {
    let role = match role {
        Some(r) => r.parse::<UserRole>()?,
        None => ctx.current_role().await?,
    };
    let language = match language {
        Some(l) => l.parse::<Language>()?,
        None => ctx.config.chat.language,
    };

    let run = ChatRun {
        client: ctx.chat_client()?,
        session: ChatSession::new(role),
        language,
        transcript: Transcript::shared(),
    };

    let question = match (question, prompt) {
        (Some(q), _) => Some(q),
        (None, Some(index)) => Some(
            prompt_by_index(role, language, index)
                .map(|p| p.text.to_string())
                .ok_or_else(|| anyhow!("No suggested prompt #{} for role {}", index, role))?,
        ),
        (None, None) => None,
    };

    match question {
        Some(q) => {
            run.ask(ctx, &q, format).await?;
            Ok(())
        }
        None => repl(ctx, run).await,
    }
}

async fn repl(ctx: &CliContext, mut run: ChatRun) -> Result<()> {
    println!("{}", "Learning Navigator".cyan().bold());
    println!(
        "  {} {}   {} {}   {} {}",
        "Role:".bold(),
        run.session.role,
        "Language:".bold(),
        run.language,
        "Session:".bold(),
        run.session.id.to_string().dimmed()
    );
    println!("{}", "Type /help for commands, /quit to leave.".dimmed());
    println!();
    print_prompt_list(run.session.role, run.language);

    let mut last_reply: Option<Message> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "You:".green().bold());
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(2, ' ');
            let name = parts.next().unwrap_or_default();
            let arg = parts.next().map(str::trim);

            match name {
                "quit" | "exit" => break,
                "help" => print_repl_help(),
                "prompts" => print_prompt_list(run.session.role, run.language),
                "samples" => print_sample_queries(run.session.role, run.language),
                "clear" => {
                    run.transcript.lock().await.clear();
                    last_reply = None;
                    println!("{}", "Conversation cleared.".dimmed());
                }
                "role" => match arg.map(str::parse::<UserRole>) {
                    Some(Ok(role)) => {
                        if let Err(e) = ctx.save_role(role).await {
                            println!("{} {}", "!".yellow(), e);
                        }
                        run.session.set_role(role);
                        run.transcript.lock().await.clear();
                        last_reply = None;
                        println!("{} Role set to {}", "✓".green(), role);
                        print_prompt_list(role, run.language);
                    }
                    Some(Err(e)) => println!("{} {}", "!".yellow(), e),
                    None => println!("Current role: {}", run.session.role),
                },
                "lang" => {
                    let next = match arg {
                        Some(a) => a.parse::<Language>(),
                        None => Ok(run.language.toggled()),
                    };
                    match next {
                        Ok(language) => {
                            run.language = language;
                            run.transcript.lock().await.clear();
                            last_reply = None;
                            println!(
                                "{} Language set to {}. Conversation cleared.",
                                "✓".green(),
                                language
                            );
                            print_prompt_list(run.session.role, language);
                        }
                        Err(e) => println!("{} {}", "!".yellow(), e),
                    }
                }
                "prompt" => {
                    let prompt = arg
                        .and_then(|a| a.parse::<usize>().ok())
                        .and_then(|i| prompt_by_index(run.session.role, run.language, i));
                    match prompt {
                        Some(p) => {
                            println!("{} {}", "You:".green().bold(), p.text);
                            last_reply = ask_in_repl(ctx, &run, p.text).await.or(last_reply);
                        }
                        None => println!("{}", "Usage: /prompt <number>".yellow()),
                    }
                }
                "good" | "bad" => {
                    let kind = if name == "good" {
                        FeedbackKind::Positive
                    } else {
                        FeedbackKind::Negative
                    };
                    match &last_reply {
                        Some(reply) => send_feedback(ctx, &run.session, reply, kind).await,
                        None => println!("{}", "No answer to rate yet.".yellow()),
                    }
                }
                other => println!("{} Unknown command /{}", "!".yellow(), other),
            }
            continue;
        }

        last_reply = ask_in_repl(ctx, &run, line).await.or(last_reply);
    }

    Ok(())
}

async fn ask_in_repl(ctx: &CliContext, run: &ChatRun, question: &str) -> Option<Message> {
    match run.ask(ctx, question, "text").await {
        Ok(reply) => Some(reply),
        Err(e) => {
            println!();
            println!("{}: {}", "Error".red().bold(), e);
            None
        }
    }
}

async fn send_feedback(
    ctx: &CliContext,
    session: &ChatSession,
    reply: &Message,
    kind: FeedbackKind,
) {
    let client = match ctx.feedback_client() {
        Ok(client) => client,
        Err(e) => {
            println!("{} {}", "!".yellow(), e);
            return;
        }
    };
    let feedback = Feedback::new(reply.id, session.id, Some(kind), reply.content.clone());
    if client.submit(&feedback).await {
        println!("{}", "Thanks for the feedback.".dimmed());
    }
}

fn print_sources(message: &Message) {
    let sources = unique_sources(&message.citations);
    if sources.is_empty() {
        return;
    }
    println!();
    println!("  {}", "Sources".yellow().bold());
    for (i, source) in sources.iter().enumerate() {
        println!(
            "    {} {} {}",
            format!("[{}]", i + 1).dimmed(),
            source.display_title(),
            source.source.dimmed()
        );
    }
}

fn print_prompt_list(role: UserRole, language: Language) {
    println!("  {}", format!("Suggested for {}", role).yellow().bold());
    for (i, prompt) in suggested_prompts(role, language).iter().enumerate() {
        println!(
            "    {} {:<22} {}",
            format!("{}.", i + 1).dimmed(),
            prompt.label,
            prompt.text.dimmed()
        );
    }
    println!();
}

fn print_repl_help() {
    println!("  {}", "Commands".yellow().bold());
    println!("    /prompts          list suggested questions");
    println!("    /prompt <n>       ask suggested question n");
    println!("    /samples          list sample queries by category");
    println!("    /role <role>      switch to instructor, staff or learner");
    println!("    /lang [en|es]     switch language (toggles when omitted)");
    println!("    /good, /bad       rate the last answer");
    println!("    /clear            start a fresh conversation");
    println!("    /quit             leave");
}

fn print_sample_queries(role: UserRole, language: Language) {
    for category in sample_queries(role, language) {
        println!("  {}", category.category.yellow().bold());
        for query in category.queries {
            println!("    {} {}", "-".dimmed(), query);
        }
    }
    println!();
}

pub fn cmd_prompts(role: UserRole, language: Language, samples: bool, format: &str) -> Result<()> {
    if format == "json" {
        return print_json(&json!({
            "role": role,
            "language": language,
            "prompts": suggested_prompts(role, language),
            "sample_queries": sample_queries(role, language),
        }));
    }
    print_prompt_list(role, language);
    if samples {
        print_sample_queries(role, language);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_delta_appends_new_text() {
        assert_eq!(render_delta("", "Mental "), "Mental ");
        assert_eq!(render_delta("Mental ", "Mental Health"), "Health");
        assert_eq!(render_delta("Mental Health", "Mental Health"), "");
    }

    #[test]
    fn test_render_delta_marks_revised_answer() {
        let out = render_delta("Mental Health Fi", "MHFA is a course.");
        assert!(out.starts_with('\n'));
        assert!(out.contains("(revised)"));
        assert!(out.ends_with("MHFA is a course."));
    }
}
