//! Interactive chat application for conversing with a DIAL deployment.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! DIAL_API_KEY=... dialchat
//!
//! # Pick a deployment and a system prompt
//! dialchat --deployment gpt-4o-mini --system "You are a helpful coding assistant"
//!
//! # Wait for whole answers, no colors
//! dialchat --no-stream --no-color
//!
//! # Load settings from YAML, then override with flags
//! dialchat --config ~/.dialchat.yaml --verbose
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/stream on|off` - Toggle streaming
//! - `/history` - Print the conversation
//! - `/stats` - Show session statistics
//! - `/config` - Show the current configuration
//! - `/quit` or `exit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use dialchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use dialchat::{DialClient, StderrLogger};

/// Environment variable holding the API key.
const API_KEY_VAR: &str = "DIAL_API_KEY";

/// Main entry point for the dialchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("dialchat [OPTIONS]");
    let config = ChatConfig::resolve(&args)?;
    let use_color = config.use_color;

    let api_key = std::env::var(API_KEY_VAR)
        .map_err(|_| format!("{API_KEY_VAR} must be set to your DIAL API key"))?;
    let mut client = DialClient::with_options(
        api_key,
        config.deployment.clone(),
        Some(config.endpoint.clone()),
        Some(config.timeout()),
    )?;
    if config.verbose {
        client = client.with_logger(Arc::new(StderrLogger::new()));
    }

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color_and_interrupt(use_color, interrupted.clone());
    let mut rl = DefaultEditor::new()?;

    println!("DIAL Chat (deployment: {})", session.config().deployment);
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::Stream(on) => {
                            session.set_streaming(on);
                            if on {
                                renderer.print_info("Streaming enabled.");
                            } else {
                                renderer.print_info("Streaming disabled.");
                            }
                        }
                        ChatCommand::History => print_history(&session),
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::ShowConfig => print_config(&session),
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    }
                    continue;
                }

                if let Err(e) = session.send(line, &mut renderer).await {
                    if !e.is_abort() {
                        renderer.print_error(&e.to_string());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

fn print_history(session: &ChatSession) {
    println!("    Conversation:");
    for message in session.conversation() {
        println!("      {}: {}", message.role(), message.content());
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Deployment: {}", stats.deployment);
    println!(
        "      Streaming: {}",
        if stats.streaming { "on" } else { "off" }
    );
    println!("      Messages: {}", stats.message_count);
    println!("      Turns: {}", stats.turns);
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.failed_requests
    );
    println!("      Fragments received: {}", stats.fragments_received);
}

fn print_config(session: &ChatSession) {
    let config = session.config();
    println!("    Current Configuration:");
    println!("      Deployment: {}", config.deployment);
    println!("      Endpoint: {}", config.endpoint);
    println!(
        "      Streaming: {}",
        if session.is_streaming() { "on" } else { "off" }
    );
    println!("      Colors: {}", if config.use_color { "on" } else { "off" });
    println!("      Verbose: {}", if config.verbose { "on" } else { "off" });
    println!("      Timeout: {}s", config.timeout_secs);
    println!("      System prompt: {}", config.system_prompt);
}
