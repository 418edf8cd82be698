//! Chat application module for interactive conversations with a DIAL deployment.
//!
//! This module provides a REPL chat interface built on top of the client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - Blocking responses when streaming is switched off
//! - Slash commands for session control
//! - Configuration from a YAML file and command-line flags
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation ownership and turn handling
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use crate::client::DEFAULT_ENDPOINT;
pub use config::{ChatArgs, ChatConfig, ChatConfigFile, DEFAULT_DEPLOYMENT, DEFAULT_SYSTEM_PROMPT};
pub use session::{ChatSession, SessionStats};
