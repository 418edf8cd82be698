//! Logging hook for dialchat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture every request the
//! [`DialClient`](crate::DialClient) sends and everything it receives, plus [`StderrLogger`],
//! which writes all of it to standard error.

use serde::Serialize;

use crate::types::{ChatCompletionRequest, Message};

/// A trait for logging client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including every raw line of a streamed body.
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &ChatCompletionRequest);

    /// Log the message produced by a blocking `get_completion` call.
    fn log_response(&self, message: &Message);

    /// Log one raw line of a streamed body, before it is decoded.
    fn log_stream_line(&self, line: &str);

    /// Log the message reconstructed from a completed stream.
    fn log_stream_message(&self, message: &Message);
}

/// A [`ClientLogger`] that prints requests and responses to stderr as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogger;

impl StderrLogger {
    /// Creates a new stderr logger.
    pub fn new() -> Self {
        Self
    }

    fn print_json<T: Serialize + std::fmt::Debug>(label: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => eprintln!("[{label}] {json}"),
            Err(_) => eprintln!("[{label}] {value:?}"),
        }
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, request: &ChatCompletionRequest) {
        Self::print_json("request", request);
    }

    fn log_response(&self, message: &Message) {
        Self::print_json("response", message);
    }

    fn log_stream_line(&self, line: &str) {
        if !line.trim().is_empty() {
            eprintln!("[stream] {line}");
        }
    }

    fn log_stream_message(&self, message: &Message) {
        Self::print_json("stream complete", message);
    }
}
