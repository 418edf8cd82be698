//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation and drives one
//! completion per user turn.

use futures::StreamExt;

use crate::chat::config::ChatConfig;
use crate::client::{CompletionClient, DialClient};
use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::stream::StreamEvent;
use crate::types::Message;

/// Label printed ahead of every answer.
const AI_LABEL: &str = "AI";

/// A chat session that manages conversation state and API interactions.
///
/// The conversation only ever grows by whole turns: the user message and the answer are
/// appended together once the answer is complete, and a failed turn leaves it untouched.
pub struct ChatSession<C: CompletionClient = DialClient> {
    client: C,
    config: ChatConfig,
    conversation: Conversation,
    request_count: u64,
    failed_requests: u64,
    fragments_received: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The deployment used for the session.
    pub deployment: String,
    /// Whether answers are streamed.
    pub streaming: bool,
    /// The number of messages in the conversation, system prompt included.
    pub message_count: usize,
    /// Completed user/assistant exchanges.
    pub turns: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Requests that ended in an error or an interrupt.
    pub failed_requests: u64,
    /// Streamed fragments seen across all requests.
    pub fragments_received: u64,
}

impl<C: CompletionClient> ChatSession<C> {
    /// Creates a new chat session whose conversation opens with the configured system prompt.
    pub fn new(client: C, config: ChatConfig) -> Self {
        let conversation = Conversation::with_system_prompt(config.system_prompt.clone());
        Self {
            client,
            config,
            conversation,
            request_count: 0,
            failed_requests: 0,
            fragments_received: 0,
        }
    }

    /// Sends a user message and renders the answer.
    ///
    /// This method:
    /// 1. Builds the request from the history plus the pending user message
    /// 2. Streams or waits for the answer, depending on the configuration
    /// 3. Appends the user message and the answer to the history
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged, or [`Error::Abort`] when the renderer asks to
    /// interrupt a streamed answer.  The history is not modified on error.
    pub async fn send(&mut self, user_input: &str, renderer: &mut dyn Renderer) -> Result<()> {
        let user = Message::user(user_input);
        let mut messages = self.conversation.get_messages().to_vec();
        messages.push(user.clone());

        self.request_count += 1;
        let outcome = if self.config.stream {
            self.send_streaming(&messages, renderer).await
        } else {
            self.send_blocking(&messages, renderer).await
        };

        match outcome {
            Ok(answer) => {
                self.conversation.add_message(user);
                self.conversation.add_message(answer);
                Ok(())
            }
            Err(err) => {
                self.failed_requests += 1;
                Err(err)
            }
        }
    }

    async fn send_streaming(
        &mut self,
        messages: &[Message],
        renderer: &mut dyn Renderer,
    ) -> Result<Message> {
        let mut stream = self.client.stream_completion(messages).await?;
        renderer.start_response(AI_LABEL);
        loop {
            if renderer.should_interrupt() {
                renderer.print_interrupted();
                return Err(Error::abort("response interrupted"));
            }
            let Some(event) = stream.next().await else {
                // The stream always ends with Completed or an error.
                return Err(Error::streaming("stream ended without a message", None));
            };
            match event? {
                StreamEvent::Fragment(text) => {
                    self.fragments_received += 1;
                    renderer.print_text(&text);
                }
                StreamEvent::Break => renderer.print_break(),
                StreamEvent::Completed(message) => {
                    renderer.finish_response();
                    return Ok(message);
                }
            }
        }
    }

    async fn send_blocking(
        &mut self,
        messages: &[Message],
        renderer: &mut dyn Renderer,
    ) -> Result<Message> {
        let message = self.client.get_completion(messages).await?;
        renderer.start_response(AI_LABEL);
        renderer.print_text(message.content());
        renderer.finish_response();
        Ok(message)
    }

    /// Switches between streamed and blocking answers.
    pub fn set_streaming(&mut self, stream: bool) {
        self.config.stream = stream;
    }

    /// Returns whether answers are streamed.
    pub fn is_streaming(&self) -> bool {
        self.config.stream
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Returns a snapshot of the session statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            deployment: self.config.deployment.clone(),
            streaming: self.config.stream,
            message_count: self.conversation.len(),
            turns: self.request_count - self.failed_requests,
            total_requests: self.request_count,
            failed_requests: self.failed_requests,
            fragments_received: self.fragments_received,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use bytes::Bytes;
    use futures::stream;

    use super::*;
    use crate::stream::CompletionStream;
    use crate::types::Role;

    enum Reply {
        Stream(Vec<&'static str>),
        Blocking(&'static str),
        Fail(u16, &'static str),
    }

    struct FakeClient {
        reply: Reply,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl FakeClient {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for FakeClient {
        async fn get_completion(&self, messages: &[Message]) -> Result<Message> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Reply::Blocking(text) => Ok(Message::ai(*text)),
                Reply::Fail(status, body) => Err(Error::request_failure(*status, *body)),
                Reply::Stream(_) => Err(Error::empty_response()),
            }
        }

        async fn stream_completion(&self, messages: &[Message]) -> Result<CompletionStream> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Reply::Stream(chunks) => {
                    let chunks: Vec<io::Result<Bytes>> = chunks
                        .iter()
                        .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
                        .collect();
                    Ok(CompletionStream::from_byte_stream(stream::iter(chunks), None))
                }
                Reply::Fail(status, body) => Err(Error::request_failure(*status, *body)),
                Reply::Blocking(_) => Err(Error::empty_response()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        text: String,
        breaks: usize,
        started: usize,
        finished: usize,
        interrupt_after: Option<usize>,
        interrupted: bool,
    }

    impl Renderer for RecordingRenderer {
        fn start_response(&mut self, label: &str) {
            assert_eq!(label, "AI");
            self.started += 1;
        }

        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn print_break(&mut self) {
            self.breaks += 1;
        }

        fn print_error(&mut self, _: &str) {}

        fn print_info(&mut self, _: &str) {}

        fn finish_response(&mut self) {
            self.finished += 1;
        }

        fn print_interrupted(&mut self) {
            self.interrupted = true;
        }

        fn should_interrupt(&self) -> bool {
            self.interrupt_after
                .is_some_and(|limit| self.text.chars().count() >= limit)
        }
    }

    const HELLO: &[&str] = &[
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: [DONE]\n\n",
    ];

    fn config(stream: bool) -> ChatConfig {
        ChatConfig::new()
            .with_system_prompt("Be brief.")
            .with_stream(stream)
    }

    #[tokio::test]
    async fn new_session_has_system_prompt() {
        let session = ChatSession::new(FakeClient::new(Reply::Blocking("x")), config(false));
        assert_eq!(session.message_count(), 1);
        let first = &session.conversation().get_messages()[0];
        assert_eq!(first.role(), Role::System);
        assert_eq!(first.content(), "Be brief.");
    }

    #[tokio::test]
    async fn streaming_turn_appends_two_messages() {
        let mut session =
            ChatSession::new(FakeClient::new(Reply::Stream(HELLO.to_vec())), config(true));
        let mut renderer = RecordingRenderer::default();
        session.send("Hi", &mut renderer).await.unwrap();

        assert_eq!(renderer.text, "Hello");
        assert_eq!(renderer.breaks, 2);
        assert_eq!(renderer.started, 1);
        assert_eq!(renderer.finished, 1);

        let messages = session.conversation().get_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], Message::user("Hi"));
        assert_eq!(messages[2], Message::ai("Hello"));

        let seen = session.client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec![Message::system("Be brief."), Message::user("Hi")]);
    }

    #[tokio::test]
    async fn blocking_turn_appends_two_messages() {
        let mut session =
            ChatSession::new(FakeClient::new(Reply::Blocking("Sure.")), config(false));
        let mut renderer = RecordingRenderer::default();
        session.send("Help?", &mut renderer).await.unwrap();
        assert_eq!(renderer.text, "Sure.");
        assert_eq!(renderer.finished, 1);
        assert_eq!(session.conversation().last(), Some(&Message::ai("Sure.")));
        assert_eq!(session.message_count(), 3);
    }

    #[tokio::test]
    async fn failed_turn_leaves_history_alone() {
        let mut session =
            ChatSession::new(FakeClient::new(Reply::Fail(401, "unauthorized")), config(true));
        let mut renderer = RecordingRenderer::default();
        let err = session.send("Hi", &mut renderer).await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(session.message_count(), 1);
        assert_eq!(renderer.started, 0);

        let stats = session.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.turns, 0);
    }

    #[tokio::test]
    async fn malformed_chunk_discards_turn() {
        let mut session = ChatSession::new(
            FakeClient::new(Reply::Stream(vec![
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
                "data: {not json}\n",
            ])),
            config(true),
        );
        let mut renderer = RecordingRenderer::default();
        let err = session.send("Hi", &mut renderer).await.unwrap_err();
        assert!(err.is_malformed_chunk());
        assert_eq!(renderer.text, "Hel");
        assert_eq!(renderer.finished, 0);
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn interrupt_aborts_streaming() {
        let mut session =
            ChatSession::new(FakeClient::new(Reply::Stream(HELLO.to_vec())), config(true));
        let mut renderer = RecordingRenderer {
            interrupt_after: Some(3),
            ..RecordingRenderer::default()
        };
        let err = session.send("Hi", &mut renderer).await.unwrap_err();
        assert!(err.is_abort());
        assert!(renderer.interrupted);
        assert_eq!(renderer.text, "Hel");
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn stats_track_turns_and_fragments() {
        let mut session =
            ChatSession::new(FakeClient::new(Reply::Stream(HELLO.to_vec())), config(true));
        let mut renderer = RecordingRenderer::default();
        session.send("one", &mut renderer).await.unwrap();
        session.send("two", &mut renderer).await.unwrap();

        let stats = session.stats();
        assert_eq!(stats.deployment, "gpt-4o");
        assert!(stats.streaming);
        assert_eq!(stats.message_count, 5);
        assert_eq!(stats.turns, 2);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.failed_requests, 0);
        assert_eq!(stats.fragments_received, 4);

        // The second request carries the first turn.
        let seen = session.client.seen.lock().unwrap();
        assert_eq!(seen[1].len(), 4);
        assert_eq!(seen[1][2], Message::ai("Hello"));
    }

    #[tokio::test]
    async fn set_streaming_switches_mode() {
        let mut session = ChatSession::new(FakeClient::new(Reply::Blocking("ok")), config(true));
        session.set_streaming(false);
        assert!(!session.is_streaming());
        let mut renderer = RecordingRenderer::default();
        session.send("Hi", &mut renderer).await.unwrap();
        assert_eq!(renderer.text, "ok");
        assert!(!session.stats().streaming);
    }
}
