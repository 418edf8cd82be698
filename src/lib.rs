// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod decoder;
pub mod error;
pub mod observability;
pub mod render;
pub mod stream;
pub mod types;

// Re-exports
pub use client::{CompletionClient, DialClient};
pub use client_logger::{ClientLogger, StderrLogger};
pub use conversation::Conversation;
pub use decoder::{Chunk, decode_line};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use stream::{CompletionStream, StreamEvent};
pub use types::*;
