// Public modules
pub mod chat_completion;
pub mod chat_completion_chunk;
pub mod chat_completion_request;
pub mod message;
pub mod role;

// Re-exports
pub use chat_completion::{ChatCompletion, CompletionChoice, CompletionMessage};
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, Delta};
pub use chat_completion_request::ChatCompletionRequest;
pub use message::Message;
pub use role::Role;
