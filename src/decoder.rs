//! Decoding of individual lines of a streamed completion body.
//!
//! The service frames a streamed answer as lines.  Lines that start with `data: ` carry either a
//! JSON chunk or the terminal `[DONE]` marker; every other line is framing.

use crate::error::{Error, Result};
use crate::types::ChatCompletionChunk;

/// Prefix of lines that carry a payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that ends the stream.
pub const DONE_MARKER: &str = "[DONE]";

/// What a single line of a streamed body means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A piece of the assistant's text.  May be empty.
    Fragment(String),
    /// The terminal marker.  Nothing after it is read.
    Done,
    /// A framing line (keep-alive, blank separator, comment).
    NoOp,
}

/// Classify one line of a streamed body.
///
/// The line is trimmed before inspection.  A data line whose payload is not a well-formed chunk
/// yields [`Error::MalformedChunk`].  Newlines inside fragment text are removed.
pub fn decode_line(line: &str) -> Result<Chunk> {
    let line = line.trim();
    let Some(payload) = line.strip_prefix(DATA_PREFIX).map(str::trim) else {
        return Ok(Chunk::NoOp);
    };
    if payload == DONE_MARKER {
        return Ok(Chunk::Done);
    }
    let chunk = serde_json::from_str::<ChatCompletionChunk>(payload)
        .map_err(|e| Error::malformed_chunk(payload, e))?;
    let text = chunk
        .first_delta_content()
        .map(|content| content.replace('\n', ""))
        .unwrap_or_default();
    Ok(Chunk::Fragment(text))
}
