//! The lazy sequence of events produced by a streamed completion.
//!
//! A [`CompletionStream`] reads the response body one line at a time, decodes each line, and
//! yields a [`StreamEvent`] per line.  It ends with exactly one [`StreamEvent::Completed`] carrying
//! the assembled assistant message, or with exactly one error.  Either way nothing follows.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

use crate::client_logger::ClientLogger;
use crate::decoder::{Chunk, decode_line};
use crate::error::{Error, Result};
use crate::observability::{
    STREAM_COMPLETED, STREAM_ERRORS, STREAM_FRAGMENTS, STREAM_LINES, STREAM_MALFORMED_CHUNKS,
};
use crate::types::Message;

/// Longest line the stream will buffer before giving up, in bytes.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;
type LineStream = FramedRead<StreamReader<ByteStream, Bytes>, LinesCodec>;

/// One step of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A piece of the answer, in wire order.  May be empty.
    Fragment(String),
    /// A framing line was seen.  Renderers may treat it as a line break or ignore it.
    Break,
    /// The stream is over; this is the whole answer.
    Completed(Message),
}

/// A finite, non-restartable stream of [`StreamEvent`]s.
///
/// The underlying HTTP response is owned by this value, so dropping it closes the connection.
pub struct CompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>,
}

impl CompletionStream {
    /// Wraps a raw body byte stream.
    ///
    /// Lines may be split across byte chunks arbitrarily; a final line without a terminator is
    /// still decoded.  A line longer than [`MAX_LINE_LENGTH`] ends the stream with
    /// [`Error::Streaming`].
    pub fn from_byte_stream<S>(byte_stream: S, logger: Option<Arc<dyn ClientLogger>>) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        let byte_stream: ByteStream = Box::pin(byte_stream);
        let lines = FramedRead::new(
            StreamReader::new(byte_stream),
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );
        let state = StreamState {
            lines,
            fragments: Vec::new(),
            logger,
            finished: false,
        };
        let inner = stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }
            let event = state.next_event().await;
            Some((event, state))
        })
        .fuse();
        Self {
            inner: Box::pin(inner),
        }
    }

    /// Drains the stream and returns the assembled message.
    pub async fn collect_message(self) -> Result<Message> {
        self.for_each_fragment(|_| {}).await
    }

    /// Drains the stream, handing every fragment to `sink` as it arrives, and returns the
    /// assembled message.
    pub async fn for_each_fragment<F>(mut self, mut sink: F) -> Result<Message>
    where
        F: FnMut(&str),
    {
        while let Some(event) = self.next().await {
            match event? {
                StreamEvent::Fragment(text) => sink(&text),
                StreamEvent::Break => {}
                StreamEvent::Completed(message) => return Ok(message),
            }
        }
        Err(Error::streaming("stream ended without a completion event", None))
    }
}

impl Stream for CompletionStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

struct StreamState {
    lines: LineStream,
    fragments: Vec<String>,
    logger: Option<Arc<dyn ClientLogger>>,
    finished: bool,
}

impl StreamState {
    async fn next_event(&mut self) -> Result<StreamEvent> {
        match self.lines.next().await {
            Some(Ok(line)) => {
                STREAM_LINES.click();
                if let Some(logger) = &self.logger {
                    logger.log_stream_line(&line);
                }
                match decode_line(&line) {
                    Ok(Chunk::Fragment(text)) => {
                        STREAM_FRAGMENTS.click();
                        self.fragments.push(text.clone());
                        Ok(StreamEvent::Fragment(text))
                    }
                    Ok(Chunk::NoOp) => Ok(StreamEvent::Break),
                    Ok(Chunk::Done) => Ok(self.complete()),
                    Err(err) => {
                        STREAM_MALFORMED_CHUNKS.click();
                        Err(self.fail(err))
                    }
                }
            }
            Some(Err(err)) => {
                STREAM_ERRORS.click();
                Err(self.fail(lines_error(err)))
            }
            // The body closed without [DONE]; keep what arrived.
            None => Ok(self.complete()),
        }
    }

    fn complete(&mut self) -> StreamEvent {
        self.finished = true;
        STREAM_COMPLETED.click();
        let message = Message::ai(std::mem::take(&mut self.fragments).concat());
        if let Some(logger) = &self.logger {
            logger.log_stream_message(&message);
        }
        StreamEvent::Completed(message)
    }

    fn fail(&mut self, err: Error) -> Error {
        self.finished = true;
        self.fragments.clear();
        err
    }
}

fn lines_error(err: LinesCodecError) -> Error {
    match err {
        LinesCodecError::Io(e) if e.kind() == io::ErrorKind::InvalidData => Error::encoding(
            format!("Invalid UTF-8 in stream: {e}"),
            Some(Box::new(e)),
        ),
        LinesCodecError::Io(e) => {
            Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
        }
        LinesCodecError::MaxLineLengthExceeded => {
            Error::streaming("line exceeded the maximum length", None)
        }
    }
}
