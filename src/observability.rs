use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("dialchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("dialchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("dialchat.client.request_duration_seconds");

pub(crate) static STREAM_LINES: Counter = Counter::new("dialchat.stream.lines");
pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("dialchat.stream.fragments");
pub(crate) static STREAM_MALFORMED_CHUNKS: Counter =
    Counter::new("dialchat.stream.malformed_chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("dialchat.stream.errors");
pub(crate) static STREAM_COMPLETED: Counter = Counter::new("dialchat.stream.completed");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_LINES);
    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_MALFORMED_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_COMPLETED);
}
