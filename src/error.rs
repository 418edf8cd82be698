//! Error types for dialchat.
//!
//! Every failure surfaces to the immediate caller; nothing in this crate logs an error and
//! carries on.  Success and failure are mutually exclusive: a call that fails never hands back a
//! partially assembled message.

use std::error;
use std::fmt;
use std::sync::Arc;

/// The main error type for dialchat.
#[derive(Clone, Debug)]
pub enum Error {
    /// The service answered the initial request with a non-success status.
    RequestFailure {
        /// HTTP status code.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// A blocking completion succeeded but carried zero choices.
    EmptyResponse,

    /// A streamed data line did not carry a well-formed chunk.
    MalformedChunk {
        /// The payload that followed the `data: ` prefix.
        payload: String,
        /// The parser's complaint.
        source: Arc<serde_json::Error>,
    },

    /// Credentials were missing or empty.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// The caller gave up on a response before it finished.
    Abort {
        /// Human-readable error message.
        message: String,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during validation of request parameters.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// The response body failed mid-stream.
    Streaming {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Encoding/decoding error.
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A configuration file could not be read or understood.
    Config {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new request failure.
    pub fn request_failure(status_code: u16, body: impl Into<String>) -> Self {
        Error::RequestFailure {
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new empty response error.
    pub fn empty_response() -> Self {
        Error::EmptyResponse
    }

    /// Creates a new malformed chunk error.
    pub fn malformed_chunk(payload: impl Into<String>, source: serde_json::Error) -> Self {
        Error::MalformedChunk {
            payload: payload.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new abort error.
    pub fn abort(message: impl Into<String>) -> Self {
        Error::Abort {
            message: message.into(),
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new streaming error.
    pub fn streaming(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Streaming {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new configuration error.
    pub fn config(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Config {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Returns true if the service rejected the request with a non-success status.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, Error::RequestFailure { .. })
    }

    /// Returns true if the service answered without any choices.
    pub fn is_empty_response(&self) -> bool {
        matches!(self, Error::EmptyResponse)
    }

    /// Returns true if a streamed chunk could not be decoded.
    pub fn is_malformed_chunk(&self) -> bool {
        matches!(self, Error::MalformedChunk { .. })
    }

    /// Returns true if this error is related to authentication.
    ///
    /// A 401 from the service counts, as do locally detected credential problems.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Error::Authentication { .. }
                | Error::RequestFailure {
                    status_code: 401,
                    ..
                }
        )
    }

    /// Returns true if this error is an abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a streaming error.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Error::Streaming { .. })
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RequestFailure { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the raw response body associated with this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::RequestFailure { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RequestFailure { status_code, body } => {
                write!(f, "HTTP {status_code}: {body}")
            }
            Error::EmptyResponse => {
                write!(f, "Empty response: no choices in completion")
            }
            Error::MalformedChunk { payload, source } => {
                write!(f, "Malformed chunk: {source} in '{payload}'")
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::Abort { message } => {
                write!(f, "Request aborted: {message}")
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Streaming { message, .. } => {
                write!(f, "Streaming error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
            Error::Config { message, .. } => {
                write!(f, "Configuration error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::MalformedChunk { source, .. } => Some(source.as_ref()),
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Streaming { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Encoding { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Config { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for dialchat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failure_carries_status_and_body() {
        let err = Error::request_failure(401, "unauthorized");
        assert!(err.is_request_failure());
        assert!(err.is_authentication());
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.body(), Some("unauthorized"));
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
    }

    #[test]
    fn non_401_failure_is_not_authentication() {
        let err = Error::request_failure(500, "boom");
        assert!(!err.is_authentication());
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn malformed_chunk_exposes_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json}").unwrap_err();
        let err = Error::malformed_chunk("{not json}", parse_err);
        assert!(err.is_malformed_chunk());
        assert!(error::Error::source(&err).is_some());
        assert!(err.to_string().contains("{not json}"));
    }

    #[test]
    fn empty_response_has_no_status() {
        let err = Error::empty_response();
        assert!(err.is_empty_response());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.body(), None);
    }

    #[test]
    fn transport_predicates() {
        let err = Error::timeout("Request timed out", Some(60.0));
        assert!(err.is_timeout());
        assert!(!err.is_connection());
        assert_eq!(err.to_string(), "Timeout error: Request timed out (60 seconds)");

        let err = Error::connection("Connection refused", None);
        assert!(err.is_connection());
        assert!(!err.is_timeout());
        assert_eq!(err.status_code(), None);

        let err = Error::streaming("line exceeded the maximum length", None);
        assert!(err.is_streaming());
        assert!(!err.is_request_failure());
    }
}
