use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::stream::CompletionStream;
use crate::types::{ChatCompletion, ChatCompletionRequest, Message};

/// Service root used when no endpoint is given.
pub const DEFAULT_ENDPOINT: &str = "https://ai-proxy.lab.epam.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Something that can answer a conversation.
///
/// [`DialClient`] is the production implementation; the chat session only depends on this trait.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the conversation and wait for the whole answer.
    async fn get_completion(&self, messages: &[Message]) -> Result<Message>;

    /// Send the conversation and stream the answer back.
    async fn stream_completion(&self, messages: &[Message]) -> Result<CompletionStream>;
}

/// Client for one deployment behind a DIAL chat completion API.
#[derive(Clone)]
pub struct DialClient {
    api_key: HeaderValue,
    deployment: String,
    client: ReqwestClient,
    url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl DialClient {
    /// Create a new client for `deployment` on the default endpoint.
    pub fn new(api_key: impl Into<String>, deployment: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, deployment, None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `endpoint` is the service root; the deployment's completion path is appended to it.
    /// `timeout` bounds connecting and, for blocking calls, the whole exchange.  Streamed bodies
    /// are not subject to it once the response has started.
    pub fn with_options(
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        endpoint: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::authentication("API key must not be empty"));
        }
        let mut api_key = HeaderValue::from_str(&api_key).map_err(|_| {
            Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            )
        })?;
        api_key.set_sensitive(true);

        let deployment = deployment.into();
        if deployment.trim().is_empty() {
            return Err(Error::validation(
                "deployment name must not be empty",
                Some("deployment".to_string()),
            ));
        }
        let url = completion_url(endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT), &deployment)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            deployment,
            client,
            url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that sees every request, stream line, and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The deployment this client talks to.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// The full chat completion URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("api-key", self.api_key.clone());
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    /// Turn a non-success response into a request failure carrying status and body.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::request_failure(status_code, body),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {e}"),
                Some(Box::new(e)),
            ),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// POST a request and return the response once its status is known to be a success.
    async fn post(&self, request: &ChatCompletionRequest) -> Result<Response> {
        if request.messages.is_empty() {
            return Err(Error::validation(
                "at least one message is required",
                Some("messages".to_string()),
            ));
        }
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        CLIENT_REQUESTS.click();

        let mut headers = self.default_headers();
        let mut builder = self.client.post(self.url.clone());
        if request.stream {
            headers.insert(
                header::ACCEPT,
                HeaderValue::from_static("text/event-stream"),
            );
        } else {
            headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
            builder = builder.timeout(self.timeout);
        }

        let response = builder
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Send the conversation and wait for a single, complete answer.
    pub async fn get_completion(&self, messages: &[Message]) -> Result<Message> {
        let start = Instant::now();
        let request = ChatCompletionRequest::new(messages);
        let response = self.post(&request).await?;

        let completion = response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {e}"),
                Some(Box::new(e)),
            )
        })?;
        let content = completion
            .into_first_content()
            .ok_or_else(Error::empty_response)?;
        let message = Message::ai(content);

        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Some(logger) = &self.logger {
            logger.log_response(&message);
        }
        Ok(message)
    }

    /// Send the conversation and stream the answer.
    ///
    /// A non-success status fails here, before any event is produced.  Otherwise the returned
    /// stream yields fragments as lines arrive and finishes with the assembled message.
    pub async fn stream_completion(&self, messages: &[Message]) -> Result<CompletionStream> {
        let start = Instant::now();
        let request = ChatCompletionRequest::new_streaming(messages);
        let response = self.post(&request).await?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let byte_stream = response
            .bytes_stream()
            .map(|result| result.map_err(io::Error::other));
        Ok(CompletionStream::from_byte_stream(byte_stream, self.logger.clone()))
    }
}

#[async_trait::async_trait]
impl CompletionClient for DialClient {
    async fn get_completion(&self, messages: &[Message]) -> Result<Message> {
        DialClient::get_completion(self, messages).await
    }

    async fn stream_completion(&self, messages: &[Message]) -> Result<CompletionStream> {
        DialClient::stream_completion(self, messages).await
    }
}

impl fmt::Debug for DialClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialClient")
            .field("deployment", &self.deployment)
            .field("url", &self.url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

/// Build `{endpoint}/openai/deployments/{deployment}/chat/completions`.
fn completion_url(endpoint: &str, deployment: &str) -> Result<Url> {
    let mut base = Url::parse(endpoint)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let url = base.join(&format!("openai/deployments/{deployment}/chat/completions"))?;
    Ok(url)
}
