use serde::{Deserialize, Serialize};

use crate::types::Message;

/// The body POSTed to a deployment's chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The conversation so far, oldest first.
    pub messages: Vec<Message>,

    /// Whether the service should stream its answer.
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Create a request for a single blocking response.
    pub fn new(messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
            stream: false,
        }
    }

    /// Create a request for a streamed response.
    pub fn new_streaming(messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn streaming_request_serialization() {
        let messages = vec![Message::system("Be brief."), Message::user("Hi")];
        let request = ChatCompletionRequest::new_streaming(&messages);

        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hi"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn blocking_request_has_stream_false() {
        let request = ChatCompletionRequest::new(&[Message::user("Hi")]);
        assert_eq!(to_value(&request).unwrap()["stream"], json!(false));
    }
}
