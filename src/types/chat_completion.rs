use serde::{Deserialize, Serialize};

/// The body of a blocking chat completion response.
///
/// Only the fields this client reads are modeled; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Candidate answers.  The first one is the answer.
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// One candidate answer in a blocking response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// The generated message.
    #[serde(default)]
    pub message: CompletionMessage,
}

/// The generated message inside a [`CompletionChoice`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// The text, which the service may send as `null`.
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Take the content of the first choice.
    ///
    /// Returns `None` when there are no choices; a `null` content becomes the empty string.
    pub fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_choice_content() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hello"}},
                {"index": 1, "message": {"role": "assistant", "content": "Other"}}
            ]
        }))
        .unwrap();
        assert_eq!(completion.into_first_content(), Some("Hello".to_string()));
    }

    #[test]
    fn zero_choices() {
        let completion: ChatCompletion = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(completion.into_first_content(), None);
    }

    #[test]
    fn null_content_is_empty() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(completion.into_first_content(), Some(String::new()));
    }
}
