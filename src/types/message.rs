use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One turn of a conversation.
///
/// Messages are immutable once built; the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system `Message`.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }

    /// The author of this message.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of this message.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume the message, returning its text.
    pub fn into_content(self) -> String {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serialization() {
        let message = Message::user("Hello, world!");
        let json = to_value(&message).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": "Hello, world!"
            })
        );
    }

    #[test]
    fn ai_message_uses_assistant_role() {
        let json = to_value(Message::ai("Hi")).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn empty_content_serializes_as_empty_string() {
        let json = to_value(Message::ai("")).unwrap();
        assert_eq!(json["content"], json!(""));
    }

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::system("s").role(), Role::System);
        assert_eq!(Message::user("u").role(), Role::User);
        assert_eq!(Message::ai("a").role(), Role::Ai);
        assert_eq!(Message::ai("a").into_content(), "a");
    }
}
