use serde::{Deserialize, Serialize};

/// The author of a message in a conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Instructions that frame the whole conversation.
    #[serde(rename = "system")]
    System,

    /// The human at the keyboard.
    #[serde(rename = "user")]
    User,

    /// The model.  Travels on the wire as `assistant`.
    #[serde(rename = "assistant")]
    Ai,
}

impl Role {
    /// The lower-case name the service expects for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Ai => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
