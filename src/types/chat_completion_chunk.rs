use serde::{Deserialize, Deserializer, Serialize};

/// One streamed event of a chat completion, as carried on a `data: ` line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Incremental updates, one per candidate.  Missing and `null` both mean none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<ChunkChoice>,
}

/// The incremental update for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// What changed since the previous chunk.
    #[serde(default)]
    pub delta: Delta,
}

/// The piece of text added by a chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Absent or `null` when the chunk carries no text (role announcements, finish markers).
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// The raw text of the first choice's delta, if there is any.
    pub fn first_delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
