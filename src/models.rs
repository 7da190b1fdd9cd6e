use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::WisdomError;

/// Metadata attached to every indexed scripture chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub tradition: String,
    pub scripture_name: String,
    pub book_title: String,
    pub source_file: String,
    #[serde(default)]
    pub chunk_index: usize,
}

/// A piece of scripture text with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub metadata: PassageMetadata,
}

impl Passage {
    pub fn tradition(&self) -> &str {
        &self.metadata.tradition
    }

    /// Scripture name, falling back to the book title
    pub fn scripture(&self) -> &str {
        if self.metadata.scripture_name.is_empty() {
            &self.metadata.book_title
        } else {
            &self.metadata.scripture_name
        }
    }
}

/// A passage returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

/// A chunk ready to be stored in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub id: String,
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// How the advisor frames its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Prayer,
    Journal,
    Meditation,
}

impl Mode {
    /// Unknown names fall back to `Standard`
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for Mode {
    type Err = WisdomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "prayer" => Ok(Self::Prayer),
            "journal" => Ok(Self::Journal),
            "meditation" => Ok(Self::Meditation),
            other => Err(WisdomError::InvalidInput(format!("Unknown mode: {other}"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Prayer => "prayer",
            Self::Journal => "journal",
            Self::Meditation => "meditation",
        };
        f.write_str(name)
    }
}

/// One prior question/answer pair supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryExchange {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}
