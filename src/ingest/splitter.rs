//! Recursive character text splitting
//!
//! Text is split on the first separator that occurs in it, pieces that are
//! still too long are split again with the remaining separators, and small
//! pieces are merged back into chunks of at most `chunk_size` characters
//! with up to `chunk_overlap` characters carried over between neighbours.
//! Separators stay attached to the start of the piece that follows them.

use std::collections::VecDeque;

use super::loader::SourceDocument;
use crate::models::Passage;

pub const DEFAULT_CHUNK_SIZE: usize = 900;
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, keeping it at the start of each following piece
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl TextSplitter {
    /// Splitter with the default separators; overlap is clamped below the size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    /// Chunks of `doc` carrying its metadata plus their position
    pub fn split_document(&self, doc: &SourceDocument) -> Vec<Passage> {
        self.split_text(&doc.content)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| {
                let mut metadata = doc.metadata.clone();
                metadata.chunk_index = chunk_index;
                Passage { content, metadata }
            })
            .collect()
    }

    pub fn split_documents(&self, docs: &[SourceDocument]) -> Vec<Passage> {
        docs.iter().flat_map(|d| self.split_document(d)).collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut remaining: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(doc) = join_pieces(&window) {
                    docs.push(doc);
                }
                // Keep a tail of at most chunk_overlap chars that still leaves room
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        if let Some(doc) = join_pieces(&window) {
            docs.push(doc);
        }
        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(
            splitter.split_text("  Be still, and know.  "),
            vec!["Be still, and know.".to_string()]
        );
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(split_keeping_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keeping_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keeping_separator("né", ""), vec!["n", "é"]);
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = TextSplitter::new(50, 15);
        let text = (0..60)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {chunk}");
        }
        // Neighbouring chunks share their boundary words
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap();
            assert!(pair[1].contains(last_word));
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(40, 0);
        let text = "First paragraph is here.\n\nSecond paragraph is here.";
        let chunks = splitter.split_text(text);
        assert_eq!(
            chunks,
            vec![
                "First paragraph is here.".to_string(),
                "Second paragraph is here.".to_string()
            ]
        );
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = TextSplitter::new(10, 2);
        let chunks = splitter.split_text(&"x".repeat(25));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0].len(), 10);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let splitter = TextSplitter::new(5, 0);
        let chunks = splitter.split_text("ॐॐॐॐॐ");
        assert_eq!(chunks, vec!["ॐॐॐॐॐ".to_string()]);
    }

    #[test]
    fn test_split_document_numbers_chunks() {
        let doc = SourceDocument::from_file_name(
            "dhammapada.txt",
            "All that we are is the result of what we have thought.\n\n\
             It is founded on our thoughts, it is made up of our thoughts."
                .to_string(),
        );
        let passages = TextSplitter::new(70, 10).split_document(&doc);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].metadata.chunk_index, 0);
        assert_eq!(passages[1].metadata.chunk_index, 1);
        assert_eq!(passages[1].metadata.tradition, "Buddhism");
    }
}
