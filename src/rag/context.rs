//! Context assembly from retrieved passages

use std::collections::BTreeSet;

use crate::models::ScoredPassage;
use crate::text::truncate_str;

/// Characters of each passage placed in the prompt
pub const MAX_CHARS_PER_PASSAGE: usize = 400;

/// Numbered citation blocks separated by blank lines
pub fn context_to_text(passages: &[ScoredPassage], max_chars_per_passage: usize) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let passage = &scored.passage;
            let content = truncate_str(passage.content.trim(), max_chars_per_passage);
            format!(
                "[{}] {} - {}\n{}",
                i + 1,
                passage.tradition(),
                passage.scripture(),
                content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Distinct traditions among the passages, sorted
pub fn traditions_in(passages: &[ScoredPassage]) -> Vec<String> {
    passages
        .iter()
        .map(|p| p.passage.tradition().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
