//! Case-insensitive search over chats, journals and community profiles

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::community::CommunityProfile;
use crate::memory::ChatRole;
use crate::memory::UserMemory;
use crate::text::take_chars;

/// Characters of context shown around a match
pub const SNIPPET_CONTEXT: usize = 100;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const PROFILE_BIO_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessageHit {
    pub chat_id: String,
    pub chat_title: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalHit {
    pub entry: String,
    pub reflection: String,
    pub date: DateTime<Utc>,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileHit {
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub preferred_traditions: Vec<String>,
    pub snippet: String,
}

fn lower_chars(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Char index of the first case-insensitive occurrence of `needle`
fn find_ci(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains_ci(text: &str, query: &str) -> bool {
    find_ci(&lower_chars(text), &lower_chars(query)).is_some()
}

/// Text around the first match of `query`, with "..." where it was cut
///
/// Without a match the first `context` characters are returned.
pub fn snippet(text: &str, query: &str, context: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let query_len = query.chars().count();

    let Some(index) = find_ci(&lower_chars(text), &lower_chars(query)) else {
        return if chars.len() > context {
            format!("{}...", take_chars(text, context))
        } else {
            text.to_string()
        };
    };

    let start = index.saturating_sub(context / 2);
    let end = (index + query_len + context / 2).min(chars.len());
    let mut out: String = chars[start..end].iter().collect();
    if start > 0 {
        out.insert_str(0, "...");
    }
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

/// Chat messages containing `query`, most recent chats first
pub fn search_chat_messages(memory: &UserMemory, query: &str, limit: usize) -> Vec<ChatMessageHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    memory
        .chats
        .iter()
        .flat_map(|chat| chat.messages.iter().map(move |m| (chat, m)))
        .filter(|(_, message)| contains_ci(&message.content, query))
        .take(limit)
        .map(|(chat, message)| ChatMessageHit {
            chat_id: chat.id.clone(),
            chat_title: chat.title.clone(),
            role: message.role,
            content: message.content.clone(),
            timestamp: message.timestamp,
            snippet: snippet(&message.content, query, SNIPPET_CONTEXT),
        })
        .collect()
}

/// Journal entries whose entry or reflection contains `query`, newest first
pub fn search_journal_entries(memory: &UserMemory, query: &str, limit: usize) -> Vec<JournalHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    memory
        .journal_entries
        .iter()
        .rev()
        .filter(|j| contains_ci(&j.entry, query) || contains_ci(&j.reflection, query))
        .take(limit)
        .map(|j| JournalHit {
            entry: j.entry.clone(),
            reflection: j.reflection.clone(),
            date: j.date,
            snippet: snippet(&format!("{} {}", j.entry, j.reflection), query, SNIPPET_CONTEXT),
        })
        .collect()
}

/// Opted-in profiles whose name or bio contains `query`
pub fn search_community_profiles(
    profiles: &[CommunityProfile],
    query: &str,
    limit: usize,
) -> Vec<ProfileHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    profiles
        .iter()
        .filter(|p| p.opt_in)
        .filter(|p| contains_ci(&p.display_name, query) || contains_ci(&p.bio, query))
        .take(limit)
        .map(|p| ProfileHit {
            email: p.email.clone(),
            display_name: p.display_name.clone(),
            bio: take_chars(&p.bio, PROFILE_BIO_CHARS),
            preferred_traditions: p.preferred_traditions.clone(),
            snippet: snippet(&p.bio, query, SNIPPET_CONTEXT),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_around_match() {
        let text = format!("{}needle{}", "a".repeat(80), "b".repeat(80));
        let out = snippet(&text, "NEEDLE", 20);
        assert_eq!(out, format!("...{}needle{}...", "a".repeat(10), "b".repeat(10)));
    }

    #[test]
    fn test_snippet_without_match_or_short_text() {
        assert_eq!(snippet("short text", "zzz", 100), "short text");
        let long = "x".repeat(150);
        assert_eq!(snippet(&long, "zzz", 100), format!("{}...", "x".repeat(100)));
        assert_eq!(snippet("peace be with you", "PEACE", 100), "peace be with you");
    }

    #[test]
    fn test_search_chats_and_journal() {
        let now = Utc::now();
        let mut memory = UserMemory::new_at("u", now);
        let chat = memory.create_chat(None, Some("Grief".to_string()), now);
        memory.add_chat_message(&chat.id, ChatRole::User, "I miss my Father", now);
        memory.add_chat_message(&chat.id, ChatRole::Assistant, "Grief is love", now);
        memory.add_journal_entry_at("Walked by the sea", "The sea is vast", now);
        memory.add_journal_entry_at("Quiet morning", "Stillness", now);

        let hits = search_chat_messages(&memory, "father", 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chat_title, "Grief");
        assert_eq!(hits[0].role, ChatRole::User);
        assert!(search_chat_messages(&memory, "  ", 20).is_empty());

        let journal = search_journal_entries(&memory, "SEA", 20);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].snippet, "Walked by the sea The sea is vast");
        assert_eq!(search_journal_entries(&memory, "stillness", 20).len(), 1);
    }

    #[test]
    fn test_search_profiles_skips_opted_out() {
        let now = Utc::now();
        let mut open = CommunityProfile::new("a@x.y", "Ann", now);
        open.bio = "Loves contemplative prayer".to_string();
        let mut hidden = CommunityProfile::new("b@x.y", "Ben", now);
        hidden.bio = "Prayer group leader".to_string();
        hidden.opt_in = false;

        let hits = search_community_profiles(&[open, hidden], "prayer", 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "a@x.y");
        assert_eq!(hits[0].snippet, "Loves contemplative prayer");
    }
}
