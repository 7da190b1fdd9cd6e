//! Per-user memory: exchanges, themes, journal, chat threads
//!
//! Every seeker has one JSON document. Anonymous seekers are keyed by a digest
//! of their session id, signed-in seekers by a digest of their email, so
//! memory follows an account across devices.

pub mod chats;
pub mod insights;
pub mod store;

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

pub use chats::Chat;
pub use chats::ChatMessage;
pub use chats::ChatRole;
pub use chats::ChatSummary;
pub use store::MemoryStore;

use crate::text::take_chars;

/// Hex characters kept from the digest for a user id
const USER_ID_LEN: usize = 12;

const MAX_ANSWER_CHARS: usize = 500;
const MAX_CONVERSATIONS: usize = 30;
const CONVERSATION_RETENTION_DAYS: i64 = 30;
const MAX_JOURNAL_ENTRIES: usize = 30;
const MAX_JOURNAL_ENTRY_CHARS: usize = 1000;
const MAX_REFLECTION_CHARS: usize = 500;

fn short_digest(input: &str) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..USER_ID_LEN].to_string()
}

/// Stable id for an anonymous session
pub fn user_id_from_session(session_id: &str) -> String {
    short_digest(session_id)
}

/// Stable id for an account, independent of case and surrounding spaces
pub fn user_id_from_email(email: &str) -> String {
    short_digest(&normalize_email(email))
}

/// Whether `id` has the shape produced by [`user_id_from_session`]
pub fn is_valid_user_id(id: &str) -> bool {
    id.len() == USER_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub traditions: Vec<String>,
}

/// All exchanges of one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub date: NaiveDate,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: DateTime<Utc>,
    pub entry: String,
    pub reflection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPreferences {
    pub traditions: Vec<String>,
    pub ui_mode: String,
    pub ambient_sound: String,
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self {
            traditions: Vec::new(),
            ui_mode: "standard".to_string(),
            ambient_sound: "Silence".to_string(),
        }
    }
}

/// Rule-based observations about how the seeker writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityTraits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_style: Option<String>,
}

impl PersonalityTraits {
    pub fn is_empty(&self) -> bool {
        self.emotional_state.is_none()
            && self.communication_style.is_none()
            && self.inquiry_style.is_none()
    }

    /// `(name, value)` pairs in display order
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("emotional_state", self.emotional_state.as_deref()),
            ("communication_style", self.communication_style.as_deref()),
            ("inquiry_style", self.inquiry_style.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiritualJourney {
    pub primary_concerns: Vec<String>,
    pub growth_areas: Vec<String>,
    pub milestones: Vec<String>,
}

/// Everything remembered about one seeker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMemory {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    #[serde(default)]
    pub visit_count: u64,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default)]
    pub preferences: MemoryPreferences,
    #[serde(default)]
    pub personality_traits: PersonalityTraits,
    #[serde(default)]
    pub spiritual_journey: SpiritualJourney,
    #[serde(default)]
    pub preferred_wisdom_style: Option<String>,
    #[serde(default)]
    pub conversation_summary: String,
    #[serde(default)]
    pub chats: Vec<Chat>,
    #[serde(default)]
    pub current_chat_id: Option<String>,
    /// Fields written by other clients are carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UserMemory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::new_at(user_id, Utc::now())
    }

    pub fn new_at(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            created_at: now,
            last_visit: now,
            visit_count: 0,
            conversations: Vec::new(),
            themes: Vec::new(),
            journal_entries: Vec::new(),
            preferences: MemoryPreferences::default(),
            personality_traits: PersonalityTraits::default(),
            spiritual_journey: SpiritualJourney::default(),
            preferred_wisdom_style: None,
            conversation_summary: String::new(),
            chats: Vec::new(),
            current_chat_id: None,
            extra: BTreeMap::new(),
        }
    }

    /// Total exchanges across all remembered days
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.exchanges.len()).sum()
    }

    pub fn has_history(&self) -> bool {
        !self.conversations.is_empty()
    }

    pub fn add_exchange(&mut self, question: &str, answer: &str, traditions: &[String]) {
        self.add_exchange_at(question, answer, traditions, Utc::now());
    }

    /// Record a question and answer under today's conversation
    ///
    /// Conversations older than 30 days are dropped and at most 30 are kept.
    /// Themes and the spiritual journey are refreshed, and personality
    /// insights are recomputed on every fifth exchange.
    pub fn add_exchange_at(
        &mut self,
        question: &str,
        answer: &str,
        traditions: &[String],
        now: DateTime<Utc>,
    ) {
        let today = now.date_naive();
        let exchange = Exchange {
            timestamp: now,
            question: question.to_string(),
            answer: take_chars(answer, MAX_ANSWER_CHARS),
            traditions: traditions.to_vec(),
        };

        match self.conversations.iter_mut().find(|c| c.date == today) {
            Some(conversation) => conversation.exchanges.push(exchange),
            None => self.conversations.push(Conversation {
                date: today,
                exchanges: vec![exchange],
            }),
        }

        let cutoff = now - Duration::days(CONVERSATION_RETENTION_DAYS);
        self.conversations.retain(|c| {
            c.date
                .and_hms_opt(0, 0, 0)
                .map_or(false, |midnight| midnight.and_utc() > cutoff)
        });
        if self.conversations.len() > MAX_CONVERSATIONS {
            let excess = self.conversations.len() - MAX_CONVERSATIONS;
            self.conversations.drain(..excess);
        }

        self.update_themes(question);
        self.update_spiritual_journey();

        if self.message_count() % 5 == 0 {
            self.extract_personality_insights();
        }
    }

    pub fn add_journal_entry(&mut self, entry: &str, reflection: &str) {
        self.add_journal_entry_at(entry, reflection, Utc::now());
    }

    pub fn add_journal_entry_at(&mut self, entry: &str, reflection: &str, now: DateTime<Utc>) {
        self.journal_entries.push(JournalEntry {
            date: now,
            entry: take_chars(entry, MAX_JOURNAL_ENTRY_CHARS),
            reflection: take_chars(reflection, MAX_REFLECTION_CHARS),
        });
        if self.journal_entries.len() > MAX_JOURNAL_ENTRIES {
            let excess = self.journal_entries.len() - MAX_JOURNAL_ENTRIES;
            self.journal_entries.drain(..excess);
        }
    }

    /// Attach an account email if none is linked yet; true when changed
    pub fn link_email(&mut self, email: &str) -> bool {
        if self.email.as_deref().map_or(true, str::is_empty) {
            self.email = Some(normalize_email(email));
            true
        } else {
            false
        }
    }

    /// Fold an anonymous session's memory into this account's memory
    ///
    /// Conversations are merged by date with the session's copy winning,
    /// themes are unioned (last 10 kept), journals are merged in date order
    /// (newest 30 kept) and the earlier creation time survives.
    pub fn merge_session(&mut self, session: UserMemory, email: &str) {
        self.email = Some(normalize_email(email));

        for conversation in session.conversations {
            match self
                .conversations
                .iter_mut()
                .find(|c| c.date == conversation.date)
            {
                Some(existing) => *existing = conversation,
                None => self.conversations.push(conversation),
            }
        }

        for theme in session.themes {
            if !self.themes.contains(&theme) {
                self.themes.push(theme);
            }
        }
        if self.themes.len() > 10 {
            let excess = self.themes.len() - 10;
            self.themes.drain(..excess);
        }

        self.journal_entries.extend(session.journal_entries);
        self.journal_entries.sort_by_key(|j| j.date);
        if self.journal_entries.len() > MAX_JOURNAL_ENTRIES {
            let excess = self.journal_entries.len() - MAX_JOURNAL_ENTRIES;
            self.journal_entries.drain(..excess);
        }

        if session.created_at < self.created_at {
            self.created_at = session.created_at;
        }
    }
}
