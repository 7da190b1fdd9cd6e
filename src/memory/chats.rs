//! Chat threads kept inside a seeker's memory document

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::UserMemory;
use crate::text::take_chars;
use crate::text::truncate_str;

const MAX_CHATS: usize = 50;
const MAX_TITLE_CHARS: usize = 100;
const AUTO_TITLE_CHARS: usize = 40;
const PREVIEW_CHARS: usize = 50;
const CHAT_ID_LEN: usize = 8;

/// Title given by clients that create a thread before the first message
pub const PLACEHOLDER_TITLE: &str = "New Conversation";
const NUMBERED_TITLE_PREFIX: &str = "New Chat ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Chat {
    fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }
}

/// Sidebar view of a chat without its messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub religion: Option<String>,
    pub message_count: usize,
    pub preview: String,
}

impl From<&Chat> for ChatSummary {
    fn from(chat: &Chat) -> Self {
        let preview = chat
            .messages
            .last()
            .map(|m| format!("{}...", take_chars(&m.content, PREVIEW_CHARS)))
            .unwrap_or_default();
        Self {
            id: chat.id.clone(),
            title: chat.title.clone(),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            religion: chat.religion.clone(),
            message_count: chat.messages.len(),
            preview,
        }
    }
}

fn numbered_title(title: &str) -> Option<u32> {
    title.strip_prefix(NUMBERED_TITLE_PREFIX)?.parse().ok()
}

fn new_chat_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..CHAT_ID_LEN].to_string()
}

fn auto_title(content: &str) -> String {
    truncate_str(content.trim(), AUTO_TITLE_CHARS)
}

impl UserMemory {
    /// Start a new thread, make it current and put it first
    pub fn create_chat(
        &mut self,
        religion: Option<String>,
        title: Option<String>,
        now: DateTime<Utc>,
    ) -> Chat {
        let title = title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| {
            let next = self
                .chats
                .iter()
                .filter_map(|c| numbered_title(&c.title))
                .max()
                .map_or(1, |n| n + 1);
            format!("{NUMBERED_TITLE_PREFIX}{next}")
        });

        let chat = Chat {
            id: new_chat_id(),
            title: take_chars(&title, MAX_TITLE_CHARS),
            created_at: now,
            updated_at: now,
            religion,
            messages: Vec::new(),
        };
        self.chats.insert(0, chat.clone());
        self.chats.truncate(MAX_CHATS);
        self.current_chat_id = Some(chat.id.clone());
        chat
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    /// Summaries, most recently used first
    pub fn chat_summaries(&self) -> Vec<ChatSummary> {
        self.chats.iter().map(ChatSummary::from).collect()
    }

    pub fn set_current_chat(&mut self, chat_id: &str) -> bool {
        if self.chat(chat_id).is_none() {
            return false;
        }
        self.current_chat_id = Some(chat_id.to_string());
        true
    }

    /// Append a message and move the thread to the top
    ///
    /// A user message renames a thread still titled `PLACEHOLDER_TITLE`.
    /// Returns the updated chat, or `None` for an unknown id.
    pub fn add_chat_message(
        &mut self,
        chat_id: &str,
        role: ChatRole,
        content: &str,
        now: DateTime<Utc>,
    ) -> Option<Chat> {
        let index = self.chats.iter().position(|c| c.id == chat_id)?;
        let mut chat = self.chats.remove(index);

        if role == ChatRole::User && chat.has_placeholder_title() {
            chat.title = auto_title(content);
        }
        chat.messages.push(ChatMessage {
            role,
            content: content.to_string(),
            timestamp: now,
        });
        chat.updated_at = now;

        self.chats.insert(0, chat.clone());
        if role == ChatRole::User {
            self.update_themes(content);
        }
        Some(chat)
    }

    pub fn delete_chat(&mut self, chat_id: &str) -> bool {
        let before = self.chats.len();
        self.chats.retain(|c| c.id != chat_id);
        if self.chats.len() == before {
            return false;
        }
        if self.current_chat_id.as_deref() == Some(chat_id) {
            self.current_chat_id = self.chats.first().map(|c| c.id.clone());
        }
        true
    }

    pub fn rename_chat(&mut self, chat_id: &str, title: &str) -> bool {
        match self.chats.iter_mut().find(|c| c.id == chat_id) {
            Some(chat) => {
                chat.title = take_chars(title, MAX_TITLE_CHARS);
                true
            }
            None => false,
        }
    }

    /// The current thread, falling back to the most recent one, else a new one
    pub fn current_chat_or_create(&mut self, religion: Option<String>, now: DateTime<Utc>) -> Chat {
        if let Some(chat) = self
            .current_chat_id
            .as_deref()
            .and_then(|id| self.chat(id))
        {
            return chat.clone();
        }
        if let Some(first) = self.chats.first().cloned() {
            self.current_chat_id = Some(first.id.clone());
            return first;
        }
        self.create_chat(religion, None, now)
    }

    /// Turn dated conversations into chat threads; returns how many were created
    ///
    /// The old conversations are kept as they are.
    pub fn migrate_conversations_to_chats(&mut self) -> usize {
        let mut migrated = 0;
        for conversation in &self.conversations {
            let Some(first) = conversation.exchanges.first() else {
                continue;
            };

            let messages = conversation
                .exchanges
                .iter()
                .flat_map(|e| {
                    [
                        ChatMessage {
                            role: ChatRole::User,
                            content: e.question.clone(),
                            timestamp: e.timestamp,
                        },
                        ChatMessage {
                            role: ChatRole::Assistant,
                            content: e.answer.clone(),
                            timestamp: e.timestamp,
                        },
                    ]
                })
                .collect();

            let started = conversation
                .date
                .and_hms_opt(0, 0, 0)
                .map_or(first.timestamp, |midnight| midnight.and_utc());
            self.chats.push(Chat {
                id: new_chat_id(),
                title: auto_title(&first.question),
                created_at: started,
                updated_at: started,
                religion: first.traditions.first().cloned(),
                messages,
            });
            migrated += 1;
        }

        if migrated > 0 {
            self.chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            if self.current_chat_id.is_none() {
                self.current_chat_id = self.chats.first().map(|c| c.id.clone());
            }
        }
        migrated
    }
}
