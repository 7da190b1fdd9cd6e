//! Themes, personality insights, journey tracking and memory summaries

use chrono::DateTime;
use chrono::Utc;

use super::PersonalityTraits;
use super::UserMemory;
use crate::text::take_chars;

const MAX_THEMES: usize = 15;
const MAX_CONCERNS: usize = 5;
const MAX_GROWTH_AREAS: usize = 3;
const MAX_MILESTONES: usize = 10;

/// Theme name and the keywords that signal it
pub const THEME_KEYWORDS: [(&str, &[&str]); 14] = [
    (
        "family",
        &[
            "family", "mother", "father", "parent", "child", "son", "daughter", "sibling",
            "brother", "sister",
        ],
    ),
    (
        "grief",
        &[
            "grief",
            "loss",
            "death",
            "died",
            "mourning",
            "passed away",
            "gone",
            "losing",
            "lost someone",
        ],
    ),
    (
        "forgiveness",
        &["forgive", "forgiveness", "resentment", "anger", "hurt by", "betrayed", "wronged"],
    ),
    (
        "purpose",
        &[
            "purpose",
            "meaning",
            "lost",
            "direction",
            "calling",
            "destiny",
            "why am i here",
            "what is my purpose",
        ],
    ),
    (
        "relationships",
        &["relationship", "marriage", "partner", "spouse", "friend", "lonely", "dating", "breakup"],
    ),
    (
        "anxiety",
        &["anxious", "anxiety", "worried", "fear", "scared", "nervous", "panic", "overwhelmed"],
    ),
    (
        "faith",
        &["faith", "doubt", "believe", "belief", "trust in god", "questioning", "spiritual doubt"],
    ),
    (
        "gratitude",
        &["grateful", "thankful", "gratitude", "blessed", "appreciate", "thankful for"],
    ),
    (
        "work",
        &["work", "job", "career", "boss", "coworker", "profession", "employment", "colleague"],
    ),
    (
        "health",
        &["health", "sick", "illness", "disease", "pain", "suffering", "medical", "treatment"],
    ),
    (
        "guilt",
        &["guilt", "guilty", "shame", "ashamed", "regret", "remorse", "sin", "wrongdoing"],
    ),
    (
        "loneliness",
        &["lonely", "alone", "isolated", "no one", "nobody", "empty", "disconnected"],
    ),
    (
        "hope",
        &["hope", "hopeful", "optimistic", "future", "better", "improve", "healing"],
    ),
    (
        "peace",
        &["peace", "calm", "serenity", "tranquil", "inner peace", "stillness"],
    ),
];

const ANXIOUS_WORDS: [&str; 4] = ["anxious", "worried", "fear", "scared"];
const GRATEFUL_WORDS: [&str; 3] = ["grateful", "thankful", "blessed"];
const SAD_WORDS: [&str; 4] = ["sad", "depressed", "down", "hopeless"];

/// Themes whose keywords appear in `text`, in catalog order
pub fn detect_themes(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    THEME_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(theme, _)| *theme)
        .collect()
}

impl UserMemory {
    /// Add any new themes found in `text`, keeping the most recent 15
    pub fn update_themes(&mut self, text: &str) {
        for theme in detect_themes(text) {
            if !self.themes.iter().any(|t| t == theme) {
                self.themes.push(theme.to_string());
            }
        }
        if self.themes.len() > MAX_THEMES {
            let excess = self.themes.len() - MAX_THEMES;
            self.themes.drain(..excess);
        }
    }

    /// Recompute rule-based personality traits from every remembered question
    pub fn extract_personality_insights(&mut self) {
        let questions: Vec<String> = self
            .conversations
            .iter()
            .flat_map(|c| c.exchanges.iter())
            .map(|e| e.question.to_lowercase())
            .collect();
        if questions.is_empty() {
            return;
        }

        let combined = questions.join(" ");
        let has_any = |words: &[&str]| words.iter().any(|w| combined.contains(w));
        let emotional_state = if has_any(&ANXIOUS_WORDS) {
            "tends to experience anxiety"
        } else if has_any(&GRATEFUL_WORDS) {
            "expresses gratitude frequently"
        } else if has_any(&SAD_WORDS) {
            "may be experiencing sadness"
        } else {
            "seeking guidance"
        };

        let total_chars: usize = questions.iter().map(|q| q.chars().count()).sum();
        let average = total_chars as f64 / questions.len() as f64;
        let communication_style = if average > 100.0 {
            "detailed and expressive"
        } else if average < 30.0 {
            "concise and direct"
        } else {
            "balanced"
        };

        let asked = questions.iter().take(5).filter(|q| q.contains('?')).count();
        let inquiry_style = match asked {
            0 => None,
            1 | 2 => Some("asks thoughtful questions".to_string()),
            _ => Some("asks many questions".to_string()),
        };

        self.personality_traits = PersonalityTraits {
            emotional_state: Some(emotional_state.to_string()),
            communication_style: Some(communication_style.to_string()),
            inquiry_style,
        };
    }

    /// Refresh concerns, growth areas and visit milestones
    pub fn update_spiritual_journey(&mut self) {
        let journey = &mut self.spiritual_journey;

        for theme in &self.themes {
            if !journey.primary_concerns.contains(theme) {
                journey.primary_concerns.push(theme.clone());
                if journey.primary_concerns.len() > MAX_CONCERNS {
                    let excess = journey.primary_concerns.len() - MAX_CONCERNS;
                    journey.primary_concerns.drain(..excess);
                }
            }
        }

        // Theme mentions across questions, in first-seen order
        let mut counts: Vec<(String, usize)> = Vec::new();
        for exchange in self.conversations.iter().flat_map(|c| c.exchanges.iter()) {
            let question = exchange.question.to_lowercase();
            for theme in &self.themes {
                if question.contains(theme.as_str()) {
                    match counts.iter_mut().find(|(t, _)| t == theme) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((theme.clone(), 1)),
                    }
                }
            }
        }
        if !counts.is_empty() {
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            journey.growth_areas = counts
                .into_iter()
                .take(MAX_GROWTH_AREAS)
                .map(|(t, _)| t)
                .collect();
        }

        if self.visit_count > 0 && self.visit_count % 10 == 0 {
            let milestone = format!("Completed {} conversations", self.visit_count);
            if !journey.milestones.contains(&milestone) {
                journey.milestones.push(milestone);
                if journey.milestones.len() > MAX_MILESTONES {
                    let excess = journey.milestones.len() - MAX_MILESTONES;
                    journey.milestones.drain(..excess);
                }
            }
        }
    }

    /// The `limit` most recent questions, oldest first
    pub fn conversation_summary(&self, limit: usize) -> String {
        let mut lines: Vec<String> = self
            .conversations
            .iter()
            .rev()
            .flat_map(|c| c.exchanges.iter().rev().map(move |e| (c.date, e)))
            .take(limit)
            .map(|(date, e)| {
                format!(
                    "[{}] Seeker asked about: {}...",
                    date.format("%Y-%m-%d"),
                    take_chars(&e.question, 100)
                )
            })
            .collect();
        if lines.is_empty() {
            return String::new();
        }
        lines.reverse();
        format!("Previous conversations:\n{}", lines.join("\n"))
    }

    pub fn themes_summary(&self) -> String {
        if self.themes.is_empty() {
            String::new()
        } else {
            format!("This seeker often reflects on: {}", self.themes.join(", "))
        }
    }

    /// Personal greeting for a seeker who has been here before
    pub fn returning_greeting(&self, now: DateTime<Utc>) -> Option<String> {
        if self.visit_count == 0 {
            return None;
        }

        let days_ago = (now - self.last_visit).num_days().max(0);
        let time_phrase = match days_ago {
            0 => "earlier today".to_string(),
            1 => "yesterday".to_string(),
            2..=6 => format!("{days_ago} days ago"),
            _ => "some time ago".to_string(),
        };

        let mut greeting =
            format!("Welcome back, dear seeker. I remember you were here {time_phrase}.");
        if let Some(recent) = self.themes.last() {
            greeting.push_str(&format!(
                " You've been reflecting on matters of {recent}. \
                 How has your heart been since we last spoke?"
            ));
        }
        Some(greeting)
    }

    /// Seeker context block for prompts; empty when nothing is known
    pub fn context_for_llm(&self) -> String {
        let mut parts = Vec::new();

        if self.visit_count > 1 {
            parts.push(format!(
                "This is a returning seeker (visit #{}).",
                self.visit_count
            ));
        }

        let traits = self.personality_traits.entries();
        if !traits.is_empty() {
            let listed: Vec<String> = traits.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            parts.push(format!("Personality insights: {}", listed.join(", ")));
        }

        if let Some(style) = self.preferred_wisdom_style.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("This seeker prefers {style} guidance."));
        }

        let journey = &self.spiritual_journey;
        if !journey.primary_concerns.is_empty() {
            let concerns: Vec<&str> = journey
                .primary_concerns
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            parts.push(format!("Primary concerns: {}", concerns.join(", ")));
        }
        if !journey.growth_areas.is_empty() {
            let growth: Vec<&str> = journey
                .growth_areas
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            parts.push(format!("Areas of growth: {}", growth.join(", ")));
        }

        let themes = self.themes_summary();
        if !themes.is_empty() {
            parts.push(themes);
        }

        let recent = self.conversation_summary(3);
        if !recent.is_empty() {
            parts.push(recent);
        }

        if !self.conversation_summary.is_empty() {
            parts.push(format!(
                "Journey summary: {}...",
                take_chars(&self.conversation_summary, 300)
            ));
        }

        if let Some(entry) = self.journal_entries.last() {
            parts.push(format!(
                "Recent journal reflection: {}...",
                take_chars(&entry.entry, 200)
            ));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("SEEKER CONTEXT:\n{}\n", parts.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_detect_themes() {
        assert_eq!(
            detect_themes("My mother passed away and I feel anxious"),
            vec!["family", "grief", "anxiety"]
        );
        assert!(detect_themes("xyz").is_empty());
    }

    #[test]
    fn test_themes_capped_at_fifteen() {
        let mut memory = UserMemory::new_at("u", now());
        memory.themes = (0..15).map(|i| format!("t{i}")).collect();
        memory.update_themes("I need peace");
        assert_eq!(memory.themes.len(), 15);
        assert_eq!(memory.themes.last().map(String::as_str), Some("peace"));
        assert_eq!(memory.themes[0], "t1");

        memory.update_themes("more peace");
        assert_eq!(memory.themes[0], "t1");
    }

    #[test]
    fn test_personality_insights() {
        let mut memory = UserMemory::new_at("u", now());
        for q in ["why?", "I am worried", "how?", "what?", "ok"] {
            memory.add_exchange_at(q, "a", &[], now());
        }
        let traits = &memory.personality_traits;
        assert_eq!(
            traits.emotional_state.as_deref(),
            Some("tends to experience anxiety")
        );
        assert_eq!(
            traits.communication_style.as_deref(),
            Some("concise and direct")
        );
        assert_eq!(traits.inquiry_style.as_deref(), Some("asks many questions"));
    }

    #[test]
    fn test_journey_growth_and_milestones() {
        let mut memory = UserMemory::new_at("u", now());
        memory.visit_count = 10;
        memory.add_exchange_at("I long for peace", "a", &[], now());
        memory.add_exchange_at("peace and hope", "a", &[], now());

        let journey = &memory.spiritual_journey;
        assert_eq!(journey.primary_concerns, vec!["peace", "hope"]);
        assert_eq!(journey.growth_areas, vec!["peace", "hope"]);
        assert_eq!(journey.milestones, vec!["Completed 10 conversations"]);
    }

    #[test]
    fn test_conversation_summary_most_recent_oldest_first() {
        let mut memory = UserMemory::new_at("u", now());
        for q in ["one", "two", "three", "four"] {
            memory.add_exchange_at(q, "a", &[], now());
        }
        assert_eq!(
            memory.conversation_summary(2),
            "Previous conversations:\n[2024-06-10] Seeker asked about: three...\n\
             [2024-06-10] Seeker asked about: four..."
        );
        assert_eq!(UserMemory::new_at("u", now()).conversation_summary(3), "");
    }

    #[test]
    fn test_returning_greeting() {
        let mut memory = UserMemory::new_at("u", now());
        assert!(memory.returning_greeting(now()).is_none());

        memory.visit_count = 3;
        memory.last_visit = now() - Duration::days(1);
        assert_eq!(
            memory.returning_greeting(now()).unwrap(),
            "Welcome back, dear seeker. I remember you were here yesterday."
        );

        memory.themes.push("gratitude".to_string());
        memory.last_visit = now() - Duration::days(20);
        let greeting = memory.returning_greeting(now()).unwrap();
        assert!(greeting.contains("some time ago."));
        assert!(greeting.ends_with(
            "You've been reflecting on matters of gratitude. How has your heart been since we last spoke?"
        ));
    }

    #[test]
    fn test_context_for_llm() {
        let empty = UserMemory::new_at("u", now());
        assert_eq!(empty.context_for_llm(), "");

        let mut memory = UserMemory::new_at("u", now());
        memory.visit_count = 2;
        memory.add_exchange_at("How do I forgive my brother?", "a", &[], now());
        memory.add_journal_entry_at("Today I felt light", "r", now());

        let context = memory.context_for_llm();
        assert!(context.starts_with("SEEKER CONTEXT:\nThis is a returning seeker (visit #2).\n"));
        assert!(context.contains("This seeker often reflects on: family, forgiveness"));
        assert!(context.contains("Seeker asked about: How do I forgive my brother?..."));
        assert!(context.contains("Recent journal reflection: Today I felt light..."));
        assert!(context.ends_with('\n'));
    }
}
