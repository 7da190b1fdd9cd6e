//! Detection of cross-tradition comparison requests in chat messages

use serde::Serialize;

const COMPARISON_PATTERNS: [&str; 9] = [
    "compare",
    "what about",
    "how do different",
    "different religions",
    "different faiths",
    "across traditions",
    "across religions",
    "various religions",
    "multiple faiths",
];

/// Keyword to tradition, checked in order
const TRADITION_KEYWORDS: [(&str, &str); 24] = [
    ("christianity", "Christianity"),
    ("christian", "Christianity"),
    ("bible", "Christianity"),
    ("islam", "Islam"),
    ("muslim", "Islam"),
    ("quran", "Islam"),
    ("buddhism", "Buddhism"),
    ("buddhist", "Buddhism"),
    ("buddha", "Buddhism"),
    ("hinduism", "Hinduism"),
    ("hindu", "Hinduism"),
    ("gita", "Hinduism"),
    ("judaism", "Judaism"),
    ("jewish", "Judaism"),
    ("torah", "Judaism"),
    ("taoism", "Taoism"),
    ("taoist", "Taoism"),
    ("tao", "Taoism"),
    ("sikhism", "Sikhism"),
    ("sikh", "Sikhism"),
    ("stoicism", "Stoicism"),
    ("stoic", "Stoicism"),
    ("confucianism", "Confucianism"),
    ("confucian", "Confucianism"),
];

/// Phrases stripped from the message to leave the topic
const TOPIC_NOISE: [&str; 7] = [
    "compare",
    "what does",
    "say about",
    "what about",
    "how do",
    "different religions",
    "view",
];

/// Traditions compared when the message names fewer than two
pub const DEFAULT_CHAT_COMPARISON: [&str; 4] = ["Christianity", "Islam", "Buddhism", "Hinduism"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRequest {
    pub topic: String,
    pub traditions: Vec<String>,
}

/// Recognize "compare X and Y on Z" style questions
pub fn detect_comparison_request(message: &str) -> Option<ComparisonRequest> {
    let lower = message.to_lowercase();

    if !COMPARISON_PATTERNS.iter().any(|p| lower.contains(p)) {
        return None;
    }

    let mut traditions: Vec<String> = Vec::new();
    for (keyword, tradition) in TRADITION_KEYWORDS {
        if lower.contains(keyword) && !traditions.iter().any(|t| t == tradition) {
            traditions.push(tradition.to_string());
        }
    }
    if traditions.len() < 2 {
        traditions = DEFAULT_CHAT_COMPARISON
            .iter()
            .map(|t| (*t).to_string())
            .collect();
    }

    let mut topic = lower;
    for noise in TOPIC_NOISE {
        topic = topic.replace(noise, "");
    }
    let topic = topic.trim().trim_matches('?').trim();
    let topic = if topic.chars().count() < 3 {
        message.to_string()
    } else {
        topic.to_string()
    };

    Some(ComparisonRequest { topic, traditions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_question_is_not_a_comparison() {
        assert!(detect_comparison_request("How can I find peace?").is_none());
    }

    #[test]
    fn test_named_traditions_are_kept_in_keyword_order() {
        let request =
            detect_comparison_request("Compare Buddhist and Christian views on forgiveness?")
                .unwrap();
        assert_eq!(request.traditions, vec!["Christianity", "Buddhism"]);
        assert_eq!(request.topic, "buddhist and christian s on forgiveness");
    }

    #[test]
    fn test_defaults_when_fewer_than_two_named() {
        let request =
            detect_comparison_request("How do different religions see suffering?").unwrap();
        assert_eq!(request.traditions, DEFAULT_CHAT_COMPARISON.to_vec());
        assert_eq!(request.topic, "see suffering");
    }

    #[test]
    fn test_what_does_what_about_pattern() {
        let request =
            detect_comparison_request("What does Islam say about charity? What about Judaism?")
                .unwrap();
        assert_eq!(request.traditions, vec!["Islam", "Judaism"]);
        assert_eq!(request.topic, "islam  charity?  judaism");
    }

    #[test]
    fn test_what_about_alone_is_a_comparison() {
        let request = detect_comparison_request("What about forgiveness in Islam?").unwrap();
        assert_eq!(request.traditions, DEFAULT_CHAT_COMPARISON.to_vec());
        assert_eq!(request.topic, "forgiveness in islam");
    }

    #[test]
    fn test_confucius_alone_does_not_name_a_tradition() {
        let request =
            detect_comparison_request("Compare what Confucius and the Stoics teach").unwrap();
        assert_eq!(request.traditions, DEFAULT_CHAT_COMPARISON.to_vec());
    }

    #[test]
    fn test_short_topic_falls_back_to_message() {
        let request = detect_comparison_request("Compare?").unwrap();
        assert_eq!(request.topic, "Compare?");
    }
}
