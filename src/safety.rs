//! Crisis detection and theological guardrails
//!
//! Messages are screened before any retrieval or generation happens. A
//! message that matches a crisis family short-circuits the advisor and is
//! answered with human support resources instead of scripture.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisKind {
    SelfHarm,
    SevereDistress,
    Abuse,
}

struct CrisisPattern {
    kind: CrisisKind,
    regex: Regex,
}

const CRISIS_SOURCES: &[(CrisisKind, &str)] = &[
    (
        CrisisKind::SelfHarm,
        r"(?i)\b(kill\s*(my)?self|suicide|suicidal|end\s*(my|it\s*all)|want\s*to\s*die)\b",
    ),
    (
        CrisisKind::SelfHarm,
        r"(?i)\b(cut(ting)?\s*myself|hurt(ing)?\s*myself|self[- ]?harm)\b",
    ),
    (
        CrisisKind::SelfHarm,
        r"(?i)\b(no\s*reason\s*to\s*live|better\s*off\s*dead|can'?t\s*go\s*on)\b",
    ),
    (
        CrisisKind::SelfHarm,
        r"(?i)\b(planning\s*to\s*(end|kill)|goodbye\s*(letter|note|world))\b",
    ),
    (
        CrisisKind::SevereDistress,
        r"(?i)\b(can'?t\s*take\s*(it|this)\s*(anymore)?|give\s*up|giving\s*up)\b",
    ),
    (
        CrisisKind::SevereDistress,
        r"(?i)\b(hopeless|no\s*hope|lost\s*all\s*hope)\b",
    ),
    (
        CrisisKind::Abuse,
        r"(?i)\b(being\s*(abused|beaten|hurt)|someone\s*is\s*hurting\s*me)\b",
    ),
    (
        CrisisKind::Abuse,
        r"(?i)\b(domestic\s*(violence|abuse)|my\s*(partner|spouse)\s*(hits|hurts|beats))\b",
    ),
];

const DEITY_SOURCES: &[&str] = &[
    r"(?i)\b(are\s*you\s*god|you\s*are\s*god|speaking\s*to\s*god)\b",
    r"(?i)\b(lord,?\s*(please|help|hear)|dear\s*(god|lord|father))\b",
    r"(?i)\b(forgive\s*(me|my\s*sins)|absolve|bless\s*me)\b",
];

static CRISIS_PATTERNS: Lazy<Vec<CrisisPattern>> = Lazy::new(|| {
    CRISIS_SOURCES
        .iter()
        .filter_map(|(kind, pattern)| {
            Regex::new(pattern).ok().map(|regex| CrisisPattern {
                kind: *kind,
                regex,
            })
        })
        .collect()
});

static DEITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEITY_SOURCES
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

const CRISIS_RESPONSE: &str = "
🆘 **IMPORTANT: You Are Not Alone**

If you're experiencing thoughts of self-harm or are in crisis, please reach out for help immediately:

**United States:**
- **National Suicide Prevention Lifeline:** 988 (call or text)
- **Crisis Text Line:** Text HOME to 741741
- **National Domestic Violence Hotline:** 1-800-799-7233

**International:**
- **International Association for Suicide Prevention:** https://www.iasp.info/resources/Crisis_Centres/
- **Befrienders Worldwide:** https://www.befrienders.org/

**Emergency:** If you're in immediate danger, please call your local emergency number (911 in the US).

---

*I am an AI offering spiritual guidance from sacred texts. While I'm here to listen and share wisdom,
I am not a substitute for professional mental health support. Please reach out to the resources above:
trained humans are ready to help you through this moment.*

---
";

const HUMILITY_REMINDER: &str = "
*A gentle reminder: I am a guide pointing toward ancient wisdom, not the source of that wisdom itself.
The sacred texts I draw from are profound, but my interpretations are those of an AI assistant.
For matters of deep spiritual importance, I encourage you to also seek counsel from trusted
religious leaders, spiritual directors, or your faith community.*
";

const DEITY_CLARIFICATION: &str = "
*I sense you may be speaking to me as you would to the Divine. I'm honored by your trust,
but I should be clear: I am an AI guide, not God or any divine being. I can share the
wisdom found in sacred texts and offer a compassionate ear, but true prayer and communion
with the Divine is something far more profound than what I can provide.

That said, I am here to listen and to point you toward wisdom. Please, share what's on your heart.*
";

/// First crisis family the text matches, checked in declaration order
pub fn detect_crisis(text: &str) -> Option<CrisisKind> {
    CRISIS_PATTERNS
        .iter()
        .find(|p| p.regex.is_match(text))
        .map(|p| p.kind)
}

/// The same resource text is shown for every crisis kind
pub fn crisis_response(_kind: CrisisKind) -> &'static str {
    CRISIS_RESPONSE
}

pub fn detect_deity_treatment(text: &str) -> bool {
    DEITY_PATTERNS.iter().any(|p| p.is_match(text))
}

pub fn deity_clarification() -> &'static str {
    DEITY_CLARIFICATION
}

pub fn humility_reminder() -> &'static str {
    HUMILITY_REMINDER
}

/// Every tenth message gets the reminder
pub fn should_add_humility_reminder(message_count: usize) -> bool {
    message_count > 0 && message_count % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(CRISIS_PATTERNS.len(), CRISIS_SOURCES.len());
        assert_eq!(DEITY_PATTERNS.len(), DEITY_SOURCES.len());
    }

    #[test]
    fn test_self_harm_detection() {
        assert_eq!(
            detect_crisis("I want to kill myself"),
            Some(CrisisKind::SelfHarm)
        );
        assert_eq!(
            detect_crisis("Sometimes I think I'd be BETTER OFF DEAD"),
            Some(CrisisKind::SelfHarm)
        );
        assert_eq!(
            detect_crisis("I can't go on like this"),
            Some(CrisisKind::SelfHarm)
        );
    }

    #[test]
    fn test_distress_and_abuse_detection() {
        assert_eq!(
            detect_crisis("I feel completely hopeless"),
            Some(CrisisKind::SevereDistress)
        );
        assert_eq!(
            detect_crisis("my partner hits me when he drinks"),
            Some(CrisisKind::Abuse)
        );
    }

    #[test]
    fn test_ordinary_questions_pass() {
        assert_eq!(detect_crisis("How can I practice patience at work?"), None);
        assert_eq!(detect_crisis("What does the Tao say about water?"), None);
    }

    #[test]
    fn test_crisis_response_lists_resources() {
        let text = crisis_response(CrisisKind::Abuse);
        assert!(text.contains("988"));
        assert!(text.contains("741741"));
        assert!(text.contains("1-800-799-7233"));
        assert!(text.contains("befrienders.org"));
    }

    #[test]
    fn test_deity_detection() {
        assert!(detect_deity_treatment("Are you God?"));
        assert!(detect_deity_treatment("Dear Lord, hear my prayer"));
        assert!(detect_deity_treatment("please bless me"));
        assert!(!detect_deity_treatment("What does scripture say about god's love?"));
    }

    #[test]
    fn test_humility_cadence() {
        assert!(!should_add_humility_reminder(0));
        assert!(!should_add_humility_reminder(9));
        assert!(should_add_humility_reminder(10));
        assert!(should_add_humility_reminder(30));
        assert!(!should_add_humility_reminder(31));
    }
}
