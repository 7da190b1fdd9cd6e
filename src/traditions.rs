//! Catalog of the wisdom traditions and their public-domain scriptures

use serde::Serialize;

/// Tradition label used for passages that match no catalog entry
pub const UNKNOWN_TRADITION: &str = "Unknown";

/// Filter value meaning "search every tradition"
pub const ALL_TRADITIONS: &str = "All Traditions";

/// Icon used when a tradition has none of its own
pub const DEFAULT_ICON: &str = "📖";

/// A downloadable scripture text
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScriptureSource {
    /// File name inside the raw data directory
    pub file_name: &'static str,
    /// Human-readable name used in citations
    pub scripture_name: &'static str,
    pub description: &'static str,
    /// `None` for texts that have no direct download
    pub url: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tradition {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub sources: &'static [ScriptureSource],
}

impl Tradition {
    /// Lowercase identifier used by clients
    pub fn id(&self) -> String {
        self.name.to_lowercase()
    }
}

const fn source(
    file_name: &'static str,
    scripture_name: &'static str,
    description: &'static str,
    url: Option<&'static str>,
) -> ScriptureSource {
    ScriptureSource {
        file_name,
        scripture_name,
        description,
        url,
    }
}

static CATALOG: &[Tradition] = &[
    Tradition {
        name: "Christianity",
        icon: "✝️",
        description: "Teachings of Jesus Christ and the Hebrew and Christian scriptures",
        sources: &[
            source(
                "bible_kjv.txt",
                "King James Bible",
                "King James Bible (1611) - Complete Old and New Testament",
                Some("https://www.gutenberg.org/cache/epub/10/pg10.txt"),
            ),
            source(
                "bible_asv.txt",
                "American Standard Version Bible",
                "American Standard Version Bible (1901)",
                Some("https://www.gutenberg.org/cache/epub/100/pg100.txt"),
            ),
        ],
    },
    Tradition {
        name: "Islam",
        icon: "☪️",
        description: "The revelation of the Quran and the way of submission to God",
        sources: &[source(
            "quran.txt",
            "Quran",
            "The Quran (M.H. Shakir translation - public domain)",
            Some("https://www.gutenberg.org/cache/epub/7440/pg7440.txt"),
        )],
    },
    Tradition {
        name: "Judaism",
        icon: "✡️",
        description: "The Torah and the rabbinic wisdom of the Talmud",
        sources: &[
            source(
                "torah.txt",
                "Torah",
                "Torah / Pentateuch (from KJV - Genesis through Deuteronomy)",
                None,
            ),
            source(
                "talmud_selections.txt",
                "Talmud",
                "Babylonian Talmud - Selections (Rodkinson translation)",
                Some("https://www.gutenberg.org/cache/epub/6219/pg6219.txt"),
            ),
        ],
    },
    Tradition {
        name: "Hinduism",
        icon: "🕉️",
        description: "The Vedic wisdom of the Gita, the Upanishads and the epics",
        sources: &[
            source(
                "bhagavad_gita.txt",
                "Bhagavad Gita",
                "Bhagavad Gita - Song of the Lord (Edwin Arnold translation)",
                Some("https://www.gutenberg.org/cache/epub/2388/pg2388.txt"),
            ),
            source(
                "upanishads.txt",
                "Upanishads",
                "Principal Upanishads (Max Müller translation)",
                Some("https://www.gutenberg.org/cache/epub/3283/pg3283.txt"),
            ),
            source(
                "ramayana.txt",
                "Ramayana",
                "The Ramayana - Epic of Rama",
                Some("https://www.gutenberg.org/cache/epub/24869/pg24869.txt"),
            ),
        ],
    },
    Tradition {
        name: "Buddhism",
        icon: "☸️",
        description: "The Buddha's path of awakening and liberation from suffering",
        sources: &[
            source(
                "dhammapada.txt",
                "Dhammapada",
                "Dhammapada - Sayings of the Buddha (Max Müller translation)",
                Some("https://www.gutenberg.org/cache/epub/2017/pg2017.txt"),
            ),
            source(
                "buddhist_sutras.txt",
                "Buddhist Sutras",
                "Buddhist Sutras - Sacred Books of the East selection",
                Some("https://www.gutenberg.org/cache/epub/44336/pg44336.txt"),
            ),
        ],
    },
    Tradition {
        name: "Sikhism",
        icon: "🙏",
        description: "The Gurus' teachings of devotion, equality and honest living",
        sources: &[],
    },
    Tradition {
        name: "Taoism",
        icon: "☯️",
        description: "Harmony with the Tao, the Way of nature",
        sources: &[source(
            "tao_te_ching.txt",
            "Tao Te Ching",
            "Tao Te Ching - The Way and Its Power (James Legge translation)",
            Some("https://www.gutenberg.org/cache/epub/216/pg216.txt"),
        )],
    },
    Tradition {
        name: "Confucianism",
        icon: "📜",
        description: "Virtue, propriety and right relationship in the Analects",
        sources: &[source(
            "analects.txt",
            "Analects",
            "Analects of Confucius (James Legge translation)",
            Some("https://www.gutenberg.org/cache/epub/3330/pg3330.txt"),
        )],
    },
    Tradition {
        name: "Stoicism",
        icon: "🏛️",
        description: "Ancient philosophy of virtue, reason and acceptance",
        sources: &[
            source(
                "meditations_aurelius.txt",
                "Meditations",
                "Meditations by Marcus Aurelius - Stoic Philosophy",
                Some("https://www.gutenberg.org/cache/epub/2680/pg2680.txt"),
            ),
            source(
                "enchiridion.txt",
                "Enchiridion",
                "Enchiridion by Epictetus - Stoic Handbook",
                Some("https://www.gutenberg.org/cache/epub/45109/pg45109.txt"),
            ),
        ],
    },
];

/// Frontend religion ids and the tradition each maps to
const RELIGION_IDS: &[(&str, &str)] = &[
    ("christianity", "Christianity"),
    ("islam", "Islam"),
    ("judaism", "Judaism"),
    ("hinduism", "Hinduism"),
    ("buddhism", "Buddhism"),
    ("sikhism", "Sikhism"),
    ("taoism", "Taoism"),
    ("shinto", "Shinto"),
];

/// Every tradition in catalog order
pub fn all() -> &'static [Tradition] {
    CATALOG
}

pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|t| t.name).collect()
}

/// Case-insensitive lookup by name
pub fn find(name: &str) -> Option<&'static Tradition> {
    let name = name.trim();
    CATALOG.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

pub fn icon_for(name: &str) -> &'static str {
    find(name).map_or(DEFAULT_ICON, |t| t.icon)
}

/// Tradition and scripture name for a raw text file
pub fn tradition_for_file(file_name: &str) -> (String, String) {
    for tradition in CATALOG {
        if let Some(source) = tradition
            .sources
            .iter()
            .find(|s| s.file_name.eq_ignore_ascii_case(file_name))
        {
            return (tradition.name.to_string(), source.scripture_name.to_string());
        }
    }

    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    (UNKNOWN_TRADITION.to_string(), title_case(stem))
}

/// Map a frontend religion id to a cataloged tradition
pub fn from_religion_id(id: &str) -> Option<&'static str> {
    let id = id.trim().to_lowercase();
    RELIGION_IDS
        .iter()
        .find(|(rid, _)| *rid == id)
        .and_then(|(_, name)| find(name))
        .map(|t| t.name)
}

/// Keep only cataloged traditions, normalized to their canonical names
pub fn normalize_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if let Some(tradition) = find(name.as_ref()) {
            if !out.iter().any(|n| n == tradition.name) {
                out.push(tradition.name.to_string());
            }
        }
    }
    out
}

fn title_case(stem: &str) -> String {
    stem.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        assert_eq!(
            names(),
            vec![
                "Christianity",
                "Islam",
                "Judaism",
                "Hinduism",
                "Buddhism",
                "Sikhism",
                "Taoism",
                "Confucianism",
                "Stoicism"
            ]
        );
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("buddhism").map(|t| t.name), Some("Buddhism"));
        assert_eq!(find(" TAOISM ").map(|t| t.name), Some("Taoism"));
        assert!(find("Jedi").is_none());
    }

    #[test]
    fn test_tradition_for_known_file() {
        assert_eq!(
            tradition_for_file("bhagavad_gita.txt"),
            ("Hinduism".to_string(), "Bhagavad Gita".to_string())
        );
        assert_eq!(
            tradition_for_file("enchiridion.txt"),
            ("Stoicism".to_string(), "Enchiridion".to_string())
        );
    }

    #[test]
    fn test_tradition_for_unknown_file() {
        assert_eq!(
            tradition_for_file("gospel_of_thomas.txt"),
            ("Unknown".to_string(), "Gospel Of Thomas".to_string())
        );
    }

    #[test]
    fn test_religion_ids() {
        assert_eq!(from_religion_id("christianity"), Some("Christianity"));
        assert_eq!(from_religion_id("Islam"), Some("Islam"));
        // Shinto has no corpus in the catalog
        assert_eq!(from_religion_id("shinto"), None);
        assert_eq!(from_religion_id("pastafarian"), None);
    }

    #[test]
    fn test_normalize_list() {
        let names = normalize_list(&["islam", "Nope", "BUDDHISM", "Islam"]);
        assert_eq!(names, vec!["Islam".to_string(), "Buddhism".to_string()]);
    }

    #[test]
    fn test_icons() {
        assert_eq!(icon_for("Taoism"), "☯️");
        assert_eq!(icon_for("Unknown"), DEFAULT_ICON);
        assert_eq!(find("Islam").unwrap().id(), "islam");
    }
}
