//! Community matching between signed-in seekers
//!
//! Profiles carry traits inferred from memory themes. Opted-in seekers are
//! scored against each other and can exchange connection requests.

pub mod matching;
pub mod store;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

pub use matching::compatibility;
pub use matching::extract_traits_from_themes;
pub use matching::TRAIT_CATEGORIES;
pub use store::CommunityStore;

use crate::memory::normalize_email;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiritualTraits {
    pub life_stage: Vec<String>,
    pub spiritual_journey: Vec<String>,
    pub primary_interests: Vec<String>,
    pub seeking_support_for: Vec<String>,
    pub preferred_traditions: Vec<String>,
    pub connection_style: Vec<String>,
}

impl SpiritualTraits {
    /// Values of a category by its serialized name
    pub fn category(&self, name: &str) -> &[String] {
        match name {
            "life_stage" => &self.life_stage,
            "spiritual_journey" => &self.spiritual_journey,
            "primary_interests" => &self.primary_interests,
            "seeking_support_for" => &self.seeking_support_for,
            "preferred_traditions" => &self.preferred_traditions,
            "connection_style" => &self.connection_style,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.life_stage.is_empty()
            && self.spiritual_journey.is_empty()
            && self.primary_interests.is_empty()
            && self.seeking_support_for.is_empty()
            && self.preferred_traditions.is_empty()
            && self.connection_style.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityProfile {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub traits: SpiritualTraits,
    #[serde(default)]
    pub preferred_traditions: Vec<String>,
    #[serde(default = "default_opt_in")]
    pub opt_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub connection_requests: Vec<ConnectionRequest>,
}

fn default_opt_in() -> bool {
    true
}

impl CommunityProfile {
    pub fn new(email: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            email: normalize_email(email),
            display_name: display_name.to_string(),
            bio: String::new(),
            traits: SpiritualTraits::default(),
            preferred_traditions: Vec::new(),
            opt_in: true,
            created_at: now,
            updated_at: now,
            last_active: now,
            connections: Vec::new(),
            connection_requests: Vec::new(),
        }
    }
}

/// Fields a seeker sets on their profile; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub bio: Option<String>,
    pub traits: Option<SpiritualTraits>,
    pub preferred_traditions: Option<Vec<String>>,
    pub opt_in: bool,
}

/// Another seeker suggested as a companion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityMatch {
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub compatibility_score: u32,
    pub matching_traits: Vec<String>,
    pub preferred_traditions: Vec<String>,
    pub last_active: DateTime<Utc>,
}

/// An accepted companion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub preferred_traditions: Vec<String>,
    pub last_active: DateTime<Utc>,
}
