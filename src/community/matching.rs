//! Trait extraction and compatibility scoring

use std::collections::BTreeSet;

use super::CommunityProfile;
use super::SpiritualTraits;

/// Known values per trait category
pub const TRAIT_CATEGORIES: [(&str, &[&str]); 6] = [
    (
        "life_stage",
        &[
            "young_adult",
            "parent",
            "career_focused",
            "retired",
            "student",
            "caregiver",
            "transitioning",
        ],
    ),
    (
        "spiritual_journey",
        &[
            "seeker",
            "devout",
            "questioning",
            "returning",
            "exploring",
            "deepening",
            "teaching",
        ],
    ),
    (
        "primary_interests",
        &[
            "prayer",
            "meditation",
            "scripture_study",
            "community",
            "service",
            "contemplation",
            "interfaith",
            "mysticism",
        ],
    ),
    (
        "seeking_support_for",
        &[
            "grief",
            "anxiety",
            "relationships",
            "purpose",
            "forgiveness",
            "faith_crisis",
            "gratitude",
            "growth",
            "parenting",
            "career",
            "health",
            "addiction",
        ],
    ),
    (
        "preferred_traditions",
        &[
            "christianity",
            "islam",
            "buddhism",
            "hinduism",
            "judaism",
            "taoism",
            "sikhism",
            "interfaith",
            "spiritual_not_religious",
        ],
    ),
    (
        "connection_style",
        &[
            "listener",
            "sharer",
            "mentor",
            "peer",
            "study_partner",
            "prayer_partner",
            "discussion",
        ],
    ),
];

/// Category weights, most important first
const CATEGORY_WEIGHTS: [(&str, f64); 5] = [
    ("seeking_support_for", 30.0),
    ("preferred_traditions", 25.0),
    ("spiritual_journey", 20.0),
    ("primary_interests", 15.0),
    ("connection_style", 10.0),
];

const SHARED_TRADITIONS_BONUS: f64 = 10.0;
const MAX_SCORE: f64 = 100.0;

fn support_need_for_theme(theme: &str) -> Option<&'static str> {
    let need = match theme {
        "grief" | "loss" => "grief",
        "anxiety" | "fear" | "worry" => "anxiety",
        "relationships" | "family" => "relationships",
        "purpose" | "meaning" => "purpose",
        "forgiveness" | "anger" => "forgiveness",
        "faith" | "doubt" => "faith_crisis",
        "gratitude" | "thankful" => "gratitude",
        "work" | "career" => "career",
        "health" | "illness" => "health",
        _ => return None,
    };
    Some(need)
}

fn journey_stage(conversation_count: usize) -> &'static str {
    match conversation_count {
        c if c > 20 => "deepening",
        c if c > 10 => "devout",
        c if c > 5 => "exploring",
        _ => "seeker",
    }
}

fn dedup_sorted(values: Vec<String>) -> Vec<String> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Traits inferred from memory themes and the number of remembered days
pub fn extract_traits_from_themes(themes: &[String], conversation_count: usize) -> SpiritualTraits {
    let needs = themes
        .iter()
        .filter_map(|t| support_need_for_theme(&t.to_lowercase()))
        .map(str::to_string)
        .collect();

    let mut journey = Vec::new();
    if conversation_count > 0 {
        journey.push(journey_stage(conversation_count).to_string());
    }

    SpiritualTraits {
        seeking_support_for: dedup_sorted(needs),
        spiritual_journey: journey,
        connection_style: vec!["peer".to_string()],
        ..SpiritualTraits::default()
    }
}

/// Score two profiles 0..=100 and list what they share
///
/// Each weighted category contributes `weight * |shared| / max(|a|, |b|)`;
/// shared profile-level traditions add a flat bonus.
pub fn compatibility(a: &CommunityProfile, b: &CommunityProfile) -> (f64, Vec<String>) {
    if !a.opt_in || !b.opt_in {
        return (0.0, Vec::new());
    }

    let mut score = 0.0;
    let mut matching = Vec::new();

    for (category, weight) in CATEGORY_WEIGHTS {
        let left: BTreeSet<&String> = a.traits.category(category).iter().collect();
        let right: BTreeSet<&String> = b.traits.category(category).iter().collect();
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let shared: Vec<&String> = left.intersection(&right).copied().collect();
        if shared.is_empty() {
            continue;
        }
        score += weight * shared.len() as f64 / left.len().max(right.len()) as f64;
        matching.extend(shared.iter().map(|t| format!("{category}:{t}")));
    }

    let left: BTreeSet<&String> = a.preferred_traditions.iter().collect();
    let right: BTreeSet<&String> = b.preferred_traditions.iter().collect();
    let shared: Vec<&str> = left
        .intersection(&right)
        .map(|t| t.as_str())
        .collect();
    if !shared.is_empty() {
        score += SHARED_TRADITIONS_BONUS;
        matching.push(format!("traditions:{}", shared.join(",")));
    }

    (score.min(MAX_SCORE), matching)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn profile(email: &str, traits: SpiritualTraits, traditions: &[&str]) -> CommunityProfile {
        let mut profile = CommunityProfile::new(email, email, Utc::now());
        profile.traits = traits;
        profile.preferred_traditions = traditions.iter().map(|t| (*t).to_string()).collect();
        profile
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_extract_traits() {
        let themes = strings(&["grief", "Family", "faith", "peace", "loss"]);
        let traits = extract_traits_from_themes(&themes, 12);
        assert_eq!(
            traits.seeking_support_for,
            vec!["faith_crisis", "grief", "relationships"]
        );
        assert_eq!(traits.spiritual_journey, vec!["devout"]);
        assert_eq!(traits.connection_style, vec!["peer"]);
        assert!(traits.life_stage.is_empty());

        let newcomer = extract_traits_from_themes(&[], 0);
        assert!(newcomer.spiritual_journey.is_empty());
        assert_eq!(extract_traits_from_themes(&[], 3).spiritual_journey, vec!["seeker"]);
        assert_eq!(extract_traits_from_themes(&[], 30).spiritual_journey, vec!["deepening"]);
    }

    #[test]
    fn test_compatibility_weights() {
        let a = profile(
            "a@x.y",
            SpiritualTraits {
                seeking_support_for: strings(&["grief", "anxiety"]),
                connection_style: strings(&["peer"]),
                ..SpiritualTraits::default()
            },
            &["Buddhism"],
        );
        let b = profile(
            "b@x.y",
            SpiritualTraits {
                seeking_support_for: strings(&["grief"]),
                connection_style: strings(&["peer"]),
                ..SpiritualTraits::default()
            },
            &["Buddhism", "Taoism"],
        );

        let (score, matching) = compatibility(&a, &b);
        // 30 * 1/2 + 10 * 1/1 + 10 bonus
        assert!((score - 35.0).abs() < 1e-9);
        assert_eq!(
            matching,
            vec![
                "seeking_support_for:grief",
                "connection_style:peer",
                "traditions:Buddhism"
            ]
        );
    }

    #[test]
    fn test_opted_out_scores_zero() {
        let traits = SpiritualTraits {
            connection_style: strings(&["peer"]),
            ..SpiritualTraits::default()
        };
        let a = profile("a@x.y", traits.clone(), &[]);
        let mut b = profile("b@x.y", traits, &[]);
        b.opt_in = false;
        assert_eq!(compatibility(&a, &b), (0.0, Vec::new()));
    }

    #[test]
    fn test_score_is_capped() {
        let all = |values: &[&str]| strings(values);
        let traits = SpiritualTraits {
            seeking_support_for: all(&["grief"]),
            preferred_traditions: all(&["islam"]),
            spiritual_journey: all(&["seeker"]),
            primary_interests: all(&["prayer"]),
            connection_style: all(&["peer"]),
            life_stage: Vec::new(),
        };
        let a = profile("a@x.y", traits.clone(), &["Islam"]);
        let b = profile("b@x.y", traits, &["Islam"]);
        assert!((compatibility(&a, &b).0 - 100.0).abs() < 1e-9);
    }
}
