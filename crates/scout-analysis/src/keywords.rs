//! Category to search-keyword table.

use scout_models::EventType;

/// Keyword variants queried per category in a full analysis.
pub const MAX_VARIANTS_PER_CATEGORY: usize = 2;

/// Categories searched when a caller passes none.
pub const ALL_CATEGORIES: [EventType; 11] = [
    EventType::Goal,
    EventType::Assist,
    EventType::Dribble,
    EventType::Tackle,
    EventType::Pass,
    EventType::Shot,
    EventType::Save,
    EventType::Foul,
    EventType::Offside,
    EventType::Corner,
    EventType::FreeKick,
];

/// Search keywords for a category, most specific first.
pub fn keywords(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::Goal => &["goal", "score", "finish", "shot on target"],
        EventType::Assist => &["assist", "pass", "through ball", "cross"],
        EventType::Dribble => &["dribble", "run", "beat defender", "skill move"],
        EventType::Tackle => &["tackle", "challenge", "win ball"],
        EventType::Pass => &["pass", "ball distribution", "play making"],
        EventType::Shot => &["shot", "attempt", "strike"],
        EventType::Save => &["save", "goalkeeper", "block"],
        EventType::Foul => &["foul", "yellow card", "red card"],
        EventType::Offside => &["offside", "offside trap"],
        EventType::Corner => &["corner kick", "set piece"],
        EventType::FreeKick => &["free kick", "direct free kick"],
        EventType::Interception => &["interception"],
        EventType::Clearance => &["clearance"],
    }
}

/// Queries issued for one category during analysis.
pub fn analysis_queries(event_type: EventType, player_name: &str) -> Vec<(&'static str, String)> {
    keywords(event_type)
        .iter()
        .take(MAX_VARIANTS_PER_CATEGORY)
        .map(|kw| (*kw, format!("{} {}", player_name, kw)))
        .collect()
}
