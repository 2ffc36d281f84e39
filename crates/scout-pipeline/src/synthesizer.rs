//! Turns detected events into highlight records.
//!
//! Everything here is a pure function of the event and its context except
//! the record id and timestamps.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use scout_models::{
    embed_url, format_duration, is_hosted_platform_url, AiInsight, Classification, Event,
    EventType, HighlightRecord,
};

const STRENGTH_TYPES: [EventType; 4] = [
    EventType::Goal,
    EventType::Assist,
    EventType::Dribble,
    EventType::Pass,
];
const WEAKNESS_TYPES: [EventType; 2] = [EventType::Foul, EventType::Offside];

const STRENGTH_MIN_CONFIDENCE: f64 = 0.75;
const WEAKNESS_MAX_CONFIDENCE: f64 = 0.6;
const EXCELLENT_MIN_CONFIDENCE: f64 = 0.9;

/// Who the highlight belongs to.
#[derive(Debug, Clone, Copy)]
pub struct PlayerContext<'a> {
    pub player_id: &'a str,
    pub player_name: &'a str,
}

/// Where the highlight was taken from.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub match_name: &'a str,
    pub match_date: DateTime<Utc>,
    /// Reference the run was started with
    pub video_ref: &'a str,
}

/// Ordered rule, first match wins.
pub fn classify(event_type: EventType, confidence: f64) -> Classification {
    if STRENGTH_TYPES.contains(&event_type) && confidence > STRENGTH_MIN_CONFIDENCE {
        Classification::Strength
    } else if WEAKNESS_TYPES.contains(&event_type) || confidence < WEAKNESS_MAX_CONFIDENCE {
        Classification::Weakness
    } else {
        Classification::Neutral
    }
}

pub fn title(player_name: &str, event_type: EventType) -> String {
    let action = match event_type {
        EventType::Goal => "Goal",
        EventType::Assist => "Assist",
        EventType::Dribble => "Dribbling Sequence",
        other => other.label(),
    };
    format!("{} - {}", player_name, action)
}

pub fn tags(event_type: EventType, confidence: f64) -> Vec<String> {
    let mut tags = vec![event_type.label().to_string()];
    if confidence > EXCELLENT_MIN_CONFIDENCE {
        tags.push("Excellent".to_string());
    }
    if matches!(event_type, EventType::Goal | EventType::Assist) {
        tags.push("Key Moment".to_string());
        tags.push("Highlight".to_string());
    }
    tags
}

/// Clip URL on the event, then an embeddable URL for hosted links, then the reference itself.
pub fn resolve_video_url(event: &Event, video_ref: &str) -> String {
    if let Some(clip_url) = event.clip_url.as_deref().filter(|u| !u.is_empty()) {
        return clip_url.to_string();
    }
    if is_hosted_platform_url(video_ref) {
        if let Some(embed) = embed_url(video_ref) {
            return embed;
        }
    }
    video_ref.to_string()
}

pub fn thumbnail(event: &Event) -> String {
    format!("/thumbnails/{}_{}.jpg", event.source_video_id, event.start())
}

fn insight(event: &Event) -> AiInsight {
    let percent = (event.confidence * 100.0).round().clamp(0.0, 100.0) as u8;
    AiInsight {
        confidence: percent,
        analysis: format!(
            "Detected {} with {:.1}% confidence",
            event.event_type.as_str(),
            event.confidence * 100.0
        ),
        key_moments: vec![format!("{} at {}s", event.event_type.as_str(), event.start())],
    }
}

/// Build the record for one event.
pub fn synthesize(event: &Event, player: PlayerContext<'_>, match_ctx: MatchContext<'_>) -> HighlightRecord {
    let now = Utc::now();
    HighlightRecord {
        id: Uuid::new_v4().to_string(),
        title: title(player.player_name, event.event_type),
        thumbnail: thumbnail(event),
        video_url: resolve_video_url(event, match_ctx.video_ref),
        duration: format_duration(event.time_range.duration_secs()),
        match_name: match_ctx.match_name.to_string(),
        match_date: match_ctx.match_date,
        classification: classify(event.event_type, event.confidence),
        tags: tags(event.event_type, event.confidence),
        player_id: player.player_id.to_string(),
        description: event.description.clone(),
        time_range: event.time_range,
        ai_insights: insight(event),
        created_at: now,
        updated_at: now,
    }
}
