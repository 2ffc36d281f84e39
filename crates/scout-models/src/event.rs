//! Detected player actions.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Fixed vocabulary of detectable soccer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    Assist,
    Shot,
    Pass,
    Dribble,
    Tackle,
    Interception,
    Clearance,
    Save,
    Foul,
    Offside,
    Corner,
    FreeKick,
}

impl EventType {
    /// Every event type, in vocabulary order.
    pub const ALL: [EventType; 13] = [
        EventType::Goal,
        EventType::Assist,
        EventType::Shot,
        EventType::Pass,
        EventType::Dribble,
        EventType::Tackle,
        EventType::Interception,
        EventType::Clearance,
        EventType::Save,
        EventType::Foul,
        EventType::Offside,
        EventType::Corner,
        EventType::FreeKick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Goal => "goal",
            EventType::Assist => "assist",
            EventType::Shot => "shot",
            EventType::Pass => "pass",
            EventType::Dribble => "dribble",
            EventType::Tackle => "tackle",
            EventType::Interception => "interception",
            EventType::Clearance => "clearance",
            EventType::Save => "save",
            EventType::Foul => "foul",
            EventType::Offside => "offside",
            EventType::Corner => "corner",
            EventType::FreeKick => "free_kick",
        }
    }

    /// Human-readable capitalized label ("Goal", "Free Kick").
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Goal => "Goal",
            EventType::Assist => "Assist",
            EventType::Shot => "Shot",
            EventType::Pass => "Pass",
            EventType::Dribble => "Dribble",
            EventType::Tackle => "Tackle",
            EventType::Interception => "Interception",
            EventType::Clearance => "Clearance",
            EventType::Save => "Save",
            EventType::Foul => "Foul",
            EventType::Offside => "Offside",
            EventType::Corner => "Corner",
            EventType::FreeKick => "Free Kick",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownEventType(s.to_string()))
    }
}

/// Inclusive start/end offsets in whole seconds. `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: u32,
    end: u32,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ModelError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.end)
    }
}

impl TimeRange {
    pub fn new(start: u32, end: u32) -> ModelResult<Self> {
        if end < start {
            return Err(ModelError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range from fractional seconds, rounding both ends.
    ///
    /// Negative inputs clamp to zero and an end before the start collapses
    /// onto the start.
    pub fn from_secs_f64(start: f64, end: f64) -> Self {
        let start = round_secs(start);
        let end = round_secs(end).max(start);
        Self { start, end }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn duration_secs(&self) -> u32 {
        self.end - self.start
    }
}

fn round_secs(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// A single detected player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,

    #[serde(flatten)]
    pub time_range: TimeRange,

    /// Detection confidence in `[0, 1]`
    pub confidence: f64,

    pub description: String,

    /// Analysis-service asset the event was detected in
    pub source_video_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_url: Option<String>,
}

impl Event {
    /// Create an event; confidence is clamped into `[0, 1]`.
    pub fn new(
        event_type: EventType,
        time_range: TimeRange,
        confidence: f64,
        description: impl Into<String>,
        source_video_id: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            event_type,
            time_range,
            confidence,
            description: description.into(),
            source_video_id: source_video_id.into(),
            clip_id: None,
            clip_url: None,
        }
    }

    pub fn with_clip_id(mut self, clip_id: impl Into<String>) -> Self {
        self.clip_id = Some(clip_id.into());
        self
    }

    pub fn with_clip_url(mut self, clip_url: impl Into<String>) -> Self {
        self.clip_url = Some(clip_url.into());
        self
    }

    pub fn start(&self) -> u32 {
        self.time_range.start()
    }

    pub fn end(&self) -> u32 {
        self.time_range.end()
    }
}
