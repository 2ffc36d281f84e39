//! Pipeline configuration.

use scout_models::EventType;
use tracing::warn;

/// Upper bound on highlights created by one run.
pub const DEFAULT_HIGHLIGHT_CAP: usize = 20;

/// Categories queried by `process_video`.
pub const DEFAULT_EVENT_TYPES: [EventType; 6] = [
    EventType::Goal,
    EventType::Assist,
    EventType::Dribble,
    EventType::Pass,
    EventType::Shot,
    EventType::Tackle,
];

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum highlights created per run
    pub highlight_cap: usize,
    /// Event categories analyzed for each processed video
    pub event_types: Vec<EventType>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            highlight_cap: DEFAULT_HIGHLIGHT_CAP,
            event_types: DEFAULT_EVENT_TYPES.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            highlight_cap: std::env::var("HIGHLIGHT_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&cap| cap > 0)
                .unwrap_or(defaults.highlight_cap),
            event_types: std::env::var("PIPELINE_EVENT_TYPES")
                .ok()
                .map(|s| parse_event_types(&s))
                .filter(|types| !types.is_empty())
                .unwrap_or(defaults.event_types),
        }
    }

    pub fn with_highlight_cap(mut self, cap: usize) -> Self {
        self.highlight_cap = cap;
        self
    }
}

/// Parse a comma-separated category list, skipping unknown names.
pub fn parse_event_types(raw: &str) -> Vec<EventType> {
    let mut types = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<EventType>() {
            Ok(t) if !types.contains(&t) => types.push(t),
            Ok(_) => {}
            Err(e) => warn!("Ignoring event type in PIPELINE_EVENT_TYPES: {}", e),
        }
    }
    types
}
