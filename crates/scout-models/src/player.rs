//! Player models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Attribute ratings (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PlayerStats {
    pub dribbling: u8,
    pub finishing: u8,
    pub passing: u8,
    pub defense: u8,
    pub speed: u8,
    pub strength: u8,
}

/// Recent match output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecentPerformance {
    pub goals: u32,
    pub assists: u32,
    pub average_rating: f64,
    pub minutes_played: u32,
}

/// A scouted player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub position: String,
    pub team: String,
    pub age: u32,
    pub nationality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub stats: PlayerStats,
    pub recent_performance: RecentPerformance,
}

impl Player {
    /// Create a player with empty stats.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: String::new(),
            team: String::new(),
            age: 0,
            nationality: String::new(),
            avatar: None,
            stats: PlayerStats::default(),
            recent_performance: RecentPerformance::default(),
        }
    }
}
