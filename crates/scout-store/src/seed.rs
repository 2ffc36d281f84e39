//! Fixture players.

use scout_models::{Player, PlayerStats, RecentPerformance};

pub const TEST_PLAYER_ID: &str = "test-player";

/// The player used for local end-to-end testing.
pub fn test_player() -> Player {
    Player {
        id: TEST_PLAYER_ID.to_string(),
        name: "Test Player".to_string(),
        position: "Forward".to_string(),
        team: "Test FC".to_string(),
        age: 22,
        nationality: "USA".to_string(),
        avatar: None,
        stats: PlayerStats {
            dribbling: 85,
            finishing: 88,
            passing: 82,
            defense: 60,
            speed: 90,
            strength: 78,
        },
        recent_performance: RecentPerformance {
            goals: 5,
            assists: 3,
            average_rating: 7.8,
            minutes_played: 540,
        },
    }
}
