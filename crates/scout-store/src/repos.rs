//! Collaborator interfaces consumed by the pipeline.

use async_trait::async_trait;

use scout_models::{HighlightRecord, Player};

use crate::error::StoreResult;

/// Read access to players.
#[async_trait]
pub trait PlayerLookup: Send + Sync {
    /// `Ok(None)` when no player has this id.
    async fn by_id(&self, player_id: &str) -> StoreResult<Option<Player>>;
}

/// Highlight persistence.
#[async_trait]
pub trait HighlightStore: Send + Sync {
    /// Persist a new record and return it as stored.
    async fn create(&self, record: HighlightRecord) -> StoreResult<HighlightRecord>;

    /// All highlights for a player, oldest first.
    async fn by_player(&self, player_id: &str) -> StoreResult<Vec<HighlightRecord>>;
}
