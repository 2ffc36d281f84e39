//! In-memory store used by the API binary and tests.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use scout_models::{HighlightRecord, Player};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_operation;
use crate::repos::{HighlightStore, PlayerLookup};
use crate::seed::test_player;

#[derive(Debug, Default)]
struct Tables {
    players: HashMap<String, Player>,
    /// Insertion order is creation order
    highlights: Vec<HighlightRecord>,
}

/// Players and highlights held behind a single lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player.
    pub async fn upsert_player(&self, player: Player) {
        let mut tables = self.tables.write().await;
        debug!(player_id = %player.id, "Upserting player");
        tables.players.insert(player.id.clone(), player);
    }

    /// Insert the fixture test player unless it already exists.
    ///
    /// Returns whether a player was inserted.
    pub async fn seed_test_player(&self) -> bool {
        let player = test_player();
        let mut tables = self.tables.write().await;
        if tables.players.contains_key(&player.id) {
            info!(player_id = %player.id, "Test player already exists, skipping seed");
            return false;
        }
        info!(player_id = %player.id, "Seeded test player");
        tables.players.insert(player.id.clone(), player);
        true
    }

    pub async fn highlight_count(&self) -> usize {
        self.tables.read().await.highlights.len()
    }
}

#[async_trait]
impl PlayerLookup for InMemoryStore {
    async fn by_id(&self, player_id: &str) -> StoreResult<Option<Player>> {
        let started = Instant::now();
        let player = self.tables.read().await.players.get(player_id).cloned();
        record_operation("player_by_id", true, started.elapsed().as_secs_f64() * 1000.0);
        Ok(player)
    }
}

#[async_trait]
impl HighlightStore for InMemoryStore {
    async fn create(&self, record: HighlightRecord) -> StoreResult<HighlightRecord> {
        let started = Instant::now();
        let mut tables = self.tables.write().await;
        let result = if record.id.trim().is_empty() {
            Err(StoreError::invalid("highlight id must not be empty"))
        } else if tables.highlights.iter().any(|h| h.id == record.id) {
            Err(StoreError::already_exists(record.id.clone()))
        } else {
            tables.highlights.push(record.clone());
            Ok(record)
        };
        record_operation("highlight_create", result.is_ok(), started.elapsed().as_secs_f64() * 1000.0);
        result
    }

    async fn by_player(&self, player_id: &str) -> StoreResult<Vec<HighlightRecord>> {
        let started = Instant::now();
        let highlights = self
            .tables
            .read()
            .await
            .highlights
            .iter()
            .filter(|h| h.player_id == player_id)
            .cloned()
            .collect();
        record_operation("highlights_by_player", true, started.elapsed().as_secs_f64() * 1000.0);
        Ok(highlights)
    }
}
