//! Highlight read endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use scout_models::HighlightRecord;
use scout_store::{HighlightStore, PlayerLookup};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PlayerHighlightsResponse {
    pub player_id: String,
    pub total: usize,
    pub highlights: Vec<HighlightRecord>,
}

/// All highlights created for a player, oldest first.
pub async fn list_player_highlights(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> ApiResult<Json<PlayerHighlightsResponse>> {
    if state.store.by_id(&player_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Player {} not found", player_id)));
    }
    let highlights = state.store.by_player(&player_id).await?;
    Ok(Json(PlayerHighlightsResponse {
        player_id,
        total: highlights.len(),
        highlights,
    }))
}
