//! Video pipeline endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use scout_models::{
    AnalysisReport, ExtractHighlightsRequest, HighlightSummary, ProcessVideoRequest,
    ProcessVideoResponse, ReanalyzeRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Unwrap a JSON body, reporting malformed input as 400 and running field validation.
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    body.validate()?;
    Ok(body)
}

/// Run the full pipeline for one video.
pub async fn process_video(
    State(state): State<AppState>,
    payload: Result<Json<ProcessVideoRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessVideoResponse>> {
    let request = validated(payload)?;
    info!(
        player_id = %request.player_id,
        video_url = %request.video_url,
        "Processing video"
    );
    let response = state.pipeline.process_video(&request).await?;
    Ok(Json(response))
}

/// Re-run analysis on an already indexed asset.
pub async fn reanalyze(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    payload: Result<Json<ReanalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisReport>> {
    let request = validated(payload)?;
    let report = state
        .pipeline
        .reanalyze(&asset_id, &request.player_id, request.event_types.as_deref())
        .await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct ExtractHighlightsResponse {
    pub status: String,
    pub asset_id: String,
    pub highlights_created: usize,
    pub highlights: Vec<HighlightSummary>,
}

/// Extract and persist highlights from an already indexed asset.
pub async fn extract_highlights(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    payload: Result<Json<ExtractHighlightsRequest>, JsonRejection>,
) -> ApiResult<Json<ExtractHighlightsResponse>> {
    let request = validated(payload)?;
    let created = state.pipeline.extract_and_save(&asset_id, &request).await?;
    Ok(Json(ExtractHighlightsResponse {
        status: "success".to_string(),
        asset_id,
        highlights_created: created.len(),
        highlights: created.iter().map(HighlightSummary::from).collect(),
    }))
}
