//! Deterministic simulated analysis used when the live service is unavailable.

use uuid::Uuid;

use scout_models::{AnalysisReport, AnalysisSource, Event, EventType, KeyMoment, PerformanceMetrics, TimeRange};

/// Asset id for the simulated report; stable for a given player name.
pub fn simulated_asset_id(player_name: &str) -> String {
    format!("simulated-{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, player_name.as_bytes()))
}

/// The fixed goal/assist/dribble report.
pub fn simulated_report(player_name: &str) -> AnalysisReport {
    let asset_id = simulated_asset_id(player_name);

    let fixtures = [
        (EventType::Goal, 75, 90, 0.92, format!("{} scores from inside the box", player_name)),
        (
            EventType::Assist,
            180,
            195,
            0.88,
            format!("{} provides a key pass leading to a goal", player_name),
        ),
        (EventType::Dribble, 260, 275, 0.84, format!("{} beats two defenders", player_name)),
    ];

    let events: Vec<Event> = fixtures
        .into_iter()
        .map(|(event_type, start, end, confidence, description)| {
            Event::new(
                event_type,
                TimeRange::from_secs_f64(start as f64, end as f64),
                confidence,
                description,
                asset_id.clone(),
            )
        })
        .collect();

    let key_moments = events
        .iter()
        .map(|e| KeyMoment {
            time: e.start(),
            description: e.description.clone(),
            importance: e.confidence,
            event_type: e.event_type,
        })
        .collect();

    AnalysisReport {
        analysis_id: format!("simulated_{}", asset_id),
        asset_id,
        source: AnalysisSource::Simulated,
        events,
        key_moments,
        metrics: PerformanceMetrics {
            success_rate: 0.9,
            intensity: 0.6,
            technical_quality: 0.75,
        },
        summary: format!(
            "Simulated analysis for {}: influential performance with goals, assists, and ball progression.",
            player_name
        ),
    }
}
