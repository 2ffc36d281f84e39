//! Domain-level notifications routed onto hub scopes.

use std::sync::Arc;

use tracing::warn;

use scout_models::{AnalysisResults, Channel, HighlightRecord, RealtimeMessage, Scope};

use crate::hub::NotificationHub;

/// Publishes pipeline outcomes; delivery problems are logged, never returned.
#[derive(Clone)]
pub struct RealtimeNotifier {
    hub: Arc<NotificationHub>,
}

impl RealtimeNotifier {
    pub fn new(hub: Arc<NotificationHub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    async fn fanout(&self, message: RealtimeMessage, scopes: &[Scope]) -> usize {
        let mut delivered = 0;
        for scope in scopes {
            match self.hub.publish(&message, scope).await {
                Ok(n) => delivered += n,
                Err(e) => warn!(scope = %scope, "Failed to publish {}: {}", message.type_name(), e),
            }
        }
        delivered
    }

    /// Player watchers plus the players channel.
    pub async fn player_update(&self, player_id: &str, data: serde_json::Value) -> usize {
        let message = RealtimeMessage::player_update(player_id, data);
        self.fanout(message, &[Scope::player(player_id), Channel::Players.into()])
            .await
    }

    /// Owning player's watchers plus the highlights channel.
    pub async fn highlight_added(&self, record: &HighlightRecord) -> usize {
        let mut scopes = Vec::with_capacity(2);
        if !record.player_id.is_empty() {
            scopes.push(Scope::player(record.player_id.clone()));
        }
        scopes.push(Channel::Highlights.into());
        self.fanout(RealtimeMessage::highlight_added(record.clone()), &scopes)
            .await
    }

    /// Player watchers plus the analytics channel.
    pub async fn analysis_complete(&self, analysis_id: &str, player_id: &str, results: AnalysisResults) -> usize {
        let message = RealtimeMessage::analysis_complete(analysis_id, player_id, results);
        self.fanout(message, &[Scope::player(player_id), Channel::Analytics.into()])
            .await
    }

    /// Player watchers only.
    pub async fn report_generated(&self, report_id: &str, player_id: &str) -> usize {
        let message = RealtimeMessage::report_generated(report_id, player_id);
        self.fanout(message, &[Scope::player(player_id)]).await
    }

    /// Analytics channel only.
    pub async fn stats_update(&self, data: serde_json::Value) -> usize {
        self.fanout(RealtimeMessage::stats_update(data), &[Channel::Analytics.into()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::OUTBOUND_QUEUE_SIZE;
    use chrono::Utc;
    use scout_models::{AiInsight, AnalysisSource, Classification, PerformanceMetrics, TimeRange};
    use tokio::sync::mpsc;

    struct Client {
        rx: mpsc::Receiver<String>,
    }

    impl Client {
        fn types(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(raw) = self.rx.try_recv() {
                let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
                out.push(v["type"].as_str().unwrap().to_string());
            }
            out
        }
    }

    async fn client(hub: &NotificationHub, scope: Scope) -> Client {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let id = hub.register(tx).await;
        hub.subscribe(id, scope).await.unwrap();
        Client { rx }
    }

    fn record(player_id: &str) -> HighlightRecord {
        let now = Utc::now();
        HighlightRecord {
            id: "h1".to_string(),
            title: "P - Goal".to_string(),
            thumbnail: String::new(),
            video_url: String::new(),
            duration: "0:15".to_string(),
            match_name: "M".to_string(),
            match_date: now,
            classification: Classification::Strength,
            tags: vec![],
            player_id: player_id.to_string(),
            description: String::new(),
            time_range: TimeRange::new(75, 90).unwrap(),
            ai_insights: AiInsight {
                confidence: 92,
                analysis: String::new(),
                key_moments: vec![],
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_routing() {
        let hub = Arc::new(NotificationHub::new());
        let notifier = RealtimeNotifier::new(hub.clone());
        let mut player = client(&hub, Scope::player("p1")).await;
        let mut other_player = client(&hub, Scope::player("p2")).await;
        let mut highlights = client(&hub, Channel::Highlights.into()).await;
        let mut analytics = client(&hub, Channel::Analytics.into()).await;
        let mut players = client(&hub, Channel::Players.into()).await;
        let mut global = client(&hub, Channel::Global.into()).await;

        assert_eq!(notifier.highlight_added(&record("p1")).await, 2);
        let results = AnalysisResults {
            asset_id: "a".to_string(),
            source: AnalysisSource::Simulated,
            total_events: 3,
            highlights_created: 3,
            metrics: PerformanceMetrics::default(),
        };
        assert_eq!(notifier.analysis_complete("an-1", "p1", results).await, 2);
        assert_eq!(notifier.stats_update(serde_json::json!({"total": 3})).await, 1);
        assert_eq!(notifier.player_update("p1", serde_json::json!({})).await, 2);
        assert_eq!(notifier.report_generated("r1", "p1").await, 1);

        assert_eq!(
            player.types(),
            vec!["highlight_added", "analysis_complete", "player_update", "report_generated"]
        );
        assert!(other_player.types().is_empty());
        assert_eq!(highlights.types(), vec!["highlight_added"]);
        assert_eq!(analytics.types(), vec!["analysis_complete", "stats_update"]);
        assert_eq!(players.types(), vec!["player_update"]);
        assert!(global.types().is_empty());
    }
}
