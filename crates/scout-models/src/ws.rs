//! Realtime notification envelopes.
//!
//! Every envelope serializes as `{"type": ..., "timestamp": ..., ...payload}`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisSource, PerformanceMetrics};
use crate::error::ModelError;
use crate::highlight::HighlightRecord;

/// Broadcast channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Global,
    Players,
    Highlights,
    Analytics,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Global,
        Channel::Players,
        Channel::Highlights,
        Channel::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Global => "global",
            Channel::Players => "players",
            Channel::Highlights => "highlights",
            Channel::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ModelError::UnknownChannel(s.to_string()))
    }
}

/// Delivery scope: a broadcast channel or one watched player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Channel(Channel),
    Player(String),
}

impl Scope {
    pub fn player(player_id: impl Into<String>) -> Self {
        Scope::Player(player_id.into())
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Scope::Channel(_))
    }
}

impl From<Channel> for Scope {
    fn from(channel: Channel) -> Self {
        Scope::Channel(channel)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Channel(c) => write!(f, "channel:{}", c),
            Scope::Player(id) => write!(f, "player:{}", id),
        }
    }
}

/// Summary carried by `analysis_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub asset_id: String,
    pub source: AnalysisSource,
    pub total_events: usize,
    pub highlights_created: usize,
    pub metrics: PerformanceMetrics,
}

/// Realtime message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeMessage {
    /// Sent once right after a subscription is established
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<Channel>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Reply to any inbound client message
    Pong { timestamp: DateTime<Utc> },

    PlayerUpdate {
        player_id: String,
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },

    HighlightAdded {
        data: Box<HighlightRecord>,
        timestamp: DateTime<Utc>,
    },

    AnalysisComplete {
        analysis_id: String,
        player_id: String,
        results: AnalysisResults,
        timestamp: DateTime<Utc>,
    },

    ReportGenerated {
        report_id: String,
        player_id: String,
        timestamp: DateTime<Utc>,
    },

    StatsUpdate {
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
}

impl RealtimeMessage {
    pub fn connected(scope: &Scope) -> Self {
        let (channel, player_id) = match scope {
            Scope::Channel(c) => (Some(*c), None),
            Scope::Player(id) => (None, Some(id.clone())),
        };
        RealtimeMessage::Connected {
            channel,
            player_id,
            timestamp: Utc::now(),
        }
    }

    pub fn pong() -> Self {
        RealtimeMessage::Pong {
            timestamp: Utc::now(),
        }
    }

    pub fn player_update(player_id: impl Into<String>, data: serde_json::Value) -> Self {
        RealtimeMessage::PlayerUpdate {
            player_id: player_id.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn highlight_added(record: HighlightRecord) -> Self {
        RealtimeMessage::HighlightAdded {
            data: Box::new(record),
            timestamp: Utc::now(),
        }
    }

    pub fn analysis_complete(
        analysis_id: impl Into<String>,
        player_id: impl Into<String>,
        results: AnalysisResults,
    ) -> Self {
        RealtimeMessage::AnalysisComplete {
            analysis_id: analysis_id.into(),
            player_id: player_id.into(),
            results,
            timestamp: Utc::now(),
        }
    }

    pub fn report_generated(report_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        RealtimeMessage::ReportGenerated {
            report_id: report_id.into(),
            player_id: player_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn stats_update(data: serde_json::Value) -> Self {
        RealtimeMessage::StatsUpdate {
            data,
            timestamp: Utc::now(),
        }
    }

    /// The `type` tag as it appears on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            RealtimeMessage::Connected { .. } => "connected",
            RealtimeMessage::Pong { .. } => "pong",
            RealtimeMessage::PlayerUpdate { .. } => "player_update",
            RealtimeMessage::HighlightAdded { .. } => "highlight_added",
            RealtimeMessage::AnalysisComplete { .. } => "analysis_complete",
            RealtimeMessage::ReportGenerated { .. } => "report_generated",
            RealtimeMessage::StatsUpdate { .. } => "stats_update",
        }
    }
}
