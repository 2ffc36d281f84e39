//! Highlight synthesis and pipeline coordination.
//!
//! [`PipelineCoordinator`] drives one run end to end over injected
//! collaborators: a [`scout_media::MediaAcquirer`], an
//! [`scout_analysis::AnalysisGateway`], the store traits and a
//! [`scout_realtime::RealtimeNotifier`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod synthesizer;

pub use config::{PipelineConfig, DEFAULT_EVENT_TYPES, DEFAULT_HIGHLIGHT_CAP};
pub use coordinator::{select_top_events, PipelineCoordinator};
pub use error::{LiveFailure, PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use synthesizer::{classify, synthesize, MatchContext, PlayerContext};
