//! Persistence collaborators for the ScoutPulse pipeline.
//!
//! The pipeline only depends on the [`PlayerLookup`] and [`HighlightStore`]
//! traits; [`InMemoryStore`] is the implementation the server ships with.

pub mod error;
pub mod memory;
pub mod metrics;
pub mod repos;
pub mod seed;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use repos::{HighlightStore, PlayerLookup};
pub use seed::{test_player, TEST_PLAYER_ID};
