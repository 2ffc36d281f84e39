//! Request handlers.

pub mod health;
pub mod highlights;
pub mod pipeline;

pub use health::*;
pub use highlights::*;
pub use pipeline::*;
