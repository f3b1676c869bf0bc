//! Reference model for model-based testing.
//!
//! Random [`Operation`] sequences are applied to both [`ModelWorld`] and a
//! real session; their [`ObservableState`]s must match after every step.

mod operation;
mod world;

pub use operation::{
    MODEL_CHANNELS, ModelChannel, Operation, OperationError, OperationResult, channel_id,
};
pub use world::{ModelWorld, ObservableState};
