//! Operations for model-based testing.
//!
//! Operations represent the actions that drive unread bookkeeping. They are
//! generated randomly and applied to both the model and a real session.

use arbitrary::Arbitrary;

/// Channel identifier (folded into a small space so operations collide).
pub type ModelChannel = u8;

/// Number of distinct channels operations refer to.
pub const MODEL_CHANNELS: u8 = 4;

/// Real channel id of a model channel.
pub fn channel_id(channel: ModelChannel) -> String {
    format!("c{}", channel % MODEL_CHANNELS)
}

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// A channel is created by someone. No-op if it exists.
    AddChannel {
        /// Channel to create.
        channel: ModelChannel,
    },

    /// Someone posts a message. Messages may predate their channel.
    Post {
        /// Target channel.
        channel: ModelChannel,
    },

    /// The user opens a channel.
    Select {
        /// Channel to open.
        channel: ModelChannel,
    },
}

/// Result of applying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,
    /// Operation was rejected.
    Error(OperationError),
}

/// Why an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Selected channel is not in the roster.
    UnknownChannel,
}
