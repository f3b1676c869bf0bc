//! Session error type.

use parley_core::{BackendError, ChannelId, PeerId, ValidationError};
use thiserror::Error;

/// Errors returned by user-initiated session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Input rejected before reaching the backend.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend refused or failed the operation. Not retried.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Channel is neither in the roster nor starred.
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// Peer is not in the directory.
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// Session was torn down.
    #[error("session has been torn down")]
    TornDown,
}

impl SessionError {
    /// Returns true if the user may succeed by retrying unchanged input.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_transient(),
            Self::Validation(_) | Self::UnknownChannel(_) | Self::UnknownPeer(_) | Self::TornDown => {
                false
            },
        }
    }
}
