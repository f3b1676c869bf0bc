//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{Invariant, InvariantKind, InvariantResult, SessionSnapshot, Violation};

/// The baseline never runs ahead of the last observed message count.
pub struct BaselineNotAhead;

impl Invariant for BaselineNotAhead {
    fn kind(&self) -> InvariantKind {
        InvariantKind::BaselineNotAhead
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for record in state.records.values() {
            if record.total > record.last_known_total {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "channel {}: total {} ahead of last known {}",
                        record.channel_id, record.total, record.last_known_total
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The last observed message count never decreases.
pub struct LastKnownMonotonic;

impl Invariant for LastKnownMonotonic {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LastKnownMonotonic
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for (channel_id, history) in &state.last_known_history {
            for window in history.windows(2) {
                if window[1] < window[0] {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!(
                            "channel {channel_id}: last known total decreased {} → {}",
                            window[0], window[1]
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The open conversation never shows an unread badge.
pub struct ActiveChannelHasNoUnread;

impl Invariant for ActiveChannelHasNoUnread {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ActiveChannelHasNoUnread
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(active) = &state.active else {
            return Ok(());
        };
        match state.records.get(active) {
            Some(record) if record.unread_count > 0 => Err(Violation {
                invariant: self.kind(),
                message: format!("active channel {active} has {} unread", record.unread_count),
            }),
            _ => Ok(()),
        }
    }
}

/// A public open conversation was listed by the sidebar when it was opened.
///
/// It may drop out of the sidebar afterwards: unstarring an open
/// bookmark-only channel keeps it open.
pub struct ActiveChannelListed;

impl Invariant for ActiveChannelListed {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ActiveChannelListed
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(active) = state.active.as_ref().filter(|_| state.active_is_public) else {
            return Ok(());
        };
        if state.active_was_listed
            || state.roster.contains(active)
            || state.starred.contains(active)
        {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.kind(),
                message: format!("active channel {active} not in roster {:?}", state.roster),
            })
        }
    }
}

/// The signed-in user never appears in their own peer list.
pub struct LocalPeerExcluded;

impl Invariant for LocalPeerExcluded {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LocalPeerExcluded
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.peers.contains(&state.local_peer) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("local peer {} listed among peers", state.local_peer),
            });
        }
        Ok(())
    }
}
