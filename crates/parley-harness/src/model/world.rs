//! Model world - the unread-count oracle.
//!
//! The world is a deliberately naive reimplementation of channel arrival,
//! selection and unread bookkeeping. It's the oracle against which the real
//! session is verified.

use parley_app::UnreadPolicy;

use super::operation::{
    MODEL_CHANNELS, ModelChannel, Operation, OperationError, OperationResult, channel_id,
};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Open channel id.
    pub active: Option<String>,
    /// Unread badge per listed channel, in channel id order.
    pub unread: Vec<(String, Option<u64>)>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ModelChannelState {
    listed: bool,
    messages: u64,
    total: u64,
    last_known: u64,
    unread: u64,
}

/// Model world - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    policy: UnreadPolicy,
    channels: Vec<ModelChannelState>,
    active: Option<usize>,
}

impl ModelWorld {
    /// Create an empty world using `policy`.
    pub fn new(policy: UnreadPolicy) -> Self {
        Self {
            policy,
            channels: vec![ModelChannelState::default(); usize::from(MODEL_CHANNELS)],
            active: None,
        }
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::AddChannel { channel } => {
                self.apply_add_channel(index(channel));
                OperationResult::Ok
            },
            Operation::Post { channel } => {
                self.apply_post(index(channel));
                OperationResult::Ok
            },
            Operation::Select { channel } => self.apply_select(index(channel)),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let unread = self
            .channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.listed)
            .map(|(i, c)| (name(i), (c.unread > 0).then_some(c.unread)))
            .collect();

        ObservableState { active: self.active.map(name), unread }
    }

    fn apply_add_channel(&mut self, i: usize) {
        let channel = &mut self.channels[i];
        if channel.listed {
            return;
        }
        channel.listed = true;
        channel.total = channel.messages;
        channel.last_known = channel.messages;
        channel.unread = 0;

        if self.active.is_none() {
            self.active = Some(i);
        }
    }

    fn apply_post(&mut self, i: usize) {
        let policy = self.policy;
        let is_active = self.active == Some(i);
        let channel = &mut self.channels[i];
        channel.messages += 1;
        if !channel.listed {
            return;
        }

        if !is_active {
            match policy {
                UnreadPolicy::Replace => {
                    if channel.messages > channel.total {
                        channel.unread = channel.messages - channel.total;
                    }
                },
                UnreadPolicy::Accumulate => {
                    channel.unread += channel.messages.saturating_sub(channel.last_known);
                },
            }
        }
        channel.last_known = channel.last_known.max(channel.messages);
    }

    fn apply_select(&mut self, i: usize) -> OperationResult {
        if !self.channels[i].listed {
            return OperationResult::Error(OperationError::UnknownChannel);
        }

        let channel = &mut self.channels[i];
        channel.total = channel.last_known;
        channel.unread = 0;

        if let Some(previous) = self.active.filter(|p| *p != i) {
            let previous = &mut self.channels[previous];
            previous.total = previous.last_known;
        }
        self.active = Some(i);
        OperationResult::Ok
    }
}

fn index(channel: ModelChannel) -> usize {
    usize::from(channel % MODEL_CHANNELS)
}

fn name(i: usize) -> String {
    // i < MODEL_CHANNELS, so the cast is lossless
    #[allow(clippy::cast_possible_truncation)]
    channel_id(i as ModelChannel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_listed_channel_becomes_active() {
        let mut world = ModelWorld::new(UnreadPolicy::Replace);
        world.apply(&Operation::AddChannel { channel: 2 });
        world.apply(&Operation::AddChannel { channel: 1 });

        assert_eq!(world.observable_state().active.as_deref(), Some("c2"));
    }

    #[test]
    fn scenario_general_random() {
        let mut world = ModelWorld::new(UnreadPolicy::Replace);
        world.apply(&Operation::AddChannel { channel: 0 });
        world.apply(&Operation::AddChannel { channel: 1 });
        for _ in 0..5 {
            world.apply(&Operation::Post { channel: 0 });
        }
        world.apply(&Operation::Select { channel: 1 });
        world.apply(&Operation::Post { channel: 0 });
        world.apply(&Operation::Post { channel: 0 });

        let state = world.observable_state();
        assert_eq!(state.unread, vec![("c0".into(), Some(2)), ("c1".into(), None)]);
    }

    #[test]
    fn select_unlisted_is_error() {
        let mut world = ModelWorld::new(UnreadPolicy::Replace);
        assert_eq!(
            world.apply(&Operation::Select { channel: 3 }),
            OperationResult::Error(OperationError::UnknownChannel)
        );
    }
}
