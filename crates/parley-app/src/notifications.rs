//! Unread notification bookkeeping.
//!
//! The [`NotificationReconciler`] turns a stream of "channel X now holds N
//! messages" observations plus channel activation events into per-channel
//! unread badges.
//!
//! # Invariants
//!
//! - `last_known_total >= total` for every record.
//! - `last_known_total` never decreases.
//! - Observations of the active channel never raise its unread count.
//! - Activation leaves the channel with no unread count.

use std::collections::HashMap;

use parley_core::ChannelId;

use crate::UnreadPolicy;

/// Notification state of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Channel the record belongs to.
    pub channel_id: ChannelId,
    /// Message count last acknowledged as seen (baseline).
    pub total: u64,
    /// Most recent observed message count.
    pub last_known_total: u64,
    /// Messages that arrived since the baseline while the channel was not
    /// active.
    pub unread_count: u64,
}

impl NotificationRecord {
    fn new(channel_id: ChannelId, total: u64) -> Self {
        Self { channel_id, total, last_known_total: total, unread_count: 0 }
    }
}

/// Per-channel unread badge state machine.
#[derive(Debug, Clone, Default)]
pub struct NotificationReconciler {
    policy: UnreadPolicy,
    records: HashMap<ChannelId, NotificationRecord>,
}

impl NotificationReconciler {
    /// Create an empty reconciler using `policy`.
    pub fn new(policy: UnreadPolicy) -> Self {
        Self { policy, records: HashMap::new() }
    }

    /// Active unread policy.
    pub fn policy(&self) -> UnreadPolicy {
        self.policy
    }

    /// Record an observed message count for `channel_id`.
    ///
    /// The first observation of a channel becomes its baseline. Later
    /// observations raise the unread count only if `channel_id` is not the
    /// active channel. A count lower than one already seen leaves
    /// `last_known_total` unchanged.
    pub fn on_message_count_observed(
        &mut self,
        channel_id: &str,
        new_total: u64,
        active_channel_id: Option<&str>,
    ) -> &NotificationRecord {
        let policy = self.policy;
        let record = self
            .records
            .entry(channel_id.to_owned())
            .and_modify(|record| {
                if active_channel_id != Some(channel_id) {
                    match policy {
                        UnreadPolicy::Replace => {
                            let delta = new_total.saturating_sub(record.total);
                            if delta > 0 {
                                record.unread_count = delta;
                            }
                        },
                        UnreadPolicy::Accumulate => {
                            record.unread_count +=
                                new_total.saturating_sub(record.last_known_total);
                        },
                    }
                }
                record.last_known_total = record.last_known_total.max(new_total);
            })
            .or_insert_with(|| NotificationRecord::new(channel_id.to_owned(), new_total));

        tracing::trace!(
            channel = %record.channel_id,
            total = record.total,
            last_known = record.last_known_total,
            unread = record.unread_count,
            "message count observed"
        );
        record
    }

    /// Treat every known message of `channel_id` as seen.
    ///
    /// Returns `false` if the channel has no record yet.
    pub fn on_channel_activated(&mut self, channel_id: &str) -> bool {
        match self.records.get_mut(channel_id) {
            Some(record) => {
                record.total = record.last_known_total;
                record.unread_count = 0;
                true
            },
            None => false,
        }
    }

    /// Acknowledge messages observed while `channel_id` was active.
    ///
    /// Called when the user leaves a channel, so its badge only counts
    /// messages arriving after the switch. Returns `false` if the channel has
    /// no record yet.
    pub fn on_channel_deactivated(&mut self, channel_id: &str) -> bool {
        match self.records.get_mut(channel_id) {
            Some(record) => {
                record.total = record.last_known_total;
                true
            },
            None => false,
        }
    }

    /// Unread count for the badge. `None` if zero or the channel is untracked.
    pub fn unread_count(&self, channel_id: &str) -> Option<u64> {
        self.records.get(channel_id).map(|r| r.unread_count).filter(|count| *count > 0)
    }

    /// Record for a channel. `None` if untracked.
    pub fn record(&self, channel_id: &str) -> Option<&NotificationRecord> {
        self.records.get(channel_id)
    }

    /// All records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.values()
    }

    /// Number of tracked channels.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no channel is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn replace() -> NotificationReconciler {
        NotificationReconciler::new(UnreadPolicy::Replace)
    }

    #[test]
    fn first_observation_sets_baseline() {
        let mut notifications = replace();
        let record = notifications.on_message_count_observed("general", 4, None).clone();

        assert_eq!(record.total, 4);
        assert_eq!(record.last_known_total, 4);
        assert_eq!(record.unread_count, 0);
        assert_eq!(notifications.unread_count("general"), None);
    }

    #[test]
    fn general_random_walkthrough() {
        let mut notifications = replace();
        notifications.on_message_count_observed("general", 0, None);

        notifications.on_message_count_observed("general", 5, None);
        assert_eq!(notifications.unread_count("general"), Some(5));

        assert!(notifications.on_channel_activated("general"));
        let record = notifications.record("general").unwrap();
        assert_eq!((record.unread_count, record.total), (0, 5));

        notifications.on_message_count_observed("general", 7, Some("general"));
        assert_eq!(notifications.unread_count("general"), None);

        // selecting "random" resets it and acknowledges "general"
        notifications.on_channel_activated("random");
        notifications.on_channel_deactivated("general");
        notifications.on_message_count_observed("general", 9, Some("random"));
        assert_eq!(notifications.unread_count("general"), Some(2));
    }

    #[test]
    fn replace_uses_distance_from_baseline() {
        let mut notifications = replace();
        notifications.on_message_count_observed("c", 10, None);
        notifications.on_message_count_observed("c", 12, None);
        notifications.on_message_count_observed("c", 15, None);

        assert_eq!(notifications.unread_count("c"), Some(5));
    }

    #[test]
    fn accumulate_sums_consecutive_deltas() {
        let mut notifications = NotificationReconciler::new(UnreadPolicy::Accumulate);
        notifications.on_message_count_observed("c", 10, None);
        notifications.on_message_count_observed("c", 12, None);
        notifications.on_message_count_observed("c", 15, None);
        assert_eq!(notifications.unread_count("c"), Some(5));

        // counts observed while active are seen, not added later
        notifications.on_channel_activated("c");
        notifications.on_message_count_observed("c", 18, Some("c"));
        notifications.on_channel_deactivated("c");
        notifications.on_message_count_observed("c", 19, None);
        assert_eq!(notifications.unread_count("c"), Some(1));
    }

    #[test]
    fn activation_of_untracked_channel_is_noop() {
        let mut notifications = replace();
        assert!(!notifications.on_channel_activated("ghost"));
        assert!(!notifications.on_channel_deactivated("ghost"));
        assert!(notifications.is_empty());
    }

    #[test]
    fn lower_count_keeps_last_known_total() {
        let mut notifications = replace();
        notifications.on_message_count_observed("c", 8, None);
        notifications.on_message_count_observed("c", 3, None);

        let record = notifications.record("c").unwrap();
        assert_eq!(record.last_known_total, 8);
        assert_eq!(record.unread_count, 0);
    }

    fn observation() -> impl Strategy<Value = (u8, u64, Option<u8>)> {
        (0u8..4, 0u64..200, prop::option::of(0u8..4))
    }

    proptest! {
        #[test]
        fn prop_active_channel_stays_quiet(totals in prop::collection::vec(0u64..500, 1..40)) {
            let mut notifications = replace();
            for total in totals {
                notifications.on_message_count_observed("c", total, Some("c"));
                prop_assert_eq!(notifications.unread_count("c"), None);
            }
        }

        #[test]
        fn prop_last_known_total_is_monotonic(observations in prop::collection::vec(observation(), 1..60)) {
            let mut notifications = replace();
            let mut previous: HashMap<String, u64> = HashMap::new();

            for (channel, total, active) in observations {
                let channel = format!("c{channel}");
                let active = active.map(|a| format!("c{a}"));
                let record = notifications
                    .on_message_count_observed(&channel, total, active.as_deref())
                    .clone();

                prop_assert!(record.last_known_total >= record.total);
                if let Some(prev) = previous.insert(channel, record.last_known_total) {
                    prop_assert!(record.last_known_total >= prev);
                }
            }
        }

        #[test]
        fn prop_activation_clears_and_is_idempotent(
            observations in prop::collection::vec(observation(), 1..40),
            target in 0u8..4,
        ) {
            let mut notifications = replace();
            for (channel, total, active) in observations {
                let active = active.map(|a| format!("c{a}"));
                notifications.on_message_count_observed(&format!("c{channel}"), total, active.as_deref());
            }

            let channel = format!("c{target}");
            notifications.on_channel_activated(&channel);
            let once = notifications.record(&channel).cloned();
            notifications.on_channel_activated(&channel);

            prop_assert_eq!(notifications.unread_count(&channel), None);
            prop_assert_eq!(notifications.record(&channel).cloned(), once);
        }
    }
}
