//! Fuzz target for the notification reconciler
//!
//! # Strategy
//!
//! - Counts that rise, stall and drop across a handful of channels
//! - Activation and deactivation in any order, including unknown channels
//! - Both unread policies
//!
//! # Invariants
//!
//! - `last_known_total >= total` for every record
//! - `last_known_total` never decreases
//! - The active channel never shows an unread badge
//! - Activation always clears the badge

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_app::{NotificationReconciler, UnreadPolicy};

#[derive(Debug, Clone, Arbitrary)]
enum ReconcilerOp {
    Observe { channel: u8, total: u16 },
    Activate { channel: u8 },
    Deactivate { channel: u8 },
}

fn channel_id(channel: u8) -> String {
    format!("c{}", channel % 5)
}

fuzz_target!(|input: (bool, Vec<ReconcilerOp>)| {
    let (accumulate, ops) = input;
    let policy = if accumulate { UnreadPolicy::Accumulate } else { UnreadPolicy::Replace };
    let mut reconciler = NotificationReconciler::new(policy);
    let mut active: Option<String> = None;
    let mut last_known: HashMap<String, u64> = HashMap::new();

    for op in ops {
        match op {
            ReconcilerOp::Observe { channel, total } => {
                let id = channel_id(channel);
                reconciler.on_message_count_observed(&id, u64::from(total), active.as_deref());
            },
            ReconcilerOp::Activate { channel } => {
                let id = channel_id(channel);
                reconciler.on_channel_activated(&id);
                assert_eq!(reconciler.unread_count(&id), None);
                if let Some(previous) = active.replace(id.clone()).filter(|p| *p != id) {
                    reconciler.on_channel_deactivated(&previous);
                }
            },
            ReconcilerOp::Deactivate { channel } => {
                reconciler.on_channel_deactivated(&channel_id(channel));
            },
        }

        for record in reconciler.records() {
            assert!(record.last_known_total >= record.total, "baseline ahead: {record:?}");
            let seen = last_known.entry(record.channel_id.clone()).or_default();
            assert!(record.last_known_total >= *seen, "last known went backwards: {record:?}");
            *seen = record.last_known_total;
        }
        if let Some(id) = &active {
            assert_eq!(reconciler.unread_count(id), None, "active channel {id} has unread");
        }
    }
});
