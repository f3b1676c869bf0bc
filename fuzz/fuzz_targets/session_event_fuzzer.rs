//! Fuzz target for the session event router
//!
//! # Strategy
//!
//! - Database traffic: channels, messages, directory entries, presence
//!   markers and bookmarks written through the in-memory database
//! - Forged events: random subscription ids, kinds and snapshot shapes
//!   delivered straight to `Session::handle`
//! - User actions: selecting channels and peers, starring, creating
//! - Connection flaps and teardown at any point
//!
//! # Invariants
//!
//! - Handling never panics, whatever the snapshot shape
//! - The standard invariant registry holds after every step
//! - After teardown every event is ignored and no subscription is left

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_app::{LocalUser, Session, SessionConfig};
use parley_core::{BackendEvent, DbPath, EventKind, Snapshot, SubscriptionId};
use parley_harness::{InvariantRegistry, MemoryDatabase, SessionSnapshot, pump};
use serde_json::{Value, json};

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    AddChannel { channel: u8 },
    Post { channel: u8, count: u8 },
    AddPeer { peer: u8 },
    Online { peer: u8 },
    Offline { peer: u8 },
    Forge { subscription: u8, kind: KindChoice, key: u8, value: ValueShape },
    Select { channel: u8 },
    Dm { peer: u8 },
    Star { channel: u8 },
    Unstar { channel: u8 },
    Create { name: String, description: String },
    Flap,
    Teardown,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum KindChoice {
    EntryAdded,
    EntryRemoved,
    ValueChanged,
    ConnectionStateChanged,
}

#[derive(Debug, Clone, Arbitrary)]
enum ValueShape {
    Null,
    Bool(bool),
    Number(i64),
    Text(String),
    Children(u8),
    Channel { name: String },
}

fn channel_path(channel: u8) -> DbPath {
    DbPath::new("channels").child(format!("c{}", channel % 4))
}

fn peer_id(peer: u8) -> String {
    // peer 0 is the local user
    if peer % 4 == 0 { "me".to_owned() } else { format!("p{}", peer % 4) }
}

fn forge(subscription: u8, kind: KindChoice, key: u8, value: ValueShape) -> BackendEvent {
    let kind = match kind {
        KindChoice::EntryAdded => EventKind::EntryAdded,
        KindChoice::EntryRemoved => EventKind::EntryRemoved,
        KindChoice::ValueChanged => EventKind::ValueChanged,
        KindChoice::ConnectionStateChanged => EventKind::ConnectionStateChanged,
    };
    let value = match value {
        ValueShape::Null => Value::Null,
        ValueShape::Bool(b) => json!(b),
        ValueShape::Number(n) => json!(n),
        ValueShape::Text(s) => json!(s),
        ValueShape::Children(n) => {
            Value::Object((0..n).map(|i| (format!("m{i}"), json!(true))).collect())
        },
        ValueShape::Channel { name } => json!({ "name": name, "desc": "", "createdBy": {} }),
    };
    BackendEvent {
        subscription: SubscriptionId(u64::from(subscription % 16)),
        kind,
        snapshot: Snapshot::new(format!("k{}", key % 4), value),
    }
}

fuzz_target!(|ops: Vec<SessionOp>| {
    let db = MemoryDatabase::new();
    db.write(&DbPath::new("users/me"), json!({ "name": "Me" }));

    let backend = db.connect_client();
    let client = backend.handle();
    let mut session = Session::new(backend, LocalUser::new("me", "Me"), SessionConfig::default());
    if session.start().is_err() {
        return;
    }
    pump(&mut session);

    let invariants = InvariantRegistry::standard();
    let mut snapshot = SessionSnapshot::capture(&session, None);

    for op in ops {
        match op {
            SessionOp::AddChannel { channel } => {
                let name = format!("channel {}", channel % 4);
                db.write(&channel_path(channel), json!({ "name": name, "desc": "fuzz" }));
            },
            SessionOp::Post { channel, count } => {
                let path = DbPath::new("messages").child(format!("c{}", channel % 4));
                for _ in 0..count % 8 {
                    db.push(&path, json!({ "content": "..." }));
                }
            },
            SessionOp::AddPeer { peer } => {
                let id = peer_id(peer);
                db.write(&DbPath::new("users").child(&id), json!({ "name": id }));
            },
            SessionOp::Online { peer } => {
                db.write(&DbPath::new("presence").child(peer_id(peer)), json!(true));
            },
            SessionOp::Offline { peer } => db.remove(&DbPath::new("presence").child(peer_id(peer))),
            SessionOp::Forge { subscription, kind, key, value } => {
                let actions = session.handle(forge(subscription, kind, key, value));
                if session.is_torn_down() {
                    assert!(actions.is_empty());
                }
            },
            SessionOp::Select { channel } => {
                let _ = session.select_channel(&format!("c{}", channel % 4));
            },
            SessionOp::Dm { peer } => {
                let _ = session.select_direct_peer(&peer_id(peer));
            },
            SessionOp::Star { channel } => {
                let _ = session.star_channel(&format!("c{}", channel % 4));
            },
            SessionOp::Unstar { channel } => {
                let _ = session.unstar_channel(&format!("c{}", channel % 4));
            },
            SessionOp::Create { name, description } => {
                let _ = session.create_channel(&name, &description);
            },
            SessionOp::Flap => {
                let connected = db.is_connected(client);
                db.set_connected(client, !connected);
            },
            SessionOp::Teardown => {
                session.teardown();
                assert_eq!(session.subscription_count(), 0);
                assert_eq!(db.subscription_count(client), 0);
            },
        }
        pump(&mut session);

        snapshot = SessionSnapshot::capture(&session, Some(&snapshot));
        if let Err(violations) = invariants.check_all(&snapshot) {
            panic!("invariants violated: {violations:?}");
        }
    }
});
