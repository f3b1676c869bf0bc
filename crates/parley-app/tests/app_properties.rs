//! Property-based tests for the Session state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.

use std::collections::BTreeSet;

use parley_app::{LocalUser, Session, SessionConfig};
use parley_core::{DbPath, PresenceStatus};
use parley_harness::{InvariantRegistry, MemoryBackend, MemoryDatabase, SessionSnapshot, pump};
use proptest::prelude::*;
use serde_json::json;

const PEERS: [&str; 4] = ["me", "ada", "bob", "cy"];

#[derive(Debug, Clone)]
enum Event {
    Directory(usize),
    MarkerSet(usize),
    MarkerCleared(usize),
    Channel(u8),
    Post(u8),
    Select(u8),
    DirectMessage(usize),
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        2 => (0..PEERS.len()).prop_map(Event::Directory),
        3 => (0..PEERS.len()).prop_map(Event::MarkerSet),
        3 => (0..PEERS.len()).prop_map(Event::MarkerCleared),
        1 => (0u8..3).prop_map(Event::Channel),
        3 => (0u8..3).prop_map(Event::Post),
        2 => (0u8..3).prop_map(Event::Select),
        1 => (0..PEERS.len()).prop_map(Event::DirectMessage),
    ]
}

fn started(db: &MemoryDatabase) -> Session<MemoryBackend> {
    let mut session =
        Session::new(db.connect_client(), LocalUser::new("me", "Me"), SessionConfig::default());
    session.start().unwrap();
    pump(&mut session);
    session
}

proptest! {
    /// Session invariants hold under arbitrary event sequences.
    #[test]
    fn prop_session_invariants_hold(events in prop::collection::vec(event_strategy(), 0..60)) {
        let db = MemoryDatabase::new();
        let mut session = started(&db);
        let invariants = InvariantRegistry::standard();
        let mut snapshot = SessionSnapshot::capture(&session, None);

        for event in &events {
            match *event {
                Event::Directory(p) => {
                    db.write(&DbPath::new("users").child(PEERS[p]), json!({ "name": PEERS[p] }));
                },
                Event::MarkerSet(p) => db.write(&DbPath::new("presence").child(PEERS[p]), json!(true)),
                Event::MarkerCleared(p) => db.remove(&DbPath::new("presence").child(PEERS[p])),
                Event::Channel(c) => {
                    db.write(&DbPath::new("channels").child(format!("c{c}")), json!({ "name": "c" }));
                },
                Event::Post(c) => {
                    db.push(&DbPath::new("messages").child(format!("c{c}")), json!("m"));
                },
                Event::Select(c) => {
                    let _ = session.select_channel(&format!("c{c}"));
                },
                Event::DirectMessage(p) => {
                    let _ = session.select_direct_peer(PEERS[p]);
                },
            }
            pump(&mut session);

            snapshot = SessionSnapshot::capture(&session, Some(&snapshot));
            invariants.assert_all(&snapshot, &format!("after {event:?}"));
        }
    }

    /// A listed peer is online exactly while its marker exists.
    ///
    /// Markers that arrive before the directory entry are dropped, so this
    /// runs with the directory populated up front.
    #[test]
    fn prop_status_tracks_marker(events in prop::collection::vec((1..PEERS.len(), any::<bool>()), 0..40)) {
        let db = MemoryDatabase::new();
        for peer in PEERS {
            db.write(&DbPath::new("users").child(peer), json!({ "name": peer }));
        }
        let mut session = started(&db);
        let mut online = BTreeSet::new();

        for (p, set) in events {
            let marker = DbPath::new("presence").child(PEERS[p]);
            if set {
                db.write(&marker, json!(true));
                online.insert(p);
            } else {
                db.remove(&marker);
                online.remove(&p);
            }
            pump(&mut session);

            for (i, peer) in PEERS.iter().enumerate().skip(1) {
                let expected =
                    if online.contains(&i) { PresenceStatus::Online } else { PresenceStatus::Offline };
                prop_assert_eq!(session.peer_status(peer), expected);
            }
        }
        prop_assert_eq!(session.peers().len(), PEERS.len() - 1);
    }
}
