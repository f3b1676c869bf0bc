//! Chaos tests: sessions over a backend that randomly refuses operations.
//!
//! Injected failures may lose writes and subscriptions, but the session's
//! invariants must hold after every step and it must never panic.

use parley_app::{LocalUser, Session, SessionConfig};
use parley_core::DbPath;
use parley_harness::{
    ChaoticBackend, InvariantRegistry, MemoryBackend, MemoryDatabase, SessionSnapshot, pump,
};
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Step {
    AddChannel(u8),
    Post(u8),
    Select(u8),
    Create(u8),
    Star(u8),
    Unstar(u8),
    PeerJoins(u8),
    PeerOnline(u8, bool),
    Reconnect,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => (0u8..5).prop_map(Step::AddChannel),
        4 => (0u8..5).prop_map(Step::Post),
        2 => (0u8..5).prop_map(Step::Select),
        1 => (0u8..5).prop_map(Step::Create),
        1 => (0u8..5).prop_map(Step::Star),
        1 => (0u8..5).prop_map(Step::Unstar),
        1 => (0u8..4).prop_map(Step::PeerJoins),
        2 => (0u8..4, any::<bool>()).prop_map(|(p, online)| Step::PeerOnline(p, online)),
        1 => Just(Step::Reconnect),
    ]
}

type ChaosSession = Session<ChaoticBackend<MemoryBackend>>;

/// Start cleanly, then turn on failure injection.
fn chaotic_session(db: &MemoryDatabase, rate: f64, seed: u64) -> ChaosSession {
    let backend = ChaoticBackend::with_seed(db.connect_client(), 0.0, seed);
    let mut session = Session::new(backend, LocalUser::new("me", "Me"), SessionConfig::default());
    session.start().unwrap();
    pump(&mut session);
    session.backend_mut().set_failure_rate(rate);
    session
}

fn peer(p: u8) -> String {
    if p == 0 { "me".to_owned() } else { format!("peer{p}") }
}

fn apply(db: &MemoryDatabase, session: &mut ChaosSession, step: &Step) {
    match step {
        Step::AddChannel(c) => {
            db.write(&DbPath::new("channels").child(format!("c{c}")), json!({ "name": format!("c{c}") }));
        },
        Step::Post(c) => {
            db.push(&DbPath::new("messages").child(format!("c{c}")), json!("hi"));
        },
        Step::Select(c) => {
            let _ = session.select_channel(&format!("c{c}"));
        },
        Step::Create(c) => {
            let _ = session.create_channel(&format!("new{c}"), "chaos");
        },
        Step::Star(c) => {
            let _ = session.star_channel(&format!("c{c}"));
        },
        Step::Unstar(c) => {
            let _ = session.unstar_channel(&format!("c{c}"));
        },
        Step::PeerJoins(p) => {
            db.write(&DbPath::new("users").child(peer(*p)), json!({ "name": peer(*p) }));
        },
        Step::PeerOnline(p, online) => {
            let marker = DbPath::new("presence").child(peer(*p));
            if *online { db.write(&marker, json!(true)) } else { db.remove(&marker) }
        },
        Step::Reconnect => {
            let handle = session.backend().inner().handle();
            db.set_connected(handle, false);
            db.set_connected(handle, true);
        },
    }
    pump(session);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_invariants_survive_backend_failures(
        seed in any::<u64>(),
        rate in 0.0f64..0.6,
        steps in prop::collection::vec(step_strategy(), 0..80),
    ) {
        let db = MemoryDatabase::new();
        let mut session = chaotic_session(&db, rate, seed);
        let invariants = InvariantRegistry::standard();
        let mut snapshot = SessionSnapshot::capture(&session, None);

        for (i, step) in steps.iter().enumerate() {
            apply(&db, &mut session, step);
            snapshot = SessionSnapshot::capture(&session, Some(&snapshot));
            invariants.assert_all(&snapshot, &format!("after step {i} ({step:?})"));
        }

        session.teardown();
        prop_assert_eq!(db.subscription_count(session.backend().inner().handle()), 0);
    }
}

#[test]
fn failed_presence_write_is_not_retried() {
    let db = MemoryDatabase::new();
    let mut session = chaotic_session(&db, 1.0, 1);
    let handle = session.backend().inner().handle();
    assert_eq!(db.value(&DbPath::new("presence/me")), Some(json!(true)));

    db.set_connected(handle, false);
    db.set_connected(handle, true);
    pump(&mut session);

    assert_eq!(db.value(&DbPath::new("presence/me")), None);
    assert!(session.backend().injected_failures() >= 1);
}

#[test]
fn refused_subscription_aborts_start() {
    let db = MemoryDatabase::new();
    let backend = ChaoticBackend::new(db.connect_client(), 1.0);
    let mut session = Session::new(backend, LocalUser::new("me", "Me"), SessionConfig::default());

    assert!(session.start().is_err());
    assert!(!session.is_started());
    assert_eq!(session.subscription_count(), 0);

    session.backend_mut().set_failure_rate(0.0);
    session.start().unwrap();
    assert_eq!(session.subscription_count(), 7);
}
