//! In-memory realtime database.
//!
//! [`MemoryDatabase`] holds a JSON tree shared by any number of simulated
//! clients. Each client talks to it through a [`MemoryBackend`], which
//! implements [`Backend`] and queues subscription events until polled.
//!
//! Event semantics follow the hosted service the client targets:
//! - subscribing replays current state (one `EntryAdded` per existing child,
//!   the current value for `ValueChanged`, the connection flag for
//!   `ConnectionStateChanged`)
//! - every mutation diffs the tree before and after, per subscription
//! - writing `null` deletes, and emptied parents are pruned
//! - disconnect cleanups registered by a client run when it goes offline

use std::sync::{Arc, Mutex, MutexGuard};

use parley_app::EventSource;
use parley_core::{
    Backend, BackendError, BackendEvent, CleanupAction, DbPath, EventKind, Snapshot,
    SubscriptionId,
};
use serde_json::{Map, Value};

/// Handle of a simulated client.
pub type ClientHandle = usize;

/// Shared in-memory database.
///
/// Clones share state. All state sits behind an `Arc<Mutex<>>` and accessors
/// use `lock().expect()`, which only panics if a test thread panicked while
/// holding the lock.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<Mutex<DatabaseInner>>,
}

#[derive(Default)]
struct DatabaseInner {
    root: Value,
    clients: Vec<ClientState>,
    next_push: u64,
    next_subscription: u64,
}

struct ClientState {
    connected: bool,
    subscriptions: Vec<Subscription>,
    cleanups: Vec<(DbPath, CleanupAction)>,
    queue: Vec<BackendEvent>,
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    path: DbPath,
    kind: EventKind,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new client. Clients start connected.
    pub fn connect_client(&self) -> MemoryBackend {
        let mut inner = self.lock();
        inner.clients.push(ClientState {
            connected: true,
            subscriptions: Vec::new(),
            cleanups: Vec::new(),
            queue: Vec::new(),
        });
        MemoryBackend { db: self.clone(), client: inner.clients.len() - 1 }
    }

    /// Value stored at `path`, if any.
    pub fn value(&self, path: &DbPath) -> Option<Value> {
        lookup(&self.lock().root, path).cloned()
    }

    /// Write `value` at `path` with administrative rights.
    pub fn write(&self, path: &DbPath, value: Value) {
        self.lock().mutate(|root| set(root, path, value));
    }

    /// Remove `path` with administrative rights.
    pub fn remove(&self, path: &DbPath) {
        self.lock().mutate(|root| remove(root, path));
    }

    /// Append `value` under `parent` with a fresh push key. Returns the key.
    pub fn push(&self, parent: &DbPath, value: Value) -> String {
        let mut inner = self.lock();
        let key = inner.next_push_key();
        let path = parent.child(&key);
        inner.mutate(|root| set(root, &path, value));
        key
    }

    /// Change a client's connection state.
    ///
    /// Going offline runs the client's disconnect cleanups first. Writes from
    /// an offline client are refused.
    pub fn set_connected(&self, client: ClientHandle, connected: bool) {
        let mut inner = self.lock();
        let Some(state) = inner.clients.get_mut(client) else {
            return;
        };
        if state.connected == connected {
            return;
        }
        state.connected = connected;
        let cleanups = if connected { Vec::new() } else { std::mem::take(&mut state.cleanups) };

        for (path, action) in cleanups {
            tracing::debug!(client, %path, "running disconnect cleanup");
            match action {
                CleanupAction::Remove => inner.mutate(|root| remove(root, &path)),
                CleanupAction::Set(value) => inner.mutate(|root| set(root, &path, value)),
            }
        }

        inner.notify_connection(client);
    }

    /// True if the client is online.
    pub fn is_connected(&self, client: ClientHandle) -> bool {
        self.lock().clients.get(client).is_some_and(|c| c.connected)
    }

    /// Number of live subscriptions held by a client.
    pub fn subscription_count(&self, client: ClientHandle) -> usize {
        self.lock().clients.get(client).map_or(0, |c| c.subscriptions.len())
    }

    /// Number of events waiting for a client.
    pub fn pending_events(&self, client: ClientHandle) -> usize {
        self.lock().clients.get(client).map_or(0, |c| c.queue.len())
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, DatabaseInner> {
        self.inner.lock().expect("memory database mutex poisoned")
    }
}

impl DatabaseInner {
    fn next_push_key(&mut self) -> String {
        self.next_push += 1;
        format!("-k{:010}", self.next_push)
    }

    fn mutate(&mut self, change: impl FnOnce(&mut Value)) {
        let before = self.root.clone();
        change(&mut self.root);
        if before == self.root {
            return;
        }

        for client in &mut self.clients {
            for sub in &client.subscriptions {
                let events = diff(sub, lookup(&before, &sub.path), lookup(&self.root, &sub.path));
                client.queue.extend(events);
            }
        }
    }

    fn notify_connection(&mut self, client: ClientHandle) {
        let Some(state) = self.clients.get_mut(client) else {
            return;
        };
        let connected = state.connected;
        let events: Vec<_> = state
            .subscriptions
            .iter()
            .filter(|s| s.kind == EventKind::ConnectionStateChanged)
            .map(|s| connection_event(s, connected))
            .collect();
        state.queue.extend(events);
    }

    fn client(&mut self, client: ClientHandle) -> Result<&mut ClientState, BackendError> {
        self.clients.get_mut(client).ok_or(BackendError::Disconnected)
    }

    fn online_client(&mut self, client: ClientHandle) -> Result<&mut ClientState, BackendError> {
        let state = self.client(client)?;
        if state.connected { Ok(state) } else { Err(BackendError::Disconnected) }
    }
}

/// One client's view of a [`MemoryDatabase`].
#[derive(Clone)]
pub struct MemoryBackend {
    db: MemoryDatabase,
    client: ClientHandle,
}

impl MemoryBackend {
    /// Handle of this client.
    pub fn handle(&self) -> ClientHandle {
        self.client
    }

    /// The shared database.
    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }
}

impl Backend for MemoryBackend {
    fn subscribe(&mut self, path: &DbPath, kind: EventKind) -> Result<SubscriptionId, BackendError> {
        let mut inner = self.db.lock();
        inner.next_subscription += 1;
        let sub = Subscription { id: SubscriptionId(inner.next_subscription), path: path.clone(), kind };

        let replay = match kind {
            EventKind::EntryAdded => diff(&sub, None, lookup(&inner.root, path)),
            EventKind::ValueChanged => {
                let value = lookup(&inner.root, path).cloned().unwrap_or(Value::Null);
                vec![value_event(&sub, value)]
            },
            EventKind::EntryRemoved => Vec::new(),
            EventKind::ConnectionStateChanged => {
                let connected = inner.client(self.client)?.connected;
                vec![connection_event(&sub, connected)]
            },
        };

        let state = inner.client(self.client)?;
        state.queue.extend(replay);
        state.subscriptions.push(sub.clone());
        Ok(sub.id)
    }

    fn unsubscribe_all(&mut self, path: &DbPath) {
        if let Ok(state) = self.db.lock().client(self.client) {
            state.subscriptions.retain(|s| s.path != *path);
        }
    }

    fn write(&mut self, path: &DbPath, value: Value) -> Result<(), BackendError> {
        let mut inner = self.db.lock();
        inner.online_client(self.client)?;
        inner.mutate(|root| set(root, path, value));
        Ok(())
    }

    fn remove(&mut self, path: &DbPath) -> Result<(), BackendError> {
        let mut inner = self.db.lock();
        inner.online_client(self.client)?;
        inner.mutate(|root| remove(root, path));
        Ok(())
    }

    fn register_disconnect_cleanup(
        &mut self,
        path: &DbPath,
        action: CleanupAction,
    ) -> Result<(), BackendError> {
        let mut inner = self.db.lock();
        inner.online_client(self.client)?.cleanups.push((path.clone(), action));
        Ok(())
    }

    fn generate_key(&mut self, _parent: &DbPath) -> String {
        self.db.lock().next_push_key()
    }
}

impl EventSource for MemoryBackend {
    fn poll_events(&mut self) -> Vec<BackendEvent> {
        self.db.lock().client(self.client).map(|s| std::mem::take(&mut s.queue)).unwrap_or_default()
    }
}

/// Events a subscription observes when its node goes from `before` to `after`.
fn diff(sub: &Subscription, before: Option<&Value>, after: Option<&Value>) -> Vec<BackendEvent> {
    match sub.kind {
        EventKind::EntryAdded => children(after)
            .filter(|(key, _)| child(before, key).is_none())
            .map(|(key, value)| event(sub, key, value.clone()))
            .collect(),
        EventKind::EntryRemoved => children(before)
            .filter(|(key, _)| child(after, key).is_none())
            .map(|(key, value)| event(sub, key, value.clone()))
            .collect(),
        EventKind::ValueChanged if before != after => {
            vec![value_event(sub, after.cloned().unwrap_or(Value::Null))]
        },
        EventKind::ValueChanged | EventKind::ConnectionStateChanged => Vec::new(),
    }
}

fn event(sub: &Subscription, key: &str, value: Value) -> BackendEvent {
    BackendEvent { subscription: sub.id, kind: sub.kind, snapshot: Snapshot::new(key, value) }
}

fn value_event(sub: &Subscription, value: Value) -> BackendEvent {
    event(sub, sub.path.key().unwrap_or_default(), value)
}

fn connection_event(sub: &Subscription, connected: bool) -> BackendEvent {
    value_event(sub, Value::Bool(connected))
}

fn children(node: Option<&Value>) -> impl Iterator<Item = (&str, &Value)> {
    node.and_then(Value::as_object).into_iter().flatten().map(|(k, v)| (k.as_str(), v))
}

fn child<'a>(node: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    node.and_then(Value::as_object).and_then(|m| m.get(key))
}

fn lookup<'a>(root: &'a Value, path: &DbPath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    (!node.is_null()).then_some(node)
}

fn set(root: &mut Value, path: &DbPath, value: Value) {
    if value.is_null() {
        remove(root, path);
        return;
    }

    let mut node = root;
    for segment in path.segments() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        node = map.entry(segment.clone()).or_insert(Value::Null);
    }
    *node = value;
}

fn remove(root: &mut Value, path: &DbPath) {
    let Some((last, ancestors)) = path.segments().split_last() else {
        *root = Value::Null;
        return;
    };
    remove_at(root, ancestors, last);
}

/// Remove `key` below `ancestors`, pruning objects left empty.
fn remove_at(node: &mut Value, ancestors: &[String], key: &str) {
    let Value::Object(map) = node else {
        return;
    };
    match ancestors.split_first() {
        None => {
            map.remove(key);
        },
        Some((head, rest)) => {
            if let Some(next) = map.get_mut(head) {
                remove_at(next, rest, key);
                if next.as_object().is_some_and(Map::is_empty) {
                    map.remove(head);
                }
            }
        },
    }
}
