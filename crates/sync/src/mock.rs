//! In-process record store for tests and local development.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{
    errors::StoreError,
    store::{CollectionQuery, RecordStore, Subscription, SubscriptionHandle},
};

type UpdateSender = mpsc::UnboundedSender<Result<Vec<Value>, StoreError>>;

struct LiveQuery {
    id: u64,
    query: CollectionQuery,
    sender: UpdateSender,
}

struct FakeState {
    documents: HashMap<String, Vec<Value>>,
    failing_subscribes: u32,
    fail_all_subscribes: bool,
    fail_fetches: bool,
    hold_writes: bool,
    network_enabled: bool,
    network_log: Vec<bool>,
    fetch_calls: usize,
    subscribe_calls: usize,
    released: usize,
    next_id: u64,
    live: HashMap<String, LiveQuery>,
    writes: Vec<(String, Value)>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            documents: HashMap::new(),
            failing_subscribes: 0,
            fail_all_subscribes: false,
            fail_fetches: false,
            hold_writes: false,
            network_enabled: true,
            network_log: Vec::new(),
            fetch_calls: 0,
            subscribe_calls: 0,
            released: 0,
            next_id: 0,
            live: HashMap::new(),
            writes: Vec::new(),
        }
    }
}

impl FakeState {
    fn matching(&self, query: &CollectionQuery) -> Vec<Value> {
        self.documents
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| {
                        doc.get(&query.owner_field).and_then(Value::as_str) == Some(query.owner_id.as_str())
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Scriptable [`RecordStore`] keeping documents in memory.
///
/// Live subscriptions receive the current result set on subscribe and
/// whatever [`FakeStore::push_update`] sends afterwards.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

fn lock(state: &Mutex<FakeState>) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    collection: String,
    id: u64,
}

impl SubscriptionHandle for FakeHandle {
    fn unsubscribe(self: Box<Self>) {
        let mut state = lock(&self.state);
        state.released += 1;
        if state.live.get(&self.collection).is_some_and(|live| live.id == self.id) {
            state.live.remove(&self.collection);
        }
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_documents(&self, collection: &str, documents: Vec<Value>) {
        lock(&self.state)
            .documents
            .insert(collection.to_string(), documents);
    }

    /// The next `count` subscribe calls fail with an index error.
    pub fn fail_next_subscribes(&self, count: u32) {
        lock(&self.state).failing_subscribes = count;
    }

    pub fn fail_all_subscribes(&self, fail: bool) {
        lock(&self.state).fail_all_subscribes = fail;
    }

    pub fn fail_fetches(&self, fail: bool) {
        lock(&self.state).fail_fetches = fail;
    }

    /// Held writes never complete.
    pub fn hold_writes(&self, hold: bool) {
        lock(&self.state).hold_writes = hold;
    }

    /// Pushes the collection's current documents to its live listener.
    /// Returns false when nothing is listening.
    pub fn push_update(&self, collection: &str) -> bool {
        let state = lock(&self.state);
        match state.live.get(collection) {
            Some(live) => live.sender.send(Ok(state.matching(&live.query))).is_ok(),
            None => false,
        }
    }

    /// Fails the live listener for `collection`.
    pub fn break_subscription(&self, collection: &str, error: StoreError) -> bool {
        let mut state = lock(&self.state);
        match state.live.remove(collection) {
            Some(live) => live.sender.send(Err(error)).is_ok(),
            None => false,
        }
    }

    pub fn fetch_calls(&self) -> usize {
        lock(&self.state).fetch_calls
    }

    pub fn subscribe_calls(&self) -> usize {
        lock(&self.state).subscribe_calls
    }

    /// Handles released through [`SubscriptionHandle::unsubscribe`].
    pub fn released(&self) -> usize {
        lock(&self.state).released
    }

    pub fn live_subscriptions(&self) -> usize {
        lock(&self.state).live.len()
    }

    pub fn network_enabled(&self) -> bool {
        lock(&self.state).network_enabled
    }

    /// Every network toggle in order, `true` for enable.
    pub fn network_log(&self) -> Vec<bool> {
        lock(&self.state).network_log.clone()
    }

    pub fn writes(&self) -> Vec<(String, Value)> {
        lock(&self.state).writes.clone()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Value>, StoreError> {
        let mut state = lock(&self.state);
        state.fetch_calls += 1;
        if state.fail_fetches {
            return Err(StoreError::Unavailable("fetch failed".to_string()));
        }
        Ok(state.matching(query))
    }

    async fn subscribe(&self, query: &CollectionQuery) -> Result<Subscription, StoreError> {
        let mut state = lock(&self.state);
        state.subscribe_calls += 1;
        if state.fail_all_subscribes {
            return Err(StoreError::Unavailable("listener refused".to_string()));
        }
        if state.failing_subscribes > 0 {
            state.failing_subscribes -= 1;
            return Err(StoreError::IndexNotReady(query.collection.clone()));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        // Listeners deliver the current result set straight away
        let _ = sender.send(Ok(state.matching(query)));

        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(
            query.collection.clone(),
            LiveQuery {
                id,
                query: query.clone(),
                sender,
            },
        );

        Ok(Subscription {
            updates: UnboundedReceiverStream::new(receiver).boxed(),
            handle: Box::new(FakeHandle {
                state: self.state.clone(),
                collection: query.collection.clone(),
                id,
            }),
        })
    }

    async fn write(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        let held = {
            let mut state = lock(&self.state);
            state.writes.push((collection.to_string(), document.clone()));
            state.hold_writes
        };
        if held {
            std::future::pending::<()>().await;
        }

        lock(&self.state)
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn enable_network(&self) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        state.network_enabled = true;
        state.network_log.push(true);
        Ok(())
    }

    async fn disable_network(&self) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        state.network_enabled = false;
        state.network_log.push(false);
        Ok(())
    }
}
