use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use futures::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::{self, FuturesUnordered},
};
use serde::Serialize;
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{Instant, sleep_until},
};
use tokio_stream::StreamMap;
use tracing::{debug, info, warn};

use crate::{
    config::SyncConfig,
    document::{DocumentShape, SyncedDocument},
    errors::{StoreError, SyncError, SyncResult},
    registry::SubscriptionRegistry,
    session::{FailureStep, RetryPolicy, SessionMachine, SessionState},
    store::{CollectionQuery, RecordStore, Subscription, UpdateStream},
};

const COMMAND_BUFFER: usize = 32;

/// The manual action a notice offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    Refetch,
    ResetConnection,
}

/// Non-fatal condition shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Offline,
    /// Live updates stopped; the collection refreshes on the poll interval.
    Degraded { collection: String },
    StoreUnavailable { collection: String, message: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Offline => "You appear to be offline. Changes will sync when you reconnect.".to_string(),
            Notice::Degraded { collection } => {
                format!("Live updates for {} are unavailable. Data refreshes every minute.", collection)
            }
            Notice::StoreUnavailable { collection, .. } => {
                format!("Could not load {}. Try again in a moment.", collection)
            }
        }
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            Notice::Degraded { .. } => Remediation::ResetConnection,
            Notice::Offline | Notice::StoreUnavailable { .. } => Remediation::Refetch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    #[serde(flatten)]
    pub state: SessionState,
    /// True once live updates gave up and polling is the only source
    pub polling: bool,
    #[serde(skip)]
    pub documents: Vec<SyncedDocument>,
}

impl Default for CollectionView {
    fn default() -> Self {
        Self {
            state: SessionState::Unsubscribed,
            polling: false,
            documents: Vec::new(),
        }
    }
}

/// Everything the UI renders from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub user_id: Option<String>,
    pub online: bool,
    pub collections: BTreeMap<String, CollectionView>,
    pub notices: Vec<Notice>,
}

impl Projection {
    pub fn documents(&self, collection: &str) -> &[SyncedDocument] {
        self.collections
            .get(collection)
            .map(|view| view.documents.as_slice())
            .unwrap_or_default()
    }

    pub fn state(&self, collection: &str) -> Option<SessionState> {
        self.collections.get(collection).map(|view| view.state)
    }
}

enum Command {
    Mount {
        user_id: String,
        done: oneshot::Sender<()>,
    },
    Teardown {
        done: oneshot::Sender<()>,
    },
    ResetConnection {
        done: oneshot::Sender<()>,
    },
    Refetch {
        done: oneshot::Sender<()>,
    },
    Write {
        collection: String,
        document: Value,
        reply: oneshot::Sender<SyncResult<()>>,
    },
}

enum Completion {
    Fetched {
        generation: u64,
        collection: String,
        result: Result<Vec<Value>, StoreError>,
    },
    Subscribed {
        generation: u64,
        collection: String,
        result: Result<Subscription, StoreError>,
    },
    Written {
        id: u64,
        result: Result<(), StoreError>,
    },
}

enum Timer {
    Retry(String),
    Poll,
    ResumeNetwork,
}

/// Cloneable front end to a running sync manager. The manager tears down
/// and stops once every handle is dropped.
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    projection: watch::Receiver<Projection>,
}

impl SyncHandle {
    async fn request(&self, command: impl FnOnce(oneshot::Sender<()>) -> Command) -> SyncResult<()> {
        let (done, ack) = oneshot::channel();
        self.commands
            .send(command(done))
            .await
            .map_err(|_| SyncError::NotInitialized)?;
        ack.await.map_err(|_| SyncError::NotInitialized)
    }

    /// Starts syncing for a user, tearing down any previous user first.
    pub async fn mount(&self, user_id: impl Into<String>) -> SyncResult<()> {
        let user_id = user_id.into();
        self.request(|done| Command::Mount { user_id, done }).await
    }

    /// Releases every subscription and stops all timers. Safe to repeat.
    pub async fn teardown(&self) -> SyncResult<()> {
        self.request(|done| Command::Teardown { done }).await
    }

    /// Disables the store network, pauses, re-enables it and re-arms any
    /// subscription that was retrying or had given up.
    pub async fn reset_connection(&self) -> SyncResult<()> {
        self.request(|done| Command::ResetConnection { done }).await
    }

    pub async fn refetch(&self) -> SyncResult<()> {
        self.request(|done| Command::Refetch { done }).await
    }

    /// Writes a document for the mounted user. Fails with
    /// [`SyncError::Offline`] if connectivity drops before the store answers.
    pub async fn write(&self, collection: &str, document: Value) -> SyncResult<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Write {
                collection: collection.to_string(),
                document,
                reply,
            })
            .await
            .map_err(|_| SyncError::NotInitialized)?;
        response.await.map_err(|_| SyncError::NotInitialized)?
    }

    pub fn projection(&self) -> watch::Receiver<Projection> {
        self.projection.clone()
    }

    pub fn snapshot(&self) -> Projection {
        self.projection.borrow().clone()
    }
}

pub struct SyncManager {
    store: Arc<dyn RecordStore>,
    config: SyncConfig,
    shape: DocumentShape,
    collections: Vec<String>,
    projection: watch::Sender<Projection>,
    view: Projection,
    user_id: Option<String>,
    generation: u64,
    sessions: HashMap<String, SessionMachine>,
    registry: SubscriptionRegistry,
    updates: StreamMap<String, UpdateStream>,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
    retry_at: HashMap<String, Instant>,
    next_poll: Option<Instant>,
    resume_at: Option<Instant>,
    rearm_on_resume: bool,
    online: bool,
    writes: HashMap<u64, oneshot::Sender<SyncResult<()>>>,
    next_write_id: u64,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl SyncManager {
    /// Spawns the manager task on the current runtime.
    ///
    /// `reachability` carries the local network signal; `true` means online.
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        config: SyncConfig,
        collections: Vec<String>,
        reachability: watch::Receiver<bool>,
    ) -> SyncHandle {
        let online = *reachability.borrow();
        let mut view = Projection {
            online,
            ..Projection::default()
        };
        if !online {
            view.notices.push(Notice::Offline);
        }
        let (projection, projection_rx) = watch::channel(view.clone());
        let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER);

        let shape = DocumentShape {
            owner_field: config.owner_field.clone(),
            timestamp_field: config.timestamp_field.clone(),
        };
        let manager = Self {
            store,
            config,
            shape,
            collections,
            projection,
            view,
            user_id: None,
            generation: 0,
            sessions: HashMap::new(),
            registry: SubscriptionRegistry::new(),
            updates: StreamMap::new(),
            pending: FuturesUnordered::new(),
            retry_at: HashMap::new(),
            next_poll: None,
            resume_at: None,
            rearm_on_resume: false,
            online,
            writes: HashMap::new(),
            next_write_id: 0,
        };
        tokio::spawn(manager.run(commands_rx, reachability));

        SyncHandle {
            commands,
            projection: projection_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut reachability: watch::Receiver<bool>) {
        let mut reachability_open = true;
        if !self.online {
            warn!("Starting offline, disabling store network");
            if let Err(e) = self.store.disable_network().await {
                warn!(error = %e, "Failed to disable store network");
            }
        }

        loop {
            let (deadline, timer) = self.next_timer().unzip();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        self.teardown();
                        break;
                    }
                },
                Some((collection, item)) = self.updates.next(), if !self.updates.is_empty() => {
                    self.handle_update(collection, item).await;
                }
                Some(completion) = self.pending.next(), if !self.pending.is_empty() => {
                    self.handle_completion(completion).await;
                }
                changed = reachability.changed(), if reachability_open => match changed {
                    Ok(()) => {
                        let online = *reachability.borrow_and_update();
                        self.set_online(online).await;
                    }
                    Err(_) => reachability_open = false,
                },
                _ = sleep_until_opt(deadline) => {
                    if let Some(timer) = timer {
                        self.handle_timer(timer).await;
                    }
                }
            }

            self.publish();
        }
        debug!("Sync manager stopped");
    }

    fn next_timer(&self) -> Option<(Instant, Timer)> {
        let retry = self
            .retry_at
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(collection, at)| (*at, Timer::Retry(collection.clone())));
        let poll = self.next_poll.map(|at| (at, Timer::Poll));
        let resume = self.resume_at.map(|at| (at, Timer::ResumeNetwork));

        [retry, poll, resume]
            .into_iter()
            .flatten()
            .min_by_key(|(at, _)| *at)
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Mount { user_id, done } => {
                self.mount(user_id);
                let _ = done.send(());
            }
            Command::Teardown { done } => {
                self.teardown();
                let _ = done.send(());
            }
            Command::ResetConnection { done } => {
                self.begin_reset(true).await;
                let _ = done.send(());
            }
            Command::Refetch { done } => {
                if self.online {
                    self.refetch_all();
                } else {
                    debug!("Skipping refetch while offline");
                }
                let _ = done.send(());
            }
            Command::Write {
                collection,
                document,
                reply,
            } => self.write(collection, document, reply),
        }
    }

    fn session_mut(&mut self, collection: &str) -> &mut SessionMachine {
        let policy = RetryPolicy {
            backoff: self.config.retry_backoff,
            max_attempts: self.config.max_attempts,
            reset_after_failures: self.config.reset_after_failures,
        };
        self.sessions
            .entry(collection.to_string())
            .or_insert_with(|| SessionMachine::new(policy))
    }

    fn query(&self, collection: &str) -> Option<CollectionQuery> {
        self.user_id.as_ref().map(|user_id| CollectionQuery {
            collection: collection.to_string(),
            owner_field: self.config.owner_field.clone(),
            owner_id: user_id.clone(),
            order_by: self.config.timestamp_field.clone(),
            descending: true,
        })
    }

    fn mount(&mut self, user_id: String) {
        if self.user_id.is_some() {
            self.teardown();
        }
        self.generation += 1;
        info!(%user_id, generation = self.generation, "Mounting sync session");

        self.user_id = Some(user_id.clone());
        self.view.user_id = Some(user_id);

        for collection in self.collections.clone() {
            self.view
                .collections
                .insert(collection.clone(), CollectionView::default());
            // The one-shot fetch fills the view before the listener is up
            self.spawn_fetch(&collection);
            if self.session_mut(&collection).start() {
                self.spawn_subscribe(&collection);
            }
        }
        self.next_poll = Some(Instant::now() + self.config.poll_interval);
    }

    fn teardown(&mut self) {
        let Some(user_id) = self.user_id.take() else {
            return;
        };
        // Anything still in flight for this mount becomes a no-op
        self.generation += 1;

        let released = self.registry.release_all();
        let open: Vec<String> = self.updates.keys().cloned().collect();
        for collection in open {
            self.updates.remove(&collection);
        }
        for session in self.sessions.values_mut() {
            session.stop();
        }
        self.retry_at.clear();
        self.next_poll = None;

        self.view.user_id = None;
        self.view.collections.clear();
        self.view.notices.retain(|notice| *notice == Notice::Offline);
        info!(%user_id, released, "Sync session torn down");
    }

    fn spawn_fetch(&mut self, collection: &str) {
        let Some(query) = self.query(collection) else {
            return;
        };
        let store = self.store.clone();
        let generation = self.generation;
        let collection = collection.to_string();
        self.pending.push(
            async move {
                let result = store.fetch(&query).await;
                Completion::Fetched {
                    generation,
                    collection,
                    result,
                }
            }
            .boxed(),
        );
    }

    fn spawn_subscribe(&mut self, collection: &str) {
        let Some(query) = self.query(collection) else {
            return;
        };
        debug!(collection, "Subscribing");
        let store = self.store.clone();
        let generation = self.generation;
        let collection = collection.to_string();
        self.pending.push(
            async move {
                let result = store.subscribe(&query).await;
                Completion::Subscribed {
                    generation,
                    collection,
                    result,
                }
            }
            .boxed(),
        );
    }

    fn refetch_all(&mut self) {
        for collection in self.collections.clone() {
            self.spawn_fetch(&collection);
        }
    }

    async fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched {
                generation,
                collection,
                result,
            } => {
                if generation != self.generation {
                    debug!(%collection, "Ignoring fetch from a previous mount");
                    return;
                }
                match result {
                    Ok(values) => {
                        self.clear_notice(|n| matches!(n, Notice::StoreUnavailable { collection: c, .. } if *c == collection));
                        self.apply_documents(&collection, values);
                    }
                    Err(e) => {
                        warn!(%collection, error = %e, "Fetch failed");
                        self.clear_notice(|n| matches!(n, Notice::StoreUnavailable { collection: c, .. } if *c == collection));
                        self.view.notices.push(Notice::StoreUnavailable {
                            collection,
                            message: e.to_string(),
                        });
                    }
                }
            }
            Completion::Subscribed {
                generation,
                collection,
                result,
            } => {
                if generation != self.generation {
                    if let Ok(subscription) = result {
                        debug!(%collection, "Releasing subscription from a previous mount");
                        subscription.handle.unsubscribe();
                    }
                    return;
                }
                match result {
                    Ok(subscription) => {
                        self.registry.insert(&collection, subscription.handle);
                        // A listener that ends on its own counts as a failure
                        let updates = subscription
                            .updates
                            .chain(stream::once(async { Err(StoreError::Closed) }))
                            .boxed();
                        self.updates.insert(collection.clone(), updates);
                        self.session_mut(&collection).on_subscribed();
                        info!(%collection, "Live subscription established");
                    }
                    Err(e) => self.on_subscription_failure(collection, e).await,
                }
            }
            Completion::Written { id, result } => {
                if let Some(reply) = self.writes.remove(&id) {
                    let _ = reply.send(result.map_err(SyncError::from));
                }
            }
        }
    }

    async fn handle_update(&mut self, collection: String, item: Result<Vec<Value>, StoreError>) {
        match item {
            Ok(values) => {
                self.apply_documents(&collection, values);
                self.session_mut(&collection).on_update();
            }
            Err(e) => {
                self.updates.remove(&collection);
                self.registry.release(&collection);
                self.on_subscription_failure(collection, e).await;
            }
        }
    }

    async fn on_subscription_failure(&mut self, collection: String, error: StoreError) {
        warn!(%collection, error = %error, transient = error.is_transient(), "Live subscription failed");

        match self.session_mut(&collection).on_failure() {
            FailureStep::Retry {
                attempt,
                delay,
                reset_connection,
            } => {
                info!(%collection, attempt, delay_secs = delay.as_secs(), "Scheduling subscription retry");
                self.retry_at.insert(collection, Instant::now() + delay);
                if reset_connection {
                    self.begin_reset(false).await;
                }
            }
            FailureStep::FallBack => {
                warn!(%collection, "Subscription retries exhausted, falling back to polling");
                if let Some(view) = self.view.collections.get_mut(&collection) {
                    view.polling = true;
                }
                self.view.notices.push(Notice::Degraded { collection });
            }
            FailureStep::Ignore => {}
        }
    }

    async fn begin_reset(&mut self, rearm: bool) {
        if self.resume_at.is_some() {
            self.rearm_on_resume |= rearm;
            return;
        }
        info!("Resetting store connection");
        if let Err(e) = self.store.disable_network().await {
            warn!(error = %e, "Failed to disable store network");
        }
        self.resume_at = Some(Instant::now() + self.config.reset_pause);
        self.rearm_on_resume = rearm;
    }

    async fn handle_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Retry(collection) => {
                self.retry_at.remove(&collection);
                if !self.online {
                    // Stays Retrying; reconnecting picks it up
                    debug!(%collection, "Deferring subscription retry while offline");
                    return;
                }
                if self.session_mut(&collection).on_retry_timer() {
                    self.spawn_subscribe(&collection);
                }
            }
            Timer::Poll => {
                self.next_poll = Some(Instant::now() + self.config.poll_interval);
                if self.online {
                    debug!("Reconciliation fetch");
                    self.refetch_all();
                }
            }
            Timer::ResumeNetwork => {
                self.resume_at = None;
                if self.online {
                    if let Err(e) = self.store.enable_network().await {
                        warn!(error = %e, "Failed to re-enable store network");
                    }
                }
                if std::mem::take(&mut self.rearm_on_resume) {
                    self.rearm_sessions();
                }
            }
        }
    }

    fn rearm_sessions(&mut self) {
        if self.user_id.is_none() {
            return;
        }
        for collection in self.collections.clone() {
            if self.session_mut(&collection).rearm() {
                info!(%collection, "Re-arming live subscription");
                self.retry_at.remove(&collection);
                if let Some(view) = self.view.collections.get_mut(&collection) {
                    view.polling = false;
                }
                self.clear_notice(|n| matches!(n, Notice::Degraded { collection: c } if *c == collection));
                self.spawn_subscribe(&collection);
            }
        }
    }

    /// Restarts sessions whose retries were waiting out an outage, with a
    /// fresh budget. Exhausted sessions stay on polling.
    fn resume_retries(&mut self) {
        for collection in self.collections.clone() {
            let session = self.session_mut(&collection);
            if matches!(session.state(), SessionState::Retrying { .. }) && session.rearm() {
                info!(%collection, "Resuming live subscription after reconnect");
                self.retry_at.remove(&collection);
                self.spawn_subscribe(&collection);
            }
        }
    }

    async fn set_online(&mut self, online: bool) {
        if online == self.online {
            return;
        }
        self.online = online;
        self.view.online = online;

        if online {
            info!("Network reachable, re-enabling store network");
            self.clear_notice(|n| *n == Notice::Offline);
            if self.resume_at.is_none() {
                if let Err(e) = self.store.enable_network().await {
                    warn!(error = %e, "Failed to enable store network");
                }
            }
            if self.user_id.is_some() {
                self.refetch_all();
                self.resume_retries();
            }
        } else {
            warn!("Network unreachable, disabling store network");
            if let Err(e) = self.store.disable_network().await {
                warn!(error = %e, "Failed to disable store network");
            }
            self.view.notices.push(Notice::Offline);
            for (_, reply) in self.writes.drain() {
                let _ = reply.send(Err(SyncError::Offline));
            }
        }
    }

    fn write(&mut self, collection: String, mut document: Value, reply: oneshot::Sender<SyncResult<()>>) {
        let Some(user_id) = self.user_id.clone() else {
            let _ = reply.send(Err(SyncError::NotInitialized));
            return;
        };
        if !self.online {
            let _ = reply.send(Err(SyncError::Offline));
            return;
        }
        let Value::Object(fields) = &mut document else {
            let _ = reply.send(Err(SyncError::Data("document is not an object".to_string())));
            return;
        };
        fields
            .entry(self.config.owner_field.clone())
            .or_insert(Value::String(user_id));

        let id = self.next_write_id;
        self.next_write_id += 1;
        self.writes.insert(id, reply);

        let store = self.store.clone();
        self.pending.push(
            async move {
                let result = store.write(&collection, document).await;
                Completion::Written { id, result }
            }
            .boxed(),
        );
    }

    /// Replaces a collection's documents. Fetches and live updates both land
    /// here, so whichever arrives last wins.
    fn apply_documents(&mut self, collection: &str, values: Vec<Value>) {
        let Some(view) = self.view.collections.get_mut(collection) else {
            return;
        };
        let mut documents: Vec<SyncedDocument> = values
            .into_iter()
            .filter_map(|value| match SyncedDocument::decode(value, &self.shape) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!(collection, error = %e, "Skipping invalid document");
                    None
                }
            })
            .collect();
        documents.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view.documents = documents;
    }

    fn clear_notice(&mut self, matches: impl Fn(&Notice) -> bool) {
        self.view.notices.retain(|notice| !matches(notice));
    }

    fn publish(&mut self) {
        for (collection, view) in self.view.collections.iter_mut() {
            if let Some(session) = self.sessions.get(collection) {
                view.state = session.state();
            }
        }
        let view = &self.view;
        self.projection.send_if_modified(|current| {
            if current == view {
                return false;
            }
            *current = view.clone();
            true
        });
    }
}
