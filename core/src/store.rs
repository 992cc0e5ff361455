//! Observable collection state and the actions that mutate it.
//!
//! # Design
//! `ResourceStore` owns a `CollectionState` behind a mutex that is only held
//! while applying a change, never across a network call. Every action is a
//! single blocking chain: mark the state, call the client, check that the
//! store is still alive, apply the result, notify observers.
//!
//! Successful mutations are followed by a full `load()`; records are never
//! patched in place. A failed `load()` keeps whatever records were shown
//! before.
//!
//! The store does not serialize actions. Two overlapping submissions both
//! reach the server, and when two mutations run concurrently their refreshes
//! race: whichever `list` response is applied last wins. Callers that need
//! at-most-one submission should gate on `ActionState::Pending`.
//!
//! Observers run outside the state lock, so concurrent actions may deliver
//! their snapshots out of order. Every change bumps `CollectionState::version`;
//! an observer that cares keeps the highest version it has seen and ignores
//! older snapshots.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::error::{ClientError, StoreError};
use crate::resource::{Resource, Validate};
use crate::transport::{Transport, UreqTransport};
use crate::types::Post;

/// Progress of the most recent `load()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Display message of the error that failed the load.
    Failed(String),
}

/// Progress of the most recent create/update/remove.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Committed,
    Failed(String),
}

/// Outcome of the caller's confirmation prompt before a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// What a UI renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionState<R> {
    /// Records in server order.
    pub records: Vec<R>,
    pub status: Status,
    /// Id of the record being edited. Resolve through `editing()`; the id may
    /// not be present in `records`.
    pub editing_id: Option<String>,
    pub action: ActionState,
    /// Incremented on every applied change; orders snapshots.
    pub version: u64,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: Status::Idle,
            editing_id: None,
            action: ActionState::Idle,
            version: 0,
        }
    }
}

impl<R: Resource> CollectionState<R> {
    pub fn find(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The record being edited, if its id still resolves.
    pub fn editing(&self) -> Option<&R> {
        self.editing_id.as_deref().and_then(|id| self.find(id))
    }

    pub fn is_pending(&self) -> bool {
        self.action == ActionState::Pending
    }
}

/// Callback invoked with a fresh snapshot after every state change.
pub type Observer<R> = Arc<dyn Fn(&CollectionState<R>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Store over the posts collection.
pub type PostStore<T = UreqTransport> = ResourceStore<Post, T>;

pub struct ResourceStore<R: Resource, T> {
    client: ResourceClient<R, T>,
    state: Mutex<CollectionState<R>>,
    observers: Mutex<Vec<(SubscriptionId, Observer<R>)>>,
    next_subscription: AtomicU64,
    live: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: Resource, T: Transport> ResourceStore<R, T> {
    pub fn new(client: ResourceClient<R, T>) -> Self {
        Self {
            client,
            state: Mutex::new(CollectionState::default()),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            live: AtomicBool::new(true),
        }
    }

    pub fn client(&self) -> &ResourceClient<R, T> {
        &self.client
    }

    pub fn snapshot(&self) -> CollectionState<R> {
        lock(&self.state).clone()
    }

    pub fn records(&self) -> Vec<R> {
        lock(&self.state).records.clone()
    }

    // ---------------------------------------------------------------------
    // Observers and lifecycle
    // ---------------------------------------------------------------------

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&CollectionState<R>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let observer: Observer<R> = Arc::new(observer);
        lock(&self.observers).push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Tear the store down. Actions in flight discard their results; later
    /// actions fail with `StoreError::Disposed`. Observers are dropped.
    pub fn dispose(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            lock(&self.observers).clear();
            debug!("store disposed");
        }
    }

    fn ensure_live(&self) -> Result<(), StoreError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(StoreError::Disposed)
        }
    }

    /// Apply `change` and notify observers, unless the store was disposed.
    fn apply(&self, change: impl FnOnce(&mut CollectionState<R>)) {
        if !self.is_live() {
            return;
        }
        let snapshot = {
            let mut state = lock(&self.state);
            change(&mut state);
            state.version += 1;
            state.clone()
        };
        let observers: Vec<Observer<R>> =
            lock(&self.observers).iter().map(|(_, o)| Arc::clone(o)).collect();
        for observer in observers {
            observer(&snapshot);
        }
    }

    // ---------------------------------------------------------------------
    // Edit target
    // ---------------------------------------------------------------------

    /// Start editing `id`. Returns the record to prefill a form with, or
    /// `None` (leaving the edit target unchanged) if `id` is not loaded.
    pub fn begin_edit(&self, id: &str) -> Option<R> {
        let record = lock(&self.state).find(id).cloned()?;
        self.apply(|s| s.editing_id = Some(id.to_string()));
        Some(record)
    }

    pub fn cancel_edit(&self) {
        let editing = lock(&self.state).editing_id.is_some();
        if editing {
            self.apply(|s| s.editing_id = None);
        }
    }

    pub fn editing(&self) -> Option<R> {
        lock(&self.state).editing().cloned()
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    /// Fetch the collection and replace `records` with it.
    ///
    /// On failure `status` becomes `Failed` and the previous records stay.
    pub fn load(&self) -> Result<(), StoreError> {
        self.ensure_live()?;
        self.apply(|s| s.status = Status::Loading);

        let result = self.client.list();
        self.ensure_live()?;

        match result {
            Ok(records) => {
                self.apply(move |s| {
                    s.records = records;
                    s.status = Status::Ready;
                    if s.editing_id.is_some() && s.editing().is_none() {
                        debug!("edit target vanished after reload");
                        s.editing_id = None;
                    }
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "load failed, keeping previous records");
                let reason = e.to_string();
                self.apply(|s| s.status = Status::Failed(reason));
                Err(e.into())
            }
        }
    }

    pub fn create(&self, fields: &R::Fields) -> Result<(), StoreError> {
        self.ensure_live()?;
        validate(fields)?;
        self.submit("create", || self.client.create(fields), |_| {})
    }

    /// Replace the fields of `id`. Success ends editing; failure keeps the
    /// edit target so the form can be resubmitted.
    pub fn update(&self, id: &str, fields: &R::Fields) -> Result<(), StoreError> {
        self.ensure_live()?;
        validate(fields)?;
        self.submit("update", || self.client.update(id, fields), |s| s.editing_id = None)
    }

    /// Delete `id` if the caller's prompt was confirmed. A declined prompt
    /// is a no-op.
    pub fn remove(&self, id: &str, confirmation: Confirmation) -> Result<(), StoreError> {
        self.ensure_live()?;
        if confirmation == Confirmation::Declined {
            debug!(id, "removal declined");
            return Ok(());
        }
        self.submit("remove", || self.client.remove(id), |_| {})
    }

    /// Run one mutation through `Pending -> {Committed, Failed}` and refresh
    /// on commit. A failed refresh does not fail the mutation; it shows up
    /// as `Status::Failed`.
    fn submit(
        &self,
        op: &'static str,
        call: impl FnOnce() -> Result<(), ClientError>,
        on_commit: impl FnOnce(&mut CollectionState<R>),
    ) -> Result<(), StoreError> {
        self.apply(|s| s.action = ActionState::Pending);

        let result = call();
        self.ensure_live()?;

        match result {
            Ok(()) => {
                self.apply(|s| {
                    s.action = ActionState::Committed;
                    on_commit(s);
                });
                if let Err(e) = self.load() {
                    debug!(op, error = %e, "refresh after commit failed");
                }
                Ok(())
            }
            Err(e) => {
                warn!(op, error = %e, "action failed");
                let reason = e.to_string();
                self.apply(|s| s.action = ActionState::Failed(reason));
                Err(e.into())
            }
        }
    }
}

fn validate<F: Validate>(fields: &F) -> Result<(), StoreError> {
    let missing = fields.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(missing))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{mpsc, Barrier};
    use std::thread;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::testing::ScriptedTransport;
    use crate::types::PostFields;

    const ONE_POST: &str =
        r#"[{"id":"1","date":"31 jul 2025","title":"Erros de design","readTime":"3 minutos"}]"#;
    const TWO_POSTS: &str = r#"[
        {"id":"1","date":"31 jul 2025","title":"Erros de design","readTime":"3 minutos"},
        {"id":"2","date":"1 ago 2025","title":"Tipos","readTime":"5 minutos"}
    ]"#;

    fn store() -> PostStore<ScriptedTransport> {
        ResourceStore::new(ResourceClient::new(
            &ClientConfig::new("http://localhost:3000"),
            ScriptedTransport::new(),
        ))
    }

    fn script(store: &PostStore<ScriptedTransport>) -> &ScriptedTransport {
        store.client().transport()
    }

    fn methods(store: &PostStore<ScriptedTransport>) -> Vec<HttpMethod> {
        script(store).requests().iter().map(|r| r.method).collect()
    }

    fn fields() -> PostFields {
        PostFields::new("31 jul 2025", "Erros de design", "3 minutos")
    }

    fn loaded(body: &str) -> PostStore<ScriptedTransport> {
        let s = store();
        script(&s).push(HttpResponse::new(200, body));
        s.load().unwrap();
        s
    }

    #[test]
    fn starts_idle_and_empty() {
        let state = store().snapshot();
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.action, ActionState::Idle);
        assert!(state.records.is_empty());
        assert!(state.editing_id.is_none());
    }

    #[test]
    fn load_replaces_records_and_notifies() {
        let s = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe(move |state| sink.lock().unwrap().push(state.status.clone()));

        script(&s).push(HttpResponse::new(200, TWO_POSTS));
        s.load().unwrap();

        let state = s.snapshot();
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[1].title, "Tipos");
        assert_eq!(*seen.lock().unwrap(), vec![Status::Loading, Status::Ready]);
    }

    #[test]
    fn failed_load_keeps_stale_records() {
        let s = loaded(ONE_POST);
        script(&s).push(HttpResponse::new(500, "boom"));

        let err = s.load().unwrap_err();
        assert_eq!(err, StoreError::Client(ClientError::Http(500)));

        let state = s.snapshot();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.status, Status::Failed("server responded with HTTP 500".to_string()));
    }

    #[test]
    fn malformed_body_fails_load_with_decode() {
        let s = store();
        script(&s).push(HttpResponse::new(200, "{oops"));
        let err = s.load().unwrap_err();
        assert!(matches!(err, StoreError::Client(ClientError::Decode(_))));
        assert!(matches!(s.snapshot().status, Status::Failed(_)));
    }

    #[test]
    fn transport_failure_fails_load() {
        let s = store();
        script(&s).push_err(ClientError::Transport("connection refused".to_string()));
        assert!(s.load().is_err());
        assert_eq!(
            s.snapshot().status,
            Status::Failed("request failed: connection refused".to_string())
        );
    }

    #[test]
    fn create_validates_before_sending() {
        let s = store();
        let err = s.create(&PostFields::new("31 jul 2025", "", " ")).unwrap_err();
        assert_eq!(err, StoreError::Validation(vec!["title", "readTime"]));
        assert!(script(&s).requests().is_empty());
        assert_eq!(s.snapshot().action, ActionState::Idle);
    }

    #[test]
    fn create_then_refresh() {
        let s = store();
        script(&s)
            .push(HttpResponse::new(
                201,
                r#"{"id":"1","date":"31 jul 2025","title":"Erros de design","readTime":"3 minutos"}"#,
            ))
            .push(HttpResponse::new(200, ONE_POST));

        s.create(&fields()).unwrap();

        assert_eq!(methods(&s), vec![HttpMethod::Post, HttpMethod::Get]);
        let state = s.snapshot();
        assert_eq!(state.action, ActionState::Committed);
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, "1");
        assert_eq!(state.records[0].fields(), fields());
    }

    #[test]
    fn create_accepts_200() {
        let s = store();
        script(&s).push(HttpResponse::new(200, "")).push(HttpResponse::new(200, ONE_POST));
        assert!(s.create(&fields()).is_ok());
    }

    #[test]
    fn failed_create_leaves_records_alone() {
        let s = loaded(ONE_POST);
        script(&s).push(HttpResponse::new(400, "bad"));

        let err = s.create(&fields()).unwrap_err();
        assert_eq!(err, StoreError::Client(ClientError::Http(400)));

        let state = s.snapshot();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.action, ActionState::Failed("server responded with HTTP 400".to_string()));
        assert_eq!(methods(&s), vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn action_passes_through_pending() {
        let s = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe(move |state| sink.lock().unwrap().push(state.action.clone()));

        script(&s).push(HttpResponse::new(201, "")).push(HttpResponse::new(200, ONE_POST));
        s.create(&fields()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], ActionState::Pending);
        assert_eq!(seen[1], ActionState::Committed);
    }

    #[test]
    fn committed_mutation_survives_failed_refresh() {
        let s = store();
        script(&s).push(HttpResponse::new(201, "")).push(HttpResponse::new(503, ""));

        assert!(s.create(&fields()).is_ok());
        let state = s.snapshot();
        assert_eq!(state.action, ActionState::Committed);
        assert_eq!(state.status, Status::Failed("server responded with HTTP 503".to_string()));
    }

    #[test]
    fn begin_edit_resolves_loaded_record() {
        let s = loaded(TWO_POSTS);
        let post = s.begin_edit("2").unwrap();
        assert_eq!(post.title, "Tipos");
        assert_eq!(s.snapshot().editing_id.as_deref(), Some("2"));
        assert_eq!(s.editing().map(|p| p.id), Some("2".to_string()));

        s.cancel_edit();
        assert!(s.editing().is_none());
    }

    #[test]
    fn begin_edit_unknown_id_is_rejected() {
        let s = loaded(ONE_POST);
        assert!(s.begin_edit("9").is_none());
        assert!(s.snapshot().editing_id.is_none());
    }

    #[test]
    fn update_commits_and_stops_editing() {
        let s = loaded(TWO_POSTS);
        s.begin_edit("2");
        let changed = PostFields::new("1 ago 2025", "Tipos fortes", "6 minutos");
        script(&s).push(HttpResponse::new(200, "")).push(HttpResponse::new(
            200,
            r#"[{"id":"1","date":"31 jul 2025","title":"Erros de design","readTime":"3 minutos"},
                {"id":"2","date":"1 ago 2025","title":"Tipos fortes","readTime":"6 minutos"}]"#,
        ));

        s.update("2", &changed).unwrap();

        let state = s.snapshot();
        assert!(state.editing_id.is_none());
        assert_eq!(state.find("2").unwrap().fields(), changed);
        let sent = script(&s).requests();
        assert_eq!(sent[1].method, HttpMethod::Put);
        assert!(sent[1].url.ends_with("/api/posts/2"));
    }

    #[test]
    fn failed_update_keeps_edit_target() {
        let s = loaded(TWO_POSTS);
        s.begin_edit("2");
        script(&s).push(HttpResponse::new(201, ""));

        let err = s.update("2", &fields()).unwrap_err();
        assert_eq!(err, StoreError::Client(ClientError::Http(201)));
        assert_eq!(s.snapshot().editing_id.as_deref(), Some("2"));
        assert_eq!(s.records().len(), 2);
    }

    #[test]
    fn update_validates_before_sending() {
        let s = loaded(ONE_POST);
        s.begin_edit("1");
        let err = s.update("1", &PostFields::new("", "t", "r")).unwrap_err();
        assert_eq!(err, StoreError::Validation(vec!["date"]));
        assert_eq!(s.snapshot().editing_id.as_deref(), Some("1"));
    }

    #[test]
    fn edit_target_falls_back_when_record_vanishes() {
        let s = loaded(TWO_POSTS);
        s.begin_edit("2");
        script(&s).push(HttpResponse::new(200, ONE_POST));
        s.load().unwrap();
        assert!(s.snapshot().editing_id.is_none());
        assert!(s.editing().is_none());
    }

    #[test]
    fn declined_removal_sends_nothing() {
        let s = loaded(ONE_POST);
        s.remove("1", Confirmation::Declined).unwrap();
        assert_eq!(methods(&s), vec![HttpMethod::Get]);
        assert_eq!(s.records().len(), 1);
    }

    #[test]
    fn confirmed_removal_refreshes() {
        let s = loaded(TWO_POSTS);
        script(&s).push(HttpResponse::new(204, "")).push(HttpResponse::new(200, ONE_POST));

        s.remove("2", Confirmation::Confirmed).unwrap();

        assert_eq!(methods(&s), vec![HttpMethod::Get, HttpMethod::Delete, HttpMethod::Get]);
        assert!(s.snapshot().find("2").is_none());
    }

    #[test]
    fn failed_removal_keeps_records() {
        let s = loaded(TWO_POSTS);
        script(&s).push(HttpResponse::new(404, ""));
        let err = s.remove("2", Confirmation::Confirmed).unwrap_err();
        assert_eq!(err, StoreError::Client(ClientError::Http(404)));
        assert_eq!(s.records().len(), 2);
    }

    #[test]
    fn unsubscribed_observer_is_not_called() {
        let s = store();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let id = s.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(s.unsubscribe(id));
        assert!(!s.unsubscribe(id));

        script(&s).push(HttpResponse::new(200, "[]"));
        s.load().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disposed_store_refuses_actions() {
        let s = loaded(ONE_POST);
        s.dispose();
        assert!(!s.is_live());

        assert_eq!(s.load(), Err(StoreError::Disposed));
        assert_eq!(s.create(&fields()), Err(StoreError::Disposed));
        assert_eq!(s.remove("1", Confirmation::Confirmed), Err(StoreError::Disposed));
        assert_eq!(methods(&s), vec![HttpMethod::Get]);
    }

    /// Blocks inside `execute` until released, so the test can dispose the
    /// store while a request is in flight.
    struct GatedTransport {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Transport for GatedTransport {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ClientError> {
            lock(&self.entered).send(()).unwrap();
            lock(&self.release).recv().unwrap();
            Ok(HttpResponse::new(200, ONE_POST))
        }
    }

    #[test]
    fn result_arriving_after_dispose_is_discarded() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = GatedTransport {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let s: Arc<PostStore<GatedTransport>> = Arc::new(ResourceStore::new(ResourceClient::new(
            &ClientConfig::new("http://localhost:3000"),
            transport,
        )));

        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        s.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let worker = Arc::clone(&s);
        let handle = thread::spawn(move || worker.load());

        entered_rx.recv().unwrap();
        s.dispose();
        release_tx.send(()).unwrap();

        assert_eq!(handle.join().unwrap(), Err(StoreError::Disposed));
        assert!(s.records().is_empty());
        assert_eq!(s.snapshot().status, Status::Loading);
        // Only the Loading notification went out.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_change_bumps_version() {
        let s = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe(move |state| sink.lock().unwrap().push(state.version));

        script(&s).push(HttpResponse::new(200, ONE_POST));
        s.load().unwrap();
        s.begin_edit("1");

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(s.snapshot().version, 3);
    }

    #[test]
    fn highest_version_seen_matches_final_state() {
        let s = Arc::new(store());
        for _ in 0..8 {
            script(&s).push(HttpResponse::new(200, TWO_POSTS));
        }
        let newest: Arc<Mutex<Option<CollectionState<Post>>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&newest);
        s.subscribe(move |state| {
            let mut newest = sink.lock().unwrap();
            if newest.as_ref().map_or(true, |n| n.version < state.version) {
                *newest = Some(state.clone());
            }
        });

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let worker = Arc::clone(&s);
                thread::spawn(move || worker.load())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        assert_eq!(newest.lock().unwrap().as_ref(), Some(&s.snapshot()));
    }

    /// Holds every POST until two are in flight at once.
    struct OverlappingPosts {
        both_in_flight: Barrier,
        methods: Mutex<Vec<HttpMethod>>,
    }

    impl Transport for OverlappingPosts {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            lock(&self.methods).push(request.method);
            match request.method {
                HttpMethod::Post => {
                    self.both_in_flight.wait();
                    Ok(HttpResponse::new(201, ""))
                }
                _ => Ok(HttpResponse::new(200, TWO_POSTS)),
            }
        }
    }

    #[test]
    fn overlapping_submissions_both_reach_the_server() {
        let s: Arc<PostStore<OverlappingPosts>> = Arc::new(ResourceStore::new(ResourceClient::new(
            &ClientConfig::new("http://localhost:3000"),
            OverlappingPosts {
                both_in_flight: Barrier::new(2),
                methods: Mutex::new(Vec::new()),
            },
        )));
        let saw_pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&saw_pending);
        s.subscribe(move |state| {
            if state.is_pending() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let worker = Arc::clone(&s);
                thread::spawn(move || worker.create(&fields()))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        let methods = lock(&s.client().transport().methods).clone();
        assert_eq!(methods.iter().filter(|m| **m == HttpMethod::Post).count(), 2);
        assert_eq!(methods.iter().filter(|m| **m == HttpMethod::Get).count(), 2);
        assert!(saw_pending.load(Ordering::SeqCst));
        assert_eq!(s.records().len(), 2);
    }

    /// Hands each request the next queued body, then blocks it until the
    /// test releases that specific request.
    struct HeldResponses {
        entered: Mutex<mpsc::Sender<()>>,
        queued: Mutex<VecDeque<(mpsc::Receiver<()>, &'static str)>>,
    }

    impl Transport for HeldResponses {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ClientError> {
            let (release, body) = lock(&self.queued).pop_front().unwrap();
            lock(&self.entered).send(()).unwrap();
            release.recv().unwrap();
            Ok(HttpResponse::new(200, body))
        }
    }

    #[test]
    fn racing_refreshes_leave_the_last_applied_response() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (first_tx, first_rx) = mpsc::channel();
        let (second_tx, second_rx) = mpsc::channel();
        let s: Arc<PostStore<HeldResponses>> = Arc::new(ResourceStore::new(ResourceClient::new(
            &ClientConfig::new("http://localhost:3000"),
            HeldResponses {
                entered: Mutex::new(entered_tx),
                queued: Mutex::new(VecDeque::from([(first_rx, ONE_POST), (second_rx, TWO_POSTS)])),
            },
        )));

        let worker = Arc::clone(&s);
        let first = thread::spawn(move || worker.load());
        entered_rx.recv().unwrap();
        let worker = Arc::clone(&s);
        let second = thread::spawn(move || worker.load());
        entered_rx.recv().unwrap();

        // The later request answers first; the earlier one lands last.
        second_tx.send(()).unwrap();
        second.join().unwrap().unwrap();
        assert_eq!(s.records().len(), 2);

        first_tx.send(()).unwrap();
        first.join().unwrap().unwrap();
        let state = s.snapshot();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, "1");
        assert_eq!(state.status, Status::Ready);
    }
}
