//! Toast dispatch store
//!
//! `ToastStore` owns the ordered list of tracked toasts, the listeners subscribed to
//! it, and one timer task per pending auto-dismiss or removal. State changes go through
//! `dispatch`, which updates the list under a lock, releases it, and then notifies every
//! listener with a snapshot before returning.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::message::{ToastDraft, ToastId, ToastKind, ToastMessage, ToastOptions, ToastPatch};

/// Auto-dismiss delay for toasts that do not set a duration
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Time a dismissed toast stays hidden in the list before it is removed
pub const DEFAULT_REMOVE_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for a toast store
#[derive(Debug, Clone)]
pub struct ToastConfig {
    /// Duration used when a draft leaves it unset
    pub default_duration: Duration,
    /// Exit window between hiding a toast and dropping it from the list
    pub remove_delay: Duration,
    /// Maximum number of tracked toasts; the oldest are dropped beyond it
    pub max_toasts: Option<usize>,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_TOAST_DURATION,
            remove_delay: DEFAULT_REMOVE_DELAY,
            max_toasts: None,
        }
    }
}

/// Actions accepted by `ToastStore::dispatch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastAction {
    /// Append a toast and start its auto-dismiss timer
    Add(ToastDraft),
    /// Change a tracked toast in place
    Update(ToastId, ToastPatch),
    /// Hide one toast, or all of them when no id is given
    Dismiss(Option<ToastId>),
    /// Drop one toast from the list immediately, or all of them when no id is given
    Remove(Option<ToastId>),
}

/// Snapshot handed to listeners on every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastState {
    /// Tracked toasts in insertion order
    pub toasts: Vec<ToastMessage>,
}

impl ToastState {
    pub fn get(&self, id: &ToastId) -> Option<&ToastMessage> {
        self.toasts.iter().find(|toast| &toast.id == id)
    }

    /// Toasts that are currently shown
    pub fn visible(&self) -> impl Iterator<Item = &ToastMessage> {
        self.toasts.iter().filter(|toast| toast.open)
    }

    fn position(&self, id: &ToastId) -> Option<usize> {
        self.toasts.iter().position(|toast| &toast.id == id)
    }
}

type Listener = Arc<dyn Fn(&ToastState) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum TimerKind {
    Dismiss,
    Remove,
}

#[derive(Default)]
struct Tracked {
    state: ToastState,
    listeners: Vec<(u64, Listener)>,
    dismiss_timers: HashMap<ToastId, JoinHandle<()>>,
    remove_timers: HashMap<ToastId, JoinHandle<()>>,
}

impl Tracked {
    fn cancel_timers(&mut self, id: &ToastId) {
        if let Some(timer) = self.dismiss_timers.remove(id) {
            timer.abort();
        }
        if let Some(timer) = self.remove_timers.remove(id) {
            timer.abort();
        }
    }
}

struct Shared {
    config: ToastConfig,
    next_toast_id: AtomicU64,
    next_listener_id: AtomicU64,
    tracked: Mutex<Tracked>,
}

/// Publish/subscribe store for toast notifications
///
/// Clones are handles onto the same store. Timers are tokio tasks that hold only a
/// weak reference back to the store, so dropping the last handle ends them quietly.
/// When no tokio runtime is available, auto-dismiss is skipped (the toast stays until
/// dismissed) and dismissed toasts are removed without an exit window.
#[derive(Clone)]
pub struct ToastStore {
    shared: Arc<Shared>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}

impl ToastStore {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                next_toast_id: AtomicU64::new(1),
                next_listener_id: AtomicU64::new(1),
                tracked: Mutex::new(Tracked::default()),
            }),
        }
    }

    pub fn config(&self) -> &ToastConfig {
        &self.shared.config
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.shared
            .tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Next counter id not already taken by a tracked toast
    ///
    /// Callers may pick ids that look like counter values, so taken ones are skipped.
    fn unused_id(&self, tracked: &Tracked) -> ToastId {
        loop {
            let n = self.shared.next_toast_id.fetch_add(1, Ordering::Relaxed);
            let id = ToastId::new(n.to_string());
            if tracked.state.position(&id).is_none() {
                return id;
            }
        }
    }

    /// Registers a listener called with the new state after every change
    ///
    /// The listener stays registered for as long as the returned `Subscription` lives.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ToastState) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.lock().listeners.push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(&self.shared),
            id,
        }
    }

    /// Returns a channel receiver that always holds the latest state
    pub fn watch(&self) -> ToastWatch {
        let (sender, receiver) = watch::channel(self.state());
        let subscription = self.subscribe(move |state| {
            sender.send_replace(state.clone());
        });
        ToastWatch {
            receiver,
            _subscription: subscription,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ToastState {
        self.lock().state.clone()
    }

    /// Applies an action and notifies listeners if anything changed
    ///
    /// Listeners run on the calling thread after the internal lock is released, so a
    /// listener may dispatch again.
    pub fn dispatch(&self, action: ToastAction) {
        self.commit(|tracked| (self.reduce(tracked, action), ()));
    }

    /// Runs `change` under the lock, then notifies listeners if it reported a change
    fn commit<R>(&self, change: impl FnOnce(&mut Tracked) -> (bool, R)) -> R {
        let (result, snapshot, listeners) = {
            let mut tracked = self.lock();
            let (changed, result) = change(&mut *tracked);
            if !changed {
                return result;
            }
            let listeners: Vec<Listener> = tracked
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (result, tracked.state.clone(), listeners)
        };

        for listener in listeners {
            listener(&snapshot);
        }
        result
    }

    fn reduce(&self, tracked: &mut Tracked, action: ToastAction) -> bool {
        match action {
            ToastAction::Add(draft) => {
                self.add(tracked, draft);
                true
            }
            ToastAction::Update(id, patch) => {
                match tracked.state.toasts.iter_mut().find(|toast| toast.id == id) {
                    Some(message) => {
                        patch.apply(message);
                        debug!(%id, "toast updated");
                        true
                    }
                    None => false,
                }
            }
            ToastAction::Dismiss(Some(id)) => self.dismiss_one(tracked, &id),
            ToastAction::Dismiss(None) => {
                let open: Vec<ToastId> = tracked
                    .state
                    .visible()
                    .map(|toast| toast.id.clone())
                    .collect();
                let mut changed = false;
                for id in &open {
                    changed |= self.dismiss_one(tracked, id);
                }
                changed
            }
            ToastAction::Remove(Some(id)) => match tracked.state.position(&id) {
                Some(index) => {
                    tracked.state.toasts.remove(index);
                    tracked.cancel_timers(&id);
                    debug!(%id, "toast removed");
                    true
                }
                None => false,
            },
            ToastAction::Remove(None) => {
                if tracked.state.toasts.is_empty() {
                    return false;
                }
                let removed: Vec<ToastMessage> = tracked.state.toasts.drain(..).collect();
                for toast in &removed {
                    tracked.cancel_timers(&toast.id);
                }
                debug!(count = removed.len(), "all toasts removed");
                true
            }
        }
    }

    fn add(&self, tracked: &mut Tracked, draft: ToastDraft) -> ToastId {
        let config = &self.shared.config;
        let id = match draft.id {
            Some(id) => id,
            None => self.unused_id(tracked),
        };

        let duplicate = tracked.state.position(&id);
        debug_assert!(duplicate.is_none(), "duplicate toast id {id}");
        if let Some(index) = duplicate {
            warn!(%id, "duplicate toast id, replacing the tracked toast");
            tracked.state.toasts.remove(index);
            tracked.cancel_timers(&id);
        }

        let duration = draft.duration.unwrap_or(config.default_duration);
        tracked.state.toasts.push(ToastMessage {
            id: id.clone(),
            kind: draft.kind,
            title: draft
                .title
                .unwrap_or_else(|| draft.kind.default_title().to_string()),
            description: draft.description,
            duration,
            open: true,
        });

        if !duration.is_zero() {
            if let Some(timer) = self.schedule(id.clone(), duration, TimerKind::Dismiss) {
                tracked.dismiss_timers.insert(id.clone(), timer);
            }
        }

        if let Some(max) = config.max_toasts {
            let overflow = tracked.state.toasts.len().saturating_sub(max);
            let dropped: Vec<ToastMessage> = tracked.state.toasts.drain(..overflow).collect();
            for toast in &dropped {
                tracked.cancel_timers(&toast.id);
            }
        }

        debug!(%id, kind = ?draft.kind, duration_ms = duration.as_millis() as u64, "toast added");
        id
    }

    fn dismiss_one(&self, tracked: &mut Tracked, id: &ToastId) -> bool {
        let Some(message) = tracked.state.toasts.iter_mut().find(|toast| &toast.id == id) else {
            return false;
        };
        if !message.open {
            return false;
        }
        message.open = false;

        if let Some(timer) = tracked.dismiss_timers.remove(id) {
            timer.abort();
        }

        let remove_delay = self.shared.config.remove_delay;
        match self.schedule(id.clone(), remove_delay, TimerKind::Remove) {
            Some(timer) => {
                tracked.remove_timers.insert(id.clone(), timer);
            }
            None => tracked.state.toasts.retain(|toast| &toast.id != id),
        }

        debug!(%id, "toast dismissed");
        true
    }

    fn schedule(&self, id: ToastId, delay: Duration, kind: TimerKind) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%id, ?kind, "no tokio runtime, toast timer not scheduled");
            return None;
        };

        let store = Arc::downgrade(&self.shared);
        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = store.upgrade() {
                ToastStore { shared }.fire(id, kind);
            }
        }))
    }

    fn fire(&self, id: ToastId, kind: TimerKind) {
        // The running task forgets its own handle so the dispatch below does not abort it.
        {
            let mut tracked = self.lock();
            match kind {
                TimerKind::Dismiss => tracked.dismiss_timers.remove(&id),
                TimerKind::Remove => tracked.remove_timers.remove(&id),
            };
        }

        match kind {
            TimerKind::Dismiss => self.dispatch(ToastAction::Dismiss(Some(id))),
            TimerKind::Remove => self.dispatch(ToastAction::Remove(Some(id))),
        }
    }

    /// Adds a toast and returns its id
    pub fn custom(&self, draft: ToastDraft) -> ToastId {
        self.commit(|tracked| (true, self.add(tracked, draft)))
    }

    /// Adds a toast of the given kind with `message` as its description
    pub fn push(&self, kind: ToastKind, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.custom(ToastDraft {
            id: options.id,
            kind,
            title: options.title,
            description: Some(message.into()),
            duration: options.duration,
        })
    }

    pub fn success(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.push(ToastKind::Success, message, options)
    }

    pub fn error(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.push(ToastKind::Error, message, options)
    }

    pub fn info(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.push(ToastKind::Info, message, options)
    }

    pub fn warning(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.push(ToastKind::Warning, message, options)
    }

    pub fn update(&self, id: &ToastId, patch: ToastPatch) {
        self.dispatch(ToastAction::Update(id.clone(), patch));
    }

    /// Hides one toast, or every toast when `id` is `None`
    pub fn dismiss(&self, id: Option<ToastId>) {
        self.dispatch(ToastAction::Dismiss(id));
    }

    /// Drops one toast immediately, or every toast when `id` is `None`
    pub fn remove(&self, id: Option<ToastId>) {
        self.dispatch(ToastAction::Remove(id));
    }
}

impl fmt::Debug for ToastStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracked = self.lock();
        f.debug_struct("ToastStore")
            .field("toasts", &tracked.state.toasts.len())
            .field("listeners", &tracked.listeners.len())
            .field("pending_timers", &(tracked.dismiss_timers.len() + tracked.remove_timers.len()))
            .field("config", &self.shared.config)
            .finish()
    }
}

/// Keeps a listener registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    store: Weak<Shared>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.store.upgrade() {
            let mut tracked = shared.tracked.lock().unwrap_or_else(PoisonError::into_inner);
            tracked.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Latest toast state delivered through a `tokio::sync::watch` channel
#[derive(Debug)]
pub struct ToastWatch {
    receiver: watch::Receiver<ToastState>,
    _subscription: Subscription,
}

impl ToastWatch {
    /// Most recent state, marking it as seen
    pub fn current(&mut self) -> ToastState {
        self.receiver.borrow_and_update().clone()
    }

    /// Whether the state changed since the last `current` call
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Waits for the next change; returns `false` once the store is gone
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::time::sleep;

    fn record(store: &ToastStore) -> (Arc<Mutex<Vec<ToastState>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.clone());
        });
        (events, subscription)
    }

    fn ids(state: &ToastState) -> Vec<String> {
        state.toasts.iter().map(|t| t.id.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_are_kept_in_insertion_order() {
        let store = ToastStore::default();
        let (events, _subscription) = record(&store);

        store.custom(ToastDraft::new(ToastKind::Info).id("A"));
        store.custom(ToastDraft::new(ToastKind::Info).id("B"));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(ids(&events[1]), vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_runs_before_dispatch_returns() {
        let store = ToastStore::default();
        let (events, _subscription) = record(&store);

        store.success("Quiz terminé", ToastOptions::default());

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_hides_then_removes() {
        let store = ToastStore::default();
        let id = store.custom(
            ToastDraft::new(ToastKind::Success).duration(Duration::from_millis(1000)),
        );

        sleep(Duration::from_millis(1001)).await;
        let state = store.state();
        assert!(!state.get(&id).expect("still tracked while hidden").open);

        sleep(DEFAULT_REMOVE_DELAY).await;
        assert!(store.state().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_duration_applies_when_unset() {
        let store = ToastStore::default();
        let id = store.info("Nouvelle formation disponible", ToastOptions::default());

        let state = store.state();
        let message = state.get(&id).unwrap();
        assert_eq!(message.duration, DEFAULT_TOAST_DURATION);
        assert_eq!(message.title, "Information");

        sleep(DEFAULT_TOAST_DURATION - Duration::from_millis(1)).await;
        assert!(store.state().get(&id).unwrap().open);

        sleep(Duration::from_millis(2)).await;
        assert!(!store.state().get(&id).unwrap().open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_never_auto_dismisses() {
        let store = ToastStore::default();
        let id = store.custom(ToastDraft::new(ToastKind::Warning).persistent());

        sleep(Duration::from_secs(60)).await;

        assert!(store.state().get(&id).unwrap().open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_cancels_auto_dismiss_timer() {
        let store = ToastStore::default();
        let (events, _subscription) = record(&store);

        store.custom(
            ToastDraft::new(ToastKind::Info)
                .id("x")
                .duration(Duration::from_millis(5000)),
        );

        sleep(Duration::from_millis(100)).await;
        store.dismiss(Some(ToastId::new("x")));
        assert_eq!(events.lock().unwrap().len(), 2);

        // Removal happens after the exit window, at t=1100ms.
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(events.lock().unwrap().len(), 3);

        // Nothing fires when the cancelled auto-dismiss would have been due.
        sleep(Duration::from_millis(5000)).await;
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events[2].toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_all_hides_every_toast() {
        let store = ToastStore::default();
        for _ in 0..3 {
            store.custom(ToastDraft::new(ToastKind::Info).persistent());
        }
        let (events, _subscription) = record(&store);

        store.dismiss(None);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1, "dismiss-all notifies once");
        assert_eq!(events[0].toasts.len(), 3);
        assert!(events[0].toasts.iter().all(|t| !t.open));
        drop(events);

        sleep(DEFAULT_REMOVE_DELAY + Duration::from_millis(1)).await;
        assert!(store.state().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissing_hidden_or_unknown_toast_is_noop() {
        let store = ToastStore::default();
        let id = store.custom(ToastDraft::new(ToastKind::Info).persistent());
        store.dismiss(Some(id.clone()));
        let (events, _subscription) = record(&store);

        store.dismiss(Some(id));
        store.dismiss(Some(ToastId::new("unknown")));
        store.dismiss(None);

        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_changes_toast_in_place() {
        let store = ToastStore::default();
        let id = store.info("Chargement des formations", ToastOptions::titled("Chargement"));
        store.info("Autre", ToastOptions::default());

        store.update(
            &id,
            ToastPatch {
                kind: Some(ToastKind::Success),
                title: Some("Terminé".to_string()),
                description: None,
            },
        );

        let state = store.state();
        assert_eq!(state.toasts[0].id, id);
        assert_eq!(state.toasts[0].kind, ToastKind::Success);
        assert_eq!(state.toasts[0].title, "Terminé");
        assert_eq!(
            state.toasts[0].description.as_deref(),
            Some("Chargement des formations")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_drops_toast_immediately() {
        let store = ToastStore::default();
        let first = store.error("Connexion perdue", ToastOptions::default());
        let second = store.warning("Session bientôt expirée", ToastOptions::default());

        store.remove(Some(first));
        assert_eq!(ids(&store.state()), vec![second.to_string()]);

        store.remove(None);
        assert!(store.state().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_toasts_drops_oldest() {
        let store = ToastStore::new(ToastConfig {
            max_toasts: Some(2),
            ..ToastConfig::default()
        });

        store.custom(ToastDraft::new(ToastKind::Info).id("1st"));
        store.custom(ToastDraft::new(ToastKind::Info).id("2nd"));
        store.custom(ToastDraft::new(ToastKind::Info).id("3rd"));

        assert_eq!(ids(&store.state()), vec!["2nd", "3rd"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_subscription_stops_notifications() {
        let store = ToastStore::default();
        let (events, subscription) = record(&store);

        store.info("un", ToastOptions::default());
        subscription.unsubscribe();
        store.info("deux", ToastOptions::default());

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_may_dispatch_again() {
        let store = ToastStore::default();
        let producer = store.clone();
        let reacted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reacted);
        let _subscription = store.subscribe(move |state| {
            let has_error = state.toasts.iter().any(|t| t.kind == ToastKind::Error);
            if has_error && !flag.swap(true, Ordering::SeqCst) {
                producer.info("Nouvelle tentative en cours", ToastOptions::default());
            }
        });

        store.error("Échec du chargement", ToastOptions::default());

        let kinds: Vec<ToastKind> = store.state().toasts.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Error, ToastKind::Info]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_receives_latest_state() {
        let store = ToastStore::default();
        let mut watch = store.watch();
        assert!(watch.current().toasts.is_empty());

        store.success("Parrainage envoyé", ToastOptions::default());

        assert!(watch.has_changed());
        assert_eq!(watch.current().toasts.len(), 1);
        assert!(!watch.has_changed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_ids_are_unique() {
        let store = ToastStore::default();
        let a = store.info("a", ToastOptions::default());
        let b = store.info("b", ToastOptions::default());

        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_id_skips_caller_supplied_ids() {
        let store = ToastStore::default();
        store.custom(ToastDraft::new(ToastKind::Info).id("1"));
        store.custom(ToastDraft::new(ToastKind::Info).id("2"));

        let generated = store.info("auto", ToastOptions::default());

        assert_eq!(generated.as_str(), "3");
        let state = store.state();
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
        assert!(state.toasts.iter().all(|toast| toast.open));
    }

    #[test]
    fn test_without_runtime_toast_persists_and_dismiss_removes() {
        let store = ToastStore::default();
        let id = store.success("Profil mis à jour", ToastOptions::default());
        assert!(store.state().get(&id).unwrap().open);

        store.dismiss(Some(id));

        assert!(store.state().toasts.is_empty());
    }
}
