use crate::constants::*;
use crate::error::NoticeError;
use crate::handlers::{DiagnosticSink, Event, TracingSink};
use crate::state::store::OrderedStore;
use notice_center_config::{Setting, SettingsProvider};
use notice_center_util::{
    CloseReason, Component, Exception, Notice, NoticeControl, NoticeHandle, NoticeKind,
    NoticeOptions, ProcessController, ProcessProps, Props, describe,
};
use parking_lot::Mutex;
use std::{
    marker::PhantomData,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::sync::broadcast;
use tracing::{debug, error, trace, warn};

/// Store contents plus the identifier counter
struct Inner<P> {
    store: OrderedStore<u32, Notice<P>>,
    next_id: u32,
}

impl<P> Inner<P> {
    fn persistent_count(&self) -> usize {
        self.store.values().filter(|n| n.persistent).count()
    }

    /// Remove the oldest non-persistent notice if the pool is over its size.
    ///
    /// Evicts at most one notice per call.
    fn evict_overflow(&mut self, pool: u32) -> Option<u32> {
        let transient = self.store.values().filter(|n| !n.persistent).count();
        if transient <= pool as usize {
            return None;
        }

        let Some(victim) = self
            .store
            .keys()
            .copied()
            .find(|id| self.store.get(id).is_some_and(|n| !n.persistent))
        else {
            error!(
                "{} non-persistent notices exceed pool of {} but none could be evicted",
                transient, pool
            );
            debug_assert!(false, "pool overflow without an eviction candidate");
            return None;
        };

        self.store.remove(&victim);
        Some(victim)
    }
}

struct Shared<P> {
    state: Mutex<Inner<P>>,
    settings: Box<dyn SettingsProvider>,
    diagnostics: Box<dyn DiagnosticSink>,
    events: broadcast::Sender<Event>,
    delete_delay: Duration,
    this: Weak<Shared<P>>,
}

impl<P: Send + 'static> Shared<P> {
    fn emit(&self, event: Event) {
        // No subscribers is fine
        _ = self.events.send(event);
    }

    fn handle(&self, id: u32) -> NoticeHandle {
        let control: Weak<dyn NoticeControl> = self.this.clone();
        NoticeHandle::new(id, control)
    }

    fn remove(&self, id: u32, reason: CloseReason) -> bool {
        let removed = self.state.lock().store.remove(&id).is_some();
        if removed {
            debug!("Removed notice {} ({:?})", id, reason);
            self.emit(Event::Removed { id, reason });
        } else {
            trace!("Notice {} was already removed", id);
        }
        removed
    }

    fn close(&self, id: u32, delay_deleting: bool) {
        if !delay_deleting {
            self.remove(id, CloseReason::Dismissed);
            return;
        }

        let delay = self.delete_delay;
        {
            let mut state = self.state.lock();
            let Some(notice) = state.store.get_mut(&id) else {
                trace!("Notice {} not found, nothing to close", id);
                return;
            };
            notice.delete_delay = delay;
        }

        if delay.is_zero() {
            self.remove(id, CloseReason::Expired);
            return;
        }

        debug!("Closing notice {} in {:?}", id, delay);
        self.emit(Event::Closing { id, delay });
        self.schedule_removal(id, delay);
    }

    fn schedule_removal(&self, id: u32, delay: Duration) {
        let this = self.this.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    match this.upgrade() {
                        Some(shared) => {
                            shared.remove(id, CloseReason::Expired);
                        }
                        None => trace!("Manager dropped before notice {} expired", id),
                    }
                });
            }
            Err(_) => {
                warn!("No async runtime to delay removal of notice {}, removing now", id);
                self.remove(id, CloseReason::Expired);
            }
        }
    }

    fn show_details(&self, id: u32) {
        if self.state.lock().store.contains(&id) {
            self.emit(Event::ShowDetails(id));
        } else {
            trace!("Details requested for missing notice {}", id);
        }
    }
}

impl<P: Send + 'static> NoticeControl for Shared<P> {
    fn close(&self, id: u32, delay_deleting: bool) {
        Shared::close(self, id, delay_deleting);
    }

    fn show_details(&self, id: u32) {
        Shared::show_details(self, id);
    }
}

/// Owner of all live notices
///
/// Assigns identifiers, enforces the persistent quota and the pool size,
/// and runs the delayed close. Cloning yields another handle to the same
/// manager.
pub struct NoticeCenter<P = Props> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for NoticeCenter<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// A process notice together with the controller that drives it
#[derive(Debug, Clone)]
pub struct ProcessNotification<P = Props> {
    pub controller: ProcessController,
    pub notification: Notice<P>,
}

pub struct Builder<P = Props> {
    settings: Box<dyn SettingsProvider>,
    diagnostics: Box<dyn DiagnosticSink>,
    delete_delay: Duration,
    event_capacity: usize,
    marker: PhantomData<fn() -> P>,
}

impl<P: Clone + Default + Send + 'static> Builder<P> {
    pub fn new(settings: impl SettingsProvider + 'static) -> Self {
        Self {
            settings: Box::new(settings),
            diagnostics: Box::new(TracingSink),
            delete_delay: DEFAULT_DELETE_DELAY,
            event_capacity: EVENT_CHANNEL_CAPACITY,
            marker: PhantomData,
        }
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    pub fn delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> NoticeCenter<P> {
        let (events, _) = broadcast::channel(self.event_capacity);
        let shared = Arc::new_cyclic(|this| Shared {
            state: Mutex::new(Inner {
                store: OrderedStore::with_capacity(INITIAL_STORE_CAPACITY, |n: &Notice<P>| n.id),
                next_id: FIRST_NOTICE_ID,
            }),
            settings: self.settings,
            diagnostics: self.diagnostics,
            events,
            delete_delay: self.delete_delay,
            this: this.clone(),
        });
        NoticeCenter { shared }
    }
}

impl NoticeCenter {
    pub fn new(settings: impl SettingsProvider + 'static) -> Self {
        Builder::new(settings).build()
    }

    pub fn builder(settings: impl SettingsProvider + 'static) -> Builder {
        Builder::new(settings)
    }
}

impl<P: Clone + Default + Send + 'static> NoticeCenter<P> {
    /// Create a notice and insert it into the store.
    ///
    /// A persistent notice is rejected while the persistent quota is used
    /// up, leaving state untouched. After insertion the oldest
    /// non-persistent notice is evicted if the pool size is exceeded.
    pub fn notify(&self, options: NoticeOptions<P>, kind: NoticeKind) -> Result<Notice<P>, NoticeError> {
        let shared = &self.shared;
        // Limits are read before locking so a provider may call back into the manager
        let quota = options
            .persistent
            .then(|| shared.settings.get_value(Setting::MaxPersistentAllow));
        let pool = shared.settings.get_value(Setting::NotificationsPool);

        let mut state = shared.state.lock();

        if let Some(limit) = quota {
            if state.persistent_count() >= limit as usize {
                warn!(
                    "Rejecting persistent notice '{}' - limit of {} reached",
                    options.title, limit
                );
                return Err(NoticeError::PersistentQuotaExceeded { limit });
            }
        }

        let id = state.next_id;
        state.next_id = id.checked_add(1).ok_or_else(|| {
            error!("Notice identifiers exhausted at {}", id);
            NoticeError::IdsExhausted
        })?;

        let notice = Notice::from_options(id, kind, options, shared.handle(id));
        state
            .store
            .add_value(notice.clone())
            .map_err(|_| NoticeError::DuplicateId(id))?;
        debug!("Created {} notice {} '{}'", kind, id, notice.title);

        let evicted = state.evict_overflow(pool);
        drop(state);

        shared.emit(Event::Added(id));
        if let Some(evicted) = evicted {
            debug!("Evicted notice {} to keep pool at {}", evicted, pool);
            shared.emit(Event::Removed {
                id: evicted,
                reason: CloseReason::Evicted,
            });
        }

        Ok(notice)
    }

    /// Create a notice rendered by `component`, typed `Custom` unless the
    /// options override it.
    pub fn custom_notification(
        &self,
        component: Component,
        props: Option<P>,
        mut options: NoticeOptions<P>,
    ) -> Result<Notice<P>, NoticeError> {
        let kind = options.kind.take().unwrap_or(NoticeKind::Custom);
        options.component = Some(component);
        if props.is_some() {
            options.extra_props = props;
        }
        self.notify(options, kind)
    }

    /// Create a custom notice that tracks a long-running process.
    ///
    /// Reuses the controller found in `props` or starts a new one, then
    /// initializes it from the created notice.
    pub fn process_notification(
        &self,
        component: Component,
        props: Option<P>,
        options: NoticeOptions<P>,
    ) -> Result<ProcessNotification<P>, NoticeError>
    where
        P: ProcessProps,
    {
        let mut props = props.unwrap_or_default();
        let controller = match props.process() {
            Some(existing) => existing.clone(),
            None => {
                let controller = ProcessController::new();
                props.set_process(controller.clone());
                controller
            }
        };

        let notification = self.custom_notification(component, Some(props), options)?;
        controller.init(&notification.title, &notification.message);

        Ok(ProcessNotification {
            controller,
            notification,
        })
    }

    pub fn log_info(&self, options: NoticeOptions<P>) -> Result<Notice<P>, NoticeError> {
        self.notify(options, NoticeKind::Info)
    }

    pub fn log_success(&self, options: NoticeOptions<P>) -> Result<Notice<P>, NoticeError> {
        self.notify(options, NoticeKind::Success)
    }

    pub fn log_error(&self, options: NoticeOptions<P>) -> Result<Notice<P>, NoticeError> {
        self.notify(options, NoticeKind::Error)
    }

    /// Show an error notice for `exception` unless `silent`, and always
    /// forward it to the diagnostic sink.
    pub fn log_exception(
        &self,
        exception: &dyn Exception,
        title: Option<&str>,
        message: Option<&str>,
        silent: bool,
    ) -> Option<Notice<P>> {
        let notice = if silent {
            None
        } else {
            let summary = describe(exception);
            let mut options = NoticeOptions::new(
                title.map_or(summary.name, str::to_string),
                message.map_or(summary.message, str::to_string),
            );
            options.details = summary.details;

            match self.log_error(options) {
                Ok(notice) => Some(notice),
                Err(err) => {
                    error!("Failed to show notice for exception: {}", err);
                    None
                }
            }
        };

        self.shared.diagnostics.report(exception);
        notice
    }

    /// Close a notice, either right away or after the delete delay.
    ///
    /// Unknown identifiers are ignored.
    pub fn close(&self, id: u32, delay_deleting: bool) {
        self.shared.close(id, delay_deleting);
    }

    pub fn show_details(&self, id: u32) {
        self.shared.show_details(id);
    }

    /// Notices not marked silent, in creation order
    pub fn visible_notifications(&self) -> Vec<Notice<P>> {
        self.shared
            .state
            .lock()
            .store
            .values()
            .filter(|n| !n.is_silent)
            .cloned()
            .collect()
    }

    /// All notices, in creation order
    pub fn notifications(&self) -> Vec<Notice<P>> {
        self.shared.state.lock().store.values().cloned().collect()
    }

    pub fn get(&self, id: u32) -> Option<Notice<P>> {
        self.shared.state.lock().store.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.shared.state.lock().store.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().store.is_empty()
    }

    pub fn persistent_count(&self) -> usize {
        self.shared.state.lock().persistent_count()
    }

    /// Drop every notice. Each one is reported as removed with
    /// `CloseReason::Cleared`, followed by a single `Event::Cleared`.
    /// Pending delayed removals turn into no-ops and identifiers keep
    /// counting up.
    pub fn clear(&self) {
        let removed: Vec<u32> = {
            let mut state = self.shared.state.lock();
            let ids = state.store.keys().copied().collect();
            state.store.clear();
            ids
        };
        debug!("Cleared {} notices", removed.len());

        for id in removed {
            self.shared.emit(Event::Removed {
                id,
                reason: CloseReason::Cleared,
            });
        }
        self.shared.emit(Event::Cleared);
    }

    pub fn delete_delay(&self) -> Duration {
        self.shared.delete_delay
    }

    /// Observe lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notice_center_config::NoticesConfig;

    fn center(pool: u32, persistent: u32) -> NoticeCenter {
        NoticeCenter::new(NoticesConfig {
            max_persistent_allow: persistent,
            notifications_pool: pool,
            ..NoticesConfig::default()
        })
    }

    #[test]
    fn test_ids_start_at_zero_and_increase() {
        let center = center(10, 1);
        let a = center.log_info(NoticeOptions::new("a", "")).unwrap();
        let b = center.log_info(NoticeOptions::new("b", "")).unwrap();
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
    }

    #[test]
    fn test_evict_overflow_skips_persistent() {
        let center = center(1, 2);
        let p = center
            .log_info(NoticeOptions::new("p", "").persistent(true))
            .unwrap();
        let a = center.log_info(NoticeOptions::new("a", "")).unwrap();
        let b = center.log_info(NoticeOptions::new("b", "")).unwrap();

        assert_eq!(center.ids(), vec![p.id, b.id]);
        assert!(center.get(a.id).is_none());
    }

    #[test]
    fn test_evict_overflow_on_empty_store_with_zero_pool() {
        let mut inner: Inner<Props> = Inner {
            store: OrderedStore::new(|n: &Notice| n.id),
            next_id: 0,
        };
        assert_eq!(inner.evict_overflow(0), None);
    }

    #[test]
    fn test_exhausted_ids_are_rejected_without_reuse() {
        let center = center(10, 1);
        center.shared.state.lock().next_id = u32::MAX - 1;

        let last = center.log_info(NoticeOptions::new("last", "")).unwrap();
        assert_eq!(last.id, u32::MAX - 1);

        let err = center.log_info(NoticeOptions::new("overflow", "")).unwrap_err();
        assert_eq!(err, NoticeError::IdsExhausted);
        assert_eq!(center.ids(), vec![u32::MAX - 1]);

        // The counter stays put, so every later attempt fails the same way
        let err = center.log_info(NoticeOptions::new("again", "")).unwrap_err();
        assert_eq!(err, NoticeError::IdsExhausted);
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_close_without_runtime_removes_immediately() {
        let center = center(5, 1);
        let notice = center.log_info(NoticeOptions::new("a", "")).unwrap();

        center.close(notice.id, true);
        assert!(center.get(notice.id).is_none());
    }

    #[test]
    fn test_close_unknown_id_is_noop() {
        let center = center(5, 1);
        center.close(42, true);
        center.close(42, false);
        assert!(center.is_empty());
    }
}
