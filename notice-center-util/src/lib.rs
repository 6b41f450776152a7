pub mod exception;
pub mod kind;
pub mod process;

pub use exception::{DetailedError, ErrorDetails, Exception, ExceptionSummary, describe};
pub use kind::{NoticeKind, UnknownKind};
pub use process::{ProcessController, ProcessState, ProcessStatus};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    borrow::Cow,
    fmt,
    sync::Weak,
    time::{Duration, SystemTime},
};

/// Opaque descriptor of the component a presentation layer uses to render
/// a custom notice
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component(Cow<'static, str>);

impl Component {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extra properties payload types that can carry a process controller
pub trait ProcessProps: Default {
    fn process(&self) -> Option<&ProcessController>;
    fn set_process(&mut self, controller: ProcessController);
}

/// Default extra properties bag
#[derive(Debug, Clone, Default)]
pub struct Props {
    /// Process controller driving a long-running notice
    pub state: Option<ProcessController>,
    /// Free-form values forwarded to the rendering component
    pub values: Map<String, Value>,
}

impl Props {
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl ProcessProps for Props {
    fn process(&self) -> Option<&ProcessController> {
        self.state.as_ref()
    }

    fn set_process(&mut self, controller: ProcessController) {
        self.state = Some(controller);
    }
}

/// Why a notice left the store
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseReason {
    /// The delayed close finished
    Expired = 1,
    /// Closed without delay
    Dismissed = 2,
    /// Evicted to respect the pool size
    Evicted = 3,
    /// The whole store was reset
    Cleared = 4,
}

/// Operations a [`NoticeHandle`] forwards to its manager
pub trait NoticeControl: Send + Sync {
    fn close(&self, id: u32, delay_deleting: bool);
    fn show_details(&self, id: u32);
}

/// Close and show-details entry points bound to one notice.
///
/// Holds only a weak reference, so a notice never keeps its manager alive.
#[derive(Clone)]
pub struct NoticeHandle {
    id: u32,
    control: Weak<dyn NoticeControl>,
}

impl NoticeHandle {
    pub fn new(id: u32, control: Weak<dyn NoticeControl>) -> Self {
        Self { id, control }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn close(&self, delay_deleting: bool) {
        match self.control.upgrade() {
            Some(control) => control.close(self.id, delay_deleting),
            None => tracing::trace!("Manager gone, ignoring close for notice {}", self.id),
        }
    }

    pub fn show_details(&self) {
        if let Some(control) = self.control.upgrade() {
            control.show_details(self.id);
        }
    }
}

impl fmt::Debug for NoticeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoticeHandle")
            .field("id", &self.id)
            .field("attached", &(self.control.strong_count() > 0))
            .finish()
    }
}

/// A user-facing notice held by the manager
#[derive(Debug, Clone)]
pub struct Notice<P = Props> {
    pub id: u32,
    pub title: String,
    pub message: String,
    pub details: Option<Value>,
    pub kind: NoticeKind,
    /// Retained in state but left out of the visible subset
    pub is_silent: bool,
    /// Exempt from pool eviction, counted against the persistent quota
    pub persistent: bool,
    pub component: Option<Component>,
    pub extra_props: P,
    pub timestamp: SystemTime,
    /// Zero unless the notice is closing, then the time left in state
    pub delete_delay: Duration,
    pub(crate) handle: NoticeHandle,
}

impl<P> Notice<P> {
    /// Build a notice with the given identifier and bound handle.
    ///
    /// Only the manager creates notices; this fills the defaults for options
    /// the caller left out.
    pub fn from_options(
        id: u32,
        kind: NoticeKind,
        options: NoticeOptions<P>,
        handle: NoticeHandle,
    ) -> Self
    where
        P: Default,
    {
        Self {
            id,
            title: options.title,
            message: options.message,
            details: options.details,
            kind,
            is_silent: options.is_silent,
            persistent: options.persistent,
            component: options.component,
            extra_props: options.extra_props.unwrap_or_default(),
            timestamp: options.timestamp.unwrap_or_else(SystemTime::now),
            delete_delay: Duration::ZERO,
            handle,
        }
    }

    pub fn handle(&self) -> &NoticeHandle {
        &self.handle
    }

    pub fn close(&self, delay_deleting: bool) {
        self.handle.close(delay_deleting);
    }

    pub fn show_details(&self) {
        self.handle.show_details();
    }

    pub fn is_closing(&self) -> bool {
        !self.delete_delay.is_zero()
    }
}

/// Creation options for a notice
#[derive(Debug, Clone)]
pub struct NoticeOptions<P = Props> {
    pub title: String,
    pub message: String,
    pub details: Option<Value>,
    pub is_silent: bool,
    pub persistent: bool,
    pub component: Option<Component>,
    pub extra_props: Option<P>,
    pub timestamp: Option<SystemTime>,
    /// Overrides the type chosen by the custom and process wrappers
    pub kind: Option<NoticeKind>,
}

impl<P> Default for NoticeOptions<P> {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            details: None,
            is_silent: false,
            persistent: false,
            component: None,
            extra_props: None,
            timestamp: None,
            kind: None,
        }
    }
}

impl<P> NoticeOptions<P> {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn silent(mut self, is_silent: bool) -> Self {
        self.is_silent = is_silent;
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    pub fn extra_props(mut self, props: P) -> Self {
        self.extra_props = Some(props);
        self
    }

    pub fn timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn kind(mut self, kind: NoticeKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u32, Option<bool>)>>);

    impl NoticeControl for Recorder {
        fn close(&self, id: u32, delay_deleting: bool) {
            self.0.lock().unwrap().push((id, Some(delay_deleting)));
        }

        fn show_details(&self, id: u32) {
            self.0.lock().unwrap().push((id, None));
        }
    }

    fn detached_handle(id: u32) -> NoticeHandle {
        let control: Arc<dyn NoticeControl> = Arc::new(Recorder::default());
        NoticeHandle::new(id, Arc::downgrade(&control))
    }

    #[test]
    fn test_from_options_fills_defaults() {
        let options: NoticeOptions = NoticeOptions::new("Saved", "All changes written");
        let notice = Notice::from_options(7, NoticeKind::Success, options, detached_handle(7));

        assert_eq!(notice.id, 7);
        assert_eq!(notice.title, "Saved");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert!(!notice.is_silent);
        assert!(!notice.persistent);
        assert!(notice.extra_props.state.is_none());
        assert!(notice.extra_props.values.is_empty());
        assert_eq!(notice.delete_delay, Duration::ZERO);
        assert!(!notice.is_closing());
    }

    #[test]
    fn test_from_options_keeps_explicit_timestamp() {
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let options: NoticeOptions = NoticeOptions::new("Old", "").timestamp(when);
        let notice = Notice::from_options(1, NoticeKind::Info, options, detached_handle(1));
        assert_eq!(notice.timestamp, when);
    }

    #[test]
    fn test_handle_forwards_to_control() {
        let recorder = Arc::new(Recorder::default());
        let control: Arc<dyn NoticeControl> = recorder.clone();
        let handle = NoticeHandle::new(3, Arc::downgrade(&control));

        handle.close(true);
        handle.close(false);
        handle.show_details();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![(3, Some(true)), (3, Some(false)), (3, None)]
        );
    }

    #[test]
    fn test_handle_without_manager_is_noop() {
        let handle = detached_handle(9);
        // Recorder was dropped with the temporary Arc
        handle.close(true);
        handle.show_details();
        assert_eq!(handle.id(), 9);
        assert!(format!("{:?}", handle).contains("attached: false"));
    }

    #[test]
    fn test_props_process_slot() {
        let mut props = Props::default().with_value("icon", Value::from("spinner"));
        assert!(props.process().is_none());

        let controller = ProcessController::new();
        props.set_process(controller.clone());
        assert!(props.process().unwrap().ptr_eq(&controller));
        assert_eq!(props.values["icon"], "spinner");
    }
}
