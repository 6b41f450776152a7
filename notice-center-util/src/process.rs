//! Progress tracking for long-running operations shown as notices
//!
//! A [`ProcessController`] is a cheap-to-clone handle. The caller drives it
//! while the notice that carries it only observes, so the controller's state
//! is independent of whether the notice is still alive.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl ProcessStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, ProcessStatus::Succeeded | ProcessStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessState {
    pub title: String,
    pub message: String,
    pub status: ProcessStatus,
    /// Completion in the 0.0-1.0 range, `None` when indeterminate
    pub progress: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ProcessController {
    state: Arc<watch::Sender<ProcessState>>,
}

impl ProcessController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProcessState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Reset the controller to describe a freshly created notice.
    pub fn init(&self, title: &str, message: &str) {
        self.state.send_modify(|s| {
            s.title = title.to_string();
            s.message = message.to_string();
            s.status = ProcessStatus::Idle;
            s.progress = None;
        });
    }

    pub fn start(&self) {
        self.state.send_modify(|s| s.status = ProcessStatus::Running);
    }

    /// Report completion. Values are clamped to 0.0-1.0; NaN clears the progress.
    pub fn set_progress(&self, progress: f32) {
        let progress = if progress.is_nan() {
            None
        } else {
            Some(progress.clamp(0.0, 1.0))
        };
        self.state.send_modify(|s| s.progress = progress);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| s.message = message);
    }

    pub fn succeed(&self, message: Option<String>) {
        self.finish(ProcessStatus::Succeeded, message);
    }

    pub fn fail(&self, message: Option<String>) {
        self.finish(ProcessStatus::Failed, message);
    }

    fn finish(&self, status: ProcessStatus, message: Option<String>) {
        self.state.send_modify(|s| {
            if s.status.is_finished() {
                tracing::debug!("Process '{}' already finished as {:?}", s.title, s.status);
                return;
            }
            s.status = status;
            if status == ProcessStatus::Succeeded {
                s.progress = Some(1.0);
            }
            if let Some(message) = message {
                s.message = message;
            }
        });
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ProcessState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().status.is_finished()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.state.subscribe()
    }

    /// Whether both handles drive the same process
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for ProcessController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_sets_title_and_message() {
        let controller = ProcessController::new();
        controller.init("Upload", "Sending files");

        let state = controller.state();
        assert_eq!(state.title, "Upload");
        assert_eq!(state.message, "Sending files");
        assert_eq!(state.status, ProcessStatus::Idle);
        assert_eq!(state.progress, None);
    }

    #[test]
    fn test_progress_is_clamped() {
        let controller = ProcessController::new();
        controller.set_progress(1.5);
        assert_eq!(controller.state().progress, Some(1.0));

        controller.set_progress(-0.5);
        assert_eq!(controller.state().progress, Some(0.0));

        controller.set_progress(f32::NAN);
        assert_eq!(controller.state().progress, None);
    }

    #[test]
    fn test_lifecycle() {
        let controller = ProcessController::new();
        controller.init("Build", "");
        controller.start();
        assert_eq!(controller.state().status, ProcessStatus::Running);
        assert!(!controller.is_finished());

        controller.succeed(Some("Done".to_string()));
        let state = controller.state();
        assert_eq!(state.status, ProcessStatus::Succeeded);
        assert_eq!(state.progress, Some(1.0));
        assert_eq!(state.message, "Done");
    }

    #[test]
    fn test_finished_process_ignores_later_outcome() {
        let controller = ProcessController::new();
        controller.fail(Some("Timed out".to_string()));
        controller.succeed(None);

        let state = controller.state();
        assert_eq!(state.status, ProcessStatus::Failed);
        assert_eq!(state.message, "Timed out");
    }

    #[test]
    fn test_clones_share_state() {
        let controller = ProcessController::new();
        let clone = controller.clone();
        let mut rx = controller.subscribe();

        clone.set_message("halfway");
        assert!(controller.ptr_eq(&clone));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().message, "halfway");
        assert!(!ProcessController::new().ptr_eq(&controller));
    }
}
