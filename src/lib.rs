//! In-memory lifecycle management for user-facing notices
//!
//! [`NoticeCenter`] assigns identifiers, keeps notices in creation order,
//! evicts the oldest transient notice once the pool is full, caps the number
//! of persistent notices, and runs the delayed close that lets a notice
//! animate out before it leaves state.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::NoticeError;
pub use handlers::{DiagnosticSink, Event, TracingSink};
pub use state::{Builder, NoticeCenter, OrderedStore, ProcessNotification, StoreError};

pub use notice_center_config::{NoticesConfig, Setting, SettingsProvider};
pub use notice_center_util::{
    CloseReason, Component, DetailedError, ErrorDetails, Exception, Notice, NoticeHandle,
    NoticeKind, NoticeOptions, ProcessController, ProcessProps, ProcessState, ProcessStatus,
    Props,
};
