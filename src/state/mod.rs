pub mod notifications;
pub mod store;

pub use notifications::{Builder, NoticeCenter, ProcessNotification};
pub use store::{OrderedStore, StoreError};
