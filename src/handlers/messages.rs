use notice_center_util::CloseReason;
use std::time::Duration;

/// Lifecycle events emitted by the notice manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A notice was inserted into the store
    Added(u32),
    /// A notice started its delayed close and should animate out
    Closing { id: u32, delay: Duration },
    /// A notice left the store
    Removed { id: u32, reason: CloseReason },
    /// The presentation layer should show this notice's details
    ShowDetails(u32),
    /// Every notice was dropped at once
    Cleared,
}

impl Event {
    /// Identifier of the notice the event refers to, if any
    pub fn id(&self) -> Option<u32> {
        match self {
            Event::Added(id)
            | Event::Closing { id, .. }
            | Event::Removed { id, .. }
            | Event::ShowDetails(id) => Some(*id),
            Event::Cleared => None,
        }
    }
}
