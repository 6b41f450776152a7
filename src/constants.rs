// Constants module for notice-center
// Centralizes magic numbers for better maintainability

use std::time::Duration;

// ============================================================================
// Lifecycle Constants
// ============================================================================

/// Time a closing notice stays in state before it is physically removed
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_millis(1000);

/// First identifier handed out by a fresh manager
pub(crate) const FIRST_NOTICE_ID: u32 = 0;

// ============================================================================
// Channel and Buffer Constants
// ============================================================================

/// Buffer size for the lifecycle event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Initial capacity for the notice store
pub(crate) const INITIAL_STORE_CAPACITY: usize = 16;
