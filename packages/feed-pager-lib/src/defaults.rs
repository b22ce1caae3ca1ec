pub const LOG_LEVEL: &str = "info";
pub const VERBOSE: bool = false;

/// Edges requested per page, matching the drafts and comments feeds.
pub const PAGE_SIZE: u32 = 10;

pub const FETCH_RETRY_ATTEMPTS: usize = 3;
pub const INITIAL_RETRY_DELAY_MS: u64 = 250;

pub const LIVE_UPDATES_ENABLED: bool = true;
pub const LIVE_CHANNEL_CAPACITY: usize = 64;
