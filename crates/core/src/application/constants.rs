// Coordinator constants (no magic values)

/// Attempts at the optimistic write before giving up with Conflict
pub const DEFAULT_MAX_SWAP_ATTEMPTS: u32 = 5;

/// Base backoff between lost swaps (5ms, doubled per attempt)
pub const DEFAULT_SWAP_BASE_DELAY_MS: u64 = 5;

/// Longest free-text note (student or mentor) we accept
pub const MAX_NOTE_LENGTH: usize = 500;

/// Buffered announcements per subscriber before it starts lagging
pub const DEFAULT_NOTIFY_CAPACITY: usize = 256;

/// Idle per-queue locks are pruned once the table grows past this size
pub const LOCK_TABLE_PRUNE_THRESHOLD: usize = 1024;
