//! Process exit codes. Schedulers key alerting off these.

pub const SUCCESS: i32 = 0;
pub const CYCLE_FAILED: i32 = 1; // Fetch, parse or snapshot save failed
pub const CONFIG_ERROR: i32 = 2; // Configuration missing or invalid
pub const SESSION_EXPIRED: i32 = 3; // Source rejected the session cookie
