use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub mod encoders;

/// Milliseconds since the Unix epoch.
pub fn current_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
