//! Database utility functions.

use chrono::Utc;

/// Get the current UTC datetime as a sortable string.
///
/// Microsecond precision so that two writes in quick succession still
/// produce strictly increasing `updated_at` values.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
