/// Configuration constants for the application
pub mod config {
    use std::time::Duration;

    /// Name shown in the window title and tooltip
    pub const APP_NAME: &str = "K8s Tray";

    /// Settings file kept in the user's home directory
    pub const CONFIG_FILE_NAME: &str = ".k8s-tray.yaml";

    /// Persisted value meaning "every namespace"
    pub const ALL_NAMESPACES: &str = "<all>";

    /// Lower bound for the poll interval
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Upper bound for the poll interval
    pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

    /// Intervals offered in the settings menu
    pub const INTERVAL_PRESETS: &[Duration] = &[
        Duration::from_secs(5),
        Duration::from_secs(10),
        Duration::from_secs(15),
        Duration::from_secs(30),
        Duration::from_secs(60),
        Duration::from_secs(2 * 60),
        Duration::from_secs(5 * 60),
    ];

    /// Clamps a poll interval into the supported range.
    pub fn clamp_interval(interval: Duration) -> Duration {
        interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
    }
}

/// Utility functions for time and age calculations
pub mod time_utils {
    use std::time::Duration;

    /// Formats a duration in seconds into a human-readable string (e.g., "2d", "5h", "30m")
    pub fn format_duration(seconds: u64) -> String {
        if seconds < 60 {
            format!("{}s", seconds)
        } else if seconds < 3600 {
            format!("{}m", seconds / 60)
        } else if seconds < 86400 {
            format!("{}h", seconds / 3600)
        } else {
            format!("{}d", seconds / 86400)
        }
    }

    /// Compact age of a pod, e.g. "3h"
    pub fn format_age(age: Duration) -> String {
        format_duration(age.as_secs())
    }

    /// Label for a poll interval as shown in the settings menu ("5 seconds", "1 minute")
    pub fn interval_label(interval: Duration) -> String {
        let secs = interval.as_secs();
        let (value, unit) = if secs >= 60 && secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };
        if value == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", value, unit)
        }
    }
}

pub use time_utils::{format_age, interval_label};
