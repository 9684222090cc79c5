//! Application constants
//!
//! Centralized defaults for the bridge, the poller, persisted preferences and
//! user-facing messages.

/// Request bridge defaults
pub mod bridge {
    /// Resource name used when none is configured
    pub const DEFAULT_RESOURCE: &str = "admin-panel";

    /// Request timeout applied when a call does not specify one (milliseconds)
    ///
    /// Every call gets the same deadline unless it overrides it; 0 in the
    /// configuration disables the default entirely.
    pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

    /// Maximum number of bytes of a host error body kept in `HostError`
    pub const ERROR_BODY_LIMIT: usize = 256;
}

/// Live-data polling defaults
pub mod poll {
    /// Delay between the end of one poll cycle and the start of the next (milliseconds)
    pub const DEFAULT_INTERVAL_MS: u64 = 5000;
}

/// Persisted preference defaults
pub mod prefs {
    /// Preference file used when none is configured
    pub const DEFAULT_PATH: &str = "./nui_prefs.toml";
}

/// View state and notice constants
pub mod view {
    /// Duration to show toast notices (seconds)
    pub const NOTICE_DURATION_SECS: i64 = 4;
}

/// User-facing message strings
pub mod messages {
    /// Placeholder shown before the first response arrives
    pub const LOADING: &str = "Loading...";

    /// Placeholder shown when the host returned an empty collection
    pub const NO_DATA: &str = "No data";

    /// Placeholder shown when the first load failed
    pub const LOAD_FAILED: &str = "Loading failed";

    /// Toast title for host/network failures
    pub const HOST_UNREACHABLE: &str = "Server unreachable";

    /// Toast title for logical failures (`success: false`)
    pub const REQUEST_REJECTED: &str = "Request failed";
}
