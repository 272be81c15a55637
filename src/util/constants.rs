// NexusHealth - util/constants.rs
//
// Single source of truth for named constants, limits, defaults and
// storage keys.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "NexusHealth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "NexusHealth";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Durable storage keys
// =============================================================================

/// Raw theme preference ("light" / "dark" / "system").
pub const THEME_STORAGE_KEY: &str = "theme";

/// Login/logout history log.
pub const HISTORY_STORAGE_KEY: &str = "login_history";

/// Cached identity of the signed-in user.
pub const USER_STORAGE_KEY: &str = "user";

/// Bearer token issued by the auth API.
pub const TOKEN_STORAGE_KEY: &str = "token";

// =============================================================================
// Session history retention
// =============================================================================

/// Default number of most-recent session records kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Smallest history cap accepted from config.
pub const MIN_HISTORY_LIMIT: usize = 10;

/// Largest history cap accepted from config.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

// =============================================================================
// Navigation
// =============================================================================

/// Section shown after login and whenever the active tab is not visible.
pub const DEFAULT_SECTION: &str = "dashboard";

// =============================================================================
// Theme
// =============================================================================

/// Browser-chrome colour applied with the dark theme.
pub const DARK_CHROME_COLOUR: &str = "#020617";

/// Browser-chrome colour applied with the light theme.
pub const LIGHT_CHROME_COLOUR: &str = "#f8fafc";

/// Environment override for the OS "prefers dark" signal ("1"/"0", "true"/"false").
pub const PREFERS_DARK_ENV: &str = "NEXUSHEALTH_PREFERS_DARK";

/// Default interval between OS appearance probes.
pub const DEFAULT_APPEARANCE_POLL_MS: u64 = 2_000;

/// Bounds for the appearance poll interval.
pub const MIN_APPEARANCE_POLL_MS: u64 = 100;
pub const MAX_APPEARANCE_POLL_MS: u64 = 60_000;

/// The watcher sleeps in slices of this length so cancellation is prompt.
pub const APPEARANCE_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

// =============================================================================
// External API
// =============================================================================

/// Default base URL of the auth API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

/// Bounds for the request timeout.
pub const MIN_API_TIMEOUT_SECS: u64 = 1;
pub const MAX_API_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";
