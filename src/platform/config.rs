// NexusHealth - platform/config.rs
//
// Platform data directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Resolved platform paths for NexusHealth configuration and client storage.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/nexushealth/).
    pub config_dir: PathBuf,

    /// Durable client storage (theme, token, login history).
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub api: ApiSection,
    pub ui: UiSection,
    pub session: SessionSection,
    pub logging: LoggingSection,
}

/// `[api]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the auth API, e.g. "https://hms.example.org/api".
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Use the built-in offline demo accounts instead of the API.
    pub demo_mode: Option<bool>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// How often the OS colour scheme is polled, in ms.
    pub appearance_poll_ms: Option<u64>,
}

/// `[session]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Number of most-recent login records kept.
    pub history_limit: Option<usize>,
    /// Label stored on each login record, e.g. "Ward 3 terminal".
    pub device_label: Option<String>,
    /// IP address of this terminal, stored on each login record.
    pub network_address: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- API --
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub demo_mode: bool,

    // -- UI --
    pub appearance_poll_ms: u64,

    // -- Session --
    pub history_limit: usize,
    pub device_label: Option<String>,
    pub network_address: Option<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            api_timeout_secs: constants::DEFAULT_API_TIMEOUT_SECS,
            demo_mode: false,
            appearance_poll_ms: constants::DEFAULT_APPEARANCE_POLL_MS,
            history_limit: constants::DEFAULT_HISTORY_LIMIT,
            device_label: None,
            network_address: None,
            log_level: None,
        }
    }
}

/// Path of config.toml inside `config_dir`.
pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(constants::CONFIG_FILE_NAME)
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unparseable, returns defaults with a warning; the
/// application still starts.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let path = config_path(config_dir);
    let mut warnings: Vec<String> = Vec::new();

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: path.clone(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: path.clone(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %path.display(), "Loaded config.toml");
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Warning text for a numeric value outside its allowed range.
fn out_of_range(field: &str, value: impl ToString, min: u64, max: u64, default: u64) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    format!("{err}. Using default ({default}).")
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- API: base_url --
    if let Some(url) = raw.api.base_url {
        let trimmed = url.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            config.api_base_url = trimmed.trim_end_matches('/').to_string();
        } else {
            warnings.push(format!(
                "[api] base_url = \"{url}\" must start with http:// or https://. Using default ({}).",
                constants::DEFAULT_API_BASE_URL,
            ));
        }
    }

    // -- API: timeout_secs --
    if let Some(secs) = raw.api.timeout_secs {
        if (constants::MIN_API_TIMEOUT_SECS..=constants::MAX_API_TIMEOUT_SECS).contains(&secs) {
            config.api_timeout_secs = secs;
        } else {
            warnings.push(out_of_range(
                "api.timeout_secs",
                secs,
                constants::MIN_API_TIMEOUT_SECS,
                constants::MAX_API_TIMEOUT_SECS,
                constants::DEFAULT_API_TIMEOUT_SECS,
            ));
        }
    }

    if let Some(demo) = raw.api.demo_mode {
        config.demo_mode = demo;
    }

    // -- UI: appearance_poll_ms --
    if let Some(ms) = raw.ui.appearance_poll_ms {
        if (constants::MIN_APPEARANCE_POLL_MS..=constants::MAX_APPEARANCE_POLL_MS).contains(&ms) {
            config.appearance_poll_ms = ms;
        } else {
            warnings.push(out_of_range(
                "ui.appearance_poll_ms",
                ms,
                constants::MIN_APPEARANCE_POLL_MS,
                constants::MAX_APPEARANCE_POLL_MS,
                constants::DEFAULT_APPEARANCE_POLL_MS,
            ));
        }
    }

    // -- Session: history_limit --
    if let Some(limit) = raw.session.history_limit {
        if (constants::MIN_HISTORY_LIMIT..=constants::MAX_HISTORY_LIMIT).contains(&limit) {
            config.history_limit = limit;
        } else {
            warnings.push(out_of_range(
                "session.history_limit",
                limit,
                constants::MIN_HISTORY_LIMIT as u64,
                constants::MAX_HISTORY_LIMIT as u64,
                constants::DEFAULT_HISTORY_LIMIT as u64,
            ));
        }
    }

    // -- Session: device_label --
    if let Some(label) = raw.session.device_label {
        let label = label.trim();
        if !label.is_empty() {
            config.device_label = Some(label.to_string());
        }
    }

    // -- Session: network_address --
    if let Some(address) = raw.session.network_address {
        let address = address.trim();
        match address.parse::<IpAddr>() {
            Ok(ip) => config.network_address = Some(ip.to_string()),
            Err(_) if address.is_empty() => {}
            Err(_) => warnings.push(format!(
                "[session] network_address = \"{address}\" is not an IP address; ignoring it."
            )),
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let normalised = level.trim().to_lowercase();
        if LOG_LEVELS.contains(&normalised.as_str()) {
            config.log_level = Some(normalised);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not one of {}. Using default ({}).",
                LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    config
}
