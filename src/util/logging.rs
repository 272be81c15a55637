// NexusHealth - util/logging.rs
//
// tracing-subscriber setup for the CLI host and any embedding loop.
//
// Level selection, highest priority first:
//   RUST_LOG  >  --debug  >  [logging] level in config.toml  >  "info"
//
// Output goes to stderr so command output on stdout stays clean. Bearer
// tokens and passwords are never passed to a tracing macro anywhere in
// the crate; keep it that way.

use super::constants::{APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL};
use tracing_subscriber::EnvFilter;

/// HTTP client internals are chatty at debug; keep them at warn unless
/// RUST_LOG asks for them explicitly.
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

/// Filter directive for the given inputs, or `None` to defer to RUST_LOG.
fn directive(rust_log_set: bool, debug_flag: bool, config_level: Option<&str>) -> Option<String> {
    if rust_log_set {
        return None;
    }
    let level = if debug_flag {
        "debug"
    } else {
        config_level.unwrap_or(DEFAULT_LOG_LEVEL)
    };
    Some(format!("{level},{QUIET_DEPENDENCIES}"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let rust_log_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = match directive(rust_log_set, debug_flag, config_level) {
        Some(d) => EnvFilter::new(d),
        None => EnvFilter::from_default_env(),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug_flag)
        .with_file(debug_flag)
        .with_line_number(debug_flag)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(app = APP_NAME, version = APP_VERSION, "Logging ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins() {
        assert_eq!(directive(true, true, Some("trace")), None);
    }

    #[test]
    fn test_debug_flag_beats_config() {
        let d = directive(false, true, Some("warn")).unwrap();
        assert!(d.starts_with("debug,"));
    }

    #[test]
    fn test_config_level_then_default() {
        assert!(directive(false, false, Some("warn")).unwrap().starts_with("warn,"));
        assert!(directive(false, false, None).unwrap().starts_with("info,"));
    }

    #[test]
    fn test_http_stack_is_quietened() {
        let d = directive(false, true, None).unwrap();
        assert!(d.contains("reqwest=warn"));
    }
}
