// NexusHealth - platform/appearance.rs
//
// Read-only access to the host's "prefers dark" colour-scheme signal.
//
// Desktop environments expose this differently; `EnvProbe` checks, in order:
//   1. NEXUSHEALTH_PREFERS_DARK (explicit override: 1/0, true/false, dark/light)
//   2. GTK_THEME with a ":dark" variant or "-dark" suffix
//   3. COLORFGBG ("fg;bg"): background colour index 0-6 or 8 is dark
// A probe returning `None` means "unknown"; callers keep their last value.

use crate::core::model::ResolvedTheme;
use crate::util::constants::PREFERS_DARK_ENV;

/// Source of the OS colour-scheme signal.
pub trait AppearanceProbe: Send + Sync {
    /// `Some(true)` when the host prefers dark, `None` when it cannot tell.
    fn prefers_dark(&self) -> Option<bool>;

    /// Signal as a display mode, defaulting to light when unknown.
    fn signal(&self) -> ResolvedTheme {
        ResolvedTheme::from_prefers_dark(self.prefers_dark().unwrap_or(false))
    }
}

/// Environment-variable based probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProbe;

impl AppearanceProbe for EnvProbe {
    fn prefers_dark(&self) -> Option<bool> {
        let var = |name: &str| std::env::var(name).ok();
        detect(
            var(PREFERS_DARK_ENV).as_deref(),
            var("GTK_THEME").as_deref(),
            var("COLORFGBG").as_deref(),
        )
    }
}

/// Probe with a fixed answer (CLI override, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub Option<bool>);

impl AppearanceProbe for FixedProbe {
    fn prefers_dark(&self) -> Option<bool> {
        self.0
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "dark" => Some(true),
        "0" | "false" | "no" | "light" => Some(false),
        _ => None,
    }
}

/// Pure detection over the three environment values.
fn detect(
    override_flag: Option<&str>,
    gtk_theme: Option<&str>,
    colorfgbg: Option<&str>,
) -> Option<bool> {
    if let Some(flag) = override_flag.and_then(parse_flag) {
        return Some(flag);
    }

    if let Some(theme) = gtk_theme {
        let theme = theme.to_lowercase();
        if !theme.is_empty() {
            return Some(theme.ends_with(":dark") || theme.ends_with("-dark"));
        }
    }

    // Last field is the background colour index.
    colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .map(|bg| bg <= 6 || bg == 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(detect(Some("1"), Some("Adwaita"), Some("0;15")), Some(true));
        assert_eq!(detect(Some("light"), Some("Adwaita:dark"), None), Some(false));
    }

    #[test]
    fn test_unparseable_override_falls_through() {
        assert_eq!(detect(Some("maybe"), Some("Adwaita:dark"), None), Some(true));
    }

    #[test]
    fn test_gtk_theme_variants() {
        assert_eq!(detect(None, Some("Adwaita:dark"), None), Some(true));
        assert_eq!(detect(None, Some("Arc-Dark"), None), Some(true));
        assert_eq!(detect(None, Some("Adwaita"), None), Some(false));
    }

    #[test]
    fn test_colorfgbg_background_index() {
        assert_eq!(detect(None, None, Some("15;0")), Some(true));
        assert_eq!(detect(None, None, Some("0;default;15")), Some(false));
        assert_eq!(detect(None, None, Some("garbage")), None);
    }

    #[test]
    fn test_unknown_signal_defaults_to_light() {
        assert_eq!(FixedProbe(None).signal(), ResolvedTheme::Light);
        assert_eq!(FixedProbe(Some(true)).signal(), ResolvedTheme::Dark);
    }
}
