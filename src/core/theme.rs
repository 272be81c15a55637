// NexusHealth - core/theme.rs
//
// Pure theme resolution. The stateful resolver that persists and
// publishes lives in app/theme.rs.

use crate::core::model::{ResolvedTheme, ThemePreference};

/// Resolve a preference against the OS signal.
///
/// An explicit light/dark preference always wins; `System` defers to the OS.
pub fn resolve(preference: ThemePreference, os_signal: ResolvedTheme) -> ResolvedTheme {
    match preference {
        ThemePreference::Light => ResolvedTheme::Light,
        ThemePreference::Dark => ResolvedTheme::Dark,
        ThemePreference::System => os_signal,
    }
}

/// Next preference in the toggle cycle: light -> dark -> system -> light.
pub fn next(preference: ThemePreference) -> ThemePreference {
    match preference {
        ThemePreference::Light => ThemePreference::Dark,
        ThemePreference::Dark => ThemePreference::System,
        ThemePreference::System => ThemePreference::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNALS: [ResolvedTheme; 2] = [ResolvedTheme::Light, ResolvedTheme::Dark];

    #[test]
    fn test_resolve_covers_every_pair() {
        for &os in &SIGNALS {
            for &pref in ThemePreference::all() {
                let expected = match pref {
                    ThemePreference::System => os,
                    ThemePreference::Light => ResolvedTheme::Light,
                    ThemePreference::Dark => ResolvedTheme::Dark,
                };
                let first = resolve(pref, os);
                assert_eq!(first, expected, "pref={pref} os={os}");
                // Stable under repetition.
                assert_eq!(resolve(pref, os), first);
            }
        }
    }

    #[test]
    fn test_cycle_visits_all_three_and_returns() {
        let start = ThemePreference::Light;
        let one = next(start);
        let two = next(one);
        assert_eq!(one, ThemePreference::Dark);
        assert_eq!(two, ThemePreference::System);
        assert_eq!(next(two), start);
    }
}
