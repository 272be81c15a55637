// NexusHealth - app/theme.rs
//
// Theme resolver service: owns the user's preference and the latest OS
// signal, keeps exactly one resolved theme, persists the raw preference
// and publishes changes to subscribers over mpsc channels.
//
// Storage is best-effort. A missing or unreadable preference starts the
// session on `System`; failed writes are logged and the in-memory value
// stays authoritative. No operation here returns an error.

use crate::core::model::{ResolvedTheme, ThemeChange, ThemePreference};
use crate::core::theme;
use crate::platform::storage::{self, KeyValueStore};
use crate::util::constants::THEME_STORAGE_KEY;
use std::sync::{mpsc, Arc};

pub struct ThemeResolver {
    store: Arc<dyn KeyValueStore>,
    preference: ThemePreference,
    os_signal: ResolvedTheme,
    resolved: ResolvedTheme,
    subscribers: Vec<mpsc::Sender<ThemeChange>>,
}

impl ThemeResolver {
    /// Load the stored preference and resolve it against `os_signal`.
    pub fn init(store: Arc<dyn KeyValueStore>, os_signal: ResolvedTheme) -> Self {
        let stored = storage::load_json::<ThemePreference>(store.as_ref(), THEME_STORAGE_KEY);
        let preference = match stored {
            Ok(Some(pref)) => pref,
            Ok(None) => {
                tracing::debug!("No stored theme preference; first run defaults to system");
                ThemePreference::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored theme preference unusable; using system");
                ThemePreference::default()
            }
        };
        let resolved = theme::resolve(preference, os_signal);
        tracing::info!(%preference, %os_signal, %resolved, "Theme initialised");

        Self {
            store,
            preference,
            os_signal,
            resolved,
            subscribers: Vec::new(),
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self) -> ResolvedTheme {
        self.resolved
    }

    /// Last OS signal seen.
    pub fn os_signal(&self) -> ResolvedTheme {
        self.os_signal
    }

    pub fn is_dark(&self) -> bool {
        self.resolved == ResolvedTheme::Dark
    }

    pub fn is_system(&self) -> bool {
        self.preference == ThemePreference::System
    }

    pub fn current(&self) -> ThemeChange {
        ThemeChange {
            preference: self.preference,
            resolved: self.resolved,
        }
    }

    /// Replace the preference, persist it and republish.
    pub fn set_preference(&mut self, preference: ThemePreference) {
        let before = self.current();
        self.preference = preference;
        self.resolved = theme::resolve(self.preference, self.os_signal);
        self.persist();
        if self.current() != before {
            tracing::info!(%preference, resolved = %self.resolved, "Theme preference changed");
            self.publish();
        }
    }

    /// Advance light -> dark -> system -> light. Returns the new preference.
    pub fn cycle_preference(&mut self) -> ThemePreference {
        let next = theme::next(self.preference);
        self.set_preference(next);
        next
    }

    /// Apply a new OS signal. The preference is never touched; repeated
    /// notifications with the same value are ignored.
    pub fn on_os_signal(&mut self, signal: ResolvedTheme) {
        if signal == self.os_signal {
            return;
        }
        self.os_signal = signal;
        let resolved = theme::resolve(self.preference, signal);
        tracing::debug!(%signal, %resolved, "OS colour scheme changed");
        if resolved != self.resolved {
            self.resolved = resolved;
            self.publish();
        }
    }

    /// Receive every subsequent `ThemeChange`.
    pub fn subscribe(&mut self) -> mpsc::Receiver<ThemeChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop all subscribers. Their receivers see a disconnected channel.
    pub fn dispose(&mut self) {
        self.subscribers.clear();
        tracing::debug!("Theme resolver disposed");
    }

    fn persist(&self) {
        // Store the raw preference, not the resolved mode, so `system`
        // keeps tracking the OS after a restart.
        let saved = storage::save_json(self.store.as_ref(), THEME_STORAGE_KEY, &self.preference);
        if let Err(e) = saved {
            tracing::warn!(error = %e, "Failed to persist theme preference; keeping it in memory");
        }
    }

    fn publish(&mut self) {
        let change = self.current();
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }
}
