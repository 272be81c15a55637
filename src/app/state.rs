// NexusHealth - app/state.rs
//
// Shell composition. Owns the theme resolver, session store and navigation
// controller plus the two background managers, and keeps them in step:
// every successful login, registration or restore moves navigation to the
// signed-in role; every logout (explicit or after a rejected restore)
// returns it to the login entry point.
//
// Owned by the host loop. Nothing here blocks except `restore_now` and
// `wait_restore`, which exist for one-shot hosts such as the CLI.

use crate::app::appearance_watch::AppearanceWatcher;
use crate::app::navigation::{NavOutcome, NavigationController};
use crate::app::restore::{RestoreManager, RestoreMessage};
use crate::app::session::{RestoreOutcome, SessionOptions, SessionStore};
use crate::app::theme::ThemeResolver;
use crate::core::model::{Identity, ResolvedTheme, SectionId, ThemeChange};
use crate::platform::api::{AuthApi, Credentials, Registration};
use crate::platform::appearance::AppearanceProbe;
use crate::platform::config::AppConfig;
use crate::platform::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::util::error::{AuthError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Something that happened in the background and was applied by `poll`.
#[derive(Debug)]
pub enum ShellEvent {
    /// The stored token was confirmed; the identity is signed in.
    SessionRestored(Identity),
    /// The stored token was rejected; stored session state was cleared.
    SessionRestoreFailed(AuthError),
    /// A restore finished after an explicit login or logout and was ignored.
    SessionRestoreDiscarded,
    /// The OS colour scheme changed.
    OsSignalChanged {
        signal: ResolvedTheme,
        theme: ThemeChange,
    },
}

pub struct AppState {
    config: AppConfig,
    api: Arc<dyn AuthApi>,
    probe: Arc<dyn AppearanceProbe>,
    theme: ThemeResolver,
    session: SessionStore,
    navigation: NavigationController,
    restore: RestoreManager,
    watcher: AppearanceWatcher,
}

/// Open durable storage under `data_dir`, or fall back to an in-memory
/// store for this process when the directory cannot be used.
pub fn open_store(data_dir: &Path) -> Arc<dyn KeyValueStore> {
    match FileStore::open(data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Client storage unavailable; state will not survive restart"
            );
            Arc::new(MemoryStore::new())
        }
    }
}

impl AppState {
    /// Build all services over `store`. No background work starts here.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn AuthApi>,
        probe: Arc<dyn AppearanceProbe>,
        config: AppConfig,
    ) -> Self {
        let theme = ThemeResolver::init(Arc::clone(&store), probe.signal());
        let session = SessionStore::init(
            store,
            SessionOptions {
                history_limit: config.history_limit,
                device_label: config.device_label.clone(),
                network_address: config.network_address.clone(),
            },
        );

        Self {
            config,
            api,
            probe,
            theme,
            session,
            navigation: NavigationController::new(),
            restore: RestoreManager::new(),
            watcher: AppearanceWatcher::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn theme(&self) -> &ThemeResolver {
        &self.theme
    }

    /// Theme changes do not affect the other services, so direct access is
    /// safe.
    pub fn theme_mut(&mut self) -> &mut ThemeResolver {
        &mut self.theme
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn is_restore_pending(&self) -> bool {
        self.restore.is_pending()
    }

    pub fn is_watching_appearance(&self) -> bool {
        self.watcher.is_active()
    }

    // -------------------------------------------------------------------------
    // Background work
    // -------------------------------------------------------------------------

    /// Start validating the stored token in the background. Returns false
    /// when there is no token to validate.
    pub fn start_restore(&mut self) -> bool {
        let Some(token) = self.session.token().map(str::to_string) else {
            return false;
        };
        self.restore
            .start(Arc::clone(&self.api), token, self.session.epoch());
        true
    }

    /// Start following the OS colour scheme.
    pub fn start_appearance_watch(&mut self) {
        self.watcher.start(
            Arc::clone(&self.probe),
            self.theme.os_signal(),
            Duration::from_millis(self.config.appearance_poll_ms),
        );
    }

    /// Apply whatever background results have arrived. Never blocks.
    pub fn poll(&mut self) -> Vec<ShellEvent> {
        let mut events = Vec::new();
        if let Some(msg) = self.restore.poll() {
            events.push(self.apply_restore(msg));
        }
        for signal in self.watcher.poll_changes() {
            events.push(self.apply_os_signal(signal));
        }
        events
    }

    /// Block up to `timeout` for a pending restore and apply it.
    pub fn wait_restore(&mut self, timeout: Duration) -> Option<ShellEvent> {
        let msg = self.restore.wait(timeout)?;
        Some(self.apply_restore(msg))
    }

    /// Block up to `timeout` for the next OS colour-scheme change and apply it.
    pub fn wait_os_signal(&mut self, timeout: Duration) -> Option<ShellEvent> {
        let signal = self.watcher.wait_change(timeout)?;
        Some(self.apply_os_signal(signal))
    }

    fn apply_restore(&mut self, msg: RestoreMessage) -> ShellEvent {
        match self.session.apply_restore(msg.started_epoch, msg.result) {
            RestoreOutcome::Restored(identity) => {
                self.navigation.on_authenticated(identity.role.clone());
                ShellEvent::SessionRestored(identity)
            }
            RestoreOutcome::Failed(e) => {
                self.navigation.on_logged_out();
                ShellEvent::SessionRestoreFailed(e)
            }
            RestoreOutcome::NoToken | RestoreOutcome::Superseded => {
                ShellEvent::SessionRestoreDiscarded
            }
        }
    }

    fn apply_os_signal(&mut self, signal: ResolvedTheme) -> ShellEvent {
        self.theme.on_os_signal(signal);
        ShellEvent::OsSignalChanged {
            signal,
            theme: self.theme.current(),
        }
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub fn login(&mut self, credentials: &Credentials) -> Result<Identity> {
        let identity = self.session.login(self.api.as_ref(), credentials)?;
        self.navigation.on_authenticated(identity.role.clone());
        Ok(identity)
    }

    pub fn register(&mut self, registration: &Registration) -> Result<Identity> {
        let identity = self.session.register(self.api.as_ref(), registration)?;
        self.navigation.on_authenticated(identity.role.clone());
        Ok(identity)
    }

    /// Sign out; returns the id of the history record that was closed.
    pub fn logout(&mut self) -> Option<String> {
        let flipped = self.session.logout();
        self.navigation.on_logged_out();
        flipped
    }

    /// Validate the stored token on the calling thread.
    pub fn restore_now(&mut self) -> Result<Option<Identity>> {
        match self.session.restore_session(self.api.as_ref()) {
            Ok(Some(identity)) => {
                self.navigation.on_authenticated(identity.role.clone());
                Ok(Some(identity))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.navigation.on_logged_out();
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn set_active_tab(&mut self, id: SectionId) -> NavOutcome {
        self.navigation.set_active_tab(id)
    }

    /// Stop background work and disconnect theme subscribers.
    pub fn dispose(&mut self) {
        self.watcher.stop();
        self.theme.dispose();
        tracing::debug!("Shell state disposed");
    }
}
