// NexusHealth - app/session.rs
//
// Session store: the signed-in identity, its bearer token, and the
// login/logout history log.
//
// Design principles:
// - History is kept most-recent-first and persisted after every mutation.
//   Mutations are synchronous, so a repeated logout finds nothing left to
//   flip.
// - Logout only ever flips the newest Active record belonging to the user
//   being signed out. Other users' records are never touched, even when
//   several accounts have signed in on this client.
// - History is capped at `history_limit` records; the oldest are dropped.
// - Storage failures are logged and swallowed; in-memory state stays
//   authoritative for the rest of the process.
// - Every login, registration and logout bumps `epoch`. A background
//   restore started under an older epoch is discarded when it completes.

use crate::core::model::{Identity, SessionRecord, SessionStatus};
use crate::platform::api::{AuthApi, AuthGrant, Credentials, Registration};
use crate::platform::storage::{self, KeyValueStore};
use crate::util::constants::{
    APP_NAME, DEFAULT_HISTORY_LIMIT, HISTORY_STORAGE_KEY, TOKEN_STORAGE_KEY, USER_STORAGE_KEY,
};
use crate::util::error::{AuthError, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Tunables for the session store, usually taken from `AppConfig`.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum number of history records kept.
    pub history_limit: usize,
    /// Label written on each new record.
    pub device_label: Option<String>,
    /// Terminal address written on each new record.
    pub network_address: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            device_label: None,
            network_address: None,
        }
    }
}

/// How a completed restore attempt was applied.
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The token was valid; the identity is now signed in.
    Restored(Identity),
    /// No durable token existed; nothing to restore.
    NoToken,
    /// The token was rejected; the logout cleanup ran.
    Failed(AuthError),
    /// A login or logout happened after the attempt started; result ignored.
    Superseded,
}

pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    options: SessionOptions,
    identity: Option<Identity>,
    /// Identity cached by a previous run, pending restore.
    cached_identity: Option<Identity>,
    token: Option<String>,
    history: Vec<SessionRecord>,
    epoch: u64,
}

impl SessionStore {
    /// Load history, cached identity and token from `store`.
    ///
    /// The store starts unauthenticated; a cached identity only becomes
    /// current after the token is confirmed by `restore_session`.
    pub fn init(store: Arc<dyn KeyValueStore>, options: SessionOptions) -> Self {
        let mut history: Vec<SessionRecord> =
            load_or_default(store.as_ref(), HISTORY_STORAGE_KEY).unwrap_or_default();
        let cached_identity: Option<Identity> = load_or_default(store.as_ref(), USER_STORAGE_KEY);
        let token: Option<String> = load_or_default(store.as_ref(), TOKEN_STORAGE_KEY);

        let limit = options.history_limit.max(1);
        if history.len() > limit {
            history.truncate(limit);
        }

        tracing::info!(
            records = history.len(),
            active = history.iter().filter(|r| r.is_active()).count(),
            has_token = token.is_some(),
            "Session store initialised"
        );

        Self {
            store,
            options,
            identity: None,
            cached_identity,
            token,
            history,
            epoch: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Durable bearer token, if any. Never log this value.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Full history, most recent first.
    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    /// Records still marked Active, most recent first.
    pub fn active_sessions(&self) -> Vec<&SessionRecord> {
        self.history.iter().filter(|r| r.is_active()).collect()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Verify credentials with the API and sign in.
    pub fn login(&mut self, api: &dyn AuthApi, credentials: &Credentials) -> Result<Identity> {
        let grant = api.login(credentials).map_err(|e| {
            tracing::info!(error = %e, "Login failed");
            e
        })?;
        Ok(self.accept_grant(grant))
    }

    /// Create an account with the API and sign in as it.
    pub fn register(&mut self, api: &dyn AuthApi, registration: &Registration) -> Result<Identity> {
        let grant = api.register(registration).map_err(|e| {
            tracing::info!(error = %e, "Registration failed");
            e
        })?;
        Ok(self.accept_grant(grant))
    }

    /// Sign out. Returns the id of the history record that was flipped, if
    /// any. Calling this with nobody signed in only clears stored state.
    pub fn logout(&mut self) -> Option<String> {
        self.epoch += 1;
        let leaving = self.identity.take().or_else(|| self.cached_identity.take());
        self.cached_identity = None;
        self.token = None;

        let flipped = leaving
            .as_ref()
            .and_then(|identity| self.flip_latest_active(&identity.name));

        match (&leaving, &flipped) {
            (Some(identity), Some(record_id)) => {
                tracing::info!(user = %identity.name, record = %record_id, "Logged out")
            }
            (Some(identity), None) => {
                tracing::info!(user = %identity.name, "Logged out; no active record to close")
            }
            (None, _) => tracing::debug!("Logout with no signed-in user"),
        }

        self.remove_key(USER_STORAGE_KEY);
        self.remove_key(TOKEN_STORAGE_KEY);
        self.persist_history();
        flipped
    }

    /// Confirm the durable token with the API (blocking).
    ///
    /// `Ok(None)` when there is no token. On rejection the logout cleanup
    /// runs and the error is returned.
    pub fn restore_session(&mut self, api: &dyn AuthApi) -> Result<Option<Identity>> {
        let Some(token) = self.token.clone() else {
            return Ok(None);
        };
        let epoch = self.epoch;
        match self.apply_restore(epoch, api.me(&token)) {
            RestoreOutcome::Restored(identity) => Ok(Some(identity)),
            RestoreOutcome::NoToken | RestoreOutcome::Superseded => Ok(None),
            RestoreOutcome::Failed(e) => Err(e.into()),
        }
    }

    /// Apply the result of a restore attempt started at `started_epoch`.
    pub fn apply_restore(
        &mut self,
        started_epoch: u64,
        result: std::result::Result<Identity, AuthError>,
    ) -> RestoreOutcome {
        if started_epoch != self.epoch {
            tracing::debug!(
                started_epoch,
                current_epoch = self.epoch,
                "Discarding superseded session restore"
            );
            return RestoreOutcome::Superseded;
        }
        if self.token.is_none() {
            return RestoreOutcome::NoToken;
        }

        match result {
            Ok(identity) => {
                tracing::info!(user = %identity.name, role = %identity.role, "Session restored");
                self.cached_identity = None;
                self.identity = Some(identity.clone());
                self.save_key(USER_STORAGE_KEY, &identity);
                RestoreOutcome::Restored(identity)
            }
            Err(e) => {
                tracing::info!(error = %e, "Stored session is no longer valid");
                self.logout();
                RestoreOutcome::Failed(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn accept_grant(&mut self, grant: AuthGrant) -> Identity {
        self.epoch += 1;
        let AuthGrant { token, identity } = grant;

        // A client holds one live session per user: a fresh login closes any
        // record the same user left open here.
        let now = Utc::now();
        for record in self
            .history
            .iter_mut()
            .filter(|r| r.is_active() && r.user_name == identity.name)
        {
            record.status = SessionStatus::LoggedOut;
            record.logout_timestamp = Some(now);
        }

        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_name: identity.name.clone(),
            user_role: identity.role.clone(),
            login_timestamp: now,
            status: SessionStatus::Active,
            network_address: self.options.network_address.clone(),
            device_label: Some(self.device_label()),
            logout_timestamp: None,
        };
        self.history.insert(0, record);
        self.history.truncate(self.options.history_limit.max(1));

        tracing::info!(user = %identity.name, role = %identity.role, "Logged in");

        self.cached_identity = None;
        self.identity = Some(identity.clone());
        self.token = Some(token);

        self.save_key(USER_STORAGE_KEY, &identity);
        if let Some(token) = &self.token {
            self.save_key(TOKEN_STORAGE_KEY, token);
        }
        self.persist_history();
        identity
    }

    /// Flip the newest Active record for `user_name`. Older records and
    /// other users' records are left alone.
    fn flip_latest_active(&mut self, user_name: &str) -> Option<String> {
        let record = self
            .history
            .iter_mut()
            .find(|r| r.is_active() && r.user_name == user_name)?;
        record.status = SessionStatus::LoggedOut;
        record.logout_timestamp = Some(Utc::now());
        Some(record.id.clone())
    }

    fn device_label(&self) -> String {
        self.options
            .device_label
            .clone()
            .unwrap_or_else(|| format!("{APP_NAME} client on {}", std::env::consts::OS))
    }

    fn persist_history(&self) {
        self.save_key(HISTORY_STORAGE_KEY, &self.history);
    }

    fn save_key<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = storage::save_json(self.store.as_ref(), key, value) {
            tracing::warn!(
                key,
                error = %e,
                "Failed to persist session state; keeping it in memory"
            );
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "Failed to clear stored session state");
        }
    }
}

/// Load a stored value, treating unreadable or malformed data as absent.
fn load_or_default<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match storage::load_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unusable stored session state");
            None
        }
    }
}
