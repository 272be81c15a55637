// NexusHealth - app/restore.rs
//
// Fire-and-forget session restore at startup.
//
// Architecture:
//   - `RestoreManager` lives on the owner thread; the `me(token)` call runs
//     on a background thread so the host loop stays responsive.
//   - The result comes back as a single `RestoreMessage` over an mpsc
//     channel, stamped with the session epoch current when it started.
//   - The owner polls without blocking and hands the message to
//     `SessionStore::apply_restore`, which discards it if a login or logout
//     happened in the meantime.

use crate::core::model::Identity;
use crate::platform::api::AuthApi;
use crate::util::error::AuthError;
use std::sync::{mpsc, Arc};

/// Outcome of one background `me` call.
#[derive(Debug)]
pub struct RestoreMessage {
    pub started_epoch: u64,
    pub result: Result<Identity, AuthError>,
}

#[derive(Default)]
pub struct RestoreManager {
    result_rx: Option<mpsc::Receiver<RestoreMessage>>,
}

impl RestoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start validating `token` in the background. A restore already in
    /// flight is abandoned; its result will never be delivered.
    pub fn start(&mut self, api: Arc<dyn AuthApi>, token: String, started_epoch: u64) {
        let (tx, rx) = mpsc::channel();
        self.result_rx = Some(rx);

        std::thread::spawn(move || {
            let result = api.me(&token);
            // Receiver dropped means the owner moved on; nothing to do.
            let _ = tx.send(RestoreMessage {
                started_epoch,
                result,
            });
        });

        tracing::debug!(started_epoch, "Session restore started");
    }

    pub fn is_pending(&self) -> bool {
        self.result_rx.is_some()
    }

    /// Take the result if it has arrived. Never blocks.
    pub fn poll(&mut self) -> Option<RestoreMessage> {
        let rx = self.result_rx.as_ref()?;
        match rx.try_recv() {
            Ok(msg) => {
                self.result_rx = None;
                Some(msg)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                tracing::warn!("Session restore thread exited without a result");
                self.result_rx = None;
                None
            }
        }
    }

    /// Block up to `timeout` for the result. Used by one-shot hosts such as
    /// the CLI that have nothing else to do meanwhile.
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<RestoreMessage> {
        let rx = self.result_rx.take()?;
        match rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.result_rx = Some(rx);
                None
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => None,
        }
    }
}
