// NexusHealth - app/appearance_watch.rs
//
// Polls the OS colour-scheme probe on a background thread and reports
// changes to the owner.
//
// Architecture:
//   - `AppearanceWatcher` lives on the owner thread; `run_watcher` loops on
//     a background thread, probing every `poll_interval`.
//   - Only changes are sent; unknown readings (`None`) keep the last value.
//   - The loop sleeps in short slices so `stop` takes effect promptly.
//   - An `Arc<AtomicBool>` cancel flag stops the thread; dropping the
//     watcher stops it too.

use crate::core::model::ResolvedTheme;
use crate::platform::appearance::AppearanceProbe;
use crate::util::constants::APPEARANCE_CANCEL_CHECK_INTERVAL_MS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct AppearanceWatcher {
    signal_rx: Option<mpsc::Receiver<ResolvedTheme>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl AppearanceWatcher {
    /// Create an inactive watcher. No thread runs until `start`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map(|f| !f.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Start polling `probe`. `last_known` is the signal the owner already
    /// has; only departures from it are reported.
    pub fn start(
        &mut self,
        probe: Arc<dyn AppearanceProbe>,
        last_known: ResolvedTheme,
        poll_interval: Duration,
    ) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        self.signal_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        std::thread::spawn(move || run_watcher(probe, last_known, poll_interval, tx, cancel));
        tracing::debug!(
            interval_ms = poll_interval.as_millis() as u64,
            "Appearance watcher started"
        );
    }

    pub fn stop(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
            tracing::debug!("Appearance watcher stopped");
        }
        self.signal_rx = None;
    }

    /// Drain pending signal changes without blocking, oldest first.
    pub fn poll_changes(&self) -> Vec<ResolvedTheme> {
        self.signal_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default()
    }

    /// Block up to `timeout` for the next change.
    pub fn wait_change(&self, timeout: Duration) -> Option<ResolvedTheme> {
        self.signal_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

impl Drop for AppearanceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_watcher(
    probe: Arc<dyn AppearanceProbe>,
    mut last: ResolvedTheme,
    poll_interval: Duration,
    tx: mpsc::Sender<ResolvedTheme>,
    cancel: Arc<AtomicBool>,
) {
    let slice = Duration::from_millis(APPEARANCE_CANCEL_CHECK_INTERVAL_MS);
    loop {
        let deadline = Instant::now() + poll_interval;
        while Instant::now() < deadline {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep(slice.min(deadline.saturating_duration_since(Instant::now())));
        }
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        if let Some(prefers_dark) = probe.prefers_dark() {
            let signal = ResolvedTheme::from_prefers_dark(prefers_dark);
            if signal != last {
                last = signal;
                if tx.send(signal).is_err() {
                    return; // Owner gone.
                }
            }
        }
    }
}
