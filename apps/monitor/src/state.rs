//! Application state management.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for the monitor run.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Number of cycles that fetched a sample.
    pub cycles_completed: AtomicU64,
    /// Number of cycles skipped because no data was available.
    pub fetch_failures: AtomicU64,
    /// Number of alerts fired by the detector.
    pub alerts_fired: AtomicU64,
    /// Number of rows written to the journal.
    pub records_written: AtomicU64,
    /// Number of journal appends skipped as duplicates.
    pub duplicates_skipped: AtomicU64,
    /// Start time in milliseconds.
    pub started_at_ms: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        Self {
            started_at_ms: AtomicU64::new(now),
            ..Default::default()
        }
    }

    pub fn record_cycle(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self) {
        self.alerts_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        (now - self.started_at_ms.load(Ordering::Relaxed)) / 1000
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            alerts_fired: self.alerts_fired.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            uptime_secs: self.uptime_secs(),
        }
    }
}

/// Summary of statistics.
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub cycles_completed: u64,
    pub fetch_failures: u64,
    pub alerts_fired: u64,
    pub records_written: u64,
    pub duplicates_skipped: u64,
    pub uptime_secs: u64,
}

/// Application state shared between the loop and the shutdown handler.
pub struct AppState {
    /// Run statistics.
    pub stats: RunStats,
    /// Running flag.
    pub running: AtomicBool,
}

impl AppState {
    /// Create new application state.
    pub fn new() -> Self {
        Self {
            stats: RunStats::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Start the monitor.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Stop the monitor.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Shared state handle.
pub type SharedState = Arc<AppState>;

/// Create shared state.
pub fn create_state() -> SharedState {
    Arc::new(AppState::new())
}
