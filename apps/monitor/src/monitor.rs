//! The poll loop: fetch, detect, notify, journal, sleep.

use crate::config::MonitorSettings;
use crate::state::SharedState;
use std::sync::Arc;
use std::time::Duration;
use tickwatch_alerts::{format_crossing_alert, AlertSink};
use tickwatch_core::{BandError, MonitorState};
use tickwatch_engine::ThresholdDetector;
use tickwatch_feeds::PriceSource;
use tickwatch_journal::{AppendOutcome, DataJournal, JournalError};
use tracing::{debug, error, info, warn};

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Sample processed; `journaled` is false when the dedup skipped the write.
    Checked { alerted: bool, journaled: bool },
    /// No data this cycle; state and journal untouched.
    Unavailable,
}

/// Single-security monitor loop.
pub struct Monitor {
    settings: MonitorSettings,
    source: Arc<dyn PriceSource>,
    detector: ThresholdDetector,
    journal: DataJournal,
    sink: Arc<dyn AlertSink>,
    state: MonitorState,
    prev_close: Option<f64>,
    prev_close_checked: bool,
}

impl Monitor {
    /// Create a monitor. Fails when the configured thresholds are inverted.
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn PriceSource>,
        journal: DataJournal,
        sink: Arc<dyn AlertSink>,
    ) -> Result<Self, BandError> {
        let detector = ThresholdDetector::new(settings.band()?);
        Ok(Self {
            settings,
            source,
            detector,
            journal,
            sink,
            state: MonitorState::default(),
            prev_close: None,
            prev_close_checked: false,
        })
    }

    /// Detector state after the last completed cycle.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run one fetch/detect/notify/journal cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, JournalError> {
        let sample = match self.source.fetch(self.settings.symbol.as_str()).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("⚠️ No data for {}: {}", self.settings.symbol, e);
                return Ok(CycleOutcome::Unavailable);
            }
        };

        let (next_state, alert) = self
            .detector
            .evaluate(&self.state, sample.close, sample.taken_at);

        let mut alerted = false;
        if let Some(event) = alert {
            alerted = true;
            let band = self.detector.band();
            let message = format_crossing_alert(self.settings.symbol.as_str(), &event, &band);
            info!("🚨 {}", message.subject);

            // A failed delivery is logged and the cycle moves on; the
            // crossing is not re-alerted next cycle.
            match self.sink.deliver(&message).await {
                Ok(()) => debug!(sink = self.sink.name(), "Alert delivered"),
                Err(e) => warn!(sink = self.sink.name(), "Alert delivery failed: {}", e),
            }
        }

        // The fetched sample always becomes the new reference point.
        self.state = next_state;

        let previous_close = self.previous_close().await;
        let outcome = self.journal.append(&sample, previous_close)?;

        Ok(CycleOutcome::Checked {
            alerted,
            journaled: outcome == AppendOutcome::Written,
        })
    }

    /// Poll until a stop is requested through the shared state.
    pub async fn run(mut self, state: SharedState) {
        info!(
            "Watching {} every {}s (band {} - {}, backoff {}s)",
            self.settings.symbol,
            self.settings.poll_interval_secs,
            self.settings.low_threshold,
            self.settings.high_threshold,
            self.settings.backoff_secs
        );

        while state.is_running() {
            let delay = match self.run_cycle().await {
                Ok(CycleOutcome::Checked { alerted, journaled }) => {
                    state.stats.record_cycle();
                    if alerted {
                        state.stats.record_alert();
                    }
                    if journaled {
                        state.stats.record_write();
                    } else {
                        state.stats.record_duplicate();
                    }

                    info!(
                        "📊 {} at {:.2} | zone {:?} | {}",
                        self.settings.symbol,
                        self.state.last_price.unwrap_or(0.0),
                        self.state.last_zone,
                        if journaled { "journaled" } else { "duplicate, skipped" }
                    );
                    Duration::from_secs(self.settings.poll_interval_secs)
                }
                Ok(CycleOutcome::Unavailable) => {
                    state.stats.record_fetch_failure();
                    info!("Retrying in {}s", self.settings.backoff_secs);
                    Duration::from_secs(self.settings.backoff_secs)
                }
                Err(e) => {
                    state.stats.record_cycle();
                    error!("📛 Journal write failed: {} (continuing)", e);
                    Duration::from_secs(self.settings.poll_interval_secs)
                }
            };

            sleep_interruptibly(&state, delay).await;
        }

        info!("Monitor loop stopped");
    }

    /// Previous-session close, fetched on first use and cached for the run.
    async fn previous_close(&mut self) -> Option<f64> {
        if !self.prev_close_checked {
            self.prev_close_checked = true;
            match self
                .source
                .previous_close(self.settings.symbol.as_str())
                .await
            {
                Ok(close) => {
                    debug!(close = close, "Cached previous session close");
                    self.prev_close = Some(close);
                }
                Err(e) => {
                    warn!("Previous close unavailable, change columns stay zero: {}", e);
                }
            }
        }
        self.prev_close
    }
}

/// Sleep for `duration`, waking early once a stop is requested.
async fn sleep_interruptibly(state: &SharedState, duration: Duration) {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if !state.is_running() {
            return;
        }
        let step = remaining.min(Duration::from_millis(100));
        tokio::time::sleep(step).await;
        remaining -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tickwatch_alerts::{AlertError, AlertMessage};
    use tickwatch_core::{PriceSample, Zone};
    use tickwatch_feeds::FeedError;

    /// Feeds a fixed script of prices; None means the fetch fails.
    struct ScriptedSource {
        prices: Mutex<VecDeque<Option<f64>>>,
        prev_close: Option<f64>,
        prev_close_calls: AtomicU64,
        seq: AtomicU64,
        fixed_time: bool,
    }

    impl ScriptedSource {
        fn new(prices: Vec<Option<f64>>, prev_close: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                prices: Mutex::new(prices.into()),
                prev_close,
                prev_close_calls: AtomicU64::new(0),
                seq: AtomicU64::new(0),
                fixed_time: false,
            })
        }

        /// Like `new`, but every sample carries the same observation time.
        fn fixed_time(prices: Vec<Option<f64>>, prev_close: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                prices: Mutex::new(prices.into()),
                prev_close,
                prev_close_calls: AtomicU64::new(0),
                seq: AtomicU64::new(0),
                fixed_time: true,
            })
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
            let price = self
                .prices
                .lock()
                .unwrap()
                .pop_front()
                .flatten()
                .ok_or_else(|| FeedError::DataUnavailable(symbol.to_string()))?;

            let minute = if self.fixed_time {
                0
            } else {
                self.seq.fetch_add(1, Ordering::SeqCst) as u32
            };
            let taken_at = NaiveDate::from_ymd_opt(2026, 8, 21)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap();
            Ok(PriceSample::new(
                symbol, taken_at, price, price, price, price, 1000,
            ))
        }

        async fn previous_close(&self, symbol: &str) -> Result<f64, FeedError> {
            self.prev_close_calls.fetch_add(1, Ordering::SeqCst);
            self.prev_close
                .ok_or_else(|| FeedError::DataUnavailable(symbol.to_string()))
        }
    }

    struct RecordingSink {
        delivered: Mutex<Vec<AlertMessage>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn subjects(&self) -> Vec<String> {
            self.delivered
                .lock()
                .unwrap()
                .iter()
                .map(|message| message.subject.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(&self, message: &AlertMessage) -> Result<(), AlertError> {
            if self.fail {
                return Err(AlertError::Delivery("scripted failure".to_string()));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn settings() -> MonitorSettings {
        MonitorSettings {
            symbol: "300300.SZ".into(),
            low_threshold: 12.0,
            high_threshold: 13.0,
            poll_interval_secs: 1,
            backoff_secs: 1,
        }
    }

    fn monitor_with(
        source: Arc<ScriptedSource>,
        sink: Arc<RecordingSink>,
        dir: &tempfile::TempDir,
    ) -> Monitor {
        Monitor::new(
            settings(),
            source,
            DataJournal::new(dir.path().join("data.csv")),
            sink,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_alerts_fire_only_on_zone_entry() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(
            vec![
                Some(12.50),
                Some(13.20),
                Some(13.50),
                Some(12.80),
                Some(11.90),
                Some(11.95),
            ],
            None,
        );
        let sink = RecordingSink::new(false);
        let mut monitor = monitor_with(source, sink.clone(), &dir);

        let mut fired = Vec::new();
        for _ in 0..6 {
            match monitor.run_cycle().await.unwrap() {
                CycleOutcome::Checked { alerted, .. } => fired.push(alerted),
                CycleOutcome::Unavailable => panic!("script ran dry"),
            }
        }

        assert_eq!(fired, vec![false, true, false, false, true, false]);
        let subjects = sink.subjects();
        assert_eq!(subjects.len(), 2);
        assert!(subjects[0].contains("above 13.00"));
        assert!(subjects[1].contains("below 12.00"));
        assert_eq!(monitor.state().last_zone, Zone::Below);
        assert_eq!(monitor.state().last_price, Some(11.95));
    }

    #[tokio::test]
    async fn test_unavailable_cycles_keep_state() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(
            vec![Some(13.20), None, None, None, Some(13.50)],
            None,
        );
        let sink = RecordingSink::new(false);
        let mut monitor = monitor_with(source, sink.clone(), &dir);

        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked { alerted: true, .. }
        ));
        for _ in 0..3 {
            assert_eq!(
                monitor.run_cycle().await.unwrap(),
                CycleOutcome::Unavailable
            );
            assert_eq!(monitor.state().last_zone, Zone::Above);
        }

        // Still Above after the gap, so no second alert
        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked { alerted: false, .. }
        ));
        assert_eq!(sink.subjects().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_still_advances_state() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(vec![Some(13.20), Some(13.50)], None);
        let sink = RecordingSink::new(true);
        let mut monitor = monitor_with(source, sink.clone(), &dir);

        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked {
                alerted: true,
                journaled: true
            }
        ));
        // The crossing is not re-alerted even though delivery failed
        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked {
                alerted: false,
                journaled: true
            }
        ));
        assert!(sink.subjects().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_sample_skips_journal() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::fixed_time(vec![Some(12.5), Some(12.6)], None);
        let sink = RecordingSink::new(false);
        let mut monitor = monitor_with(source, sink, &dir);

        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked {
                journaled: true,
                ..
            }
        ));
        assert!(matches!(
            monitor.run_cycle().await.unwrap(),
            CycleOutcome::Checked {
                journaled: false,
                ..
            }
        ));

        let contents = std::fs::read_to_string(dir.path().join("data.csv")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_previous_close_fetched_once_and_flows_to_journal() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(
            vec![Some(13.2), Some(13.3), Some(13.4)],
            Some(12.0),
        );
        let sink = RecordingSink::new(false);
        let mut monitor = monitor_with(source.clone(), sink, &dir);

        for _ in 0..3 {
            monitor.run_cycle().await.unwrap();
        }

        assert_eq!(source.prev_close_calls.load(Ordering::SeqCst), 1);

        let journal = DataJournal::new(dir.path().join("data.csv"));
        let latest = journal.latest().unwrap().unwrap();
        assert_eq!(latest.price_change, 1.4);
        // 1.4 / 12 * 100 = 11.67 after rounding
        assert_eq!(latest.change_percentage, 11.67);
    }

    #[tokio::test]
    async fn test_previous_close_failure_not_retried() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(vec![Some(12.5), Some(12.6)], None);
        let sink = RecordingSink::new(false);
        let mut monitor = monitor_with(source.clone(), sink, &dir);

        monitor.run_cycle().await.unwrap();
        monitor.run_cycle().await.unwrap();

        assert_eq!(source.prev_close_calls.load(Ordering::SeqCst), 1);
        let latest = DataJournal::new(dir.path().join("data.csv"))
            .latest()
            .unwrap()
            .unwrap();
        assert_eq!(latest.price_change, 0.0);
    }

    #[tokio::test]
    async fn test_run_loop_stops_on_request() {
        let dir = tempdir().unwrap();
        let source = ScriptedSource::new(vec![Some(12.5); 100], None);
        let sink = RecordingSink::new(false);
        let monitor = monitor_with(source, sink, &dir);

        let state = crate::state::create_state();
        state.start();

        let handle = tokio::spawn(monitor.run(state.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        state.stop();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("loop should stop promptly")
            .unwrap();

        assert!(state.stats.summary().cycles_completed >= 1);
    }
}
