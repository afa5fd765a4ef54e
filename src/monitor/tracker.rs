//! Foreground-window tracking: focus-switch boundaries and activity records.

use crate::classifier::ActivityClassifier;
use crate::models::Activity;
use crate::probe::{WindowProbe, WindowSample};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// How often the foreground window is sampled.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Activities shorter than this are treated as switch noise and dropped.
/// The final activity emitted on stop is exempt; see [`SwitchDetector::finish`].
pub const MIN_ACTIVITY_DURATION: Duration = Duration::from_secs(3);

/// Events emitted by the window tracker.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A focus interval was finalized.
    AppSwitched(Activity),
    /// The tracker stopped; carries the full session log.
    Completed(Vec<Activity>),
}

/// In-progress focus interval. Becomes an [`Activity`] when finalized.
#[derive(Debug, Clone)]
struct OpenActivity {
    app_name: String,
    window_title: String,
    start_time: DateTime<Utc>,
}

/// Pure focus-switch state machine.
///
/// Feed it window samples with timestamps; it detects boundaries, applies
/// the noise filter, classifies, and accumulates the session log.
pub struct SwitchDetector {
    classifier: ActivityClassifier,
    open: Option<OpenActivity>,
    log: Vec<Activity>,
}

impl SwitchDetector {
    pub fn new(classifier: ActivityClassifier) -> Self {
        Self {
            classifier,
            open: None,
            log: Vec::new(),
        }
    }

    /// Number of finalized activities so far.
    pub fn logged(&self) -> usize {
        self.log.len()
    }

    /// Feed one sample. Returns the previous activity when this sample
    /// crosses a focus boundary and the previous interval survives the
    /// noise filter.
    ///
    /// Empty identities carry no information and are skipped, same as a
    /// failed sample.
    pub fn observe(&mut self, now: DateTime<Utc>, sample: &WindowSample) -> Option<Activity> {
        if sample.is_empty() {
            return None;
        }

        let same_focus = self
            .open
            .as_ref()
            .map(|open| {
                open.app_name == sample.app_name && open.window_title == sample.window_title
            })
            .unwrap_or(false);
        if same_focus {
            return None;
        }

        let finalized = self.finalize_open(now, false);
        self.open = Some(OpenActivity {
            app_name: sample.app_name.clone(),
            window_title: sample.window_title.clone(),
            start_time: now,
        });
        finalized
    }

    /// Force-finalize the open interval and drain the session log.
    ///
    /// The final activity bypasses the noise filter: a tracking run that
    /// stops 1 second after a switch still records that second. This
    /// asymmetry with [`SwitchDetector::observe`] is intentional.
    pub fn finish(&mut self, now: DateTime<Utc>) -> (Option<Activity>, Vec<Activity>) {
        let last = self.finalize_open(now, true);
        (last, std::mem::take(&mut self.log))
    }

    fn finalize_open(&mut self, now: DateTime<Utc>, force: bool) -> Option<Activity> {
        let open = self.open.take()?;
        let activity = Activity {
            is_productive: self.classifier.classify(&open.app_name, &open.window_title),
            app_name: open.app_name,
            window_title: open.window_title,
            start_time: open.start_time,
            end_time: now,
        };

        if !force && activity.duration() < MIN_ACTIVITY_DURATION {
            debug!(app = %activity.app_name, "dropping sub-threshold activity");
            return None;
        }

        self.log.push(activity.clone());
        Some(activity)
    }
}

/// Samples a [`WindowProbe`] on a background thread, gated on the idle flag,
/// and emits [`TrackerEvent`]s.
pub struct WindowTracker {
    probe: Arc<dyn WindowProbe>,
    classifier: ActivityClassifier,
    idle_flag: Arc<AtomicBool>,
    sample_interval: Duration,
    events_tx: Sender<TrackerEvent>,
    events_rx: Receiver<TrackerEvent>,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WindowTracker {
    /// `idle_flag` usually comes from [`crate::monitor::IdleMonitor::idle_flag`];
    /// while it is set the tracker skips sampling entirely and idle time is
    /// accounted for by the idle monitor alone.
    pub fn new(
        probe: Arc<dyn WindowProbe>,
        classifier: ActivityClassifier,
        idle_flag: Arc<AtomicBool>,
        sample_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            probe,
            classifier,
            idle_flag,
            sample_interval,
            events_tx,
            events_rx,
            shutdown: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Receiver for tracker events.
    pub fn receiver(&self) -> &Receiver<TrackerEvent> {
        &self.events_rx
    }

    /// Start the sampling thread. Starting an already-running tracker is a
    /// no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        info!(
            interval_secs = self.sample_interval.as_secs(),
            "window tracking started"
        );

        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        self.shutdown = Some(shutdown_tx);

        let probe = Arc::clone(&self.probe);
        let idle_flag = Arc::clone(&self.idle_flag);
        let events = self.events_tx.clone();
        let mut detector = SwitchDetector::new(self.classifier.clone());
        let sample_interval = self.sample_interval;

        self.handle = Some(std::thread::spawn(move || {
            let ticker = tick(sample_interval);

            // First sample fires immediately, then on the cadence.
            Self::run_tick(&probe, &idle_flag, &mut detector, &events);

            loop {
                select! {
                    recv(ticker) -> _ => {
                        Self::run_tick(&probe, &idle_flag, &mut detector, &events);
                    }
                    recv(shutdown_rx) -> _ => break,
                }
            }

            // Flush the in-flight interval and hand over the session log
            // before the thread exits, so stop() returns with everything
            // emitted.
            let (last, log) = detector.finish(Utc::now());
            if let Some(activity) = last {
                let _ = events.send(TrackerEvent::AppSwitched(activity));
            }
            info!(activities = log.len(), "window tracking stopped");
            let _ = events.send(TrackerEvent::Completed(log));
        }));
    }

    fn run_tick(
        probe: &Arc<dyn WindowProbe>,
        idle_flag: &AtomicBool,
        detector: &mut SwitchDetector,
        events: &Sender<TrackerEvent>,
    ) {
        // While the user is idle the tick is skipped entirely; break time is
        // accounted for by the idle monitor's transitions, not here.
        if idle_flag.load(Ordering::SeqCst) {
            return;
        }

        let Some(sample) = probe.sample_foreground_window() else {
            return;
        };

        if let Some(activity) = detector.observe(Utc::now(), &sample) {
            let _ = events.send(TrackerEvent::AppSwitched(activity));
        }
    }

    /// Stop the sampling thread, finalize the in-flight activity, and emit
    /// the completion event. Idempotent; everything is emitted before this
    /// returns.
    pub fn stop(&mut self) {
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for WindowTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
