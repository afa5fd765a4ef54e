//! Engine notifications and subscriber fan-out.
//!
//! Notifications are delivered on whatever thread produced them; consumers
//! (UI, loggers) marshal to their own context as needed. Subscribers that
//! drop their receiver are pruned on the next emit.

use crate::models::{Activity, IdleTransition, Session};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

/// Everything observable about the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A work session was opened.
    SessionStarted { session: Session },
    /// The open session changed (activity appended or break accrued).
    SessionUpdated { session: Session },
    /// A session was closed and handed to storage.
    SessionEnded { session: Session },
    /// The tracker finalized an activity.
    AppSwitched { activity: Activity },
    /// The idle monitor crossed the threshold in either direction.
    IdleStateChanged { transition: IdleTransition },
    /// Continuous idle-time readout, fired every idle tick. Display only;
    /// carries no state-transition meaning.
    IdleTimeUpdated { idle_for: Duration },
    /// The tracker stopped and flushed its session log.
    TrackingStopped { activities: Vec<Activity> },
}

/// Fan-out bus for [`EngineEvent`]s.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<EngineEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; events emitted after this call are delivered
    /// to the returned receiver.
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&self, event: EngineEvent) {
        let mut subscribers = self.subscribers.lock().expect("event bus lock poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .len()
    }
}
