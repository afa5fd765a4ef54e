//! Work-session lifecycle: the state machine fusing activity and idle
//! streams into a single open [`Session`].

use crate::events::{EngineEvent, EventBus};
use crate::models::{Activity, IdleTransition, Session};
use crate::storage::{SessionStore, StoreError};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Errors surfaced by session lifecycle operations.
#[derive(Debug)]
pub enum SessionError {
    /// The storage collaborator rejected the closed session. The in-memory
    /// session stays open and valid for retry.
    Persistence(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Persistence(e) => write!(f, "failed to persist session: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Persistence(e)
    }
}

/// Owns the single open session slot.
///
/// All four operations serialize on one mutex: the tracker and idle monitor
/// tick on independent schedules, and statistics must always reflect a
/// consistent snapshot.
pub struct SessionManager {
    current: Mutex<Option<Session>>,
    store: Arc<dyn SessionStore>,
    events: Arc<EventBus>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, events: Arc<EventBus>) -> Self {
        Self {
            current: Mutex::new(None),
            store,
            events,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Snapshot of the open session, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// Open a new session. No-op if one is already open; returns the id of
    /// the session that is open after the call.
    pub fn start_session(&self) -> String {
        let mut guard = self.lock();
        if let Some(session) = guard.as_ref() {
            debug!(id = %session.id, "start_session ignored, session already active");
            return session.id.clone();
        }

        let session = Session::begin(Utc::now());
        let id = session.id.clone();
        let snapshot = session.clone();
        *guard = Some(session);
        drop(guard);

        info!(%id, "work session started");
        self.events
            .emit(EngineEvent::SessionStarted { session: snapshot });
        id
    }

    /// Close the open session, compute its final statistics, and hand it to
    /// storage. No-op (returns `Ok(None)`) when no session is open.
    ///
    /// On a persistence failure the session is left open and unchanged so
    /// the caller can retry.
    pub fn end_session(&self) -> Result<Option<Session>, SessionError> {
        let mut guard = self.lock();
        let Some(session) = guard.as_mut() else {
            return Ok(None);
        };

        session.end_time = Some(Utc::now());
        session.recompute_statistics();
        let snapshot = session.clone();

        if let Err(e) = self.store.persist_session(&snapshot) {
            warn!(id = %snapshot.id, error = %e, "session persistence failed, keeping session open");
            session.end_time = None;
            return Err(e.into());
        }

        *guard = None;
        drop(guard);

        info!(
            id = %snapshot.id,
            activities = snapshot.app_switch_count,
            score = snapshot.productivity_score,
            "work session ended"
        );
        self.events.emit(EngineEvent::SessionEnded {
            session: snapshot.clone(),
        });
        Ok(Some(snapshot))
    }

    /// Append a finalized activity to the open session and recompute
    /// statistics. Silently ignored when no session is open; that is a
    /// legitimate race between the monitors and the session lifecycle, not
    /// an error.
    pub fn add_activity(&self, activity: Activity) {
        let mut guard = self.lock();
        let Some(session) = guard.as_mut() else {
            debug!(app = %activity.app_name, "activity dropped, no active session");
            return;
        };

        session.activities.push(activity);
        session.recompute_statistics();
        let snapshot = session.clone();
        drop(guard);

        self.events
            .emit(EngineEvent::SessionUpdated { session: snapshot });
    }

    /// Fold an idle transition into the open session. Break time accrues
    /// only on the idle-entry edge; the return-to-active edge just refreshes
    /// statistics. Ignored when no session is open.
    pub fn on_idle_transition(&self, transition: &IdleTransition) {
        let mut guard = self.lock();
        let Some(session) = guard.as_mut() else {
            return;
        };

        if transition.is_idle {
            session.break_time += transition.idle_duration;
            info!(
                break_secs = transition.idle_duration.as_secs(),
                "break recorded"
            );
        }

        session.recompute_statistics();
        let snapshot = session.clone();
        drop(guard);

        self.events
            .emit(EngineEvent::SessionUpdated { session: snapshot });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.current.lock().expect("session lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{DateTime, TimeZone};
    use std::time::Duration;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn activity(app: &str, start: i64, end: i64, productive: bool) -> Activity {
        Activity {
            app_name: app.to_string(),
            window_title: String::new(),
            start_time: ts(start),
            end_time: ts(end),
            is_productive: productive,
        }
    }

    fn manager() -> (SessionManager, Arc<MemoryStore>, Arc<EventBus>) {
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(EventBus::new());
        (
            SessionManager::new(store.clone(), events.clone()),
            store,
            events,
        )
    }

    #[test]
    fn start_session_is_idempotent() {
        let (mgr, _, events) = manager();
        let rx = events.subscribe();

        let first = mgr.start_session();
        let second = mgr.start_session();
        assert_eq!(first, second);

        // Exactly one started notification.
        assert!(matches!(
            rx.try_recv().unwrap(),
            EngineEvent::SessionStarted { .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn activities_accumulate_without_drift() {
        let (mgr, _, _) = manager();
        mgr.start_session();

        mgr.add_activity(activity("code", 0, 120, true));
        mgr.add_activity(activity("chrome", 120, 150, false));
        mgr.add_activity(activity("slack", 150, 210, true));

        let session = mgr.current_session().unwrap();
        let total: Duration = session.activities.iter().map(Activity::duration).sum();
        assert_eq!(session.productive_time + session.distracted_time, total);
        assert_eq!(total, Duration::from_secs(210));
    }

    #[test]
    fn activity_without_session_is_ignored() {
        let (mgr, _, events) = manager();
        let rx = events.subscribe();

        mgr.add_activity(activity("code", 0, 60, true));
        assert!(!mgr.is_active());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn break_time_accrues_from_idle_entry_only() {
        let (mgr, _, _) = manager();
        mgr.start_session();

        let entered = IdleTransition {
            is_idle: true,
            idle_duration: Duration::from_secs(90),
            timestamp: Utc::now(),
        };
        let left = IdleTransition {
            is_idle: false,
            idle_duration: Duration::from_secs(90),
            timestamp: Utc::now(),
        };

        mgr.on_idle_transition(&entered);
        mgr.on_idle_transition(&left);

        let session = mgr.current_session().unwrap();
        assert_eq!(session.break_time, Duration::from_secs(90));
    }

    #[test]
    fn end_session_persists_and_clears_slot() {
        let (mgr, store, events) = manager();
        let rx = events.subscribe();
        mgr.start_session();
        mgr.add_activity(activity("code", 0, 60, true));

        let ended = mgr.end_session().unwrap().unwrap();
        assert!(ended.end_time.is_some());
        assert!(!mgr.is_active());
        assert_eq!(store.sessions().len(), 1);

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(kinds
            .iter()
            .any(|e| matches!(e, EngineEvent::SessionEnded { .. })));
    }

    #[test]
    fn end_without_session_is_noop() {
        let (mgr, store, _) = manager();
        assert!(mgr.end_session().unwrap().is_none());
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn persistence_failure_keeps_session_open() {
        struct FailingStore;
        impl SessionStore for FailingStore {
            fn persist_session(&self, _: &Session) -> Result<(), StoreError> {
                Err(StoreError::Io("disk full".into()))
            }
            fn load_sessions(&self, _: u32) -> Result<Vec<Session>, StoreError> {
                Ok(Vec::new())
            }
        }

        let mgr = SessionManager::new(Arc::new(FailingStore), Arc::new(EventBus::new()));
        mgr.start_session();
        mgr.add_activity(activity("code", 0, 60, true));

        assert!(mgr.end_session().is_err());
        // Session survives, still open, statistics intact.
        let session = mgr.current_session().unwrap();
        assert!(session.is_open());
        assert_eq!(session.app_switch_count, 1);
    }
}
