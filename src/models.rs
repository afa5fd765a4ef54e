//! Core data model: activities, idle transitions, and work sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One contiguous interval of a single focused app/window.
///
/// Immutable once finalized by the tracker. Invariant: `end_time >=
/// start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub app_name: String,
    pub window_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_productive: bool,
}

impl Activity {
    /// Duration of the activity, derived from its endpoints.
    pub fn duration(&self) -> Duration {
        (self.end_time - self.start_time).to_std().unwrap_or_default()
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration().as_secs_f64() / 60.0
    }
}

/// An idle/active edge reported by the idle monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleTransition {
    /// `true` on the active→idle edge, `false` on the reverse.
    pub is_idle: bool,
    /// Time since last input at the moment of the edge.
    pub idle_duration: Duration,
    pub timestamp: DateTime<Utc>,
}

/// One tracking run from start to stop, aggregating activities and break
/// time.
///
/// Statistics are always recomputed from the full activity sequence rather
/// than maintained incrementally; at this data scale the full recompute is
/// the source of truth and several consumers rely on its ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is open.
    pub end_time: Option<DateTime<Utc>>,
    pub activities: Vec<Activity>,
    /// Accumulated idle time, folded in from idle-entry transitions.
    pub break_time: Duration,
    pub productive_time: Duration,
    pub distracted_time: Duration,
    /// 0–100, share of classified time that was productive.
    pub productivity_score: f64,
    pub app_switch_count: usize,
    /// Top 5 apps by total focused time, first-seen order breaking ties.
    pub top_apps: Vec<String>,
}

impl Session {
    /// Open a new session starting now.
    pub fn begin(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            activities: Vec::new(),
            break_time: Duration::ZERO,
            productive_time: Duration::ZERO,
            distracted_time: Duration::ZERO,
            productivity_score: 0.0,
            app_switch_count: 0,
            top_apps: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Wall-clock length of the session. Open sessions measure up to now.
    pub fn duration(&self) -> Duration {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).to_std().unwrap_or_default()
    }

    /// Recompute all derived statistics from the full activity sequence.
    pub fn recompute_statistics(&mut self) {
        self.productive_time = self
            .activities
            .iter()
            .filter(|a| a.is_productive)
            .map(Activity::duration)
            .sum();

        self.distracted_time = self
            .activities
            .iter()
            .filter(|a| !a.is_productive)
            .map(Activity::duration)
            .sum();

        self.app_switch_count = self.activities.len();

        let total_active = self.productive_time + self.distracted_time;
        self.productivity_score = if total_active > Duration::ZERO {
            self.productive_time.as_secs_f64() / total_active.as_secs_f64() * 100.0
        } else {
            0.0
        };

        self.top_apps = top_apps_by_time(&self.activities, 5);
    }
}

/// Total time spent per app, in first-seen order.
fn time_per_app(activities: &[Activity]) -> Vec<(String, Duration)> {
    let mut totals: Vec<(String, Duration)> = Vec::new();
    for activity in activities {
        match totals.iter_mut().find(|(name, _)| name == &activity.app_name) {
            Some((_, total)) => *total += activity.duration(),
            None => totals.push((activity.app_name.clone(), activity.duration())),
        }
    }
    totals
}

/// Top `limit` apps by accumulated duration; ties resolve to the
/// first-encountered app (stable sort).
pub(crate) fn top_apps_by_time(activities: &[Activity], limit: usize) -> Vec<String> {
    let mut totals = time_per_app(activities);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.into_iter().take(limit).map(|(name, _)| name).collect()
}

/// Rollup of several sessions, e.g. everything recorded today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_sessions: usize,
    pub total_work_time: Duration,
    pub total_productive_time: Duration,
    pub total_break_time: Duration,
    pub average_session_length: Duration,
    /// Mean of the per-session productivity scores.
    pub productivity_score: f64,
    pub total_app_switches: usize,
}

impl SessionStatistics {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let total_work_time: Duration = sessions.iter().map(Session::duration).sum();
        Self {
            total_sessions: sessions.len(),
            total_work_time,
            total_productive_time: sessions.iter().map(|s| s.productive_time).sum(),
            total_break_time: sessions.iter().map(|s| s.break_time).sum(),
            average_session_length: total_work_time / sessions.len() as u32,
            productivity_score: sessions.iter().map(|s| s.productivity_score).sum::<f64>()
                / sessions.len() as f64,
            total_app_switches: sessions.iter().map(|s| s.app_switch_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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

    #[test]
    fn activity_duration_is_derived() {
        let a = activity("code", 0, 90, true);
        assert_eq!(a.duration(), Duration::from_secs(90));
        assert!((a.duration_minutes() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn statistics_partition_time_exactly() {
        let mut session = Session::begin(ts(0));
        session.activities.push(activity("code", 0, 120, true));
        session.activities.push(activity("chrome", 120, 180, false));
        session.activities.push(activity("slack", 180, 300, true));
        session.recompute_statistics();

        let total: Duration = session.activities.iter().map(Activity::duration).sum();
        assert_eq!(session.productive_time + session.distracted_time, total);
        assert_eq!(session.productive_time, Duration::from_secs(240));
        assert_eq!(session.distracted_time, Duration::from_secs(60));
        assert_eq!(session.app_switch_count, 3);
        assert!((session.productivity_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn empty_session_has_zero_score() {
        let mut session = Session::begin(ts(0));
        session.recompute_statistics();
        assert_eq!(session.productivity_score, 0.0);
        assert_eq!(session.app_switch_count, 0);
        assert!(session.top_apps.is_empty());
    }

    #[test]
    fn top_apps_ordered_by_total_time() {
        let mut session = Session::begin(ts(0));
        session.activities.push(activity("code", 0, 60, true));
        session.activities.push(activity("chrome", 60, 300, false));
        session.activities.push(activity("code", 300, 330, true));
        session.activities.push(activity("slack", 330, 340, true));
        session.recompute_statistics();

        assert_eq!(session.top_apps, vec!["chrome", "code", "slack"]);
    }

    #[test]
    fn top_apps_tie_breaks_first_seen() {
        let acts = vec![
            activity("alpha", 0, 60, true),
            activity("beta", 60, 120, true),
        ];
        assert_eq!(top_apps_by_time(&acts, 5), vec!["alpha", "beta"]);
    }

    #[test]
    fn day_rollup_over_empty_input_is_zeroed() {
        let stats = SessionStatistics::from_sessions(&[]);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_work_time, Duration::ZERO);
    }

    #[test]
    fn day_rollup_sums_and_averages() {
        let mut a = Session::begin(ts(0));
        a.end_time = Some(ts(600));
        a.activities.push(activity("code", 0, 600, true));
        a.recompute_statistics();

        let mut b = Session::begin(ts(1000));
        b.end_time = Some(ts(1200));
        b.activities.push(activity("chrome", 1000, 1200, false));
        b.recompute_statistics();

        let stats = SessionStatistics::from_sessions(&[a, b]);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_work_time, Duration::from_secs(800));
        assert_eq!(stats.average_session_length, Duration::from_secs(400));
        assert_eq!(stats.total_app_switches, 2);
        assert!((stats.productivity_score - 50.0).abs() < 1e-9);
    }
}
