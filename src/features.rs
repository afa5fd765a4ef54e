//! ML feature derivation from closed sessions.
//!
//! Everything here is a pure function of the session collection: records
//! are regenerable at any time, and context windows look backward only
//! within the owning session's ordered activity sequence.

use crate::models::{Activity, Session};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Base distraction for productive activities.
const BASE_DISTRACTION_PRODUCTIVE: f64 = 0.2;
/// Base distraction for non-productive activities.
const BASE_DISTRACTION_DISTRACTED: f64 = 0.8;

/// One training record per activity, with session-relative context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlFeatureRecord {
    /// Host this record was produced on.
    pub device_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    /// Hour of day as a fraction, 0.0–23.98.
    pub time_of_day: f64,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u32,
    pub app_name: String,
    pub window_title: String,
    pub app_category: String,
    pub duration_minutes: f64,
    /// Minutes between the previous activity's end and this one's start;
    /// 0 for the first activity of a session.
    pub time_since_last_switch_min: f64,
    pub app_switches_last_10_min: usize,
    pub app_switches_last_hour: usize,
    /// Productivity percentage (0–100) over the trailing 30 minutes.
    pub recent_productivity_last_30_min: f64,
    /// Target variable.
    pub is_productive: bool,
    /// Continuous risk score in [0, 1].
    pub distraction_level: f64,
    // Session-level context, passed through on every record.
    pub session_productivity: f64,
    pub session_app_switches: usize,
    pub session_length_hours: f64,
    /// Break minutes over max(1, session minutes).
    pub break_time_ratio: f64,
}

/// Ordered category table: first matching bucket wins.
pub type CategoryRules = Vec<(String, Vec<String>)>;

fn default_categories() -> CategoryRules {
    let table: &[(&str, &[&str])] = &[
        (
            "Development",
            &[
                "devenv",
                "code",
                "pycharm",
                "intellij",
                "eclipse",
                "atom",
                "sublime_text",
                "notepad++",
            ],
        ),
        (
            "Communication",
            &["outlook", "teams", "slack", "discord", "zoom", "skype", "telegram"],
        ),
        ("Web Browser", &["chrome", "firefox", "edge", "safari", "opera"]),
        (
            "Entertainment",
            &["spotify", "vlc", "netflix", "youtube", "steam", "epicgameslauncher"],
        ),
        ("Office", &["word", "excel", "powerpoint", "onenote", "notion"]),
        ("Design", &["photoshop", "illustrator", "figma", "sketch", "canva"]),
        ("System", &["explorer", "taskmgr", "regedit", "cmd", "powershell"]),
    ];

    table
        .iter()
        .map(|(name, apps)| {
            (
                name.to_string(),
                apps.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

/// Stateless transformer from closed sessions to ML feature records.
pub struct FeatureEngine {
    categories: CategoryRules,
    device_id: String,
}

impl FeatureEngine {
    pub fn new(categories: CategoryRules, device_id: impl Into<String>) -> Self {
        Self {
            categories,
            device_id: device_id.into(),
        }
    }

    /// Derive one record per activity across the given sessions.
    ///
    /// Pure function of its inputs: running it twice over the same closed
    /// sessions yields identical output.
    pub fn derive_features(&self, sessions: &[Session]) -> Vec<MlFeatureRecord> {
        let mut records = Vec::new();

        for session in sessions {
            let mut activities = session.activities.clone();
            activities.sort_by_key(|a| a.start_time);

            let session_minutes = session.duration().as_secs_f64() / 60.0;
            let break_time_ratio =
                session.break_time.as_secs_f64() / 60.0 / session_minutes.max(1.0);

            for (i, activity) in activities.iter().enumerate() {
                let time_since_last_switch_min = if i > 0 {
                    minutes_between(activities[i - 1].end_time, activity.start_time)
                } else {
                    0.0
                };

                records.push(MlFeatureRecord {
                    device_id: self.device_id.clone(),
                    session_id: session.id.clone(),
                    timestamp: activity.start_time,
                    time_of_day: activity.start_time.hour() as f64
                        + activity.start_time.minute() as f64 / 60.0,
                    day_of_week: activity.start_time.weekday().num_days_from_sunday(),
                    app_name: activity.app_name.clone(),
                    window_title: activity.window_title.clone(),
                    app_category: self.categorize_app(&activity.app_name),
                    duration_minutes: activity.duration_minutes(),
                    time_since_last_switch_min,
                    app_switches_last_10_min: count_switches(&activities, activity.start_time, 10),
                    app_switches_last_hour: count_switches(&activities, activity.start_time, 60),
                    recent_productivity_last_30_min: recent_productivity(
                        &activities,
                        activity.start_time,
                        30,
                    ),
                    is_productive: activity.is_productive,
                    distraction_level: distraction_level(activity, activities.len()),
                    session_productivity: session.productivity_score,
                    session_app_switches: activities.len(),
                    session_length_hours: session.duration().as_secs_f64() / 3600.0,
                    break_time_ratio,
                });
            }
        }

        records
    }

    /// Bucket an app into a coarse category; unknown apps fall into
    /// `"Other"`. Case-insensitive exact match, like the classifier.
    pub fn categorize_app(&self, app_name: &str) -> String {
        for (category, apps) in &self.categories {
            if apps.iter().any(|a| a.eq_ignore_ascii_case(app_name)) {
                return category.clone();
            }
        }
        "Other".to_string()
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        let device_id = hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown-host".to_string());
        Self::new(default_categories(), device_id)
    }
}

/// Distraction risk for one activity given its session's total switch
/// count: base by productivity, plus a switch-rate penalty capped at 0.3,
/// minus a long-focus bonus capped at 0.2, clamped to [0, 1].
pub fn distraction_level(activity: &Activity, session_switch_count: usize) -> f64 {
    let base = if activity.is_productive {
        BASE_DISTRACTION_PRODUCTIVE
    } else {
        BASE_DISTRACTION_DISTRACTED
    };

    let switch_penalty = (session_switch_count as f64 / 100.0).min(0.3);
    let duration_bonus = (-(activity.duration_minutes() / 30.0) * 0.1).max(-0.2);

    (base + switch_penalty + duration_bonus).clamp(0.0, 1.0)
}

/// Activities starting within the trailing window, reference inclusive.
fn count_switches(activities: &[Activity], reference: DateTime<Utc>, minutes_back: i64) -> usize {
    let cutoff = reference - ChronoDuration::minutes(minutes_back);
    activities
        .iter()
        .filter(|a| a.start_time >= cutoff && a.start_time <= reference)
        .count()
}

/// Productivity percentage (0–100) over activities starting in the trailing
/// window; 0 when the window is empty.
fn recent_productivity(
    activities: &[Activity],
    reference: DateTime<Utc>,
    minutes_back: i64,
) -> f64 {
    let cutoff = reference - ChronoDuration::minutes(minutes_back);
    let recent: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.start_time >= cutoff && a.start_time <= reference)
        .collect();

    if recent.is_empty() {
        return 0.0;
    }

    let productive: f64 = recent
        .iter()
        .filter(|a| a.is_productive)
        .map(|a| a.duration_minutes())
        .sum();
    let total: f64 = recent.iter().map(|a| a.duration_minutes()).sum();

    if total > 0.0 {
        productive / total * 100.0
    } else {
        0.0
    }
}

fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
