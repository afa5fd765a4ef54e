//! Daily productivity reports aggregated from stored sessions.

use crate::models::{Activity, Session};
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Apps listed in the top-app rankings.
const TOP_APP_LIMIT: usize = 5;

/// One calendar day's aggregate. Derived and regenerable; never a source of
/// truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub number_of_sessions: usize,
    pub total_work_time_hours: f64,
    pub productive_time_hours: f64,
    pub distracted_time_hours: f64,
    pub break_time_hours: f64,
    /// Mean of the per-session productivity scores.
    pub productivity_score: f64,
    pub total_app_switches: usize,
    pub average_session_length_min: f64,
    pub top_productive_apps: Vec<String>,
    pub top_distracting_apps: Vec<String>,
    /// Hour of day (0–23) → productivity percentage, only for hours with at
    /// least one recorded activity.
    pub productivity_by_hour: BTreeMap<u32, f64>,
    /// `"HH:00 (NN%)"`, absent when the day has no activity.
    pub most_productive_hour: Option<String>,
    pub least_productive_hour: Option<String>,
}

impl DailyReport {
    /// Well-defined zero-valued report for a day without sessions.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            number_of_sessions: 0,
            total_work_time_hours: 0.0,
            productive_time_hours: 0.0,
            distracted_time_hours: 0.0,
            break_time_hours: 0.0,
            productivity_score: 0.0,
            total_app_switches: 0,
            average_session_length_min: 0.0,
            top_productive_apps: Vec::new(),
            top_distracting_apps: Vec::new(),
            productivity_by_hour: BTreeMap::new(),
            most_productive_hour: None,
            least_productive_hour: None,
        }
    }
}

/// Aggregate every session starting on `date` (UTC) into a report.
pub fn generate_daily_report(date: NaiveDate, sessions: &[Session]) -> DailyReport {
    let day_sessions: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.start_time.date_naive() == date)
        .collect();

    if day_sessions.is_empty() {
        return DailyReport::empty(date);
    }

    let all_activities: Vec<&Activity> = day_sessions
        .iter()
        .flat_map(|s| s.activities.iter())
        .collect();

    let hours = |d: std::time::Duration| d.as_secs_f64() / 3600.0;

    let mut report = DailyReport::empty(date);
    report.number_of_sessions = day_sessions.len();
    report.total_work_time_hours = day_sessions.iter().map(|s| hours(s.duration())).sum();
    report.productive_time_hours = day_sessions.iter().map(|s| hours(s.productive_time)).sum();
    report.distracted_time_hours = day_sessions.iter().map(|s| hours(s.distracted_time)).sum();
    report.break_time_hours = day_sessions.iter().map(|s| hours(s.break_time)).sum();
    report.productivity_score = day_sessions
        .iter()
        .map(|s| s.productivity_score)
        .sum::<f64>()
        / day_sessions.len() as f64;
    report.total_app_switches = day_sessions.iter().map(|s| s.app_switch_count).sum();
    report.average_session_length_min = day_sessions
        .iter()
        .map(|s| s.duration().as_secs_f64() / 60.0)
        .sum::<f64>()
        / day_sessions.len() as f64;

    report.top_productive_apps = top_apps(&all_activities, true);
    report.top_distracting_apps = top_apps(&all_activities, false);
    report.productivity_by_hour = productivity_by_hour(&all_activities);

    // Ties resolve to the earliest hour: the map iterates ascending and the
    // comparisons are strict.
    let mut most: Option<(u32, f64)> = None;
    let mut least: Option<(u32, f64)> = None;
    for (&hour, &score) in &report.productivity_by_hour {
        if most.map(|(_, best)| score > best).unwrap_or(true) {
            most = Some((hour, score));
        }
        if least.map(|(_, worst)| score < worst).unwrap_or(true) {
            least = Some((hour, score));
        }
    }
    report.most_productive_hour = most.map(format_hour_label);
    report.least_productive_hour = least.map(format_hour_label);

    report
}

fn format_hour_label((hour, score): (u32, f64)) -> String {
    format!("{hour:02}:00 ({score:.0}%)")
}

/// Top apps by summed focused minutes among (non-)productive activities,
/// first-seen order breaking ties.
fn top_apps(activities: &[&Activity], productive: bool) -> Vec<String> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for activity in activities.iter().filter(|a| a.is_productive == productive) {
        match totals.iter_mut().find(|(name, _)| name == &activity.app_name) {
            Some((_, total)) => *total += activity.duration_minutes(),
            None => totals.push((activity.app_name.clone(), activity.duration_minutes())),
        }
    }
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals
        .into_iter()
        .take(TOP_APP_LIMIT)
        .map(|(name, _)| name)
        .collect()
}

/// Productivity percentage per hour of day, restricted to hours with
/// recorded activity.
fn productivity_by_hour(activities: &[&Activity]) -> BTreeMap<u32, f64> {
    let mut by_hour: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for activity in activities {
        let entry = by_hour.entry(activity.start_time.hour()).or_insert((0.0, 0.0));
        if activity.is_productive {
            entry.0 += activity.duration_minutes();
        }
        entry.1 += activity.duration_minutes();
    }

    by_hour
        .into_iter()
        .map(|(hour, (productive, total))| (hour, productive / total.max(1.0) * 100.0))
        .collect()
}
