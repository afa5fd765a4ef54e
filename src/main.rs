//! Focus Agent CLI
//!
//! Background focus tracker and session analytics.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use crossbeam_channel::{select, unbounded};
use focus_agent::{
    classifier::ActivityClassifier,
    config::Config,
    events::{EngineEvent, EventBus},
    features::FeatureEngine,
    monitor::{IdleEvent, IdleMonitor, TrackerEvent, WindowTracker},
    notify::{ActivityNotifier, LogNotifier},
    probe::{IdleProbe, NoopProbe, WindowProbe},
    report::generate_daily_report,
    session::SessionManager,
    storage::{JsonFileStore, SessionStore},
    VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "focus-agent")]
#[command(version = VERSION)]
#[command(about = "Background focus tracker and session analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tracking session (runs until Ctrl+C)
    Track {
        /// Idle threshold in seconds
        #[arg(long, default_value = "300")]
        idle_threshold: u64,
    },

    /// Show the daily productivity report
    Report {
        /// Day to report on (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// How many days of history to load
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Derive ML feature records from stored sessions
    Features {
        /// How many days of history to process
        #[arg(long, default_value = "7")]
        days: u32,

        /// Write records to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Track { idle_threshold } => cmd_track(idle_threshold),
        Commands::Report { date, days } => cmd_report(date, days),
        Commands::Features { days, output } => cmd_features(days, output),
        Commands::Config => cmd_config(),
    }
}

fn cmd_track(idle_threshold_secs: u64) -> Result<()> {
    println!("Focus Agent v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    // Host probes are injected capabilities; without platform bindings the
    // no-op probe keeps the pipeline running but records nothing.
    let window_probe: Arc<dyn WindowProbe> = Arc::new(NoopProbe);
    let idle_probe: Arc<dyn IdleProbe> = Arc::new(NoopProbe);
    eprintln!("Warning: no host probe bound on this platform; no activity will be recorded.");

    let store = Arc::new(JsonFileStore::new(config.sessions_path()));
    let events = Arc::new(EventBus::new());
    let sessions = SessionManager::new(store, events.clone());
    let notifier = LogNotifier;

    let mut idle = IdleMonitor::new(
        idle_probe,
        std::time::Duration::from_secs(idle_threshold_secs),
        config.idle_poll_interval,
    );
    let mut tracker = WindowTracker::new(
        window_probe,
        ActivityClassifier::new(&config.classifier),
        idle.idle_flag(),
        config.sample_interval,
    );

    println!("Starting tracking...");
    println!("  Sample interval: {}s", config.sample_interval.as_secs());
    println!("  Idle threshold: {idle_threshold_secs}s");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    idle.start();
    tracker.start();
    let session_id = sessions.start_session();
    println!("Session started: {session_id}");

    // Ctrl+C flips into the same select loop as the monitor channels.
    let (ctrl_tx, ctrl_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = ctrl_tx.send(());
    })
    .context("Error setting Ctrl+C handler")?;

    let tracker_rx = tracker.receiver().clone();
    let idle_rx = idle.receiver().clone();

    loop {
        select! {
            recv(tracker_rx) -> event => {
                if let Ok(event) = event {
                    handle_tracker_event(event, &sessions, &events, &notifier);
                }
            }
            recv(idle_rx) -> event => {
                if let Ok(event) = event {
                    handle_idle_event(event, &sessions, &events);
                }
            }
            recv(ctrl_rx) -> _ => break,
        }
    }

    println!();
    println!("Stopping tracking...");
    tracker.stop();
    idle.stop();

    // Everything is already emitted once stop() returns; drain the queues
    // so the final partial activity reaches the session before it closes.
    while let Ok(event) = tracker_rx.try_recv() {
        handle_tracker_event(event, &sessions, &events, &notifier);
    }
    while let Ok(event) = idle_rx.try_recv() {
        handle_idle_event(event, &sessions, &events);
    }

    match sessions.end_session() {
        Ok(Some(session)) => {
            println!();
            println!("Session {} saved.", session.id);
            println!("  Activities: {}", session.app_switch_count);
            println!(
                "  Productive: {}m  Distracted: {}m  Breaks: {}m",
                session.productive_time.as_secs() / 60,
                session.distracted_time.as_secs() / 60,
                session.break_time.as_secs() / 60
            );
            println!("  Productivity score: {:.0}%", session.productivity_score);
            if !session.top_apps.is_empty() {
                println!("  Top apps: {}", session.top_apps.join(", "));
            }
        }
        Ok(None) => println!("No session was active."),
        Err(e) => eprintln!("Error saving session: {e}"),
    }

    Ok(())
}

fn handle_tracker_event(
    event: TrackerEvent,
    sessions: &SessionManager,
    bus: &EventBus,
    notifier: &LogNotifier,
) {
    match event {
        TrackerEvent::AppSwitched(activity) => {
            println!(
                "[{}] {} - {} ({}, {}s)",
                activity.end_time.format("%H:%M:%S"),
                activity.app_name,
                activity.window_title,
                if activity.is_productive {
                    "productive"
                } else {
                    "distracting"
                },
                activity.duration().as_secs()
            );
            notifier.notify_activity(&activity);
            bus.emit(EngineEvent::AppSwitched {
                activity: activity.clone(),
            });
            sessions.add_activity(activity);
        }
        TrackerEvent::Completed(log) => {
            println!("Tracking stopped. Logged {} activities.", log.len());
            bus.emit(EngineEvent::TrackingStopped { activities: log });
        }
    }
}

fn handle_idle_event(event: IdleEvent, sessions: &SessionManager, bus: &EventBus) {
    match event {
        IdleEvent::StateChanged(transition) => {
            println!(
                "[{}] {} (idle for {}s)",
                transition.timestamp.format("%H:%M:%S"),
                if transition.is_idle { "IDLE" } else { "ACTIVE" },
                transition.idle_duration.as_secs()
            );
            bus.emit(EngineEvent::IdleStateChanged {
                transition: transition.clone(),
            });
            sessions.on_idle_transition(&transition);
        }
        IdleEvent::TimeUpdated { idle_for } => {
            // Live readout only; nothing to fold into the session.
            bus.emit(EngineEvent::IdleTimeUpdated { idle_for });
        }
    }
}

fn cmd_report(date: Option<String>, days: u32) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let store = JsonFileStore::new(config.sessions_path());

    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let sessions = store
        .load_sessions(days)
        .context("failed to load sessions")?;
    let report = generate_daily_report(date, &sessions);

    println!("Daily Report - {}", report.date);
    println!("==========================");
    println!();
    println!("Sessions:           {}", report.number_of_sessions);
    println!("Work time:          {:.1}h", report.total_work_time_hours);
    println!("Productive:         {:.1}h", report.productive_time_hours);
    println!("Distracted:         {:.1}h", report.distracted_time_hours);
    println!("Breaks:             {:.1}h", report.break_time_hours);
    println!("Productivity score: {:.0}%", report.productivity_score);
    println!("App switches:       {}", report.total_app_switches);
    println!(
        "Avg session length: {:.0}m",
        report.average_session_length_min
    );

    if let Some(hour) = &report.most_productive_hour {
        println!("Most productive:    {hour}");
    }
    if let Some(hour) = &report.least_productive_hour {
        println!("Least productive:   {hour}");
    }
    if !report.top_productive_apps.is_empty() {
        println!("Top productive:     {}", report.top_productive_apps.join(", "));
    }
    if !report.top_distracting_apps.is_empty() {
        println!("Top distracting:    {}", report.top_distracting_apps.join(", "));
    }
    if !report.productivity_by_hour.is_empty() {
        println!();
        println!("By hour:");
        for (hour, score) in &report.productivity_by_hour {
            println!("  {hour:02}:00  {score:.0}%");
        }
    }

    Ok(())
}

fn cmd_features(days: u32, output: Option<PathBuf>) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let store = JsonFileStore::new(config.sessions_path());

    let sessions = store
        .load_sessions(days)
        .context("failed to load sessions")?;
    let records = FeatureEngine::default().derive_features(&sessions);

    let json = serde_json::to_string_pretty(&records).context("failed to serialize records")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Exported {} feature records from {} sessions to {}",
                records.len(),
                sessions.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!("Session history: {:?}", config.sessions_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );

    Ok(())
}
