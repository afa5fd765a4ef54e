//! Background monitors: the idle detector and the window tracker.
//!
//! Each monitor is a pure state machine driven by a dedicated thread on a
//! fixed cadence. `stop()` joins the worker, so no tick can fire after it
//! returns.

pub mod idle;
pub mod tracker;

pub use idle::{IdleEvent, IdleMonitor, IdleState};
pub use tracker::{SwitchDetector, TrackerEvent, WindowTracker};
