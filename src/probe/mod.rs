//! Host capability probes consumed by the tracking engine.
//!
//! The engine never talks to OS window or input APIs directly. It consumes
//! these traits as injected capabilities, so platform bindings live outside
//! the crate and tests can script arbitrary focus/idle timelines.

pub mod noop;
pub mod types;

pub use noop::NoopProbe;
pub use types::WindowSample;

use std::time::Duration;

/// Source of foreground-window identity samples.
pub trait WindowProbe: Send + Sync {
    /// Identity of the currently focused application/window.
    ///
    /// Returns `None` when the host cannot be read. Implementations must
    /// fail gracefully rather than panic across this boundary; a `None`
    /// simply skips the tracking tick.
    fn sample_foreground_window(&self) -> Option<WindowSample>;
}

/// Source of time-since-last-input readings.
pub trait IdleProbe: Send + Sync {
    /// Elapsed time since the last user input, or `None` if the host
    /// reading failed. Failed reads are treated as zero idle time by the
    /// idle monitor.
    fn read_idle_duration(&self) -> Option<Duration>;
}
