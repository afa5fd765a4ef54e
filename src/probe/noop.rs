//! No-op probe for hosts without platform bindings.
//!
//! This exists so the binary can run (and the crate can compile) everywhere;
//! it never reports a focused window and always reads zero idle time.

use crate::probe::{IdleProbe, WindowProbe, WindowSample};
use std::time::Duration;

/// A probe that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProbe;

impl WindowProbe for NoopProbe {
    fn sample_foreground_window(&self) -> Option<WindowSample> {
        None
    }
}

impl IdleProbe for NoopProbe {
    fn read_idle_duration(&self) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}
