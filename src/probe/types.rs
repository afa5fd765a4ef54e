//! Sample types shared by the host probes.

use serde::{Deserialize, Serialize};

/// Identity of a focused application/window at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSample {
    /// Process or application name, e.g. `"code"`.
    pub app_name: String,
    /// Title of the focused window.
    pub window_title: String,
}

impl WindowSample {
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
        }
    }

    /// An empty identity carries no usable information and is skipped by the
    /// tracker, same as a failed read.
    pub fn is_empty(&self) -> bool {
        self.app_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identity_is_detected() {
        assert!(WindowSample::new("", "some title").is_empty());
        assert!(!WindowSample::new("code", "").is_empty());
    }
}
