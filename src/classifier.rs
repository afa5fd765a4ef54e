//! Productive/distracting classification of focused applications.
//!
//! Classification is a pure function of the app identity and window title.
//! The rule lists are injected configuration rather than baked-in constants,
//! so deployments (and tests) can override them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rule lists driving [`ActivityClassifier`]. All matching is
/// case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Apps always considered productive (exact name match).
    pub productive_apps: Vec<String>,
    /// Apps considered distracting unless the window title looks
    /// work-related (exact name match).
    pub distracting_apps: Vec<String>,
    /// Title keywords that rescue a distracting app (substring match).
    pub work_keywords: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            productive_apps: [
                "devenv",
                "code",
                "notepad",
                "notepad++",
                "sublime_text",
                "atom",
                "pycharm",
                "intellij",
                "eclipse",
                "netbeans",
                "word",
                "excel",
                "powerpoint",
                "outlook",
                "teams",
                "slack",
                "zoom",
                "discord",
                "figma",
                "photoshop",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            distracting_apps: [
                "chrome",
                "firefox",
                "edge",
                "safari",
                "opera",
                "spotify",
                "vlc",
                "netflix",
                "youtube",
                "tiktok",
                "instagram",
                "facebook",
                "twitter",
                "reddit",
                "steam",
                "epicgameslauncher",
                "uplay",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            work_keywords: [
                "github",
                "stackoverflow",
                "documentation",
                "tutorial",
                "course",
                "learning",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Classifies activities as productive or distracting.
#[derive(Debug, Clone)]
pub struct ActivityClassifier {
    productive: HashSet<String>,
    distracting: HashSet<String>,
    work_keywords: Vec<String>,
}

impl ActivityClassifier {
    /// Build a classifier from a rule set. Rules are lowercased once here so
    /// each classification is a plain lookup.
    pub fn new(rules: &ClassifierRules) -> Self {
        Self {
            productive: rules
                .productive_apps
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            distracting: rules
                .distracting_apps
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            work_keywords: rules
                .work_keywords
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Classify an activity by app name and window title.
    ///
    /// Apps in neither list default to productive; that is a deliberate
    /// policy (unknown tools are assumed to be work), not an omission.
    pub fn classify(&self, app_name: &str, window_title: &str) -> bool {
        let app = app_name.to_lowercase();

        if self.productive.contains(&app) {
            return true;
        }

        if self.distracting.contains(&app) {
            return self.is_work_related(window_title);
        }

        true
    }

    fn is_work_related(&self, window_title: &str) -> bool {
        let title = window_title.to_lowercase();
        self.work_keywords.iter().any(|kw| title.contains(kw))
    }
}

impl Default for ActivityClassifier {
    fn default() -> Self {
        Self::new(&ClassifierRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn productive_app_is_productive() {
        let classifier = ActivityClassifier::default();
        assert!(classifier.classify("code", "anything"));
    }

    #[test]
    fn distracting_app_rescued_by_work_title() {
        let classifier = ActivityClassifier::default();
        assert!(classifier.classify("chrome", "Open Source Project - GitHub"));
        assert!(!classifier.classify("chrome", "Funny Cat Video"));
    }

    #[test]
    fn unknown_app_defaults_to_productive() {
        let classifier = ActivityClassifier::default();
        assert!(classifier.classify("unknownapp", "x"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = ActivityClassifier::default();
        assert!(classifier.classify("CODE", "x"));
        assert!(classifier.classify("Chrome", "Rust Documentation - std"));
        assert!(!classifier.classify("FIREFOX", "cat compilation"));
    }

    #[test]
    fn custom_rules_override_defaults() {
        let rules = ClassifierRules {
            productive_apps: vec!["game".into()],
            distracting_apps: vec!["editor".into()],
            work_keywords: vec![],
        };
        let classifier = ActivityClassifier::new(&rules);
        assert!(classifier.classify("game", ""));
        assert!(!classifier.classify("editor", "important work"));
    }
}
