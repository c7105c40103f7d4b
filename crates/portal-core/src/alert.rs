//! Transient page alerts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    /// Returns display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }

    /// Style class of the alert box. Success shares the info style.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Error => "alert-danger",
            Self::Warning => "alert-warning",
            Self::Info | Self::Success => "alert-info",
        }
    }

    /// Icon shown before the text.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Error => "exclamation-triangle",
            Self::Warning => "exclamation-circle",
            Self::Success => "check-circle",
            Self::Info => "info-circle",
        }
    }
}

/// Identifier of an alert rendered on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// A message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub text: String,
    pub severity: Severity,
}

impl AlertMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Error)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Success)
    }
}

/// Display stage of a rendered alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertStage {
    /// Fully visible.
    #[default]
    Shown,
    /// Fade-out animation running; removal follows.
    Fading,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classes() {
        assert_eq!(Severity::Error.css_class(), "alert-danger");
        assert_eq!(Severity::Warning.css_class(), "alert-warning");
        assert_eq!(Severity::Info.css_class(), "alert-info");
        assert_eq!(Severity::Success.css_class(), "alert-info");
    }

    #[test]
    fn test_severity_icons_are_distinct() {
        let icons = [
            Severity::Info.icon(),
            Severity::Warning.icon(),
            Severity::Error.icon(),
            Severity::Success.icon(),
        ];
        for (i, a) in icons.iter().enumerate() {
            for b in &icons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_alert_id_display() {
        assert_eq!(AlertId(7).to_string(), "alert-7");
    }
}
