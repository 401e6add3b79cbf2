use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReflectionVerdict {
    NoReflection,
    EscapedReflection,
    RawReflection,
}

impl fmt::Display for ReflectionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReflectionVerdict::RawReflection => "RAW_REFLECTION",
            ReflectionVerdict::EscapedReflection => "ESCAPED",
            ReflectionVerdict::NoReflection => "NO_REFLECTION",
        };
        write!(f, "{}", s)
    }
}

impl ReflectionVerdict {
    pub fn is_raw(&self) -> bool {
        matches!(self, ReflectionVerdict::RawReflection)
    }
}

/// Which dialog-producing global fired during browser verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Alert,
    Confirm,
    Prompt,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerKind::Alert => "alert",
            TriggerKind::Confirm => "confirm",
            TriggerKind::Prompt => "prompt",
        };
        write!(f, "{}", s)
    }
}

impl TriggerKind {
    /// Keyword table for backends that only report a blocking dialog through
    /// error text. Order matters: the first keyword found wins.
    const WORDING: &'static [(&'static str, TriggerKind)] = &[
        ("alert text", TriggerKind::Alert),
        ("confirmation", TriggerKind::Confirm),
        ("confirm", TriggerKind::Confirm),
        ("prompt", TriggerKind::Prompt),
    ];

    /// Markers meaning a navigation was blocked by an open modal dialog.
    const BLOCKED_MARKERS: &'static [&'static str] = &[
        "unexpected alert open",
        "javascript dialog",
        "javascriptdialogopening",
        "dialog is showing",
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alert" => Some(TriggerKind::Alert),
            "confirm" => Some(TriggerKind::Confirm),
            "prompt" => Some(TriggerKind::Prompt),
            _ => None,
        }
    }

    /// Infers the dialog category from human-readable wording. Ambiguous
    /// wording falls back to `Alert`.
    pub fn from_wording(message: &str) -> Self {
        let lower = message.to_lowercase();
        Self::WORDING
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or(TriggerKind::Alert)
    }

    /// Returns the dialog kind when an error message says a modal dialog
    /// blocked the page load.
    pub fn from_blocked_navigation(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        Self::BLOCKED_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
            .then(|| Self::from_wording(message))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Low => "Low",
            Severity::Info => "Info",
        };
        write!(f, "{}", s)
    }
}

impl Severity {
    pub fn numeric_value(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Low => 1,
            Severity::Info => 0,
        }
    }
}
