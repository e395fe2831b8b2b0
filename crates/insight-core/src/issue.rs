//! Issue attribute enums shared with the relational store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    /// Cosmetic or minor annoyance.
    Low,
    /// Degraded but usable.
    Medium,
    /// Major functionality broken.
    High,
    /// Outage or data loss.
    Critical,
}

/// Issue workflow status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    /// Newly filed, untriaged.
    Open,
    /// Accepted by a maintainer.
    Triaged,
    /// Being worked on.
    InProgress,
    /// Resolved.
    Done,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::Triaged => "TRIAGED",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        };
        f.write_str(s)
    }
}
