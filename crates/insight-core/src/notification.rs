//! Wire notification payloads pushed to connected clients.
//!
//! Field names and the `type` tag are part of the client contract
//! (`issue_created` / `issue_updated` / `issue_deleted`) and must not
//! change shape without a coordinated client update.

use serde::{Deserialize, Serialize};

use crate::events::{IssueCreated, IssueDeleted, IssueUpdated};
use crate::ids::{IssueId, UserId};
use crate::issue::{IssueSeverity, IssueStatus};
use crate::roles::Role;

/// A JSON-shaped event delivered to a client session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A new issue exists.
    IssueCreated {
        /// The new issue.
        issue_id: IssueId,
        /// Issue title.
        title: String,
        /// Email of the user who filed it.
        reporter_email: String,
        /// Role of the user who filed it.
        reporter_role: Role,
        /// Severity at creation.
        severity: IssueSeverity,
        /// Status at creation.
        status: IssueStatus,
    },
    /// An issue changed.
    IssueUpdated {
        /// The updated issue.
        issue_id: IssueId,
        /// Title after the update.
        title: String,
        /// Email of the user who made the change.
        updated_by_email: String,
        /// Role of the user who made the change.
        updated_by_role: Role,
        /// Severity after the update.
        severity: IssueSeverity,
        /// Status after the update.
        status: IssueStatus,
        /// Identity of the issue's reporter.
        reporter_id: UserId,
    },
    /// An issue was removed.
    IssueDeleted {
        /// The deleted issue.
        issue_id: IssueId,
        /// Title at deletion time.
        title: String,
        /// Email of the admin who deleted it.
        deleted_by_email: String,
        /// Identity of the issue's reporter.
        reporter_id: UserId,
    },
}

impl From<&IssueCreated> for Notification {
    fn from(event: &IssueCreated) -> Self {
        Self::IssueCreated {
            issue_id: event.issue_id,
            title: event.title.clone(),
            reporter_email: event.actor.email.clone(),
            reporter_role: event.actor.role,
            severity: event.severity,
            status: event.status,
        }
    }
}

impl From<&IssueUpdated> for Notification {
    fn from(event: &IssueUpdated) -> Self {
        Self::IssueUpdated {
            issue_id: event.issue_id,
            title: event.title.clone(),
            updated_by_email: event.actor.email.clone(),
            updated_by_role: event.actor.role,
            severity: event.severity,
            status: event.status,
            reporter_id: event.reporter.clone(),
        }
    }
}

impl From<&IssueDeleted> for Notification {
    fn from(event: &IssueDeleted) -> Self {
        Self::IssueDeleted {
            issue_id: event.issue_id,
            title: event.title.clone(),
            deleted_by_email: event.actor.email.clone(),
            reporter_id: event.reporter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Actor;

    fn staff_actor() -> Actor {
        Actor {
            identity: UserId::from("m1"),
            role: Role::Maintainer,
            email: "m1@example.com".into(),
        }
    }

    #[test]
    fn created_payload_shape() {
        let event = IssueCreated {
            issue_id: IssueId::new(12),
            title: "crash on save".into(),
            severity: IssueSeverity::Critical,
            status: IssueStatus::Open,
            actor: Actor {
                identity: UserId::from("r1"),
                role: Role::Reporter,
                email: "r1@example.com".into(),
            },
        };
        let json = serde_json::to_value(Notification::from(&event)).unwrap();
        assert_eq!(json["type"], "issue_created");
        assert_eq!(json["issue_id"], 12);
        assert_eq!(json["title"], "crash on save");
        assert_eq!(json["reporter_email"], "r1@example.com");
        assert_eq!(json["reporter_role"], "REPORTER");
        assert_eq!(json["severity"], "CRITICAL");
        assert_eq!(json["status"], "OPEN");
    }

    #[test]
    fn updated_payload_shape() {
        let event = IssueUpdated {
            issue_id: IssueId::new(5),
            title: "slow dashboard".into(),
            severity: IssueSeverity::Medium,
            status: IssueStatus::InProgress,
            reporter: UserId::from("r9"),
            actor: staff_actor(),
        };
        let json = serde_json::to_value(Notification::from(&event)).unwrap();
        assert_eq!(json["type"], "issue_updated");
        assert_eq!(json["updated_by_email"], "m1@example.com");
        assert_eq!(json["updated_by_role"], "MAINTAINER");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert_eq!(json["reporter_id"], "r9");
    }

    #[test]
    fn deleted_payload_shape() {
        let event = IssueDeleted {
            issue_id: IssueId::new(8),
            title: "duplicate".into(),
            reporter: UserId::from("r2"),
            actor: Actor {
                identity: UserId::from("a1"),
                role: Role::Admin,
                email: "a1@example.com".into(),
            },
        };
        let json = serde_json::to_value(Notification::from(&event)).unwrap();
        assert_eq!(json["type"], "issue_deleted");
        assert_eq!(json["deleted_by_email"], "a1@example.com");
        assert_eq!(json["reporter_id"], "r2");
        // Deletion payloads carry no severity/status
        assert!(json.get("severity").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn payload_roundtrip() {
        let event = IssueUpdated {
            issue_id: IssueId::new(1),
            title: "t".into(),
            severity: IssueSeverity::Low,
            status: IssueStatus::Done,
            reporter: UserId::from("r1"),
            actor: staff_actor(),
        };
        let payload = Notification::from(&event);
        let json = serde_json::to_string(&payload).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
