//! Domain events handed to the notification subsystem.
//!
//! The CRUD layer constructs one of these immediately after a mutation
//! commits and invokes the event router with it. Events are consumed once
//! and never persisted; no event exists for a failed mutation.

use serde::{Deserialize, Serialize};

use crate::ids::{IssueId, UserId};
use crate::issue::{IssueSeverity, IssueStatus};
use crate::roles::Role;

/// The authenticated user who performed the mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Logical identity, matching the `userid` their session registered under.
    pub identity: UserId,
    /// Role at the time of the mutation.
    pub role: Role,
    /// Email, used for human-readable attribution in payloads.
    pub email: String,
}

/// An issue was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCreated {
    /// ID assigned by the store.
    pub issue_id: IssueId,
    /// Issue title.
    pub title: String,
    /// Severity at creation.
    pub severity: IssueSeverity,
    /// Status at creation.
    pub status: IssueStatus,
    /// Who created it (also the reporter of the new issue).
    pub actor: Actor,
}

/// An issue was updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdated {
    /// The updated issue.
    pub issue_id: IssueId,
    /// Title after the update.
    pub title: String,
    /// Severity after the update.
    pub severity: IssueSeverity,
    /// Status after the update.
    pub status: IssueStatus,
    /// Identity of the issue's original reporter.
    pub reporter: UserId,
    /// Who performed the update.
    pub actor: Actor,
}

/// An issue was deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDeleted {
    /// The deleted issue.
    pub issue_id: IssueId,
    /// Title at deletion time.
    pub title: String,
    /// Identity of the issue's original reporter.
    pub reporter: UserId,
    /// Who performed the deletion.
    pub actor: Actor,
}

/// Any issue-lifecycle event, tagged by kind for the ingest boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueEvent {
    /// See [`IssueCreated`].
    Created(IssueCreated),
    /// See [`IssueUpdated`].
    Updated(IssueUpdated),
    /// See [`IssueDeleted`].
    Deleted(IssueDeleted),
}

impl IssueEvent {
    /// The issue this event concerns.
    #[must_use]
    pub fn issue_id(&self) -> IssueId {
        match self {
            Self::Created(e) => e.issue_id,
            Self::Updated(e) => e.issue_id,
            Self::Deleted(e) => e.issue_id,
        }
    }

    /// The acting user.
    #[must_use]
    pub fn actor(&self) -> &Actor {
        match self {
            Self::Created(e) => &e.actor,
            Self::Updated(e) => &e.actor,
            Self::Deleted(e) => &e.actor,
        }
    }
}
