//! # insight-core
//!
//! Foundation types for the Insight tracker's realtime subsystem.
//!
//! This crate provides the shared vocabulary the other Insight crates
//! depend on:
//!
//! - **Branded IDs**: [`UserId`], [`IssueId`], [`ConnectionId`] newtypes
//! - **Roles**: the closed [`Role`] set (`ADMIN` / `MAINTAINER` / `REPORTER`)
//! - **Issue enums**: [`IssueSeverity`] and [`IssueStatus`]
//! - **Domain events**: [`IssueEvent`] and its per-action records, handed
//!   over by the CRUD layer after a mutation commits
//! - **Wire notifications**: the [`Notification`] payloads pushed to
//!   connected clients

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod issue;
pub mod notification;
pub mod roles;

pub use events::{Actor, IssueCreated, IssueDeleted, IssueEvent, IssueUpdated};
pub use ids::{ConnectionId, IssueId, UserId};
pub use issue::{IssueSeverity, IssueStatus};
pub use notification::Notification;
pub use roles::{Role, UnknownRole};
