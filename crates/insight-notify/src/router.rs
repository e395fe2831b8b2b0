//! Issue-event routing policy.
//!
//! One entry point per domain action. Each builds the wire payload for the
//! event and makes exactly one targeting decision. The recipient sets are
//! product semantics, not plumbing: reporters hear about staff actions on
//! their own issues, staff hear about all activity.

use std::sync::Arc;

use insight_core::roles::STAFF_ROLES;
use insight_core::{IssueCreated, IssueDeleted, IssueEvent, IssueUpdated, Notification, Role};
use tracing::{debug, warn};

use crate::delivery::{Delivery, DeliveryEngine, WirePayload};

/// Maps committed issue mutations to delivery calls.
///
/// Invoked by the CRUD layer after a mutation commits. The returned
/// per-recipient results are observability data; no outcome here ever
/// affects the triggering operation.
pub struct EventRouter {
    delivery: Arc<DeliveryEngine>,
}

impl EventRouter {
    /// Create a router over the given delivery engine.
    #[must_use]
    pub fn new(delivery: Arc<DeliveryEngine>) -> Self {
        Self { delivery }
    }

    /// Route any issue event to its handler.
    pub fn dispatch(&self, event: &IssueEvent) -> Vec<Delivery> {
        let results = match event {
            IssueEvent::Created(e) => self.on_issue_created(e),
            IssueEvent::Updated(e) => self.on_issue_updated(e),
            IssueEvent::Deleted(e) => self.on_issue_deleted(e),
        };
        debug!(
            issue_id = %event.issue_id(),
            actor = %event.actor().identity,
            recipients = results.len(),
            delivered = results.iter().filter(|d| d.delivered()).count(),
            "event routed"
        );
        results
    }

    /// A reporter's new issue goes to staff; a staff member's new issue is
    /// broadcast to everyone.
    ///
    /// The staff branch intentionally does not exclude the actor — staff
    /// see their own creations echoed back, unlike the update/delete
    /// paths. Clients rely on the echo to confirm the listener works.
    pub fn on_issue_created(&self, event: &IssueCreated) -> Vec<Delivery> {
        let Some(payload) = render(&Notification::from(event)) else {
            return Vec::new();
        };
        if event.actor.role == Role::Reporter {
            self.delivery.deliver_to_role(&STAFF_ROLES, &payload, &[])
        } else {
            self.delivery.broadcast_all(&payload, &[])
        }
    }

    /// Staff updates notify the issue's reporter plus the rest of the
    /// staff; a reporter updating their own issue notifies staff only.
    ///
    /// The actor never hears about their own update, and the reporter is
    /// excluded from the staff fan-out when already targeted directly, so
    /// every recipient gets the event exactly once.
    pub fn on_issue_updated(&self, event: &IssueUpdated) -> Vec<Delivery> {
        let Some(payload) = render(&Notification::from(event)) else {
            return Vec::new();
        };
        let actor = &event.actor.identity;
        if event.actor.role.is_staff() {
            let mut results = Vec::new();
            if event.reporter != *actor {
                results.push(self.delivery.deliver_to(&event.reporter, &payload));
            }
            results.extend(self.delivery.deliver_to_role(
                &STAFF_ROLES,
                &payload,
                &[actor, &event.reporter],
            ));
            results
        } else {
            self.delivery.deliver_to_role(&STAFF_ROLES, &payload, &[])
        }
    }

    /// A deletion notifies the issue's reporter and all staff except the
    /// deleting admin.
    pub fn on_issue_deleted(&self, event: &IssueDeleted) -> Vec<Delivery> {
        let Some(payload) = render(&Notification::from(event)) else {
            return Vec::new();
        };
        let actor = &event.actor.identity;
        let mut results = Vec::new();
        if event.reporter != *actor {
            results.push(self.delivery.deliver_to(&event.reporter, &payload));
        }
        results.extend(self.delivery.deliver_to_role(
            &STAFF_ROLES,
            &payload,
            &[actor, &event.reporter],
        ));
        results
    }
}

fn render(notification: &Notification) -> Option<WirePayload> {
    match WirePayload::render(notification) {
        Ok(payload) => Some(payload),
        Err(err) => {
            // Delivery is supplementary; a render failure is logged, never
            // surfaced to the triggering operation.
            warn!(%err, "failed to render notification payload");
            None
        }
    }
}
