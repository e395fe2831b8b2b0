//! Best-effort event delivery against registry snapshots.
//!
//! Every push is independent per recipient: a dead or backlogged session
//! fails its own delivery, gets reaped, and never stalls the rest of the
//! fan-out or the business operation that triggered it.

use std::sync::Arc;

use insight_core::{Role, UserId};
use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::lifecycle::ConnectionLifecycle;
use crate::registry::SessionRegistry;
use crate::session::{PushError, Session};

/// A payload rendered to its JSON wire form once per event.
///
/// Clones share the rendered frame, so a fan-out to N recipients
/// serializes exactly once.
#[derive(Clone, Debug)]
pub struct WirePayload(Arc<String>);

impl WirePayload {
    /// Render a serializable payload to its wire frame.
    pub fn render<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(payload).map(|json| Self(Arc::new(json)))
    }

    /// The rendered JSON text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn frame(&self) -> Arc<String> {
        self.0.clone()
    }
}

/// Outcome of one delivery attempt to one recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The frame was queued on the session's transport.
    Delivered,
    /// The identity had no live session. A normal outcome, not an error.
    NotConnected,
    /// The push failed; the session has been reaped.
    Failed(PushError),
}

/// One recipient's delivery result within a fan-out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// The targeted identity.
    pub identity: UserId,
    /// What happened to this recipient's push.
    pub outcome: DeliveryOutcome,
}

impl Delivery {
    /// Whether the frame reached the session's transport queue.
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Resolves targeting rules against the [`SessionRegistry`] and attempts
/// one push per matching session.
pub struct DeliveryEngine {
    registry: Arc<SessionRegistry>,
    lifecycle: Arc<ConnectionLifecycle>,
}

impl DeliveryEngine {
    /// Create an engine over the registry and the lifecycle handler that
    /// reaps sessions on push failure.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>, lifecycle: Arc<ConnectionLifecycle>) -> Self {
        Self {
            registry,
            lifecycle,
        }
    }

    /// Deliver to a single identity.
    ///
    /// An absent identity is skipped, never an error, and the registry is
    /// not mutated. A transport failure reaps the session before returning.
    pub fn deliver_to(&self, identity: &UserId, payload: &WirePayload) -> Delivery {
        match self.registry.lookup(identity) {
            Some(session) => self.push_session(&session, payload),
            None => {
                debug!(identity = %identity, "recipient not connected, skipping");
                Delivery {
                    identity: identity.clone(),
                    outcome: DeliveryOutcome::NotConnected,
                }
            }
        }
    }

    /// Deliver to each identity independently; one recipient's failure
    /// never prevents delivery to the others.
    pub fn deliver_to_set<'a, I>(&self, identities: I, payload: &WirePayload) -> Vec<Delivery>
    where
        I: IntoIterator<Item = &'a UserId>,
    {
        identities
            .into_iter()
            .map(|identity| self.deliver_to(identity, payload))
            .collect()
    }

    /// Deliver to every session whose role is in `roles`, minus `exclude`.
    ///
    /// The role set is resolved as a snapshot at call time; sessions that
    /// connect mid-fan-out are not retroactively included.
    pub fn deliver_to_role(
        &self,
        roles: &[Role],
        payload: &WirePayload,
        exclude: &[&UserId],
    ) -> Vec<Delivery> {
        let snapshot = self.registry.with_role_in(roles);
        debug!(roles = ?roles, recipients = snapshot.len(), "role fan-out");
        self.push_snapshot(snapshot, payload, exclude)
    }

    /// Deliver to every connected session, minus `exclude`.
    pub fn broadcast_all(&self, payload: &WirePayload, exclude: &[&UserId]) -> Vec<Delivery> {
        let snapshot = self.registry.all();
        debug!(recipients = snapshot.len(), "broadcast fan-out");
        self.push_snapshot(snapshot, payload, exclude)
    }

    fn push_snapshot(
        &self,
        snapshot: Vec<Arc<Session>>,
        payload: &WirePayload,
        exclude: &[&UserId],
    ) -> Vec<Delivery> {
        snapshot
            .iter()
            .filter(|session| !exclude.iter().any(|x| *x == session.identity()))
            .map(|session| self.push_session(session, payload))
            .collect()
    }

    fn push_session(&self, session: &Arc<Session>, payload: &WirePayload) -> Delivery {
        let outcome = match session.push(payload.frame()) {
            Ok(()) => {
                counter!("notify_deliveries_total").increment(1);
                DeliveryOutcome::Delivered
            }
            Err(err) => {
                warn!(identity = %session.identity(), %err, "push failed, reaping session");
                counter!("notify_delivery_failures_total").increment(1);
                self.lifecycle.reap_broken(session);
                DeliveryOutcome::Failed(err)
            }
        };
        Delivery {
            identity: session.identity().clone(),
            outcome,
        }
    }
}
