//! Connection lifecycle: establishment, teardown, and reaping.

use std::collections::BTreeMap;
use std::sync::Arc;

use insight_core::{Role, UserId};
use metrics::{counter, gauge};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::registry::SessionRegistry;
use crate::session::{Session, SessionSender};

/// A connection attempt was refused at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The request presented no identity; nothing was registered.
    #[error("connection request missing identity")]
    MissingIdentity,
}

/// Diagnostic view of one live session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// Role presented at connect time, if any.
    pub role: Option<Role>,
    /// Display label (email), if any.
    pub email: Option<String>,
    /// Always `true` — only live sessions appear in the snapshot.
    pub connected: bool,
}

/// Applies connect/disconnect signals to the [`SessionRegistry`] and reaps
/// sessions whose transport failed during delivery.
///
/// Per identity the states are simply absent and connected; a reconnect
/// under a connected identity supersedes the old session in place, without
/// passing through absent.
pub struct ConnectionLifecycle {
    registry: Arc<SessionRegistry>,
}

impl ConnectionLifecycle {
    /// Create a lifecycle handler over the given registry.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this handler mutates.
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Establish a session for a new connection.
    ///
    /// Refuses empty identities before touching the registry. A role the
    /// transport could not parse arrives as `None` and the session is then
    /// excluded from role-targeted deliveries.
    ///
    /// If the identity already has a session it is atomically superseded;
    /// the old transport handle is abandoned and left to fail on its own
    /// next use.
    pub fn connect(
        &self,
        identity: &str,
        role: Option<Role>,
        display_label: Option<String>,
        handle: SessionSender,
    ) -> Result<Arc<Session>, ConnectError> {
        if identity.is_empty() {
            warn!("refusing connection without identity");
            return Err(ConnectError::MissingIdentity);
        }

        let session = Arc::new(Session::new(
            UserId::from(identity),
            role,
            display_label,
            handle,
        ));
        let superseded = self.registry.upsert(session.clone()).is_some();
        info!(
            identity,
            role = role.map(Role::as_str),
            superseded,
            total = self.registry.len(),
            "client connected"
        );
        counter!("notify_connects_total").increment(1);
        if superseded {
            counter!("notify_sessions_superseded_total").increment(1);
        }
        self.update_active_gauge();
        Ok(session)
    }

    /// Handle an explicit disconnect signal for `identity`.
    ///
    /// Unconditional: whatever session currently holds the identity is
    /// removed. No-op if the identity is absent.
    pub fn disconnect(&self, identity: &UserId) {
        if self.registry.remove(identity).is_some() {
            info!(identity = %identity, total = self.registry.len(), "client disconnected");
            self.update_active_gauge();
        }
    }

    /// Tear down a specific connection when its transport task ends.
    ///
    /// Generation-guarded: if the session was already superseded by a
    /// reconnect, the newer session stays registered.
    pub fn disconnect_current(&self, session: &Session) {
        if self
            .registry
            .remove_if(session.identity(), session.connection_id())
        {
            info!(
                identity = %session.identity(),
                total = self.registry.len(),
                "client disconnected"
            );
            self.update_active_gauge();
        } else {
            debug!(
                identity = %session.identity(),
                "teardown for superseded connection, registry untouched"
            );
        }
    }

    /// Reap a session after a failed delivery push.
    ///
    /// Idempotent, and generation-guarded like
    /// [`disconnect_current`](Self::disconnect_current): reaping a stale
    /// snapshot entry never removes a session that reconnected mid-fan-out.
    pub fn reap_broken(&self, session: &Session) {
        if self
            .registry
            .remove_if(session.identity(), session.connection_id())
        {
            warn!(identity = %session.identity(), "reaped broken session");
            counter!("notify_sessions_reaped_total").increment(1);
            self.update_active_gauge();
        }
    }

    /// Read-only snapshot for the diagnostics endpoint:
    /// identity → role / email / connected.
    ///
    /// Authorization is the caller's concern; the core trusts whoever
    /// reached it.
    #[must_use]
    pub fn diagnostics(&self) -> BTreeMap<String, SessionInfo> {
        self.registry
            .all()
            .into_iter()
            .map(|session| {
                (
                    session.identity().to_string(),
                    SessionInfo {
                        role: session.role(),
                        email: session.display_label().map(str::to_owned),
                        connected: true,
                    },
                )
            })
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn update_active_gauge(&self) {
        gauge!("notify_sessions_active").set(self.registry.len() as f64);
    }
}
