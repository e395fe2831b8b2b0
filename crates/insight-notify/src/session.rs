//! A single live client session and its push primitive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use insight_core::{ConnectionId, Role, UserId};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// The opaque transport handle: frames queued here are drained by the
/// session's writer task and sent over the wire.
pub type SessionSender = mpsc::Sender<Arc<String>>;

/// A push over a session's transport handle failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PushError {
    /// The writer task is gone; the connection is dead.
    #[error("session channel closed")]
    Closed,
    /// The client stopped draining its queue. Treated the same as a dead
    /// connection: the push is never retried or awaited.
    #[error("session channel full")]
    Full,
}

/// One live client connection, owned by the [`SessionRegistry`].
///
/// Everything here is immutable after establishment; a reconnect under the
/// same identity produces a whole new `Session` with a fresh
/// [`ConnectionId`] rather than mutating this one.
///
/// [`SessionRegistry`]: crate::registry::SessionRegistry
#[derive(Debug)]
pub struct Session {
    identity: UserId,
    role: Option<Role>,
    display_label: Option<String>,
    connection_id: ConnectionId,
    tx: SessionSender,
    connected_at: Instant,
}

impl Session {
    /// Create a session for a freshly established connection.
    #[must_use]
    pub fn new(
        identity: UserId,
        role: Option<Role>,
        display_label: Option<String>,
        tx: SessionSender,
    ) -> Self {
        Self {
            identity,
            role,
            display_label,
            connection_id: ConnectionId::generate(),
            tx,
            connected_at: Instant::now(),
        }
    }

    /// The identity this session is registered under.
    #[must_use]
    pub fn identity(&self) -> &UserId {
        &self.identity
    }

    /// The session's role, if one was presented at connect time.
    ///
    /// `None` means the session is excluded from all role-targeted
    /// deliveries but still receives broadcasts and direct sends.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Diagnostic label (the user's email in practice).
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.display_label.as_deref()
    }

    /// Generation marker distinguishing this connection from any other
    /// connection under the same identity.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queue one frame for the writer task without blocking.
    pub fn push(&self, frame: Arc<String>) -> Result<(), PushError> {
        self.tx.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => PushError::Full,
            TrySendError::Closed(_) => PushError::Closed,
        })
    }

    /// How long this session has been connected.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
