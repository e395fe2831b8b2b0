//! Graceful shutdown coordination.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Fans a single shutdown decision out to every gateway task.
///
/// Writer tasks and the accept loop each hold a child of the root token;
/// cancelling the root drains them all.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A token that resolves when shutdown is triggered.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Trigger shutdown when the process receives ctrl-c.
    ///
    /// Resolves either way once shutdown is underway, so it can be used
    /// directly as an axum graceful-shutdown future.
    pub async fn on_ctrl_c(&self) {
        let token = self.token();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
