//! WebSocket session establishment and per-client transport tasks.
//!
//! A client connects with `GET /ws?userid=<id>&role=<ROLE>&email=<email>`.
//! `userid` is required and the upgrade is refused without it; `role` is
//! optional and an unparseable value is tolerated as "no role" (the
//! session then receives broadcasts and direct sends but never
//! role-targeted deliveries); `email` is a diagnostics label.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use insight_core::Role;
use metrics::counter;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::metrics::{
    WS_CONNECTIONS_REFUSED_TOTAL, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
};
use crate::server::AppState;

/// Query-string attributes presented at connection establishment.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Required logical identity.
    pub userid: Option<String>,
    /// Optional role; must be one of the closed set to count.
    pub role: Option<String>,
    /// Optional diagnostics label.
    pub email: Option<String>,
}

/// Connection attributes after boundary validation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolvedConnect {
    pub identity: String,
    pub role: Option<Role>,
    pub label: Option<String>,
}

/// Validate connect params before the upgrade.
///
/// A missing or empty `userid` refuses the connection. An unknown role is
/// not an error — the session simply registers roleless.
pub(crate) fn resolve_params(params: ConnectParams) -> Result<ResolvedConnect, &'static str> {
    let identity = match params.userid {
        Some(id) if !id.is_empty() => id,
        _ => return Err("missing userid"),
    };
    let role = params.role.as_deref().and_then(|raw| match raw.parse() {
        Ok(role) => Some(role),
        Err(_) => {
            debug!(role = raw, "unrecognized role, registering without one");
            None
        }
    });
    Ok(ResolvedConnect {
        identity,
        role,
        label: params.email.filter(|e| !e.is_empty()),
    })
}

/// `GET /ws` — upgrade to a notification session.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    match resolve_params(params) {
        Ok(connect) => ws.on_upgrade(move |socket| run_session(socket, connect, state)),
        Err(reason) => {
            warn!(reason, "refusing websocket connection");
            counter!(WS_CONNECTIONS_REFUSED_TOTAL).increment(1);
            (StatusCode::BAD_REQUEST, reason).into_response()
        }
    }
}

/// Tracks when the client last gave any sign of life.
struct Liveness {
    last_seen: Mutex<Instant>,
}

impl Liveness {
    fn new() -> Self {
        Self {
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

/// Run one client session from upgrade through disconnect.
///
/// 1. Registers the session (superseding any prior one for the identity)
/// 2. Spawns a writer task draining the session queue onto the socket,
///    pinging on an interval and disconnecting unresponsive clients
/// 3. Reads inbound frames purely as liveness signals
/// 4. Tears down its own registration on exit, never a successor's
#[instrument(skip_all, fields(identity = %connect.identity))]
pub(crate) async fn run_session(socket: WebSocket, connect: ResolvedConnect, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<String>>(state.config.channel_capacity);

    let session = match state
        .lifecycle
        .connect(&connect.identity, connect.role, connect.label, tx)
    {
        Ok(session) => session,
        Err(err) => {
            warn!(%err, "connection refused after upgrade");
            return;
        }
    };
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    let connected_at = Instant::now();

    let liveness = Arc::new(Liveness::new());
    let ping_interval = Duration::from_secs(state.config.heartbeat_interval_secs);
    let idle_timeout = Duration::from_secs(state.config.heartbeat_timeout_secs);
    let shutdown = state.shutdown.token();

    let writer_liveness = liveness.clone();
    let writer = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        // Skip the immediate first tick
        let _ = ping.tick().await;
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    match frame {
                        Some(frame) => {
                            if ws_tx.send(Message::Text(frame.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping.tick() => {
                    if writer_liveness.idle_for() > idle_timeout {
                        warn!("client unresponsive for {idle_timeout:?}, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                () = shutdown.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Inbound frames carry no commands; anything from the client counts
    // as a liveness signal.
    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(_) | Message::Ping(_) | Message::Pong(_) => liveness.touch(),
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Binary(_) => {}
        }
    }

    info!(age_secs = connected_at.elapsed().as_secs(), "session ended");
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    writer.abort();
    state.lifecycle.disconnect_current(&session);
}
