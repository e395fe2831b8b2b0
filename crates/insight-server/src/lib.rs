//! # insight-server
//!
//! Axum HTTP + `WebSocket` gateway for the Insight realtime notification
//! subsystem.
//!
//! - `GET /ws?userid=&role=&email=` — client session establishment
//! - `POST /internal/events` — the CRUD layer's boundary: a committed
//!   issue event in, a fan-out summary out
//! - `GET /debug/connections` — registry diagnostics (authorization is the
//!   outer layer's job)
//! - `GET /health`, `GET /metrics` — operational endpoints
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod ingest;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod ws;
