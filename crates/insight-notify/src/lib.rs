//! # insight-notify
//!
//! The realtime notification fan-out subsystem for the Insight tracker.
//!
//! - [`SessionRegistry`]: the live set of connected client sessions, one
//!   per identity
//! - [`DeliveryEngine`]: best-effort, per-recipient push of rendered
//!   payloads against a registry snapshot
//! - [`EventRouter`]: the policy table mapping issue-lifecycle events to
//!   recipient sets
//! - [`ConnectionLifecycle`]: session establishment, teardown, and reaping
//!   of sessions whose transport failed mid-send
//!
//! Delivery never blocks the business operation that triggered it: pushes
//! are non-blocking channel sends, one recipient's failure is isolated
//! from the rest, and a failed push only costs that session its
//! registration. Per-recipient ordering follows event-trigger order;
//! nothing is guaranteed across recipients.

#![deny(unsafe_code)]

pub mod delivery;
pub mod lifecycle;
pub mod registry;
pub mod router;
pub mod session;

pub use delivery::{Delivery, DeliveryEngine, DeliveryOutcome, WirePayload};
pub use lifecycle::{ConnectError, ConnectionLifecycle, SessionInfo};
pub use registry::SessionRegistry;
pub use router::EventRouter;
pub use session::{PushError, Session, SessionSender};
