//! `POST /internal/events` — the CRUD layer's boundary with the core.
//!
//! The business layer calls this only after its mutation has durably
//! committed. Whatever happens during fan-out, the response is a summary,
//! never an error that could fail the triggering operation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use insight_core::IssueEvent;
use insight_notify::delivery::{Delivery, DeliveryOutcome};
use serde::Serialize;

use crate::server::AppState;

/// Per-recipient outcome counts for one event's fan-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FanoutSummary {
    /// Recipients the targeting rule resolved to.
    pub attempted: usize,
    /// Frames queued on a live session's transport.
    pub delivered: usize,
    /// Recipients with no live session.
    pub skipped: usize,
    /// Pushes that failed (those sessions were reaped).
    pub failed: usize,
}

impl FanoutSummary {
    /// Tally a fan-out's per-recipient results.
    #[must_use]
    pub fn tally(results: &[Delivery]) -> Self {
        let mut summary = Self {
            attempted: results.len(),
            ..Self::default()
        };
        for delivery in results {
            match delivery.outcome {
                DeliveryOutcome::Delivered => summary.delivered += 1,
                DeliveryOutcome::NotConnected => summary.skipped += 1,
                DeliveryOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Handle a committed issue event from the CRUD layer.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<IssueEvent>,
) -> (StatusCode, Json<FanoutSummary>) {
    let results = state.router.dispatch(&event);
    (StatusCode::ACCEPTED, Json(FanoutSummary::tally(&results)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::UserId;
    use insight_notify::session::PushError;

    fn delivery(identity: &str, outcome: DeliveryOutcome) -> Delivery {
        Delivery {
            identity: UserId::from(identity),
            outcome,
        }
    }

    #[test]
    fn tally_counts_each_outcome() {
        let results = [
            delivery("a", DeliveryOutcome::Delivered),
            delivery("b", DeliveryOutcome::NotConnected),
            delivery("c", DeliveryOutcome::Failed(PushError::Closed)),
            delivery("d", DeliveryOutcome::Delivered),
        ];
        let summary = FanoutSummary::tally(&results);
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn tally_of_empty_fanout() {
        let summary = FanoutSummary::tally(&[]);
        assert_eq!(summary, FanoutSummary::default());
    }

    #[test]
    fn summary_serializes_counts() {
        let json = serde_json::to_value(FanoutSummary {
            attempted: 3,
            delivered: 2,
            skipped: 1,
            failed: 0,
        })
        .unwrap();
        assert_eq!(json["attempted"], 3);
        assert_eq!(json["delivered"], 2);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["failed"], 0);
    }
}
