use axum::{Extension, Json, body::Bytes, http::StatusCode};
use std::sync::Arc;

use super::propagation::PropagationEngine;
use super::protocol::{CountResponse, SyncRequest};
use super::store::CounterStore;
use crate::membership::registry::PeerRegistry;

/// Increments locally and only answers once every peer has either taken the new value
/// or been evicted.
pub async fn handle_increment(
    Extension(counter): Extension<Arc<CounterStore>>,
    Extension(propagation): Extension<Arc<PropagationEngine>>,
    Extension(registry): Extension<Arc<PeerRegistry>>,
) -> (StatusCode, Json<CountResponse>) {
    let count = counter.increment();
    tracing::info!("Counter incremented: {}", count);

    let report = propagation.propagate(count).await;
    if !report.evicted.is_empty() {
        tracing::info!(
            "Increment to {} reached {} peer(s), evicted {}",
            count,
            report.delivered.len(),
            report.evicted.len()
        );
    }

    (
        StatusCode::OK,
        Json(CountResponse {
            count,
            node_id: registry.local_id().clone(),
        }),
    )
}

pub async fn handle_count(
    Extension(counter): Extension<Arc<CounterStore>>,
    Extension(registry): Extension<Arc<PeerRegistry>>,
) -> (StatusCode, Json<CountResponse>) {
    (
        StatusCode::OK,
        Json(CountResponse {
            count: counter.read(),
            node_id: registry.local_id().clone(),
        }),
    )
}

pub async fn handle_sync(
    Extension(counter): Extension<Arc<CounterStore>>,
    Extension(propagation): Extension<Arc<PropagationEngine>>,
    body: Bytes,
) -> StatusCode {
    let req: SyncRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Rejected malformed sync request: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let (value, updated) = counter.merge_received(req.count);

    if updated {
        tracing::info!("Counter synced, new value: {}", value);
        propagation.propagate(value).await;
    } else {
        tracing::debug!("Ignored sync of {} (local value {})", req.count, value);
    }

    StatusCode::OK
}
