//! Node Assembly
//!
//! Builds the shared components of one node and the HTTP router that exposes them.

use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::Timings;
use crate::counter::handlers::{handle_count, handle_increment, handle_sync};
use crate::counter::propagation::PropagationEngine;
use crate::counter::protocol::{ENDPOINT_COUNT, ENDPOINT_INCREMENT, ENDPOINT_SYNC};
use crate::counter::store::CounterStore;
use crate::membership::handlers::{
    handle_discovery, handle_get_peers, handle_health, handle_register, handle_remove_peer,
};
use crate::membership::exchange::RegistrationExchange;
use crate::membership::health::HealthChecker;
use crate::membership::protocol::{
    ENDPOINT_DISCOVERY, ENDPOINT_HEALTH, ENDPOINT_PEERS, ENDPOINT_REGISTER, ENDPOINT_REMOVE_PEER,
};
use crate::membership::registry::PeerRegistry;
use crate::membership::types::NodeId;
use crate::transport::PeerClient;

pub struct ClusterNode {
    pub registry: Arc<PeerRegistry>,
    pub counter: Arc<CounterStore>,
    pub propagation: Arc<PropagationEngine>,
    pub exchange: Arc<RegistrationExchange>,
    pub health: Arc<HealthChecker>,
    pub timings: Timings,
}

impl ClusterNode {
    pub fn new(local_id: NodeId, timings: Timings) -> Self {
        let client = PeerClient::new(timings.request_timeout);
        let registry = PeerRegistry::new(local_id);
        let counter = CounterStore::new();

        let propagation = PropagationEngine::new(registry.clone(), client.clone(), timings.retry);
        let exchange = RegistrationExchange::new(registry.clone(), client.clone());
        let health = HealthChecker::new(registry.clone(), client, timings.health_interval);

        Self {
            registry,
            counter,
            propagation,
            exchange,
            health,
            timings,
        }
    }

    pub fn local_id(&self) -> &NodeId {
        self.registry.local_id()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(ENDPOINT_REGISTER, post(handle_register))
            .route(ENDPOINT_PEERS, get(handle_get_peers))
            .route(ENDPOINT_REMOVE_PEER, post(handle_remove_peer))
            .route(ENDPOINT_INCREMENT, post(handle_increment))
            .route(ENDPOINT_COUNT, get(handle_count))
            .route(ENDPOINT_SYNC, post(handle_sync))
            .route(ENDPOINT_HEALTH, get(handle_health))
            .route(ENDPOINT_DISCOVERY, get(handle_discovery))
            .layer(Extension(self.registry.clone()))
            .layer(Extension(self.counter.clone()))
            .layer(Extension(self.propagation.clone()))
    }
}
