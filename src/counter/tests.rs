//! Counter Module Tests
//!
//! Validates the merge rule and the propagation contract.
//!
//! ## Test Scopes
//! - **Store**: increment and maximum-wins merge semantics.
//! - **Propagation**: retry counts, linear backoff, eviction after exhaustion, and
//!   concurrent fan-out.
//!
//! *Note: full multi-node flows through the HTTP handlers live in `tests/cluster.rs`.*

#[cfg(test)]
mod tests {
    use crate::counter::propagation::{PropagationEngine, RetryPolicy};
    use crate::counter::protocol::{ENDPOINT_SYNC, SyncRequest};
    use crate::counter::store::CounterStore;
    use crate::membership::registry::PeerRegistry;
    use crate::membership::types::NodeId;
    use crate::test_support::{spawn_peer, unreachable_peer};
    use crate::transport::PeerClient;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    const LOCAL: &str = "127.0.0.1:1";
    const BACKOFF_UNIT: Duration = Duration::from_millis(20);

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            backoff_unit: BACKOFF_UNIT,
        }
    }

    fn engine(registry: Arc<PeerRegistry>) -> Arc<PropagationEngine> {
        PropagationEngine::new(registry, PeerClient::new(Duration::from_millis(500)), fast_policy())
    }

    /// A `/sync` endpoint that fails a fixed number of times before accepting.
    #[derive(Clone, Default)]
    struct SyncStub {
        hits: Arc<AtomicUsize>,
        received: Arc<Mutex<Vec<u64>>>,
    }

    impl SyncStub {
        fn router(&self, failures_before_success: usize) -> Router {
            let hits = self.hits.clone();
            let received = self.received.clone();

            Router::new().route(
                ENDPOINT_SYNC,
                post(move |Json(req): Json<SyncRequest>| {
                    let hits = hits.clone();
                    let received = received.clone();
                    async move {
                        let attempt = hits.fetch_add(1, Ordering::SeqCst) + 1;
                        received.lock().unwrap().push(req.count);
                        if attempt <= failures_before_success {
                            StatusCode::INTERNAL_SERVER_ERROR
                        } else {
                            StatusCode::OK
                        }
                    }
                }),
            )
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    // ============================================================
    // COUNTER STORE TESTS
    // ============================================================

    #[test]
    fn test_increment_exceeds_previous_read() {
        let store = CounterStore::new();

        for _ in 0..10 {
            let before = store.read();
            let after = store.increment();
            assert!(after > before);
            assert_eq!(store.read(), after);
        }
    }

    #[test]
    fn test_merge_keeps_maximum() {
        let store = CounterStore::new();
        store.merge_received(3);

        let candidates = [1u64, 7, 2, 7, 5, 11, 0, 9];
        for candidate in candidates {
            store.merge_received(candidate);
        }

        assert_eq!(store.read(), 11);
    }

    #[test]
    fn test_merge_reports_updates() {
        let store = CounterStore::new();
        store.merge_received(3);

        assert_eq!(store.merge_received(5), (5, true));
        assert_eq!(store.merge_received(2), (5, false));
        assert_eq!(store.read(), 5);
    }

    #[test]
    fn test_independent_increments_converge_to_maximum() {
        // Two nodes each increment on their own and then exchange values.
        let a = CounterStore::new();
        let b = CounterStore::new();
        a.increment();
        a.increment();
        b.increment();

        a.merge_received(b.read());
        b.merge_received(a.read());

        assert_eq!(a.read(), 2);
        assert_eq!(b.read(), 2, "Max-wins does not sum independent increments");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = CounterStore::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.increment();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.read(), 800);
    }

    // ============================================================
    // PROPAGATION TESTS
    // ============================================================

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_no_peers_means_empty_round() {
        let registry = PeerRegistry::new(NodeId::new(LOCAL));
        let report = engine(registry).propagate(1).await;

        assert!(report.delivered.is_empty());
        assert!(report.evicted.is_empty());
    }

    #[tokio::test]
    async fn test_peer_succeeding_on_attempt_k_is_kept() {
        for k in 1..=3usize {
            let stub = SyncStub::default();
            let peer = spawn_peer(stub.router(k - 1)).await;

            let registry = PeerRegistry::new(NodeId::new(LOCAL));
            registry.add(peer.clone());

            let report = engine(registry.clone()).propagate(42).await;

            assert_eq!(report.delivered, vec![peer.clone()], "k = {}", k);
            assert!(report.evicted.is_empty());
            assert!(registry.contains(&peer), "Peer succeeding on attempt {} must stay", k);
            assert_eq!(stub.hits(), k);
            assert!(stub.received.lock().unwrap().iter().all(|count| *count == 42));
        }
    }

    #[tokio::test]
    async fn test_peer_failing_every_attempt_is_evicted() {
        let stub = SyncStub::default();
        let peer = spawn_peer(stub.router(usize::MAX)).await;

        let registry = PeerRegistry::new(NodeId::new(LOCAL));
        registry.add(peer.clone());

        let started = Instant::now();
        let report = engine(registry.clone()).propagate(7).await;

        assert_eq!(report.evicted, vec![peer.clone()]);
        assert!(!registry.contains(&peer));
        assert_eq!(stub.hits(), 3, "No attempts beyond the third");
        // waits of 1 and 2 backoff units between the three attempts
        assert!(started.elapsed() >= BACKOFF_UNIT * 3);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_evicted() {
        let peer = unreachable_peer().await;
        let registry = PeerRegistry::new(NodeId::new(LOCAL));
        registry.add(peer.clone());

        let report = engine(registry.clone()).propagate(1).await;

        assert_eq!(report.evicted, vec![peer]);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_is_concurrent_and_independent() {
        let slow_router = || {
            Router::new().route(
                ENDPOINT_SYNC,
                post(|| async {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    StatusCode::OK
                }),
            )
        };
        let slow_a = spawn_peer(slow_router()).await;
        let slow_b = spawn_peer(slow_router()).await;
        let dead = unreachable_peer().await;

        let registry = PeerRegistry::new(NodeId::new(LOCAL));
        registry.seed(vec![slow_a.clone(), slow_b.clone(), dead.clone()]);

        let started = Instant::now();
        let report = engine(registry.clone()).propagate(3).await;

        assert!(
            started.elapsed() < Duration::from_millis(750),
            "Peers should be contacted in parallel, took {:?}",
            started.elapsed()
        );
        assert_eq!(report.delivered.len(), 2);
        assert_eq!(report.evicted, vec![dead]);
        assert_eq!(registry.snapshot().len(), 2);
    }
}
