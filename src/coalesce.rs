// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request coalescing (singleflight)
//!
//! At most one computation runs per key. The first caller spawns it; callers
//! arriving while it runs join the same shared outcome. Every waiter receives
//! a clone of the single result, success or error.
//!
//! Computations run on their own task, so a caller that stops waiting never
//! cancels work other callers depend on. An RAII guard owned by that task
//! removes the in-flight entry when the task ends, whether it returns or
//! panics.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinError;
use tracing::{debug, Instrument};

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;
type InFlightMap<K, T, E> = Arc<Mutex<HashMap<K, SharedOutcome<T, E>>>>;

fn lock<K, T, E>(map: &InFlightMap<K, T, E>) -> MutexGuard<'_, HashMap<K, SharedOutcome<T, E>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes the in-flight entry for `key` when the owning task ends.
struct InFlightGuard<K: Eq + Hash, T, E> {
    map: InFlightMap<K, T, E>,
    key: K,
}

impl<K: Eq + Hash, T, E> Drop for InFlightGuard<K, T, E> {
    fn drop(&mut self) {
        lock(&self.map).remove(&self.key);
    }
}

/// Singleflight map from key to shared in-flight outcome
///
/// # Examples
///
/// ```rust
/// use score_api::{RequestCoalescer, ScoreApiError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let coalescer: RequestCoalescer<String, u64, ScoreApiError> = RequestCoalescer::new();
///
/// let value = coalescer
///     .serve("answer".to_string(), || async { Ok(42) })
///     .await
///     .unwrap();
/// assert_eq!(value, 42);
/// assert_eq!(coalescer.in_flight(), 0);
/// # }
/// ```
pub struct RequestCoalescer<K, T, E> {
    in_flight: InFlightMap<K, T, E>,
}

impl<K, T, E> Default for RequestCoalescer<K, T, E> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, T, E> std::fmt::Debug for RequestCoalescer<K, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = lock(&self.in_flight).len();
        f.debug_struct("RequestCoalescer")
            .field("in_flight", &in_flight)
            .finish()
    }
}

impl<K, T, E> RequestCoalescer<K, T, E>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + From<JoinError> + Send + Sync + 'static,
{
    /// Creates an empty coalescer
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outcome of the single computation for `key`
    ///
    /// If nothing is in flight for `key`, `compute` is called once and its
    /// future is spawned. Otherwise `compute` is dropped uncalled and the
    /// caller waits on the running computation.
    ///
    /// # Errors
    ///
    /// Returns the computation's error, or `E::from(JoinError)` if the
    /// computation panicked or its task was cancelled.
    pub async fn serve<F, Fut>(&self, key: K, compute: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let outcome = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(&key) {
                Some(running) => {
                    debug!(key = %key, "Joining in-flight computation");
                    running.clone()
                }
                None => {
                    // Called before the guard exists: a panic here must not
                    // run the guard's drop while this lock is held.
                    let computation = compute();
                    let guard = InFlightGuard {
                        map: Arc::clone(&self.in_flight),
                        key: key.clone(),
                    };
                    let handle = tokio::spawn(
                        async move {
                            let _guard = guard;
                            computation.await
                        }
                        .in_current_span(),
                    );

                    let shared = handle
                        .map(|joined| joined.unwrap_or_else(|e| Err(E::from(e))))
                        .boxed()
                        .shared();
                    in_flight.insert(key, shared.clone());
                    shared
                }
            }
        };

        outcome.await
    }

    /// Number of computations currently in flight
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScoreApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    type Coalescer = RequestCoalescer<String, u64, ScoreApiError>;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let coalescer = Arc::new(Coalescer::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let coalescer = coalescer.clone();
            let calls = calls.clone();
            let release = release.clone();
            handles.push(tokio::spawn(async move {
                coalescer
                    .serve("k".to_string(), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        Ok(7)
                    })
                    .await
            }));
        }

        while coalescer.in_flight() == 0 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        release.notify_one();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_is_broadcast_and_entry_removed() {
        let coalescer = Arc::new(Coalescer::new());

        let (a, b) = tokio::join!(
            coalescer.serve("k".to_string(), || async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(ScoreApiError::rejected("boom"))
            }),
            coalescer.serve("k".to_string(), || async { Ok(1) }),
        );

        assert!(matches!(a, Err(ScoreApiError::Rejected { .. })));
        assert!(matches!(b, Err(ScoreApiError::Rejected { .. })));
        assert_eq!(coalescer.in_flight(), 0);

        let retried = coalescer
            .serve("k".to_string(), || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(retried, 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let coalescer = Coalescer::new();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            coalescer.serve("a".to_string(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            }),
            coalescer.serve("b".to_string(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(2) }
            }),
        );

        assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_computation() {
        let coalescer = Arc::new(Coalescer::new());
        let finished = Arc::new(AtomicUsize::new(0));

        let first = {
            let coalescer = coalescer.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                coalescer
                    .serve("k".to_string(), move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok(9)
                    })
                    .await
            })
        };

        while coalescer.in_flight() == 0 {
            tokio::task::yield_now().await;
        }
        first.abort();

        let joined = coalescer
            .serve("k".to_string(), || async { Ok(0) })
            .await
            .unwrap();

        assert_eq!(joined, 9);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_settles_as_aborted() {
        let coalescer = Coalescer::new();

        let result = coalescer
            .serve("k".to_string(), || async {
                if true {
                    panic!("strategy exploded");
                }
                Ok(0)
            })
            .await;

        assert!(matches!(result, Err(ScoreApiError::Aborted { .. })));
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panic_before_future_leaves_coalescer_usable() {
        let coalescer = Arc::new(Coalescer::new());

        let panicking = {
            let coalescer = Arc::clone(&coalescer);
            tokio::spawn(async move {
                coalescer
                    .serve("k".to_string(), || -> futures::future::Ready<Result<u64, ScoreApiError>> {
                        panic!("invalid strategy params")
                    })
                    .await
            })
        };
        assert!(panicking.await.unwrap_err().is_panic());
        assert_eq!(coalescer.in_flight(), 0);

        let retried = tokio::time::timeout(
            Duration::from_secs(2),
            coalescer.serve("k".to_string(), || async { Ok(5) }),
        )
        .await
        .expect("coalescer should not stay locked after a panic");

        assert_eq!(retried.unwrap(), 5);
        assert_eq!(coalescer.in_flight(), 0);
    }
}
