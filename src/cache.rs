use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::ForecastError;
use crate::models::{ProjectionResult, ScenarioInput};

/// Default freshness window for cached projections.
pub const DEFAULT_TTL_SECS: u64 = 120;
/// Capacity bound; oldest ready entries are evicted past this.
const MAX_ENTRIES: usize = 4096;

/// Counters for observability and for the idempotence tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
}

/// A computation in flight for one key. Late arrivals block here until the
/// leader publishes a result.
struct Flight {
    result: Mutex<Option<Result<Arc<ProjectionResult>, String>>>,
    ready: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn complete(&self, outcome: Result<Arc<ProjectionResult>, String>) {
        let mut slot = self
            .result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(outcome);
        self.ready.notify_all();
    }

    fn wait(&self) -> Result<Arc<ProjectionResult>, ForecastError> {
        let mut slot = self.result.lock().expect("flight mutex poisoned");
        loop {
            if let Some(outcome) = &*slot {
                return match outcome {
                    Ok(value) => Ok(Arc::clone(value)),
                    // Waiters get a retryable error; the leader kept the
                    // original.
                    Err(msg) => Err(ForecastError::Computation(msg.clone())),
                };
            }
            slot = self.ready.wait(slot).expect("flight mutex poisoned");
        }
    }
}

enum Slot {
    Ready {
        at: Instant,
        value: Arc<ProjectionResult>,
    },
    Pending(Arc<Flight>),
}

/// Memoizes full projection outputs keyed by the exact scenario.
///
/// Guarantees at-most-one concurrent computation per key: the first caller
/// for a key becomes the leader and runs the computation; everyone else
/// arriving before it finishes waits for (and receives) the leader's
/// result. Entries expire after the TTL and are recomputed lazily on next
/// access; a TTL of zero disables reuse while still coalescing concurrent
/// requests. Failed computations are never cached.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<ScenarioInput, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
        }
    }

    /// Number of ready (cached) entries.
    pub fn len(&self) -> usize {
        let map = self.entries.lock().expect("cache mutex poisoned");
        map.values()
            .filter(|s| matches!(s, Slot::Ready { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }

    /// Look up a fresh entry for the scenario or run `compute` to produce
    /// one, coalescing concurrent callers onto a single run.
    pub fn get_or_compute<F>(
        &self,
        scenario: &ScenarioInput,
        compute: F,
    ) -> Result<Arc<ProjectionResult>, ForecastError>
    where
        F: FnOnce() -> Result<ProjectionResult, ForecastError>,
    {
        enum Role {
            Hit(Arc<ProjectionResult>),
            Wait(Arc<Flight>),
            Lead(Arc<Flight>),
        }

        let role = {
            let mut map = self.entries.lock().expect("cache mutex poisoned");
            match map.get(scenario) {
                Some(Slot::Ready { at, value }) if at.elapsed() < self.ttl => {
                    Role::Hit(Arc::clone(value))
                }
                Some(Slot::Pending(flight)) => Role::Wait(Arc::clone(flight)),
                _ => {
                    evict_expired(&mut map, self.ttl);
                    if map.len() >= MAX_ENTRIES {
                        evict_oldest_ready(&mut map);
                    }
                    let flight = Arc::new(Flight::new());
                    map.insert(scenario.clone(), Slot::Pending(Arc::clone(&flight)));
                    Role::Lead(flight)
                }
            }
        };

        match role {
            Role::Hit(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cell = %scenario.cell_id, "projection cache hit");
                Ok(value)
            }
            Role::Wait(flight) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cell = %scenario.cell_id, "joining in-flight projection");
                flight.wait()
            }
            Role::Lead(flight) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let mut guard = FlightGuard {
                    cache: self,
                    scenario,
                    flight: &flight,
                    armed: true,
                };
                let outcome = compute();
                self.computations.fetch_add(1, Ordering::Relaxed);
                guard.armed = false;
                drop(guard);

                match outcome {
                    Ok(result) => {
                        let value = Arc::new(result);
                        let mut map = self.entries.lock().expect("cache mutex poisoned");
                        map.insert(
                            scenario.clone(),
                            Slot::Ready {
                                at: Instant::now(),
                                value: Arc::clone(&value),
                            },
                        );
                        drop(map);
                        flight.complete(Ok(Arc::clone(&value)));
                        Ok(value)
                    }
                    Err(e) => {
                        self.remove_pending(scenario, &flight);
                        flight.complete(Err(e.to_string()));
                        Err(e)
                    }
                }
            }
        }
    }

    fn remove_pending(&self, scenario: &ScenarioInput, flight: &Arc<Flight>) {
        let mut map = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if matches!(map.get(scenario), Some(Slot::Pending(f)) if Arc::ptr_eq(f, flight)) {
            map.remove(scenario);
        }
    }
}

/// Clears the pending slot if the leader unwinds without publishing, so
/// waiters error out instead of blocking forever.
struct FlightGuard<'a> {
    cache: &'a ResultCache,
    scenario: &'a ScenarioInput,
    flight: &'a Arc<Flight>,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.remove_pending(self.scenario, self.flight);
            self.flight
                .complete(Err("projection computation panicked".to_string()));
        }
    }
}

fn evict_expired(map: &mut HashMap<ScenarioInput, Slot>, ttl: Duration) {
    map.retain(|_, slot| match slot {
        Slot::Ready { at, .. } => at.elapsed() < ttl,
        Slot::Pending(_) => true,
    });
}

fn evict_oldest_ready(map: &mut HashMap<ScenarioInput, Slot>) {
    let oldest = map
        .iter()
        .filter_map(|(k, slot)| match slot {
            Slot::Ready { at, .. } => Some((k.clone(), *at)),
            Slot::Pending(_) => None,
        })
        .min_by_key(|(_, at)| *at)
        .map(|(k, _)| k);
    if let Some(key) = oldest {
        map.remove(&key);
    }
}
