// src/load_balancer/weighted_random.rs
use crate::load_balancer::LoadBalancer;
use crate::proxy::Backend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Weighted random selection: a backend with weight `w` is chosen with
/// probability `w / total`, independently on every call.
///
/// The backend list is fixed at construction and the RNG is seeded once, so
/// the only synchronization in the hot path is the mutex around the draw.
pub struct WeightedRandom {
    backends: Vec<Backend>,
    total_weight: u64,
    rng: Mutex<StdRng>,
}

impl WeightedRandom {
    pub fn new(backends: Vec<Backend>) -> Self {
        Self::with_rng(backends, StdRng::from_entropy())
    }

    /// Construct with a caller-supplied RNG. Deterministic selection sequences
    /// in tests use this with `StdRng::seed_from_u64`.
    pub fn with_rng(backends: Vec<Backend>, rng: StdRng) -> Self {
        assert!(
            !backends.is_empty(),
            "weighted selection requires at least one backend"
        );

        let total_weight = backends.iter().map(|b| u64::from(b.weight)).sum();

        Self {
            backends,
            total_weight,
            rng: Mutex::new(rng),
        }
    }

    fn draw(&self) -> u64 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..self.total_weight)
    }

    /// Resolve a draw in `[0, total_weight)` to a backend by walking the
    /// cumulative weights. An out-of-range draw falls back to the first
    /// backend rather than failing.
    fn backend_for(&self, draw: u64) -> &Backend {
        let mut cumulative = 0u64;
        for backend in &self.backends {
            cumulative += u64::from(backend.weight);
            if draw < cumulative {
                return backend;
            }
        }

        &self.backends[0]
    }
}

impl LoadBalancer for WeightedRandom {
    fn pick(&self) -> &Backend {
        // All-zero weights leave nothing to draw from; resolve to the first
        // backend, same as the out-of-range fallback.
        if self.total_weight == 0 {
            return &self.backends[0];
        }

        self.backend_for(self.draw())
    }

    fn name(&self) -> &'static str {
        "weighted_random"
    }
}
