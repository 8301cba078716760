// src/load_balancer/algorithm.rs
use crate::proxy::Backend;

/// Selection strategy over a backend set fixed at construction.
///
/// Implementations own their copy of the list plus whatever internal state
/// the strategy needs; `pick` must tolerate any number of concurrent callers.
pub trait LoadBalancer: Send + Sync {
    /// Choose the backend the next request should be routed to.
    fn pick(&self) -> &Backend;

    fn name(&self) -> &'static str;
}
