// src/proxy/backend.rs
use std::fmt;

/// One upstream server the proxy may route to.
///
/// The configured backend set is built once at startup and shared read-only
/// across every request handler. The address is kept as the raw URI text from
/// the config; it is joined with the request path and parsed at forward time,
/// so a malformed entry costs one 502 instead of refusing to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub address: String,
    pub weight: u32,
}

impl Backend {
    pub fn new(address: impl Into<String>, weight: u32) -> Self {
        Self {
            address: address.into(),
            weight,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (weight {})", self.address, self.weight)
    }
}
