// ────────────────────────────────
// src/server/listener.rs
// Low-level TCP bind, kept separate so TLS could be swapped in later.
// ────────────────────────────────
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Bind the listening socket. Failure here is fatal to the process; it is
/// the only error that escalates past a single request.
pub async fn bind_tcp(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind listen address {}", addr))
}
