//! demos/test_backend.rs
//! Mock upstream for eyeballing the weighted distribution by hand.
//! Run: cargo run --example test_backend -- <port> [name]

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server,
};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

#[derive(Clone)]
struct BackendState {
    port: u16,
    name: String,
    req_counter: Arc<AtomicU64>,
    base_delay: u64,
}

// ——————————————————————————————————————————
// Request handler
async fn handle(req: Request<Body>, state: BackendState) -> Result<Response<Body>, Infallible> {
    let n = state.req_counter.fetch_add(1, Ordering::SeqCst) + 1;
    let path = req.uri().path().to_owned();
    let forwarded_by = req
        .headers()
        .get("x-forwarded-by")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    if state.base_delay > 0 {
        sleep(Duration::from_millis(state.base_delay)).await;
    }

    let body = format!(
        r#"{{"backend":"{}","port":{},"req":{},"path":"{}","forwarded_by":"{}"}}"#,
        state.name, state.port, n, path, forwarded_by
    );

    Ok(Response::builder()
        .header("Content-Type", "application/json")
        .header("X-Backend-Name", state.name.clone())
        .body(Body::from(body))
        .unwrap())
}

// ——————————————————————————————————————————
// Main
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "8001".into())
        .parse()?;
    let name = std::env::args()
        .nth(2)
        .or_else(|| std::env::var("BACKEND_NAME").ok())
        .unwrap_or_else(|| format!("backend-{port}"));

    let base_delay = std::env::var("BASE_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let state = BackendState {
        port,
        name: name.clone(),
        req_counter: Arc::new(AtomicU64::new(0)),
        base_delay,
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    println!(
        "Mock backend '{}' on http://{}  [delay={}ms]",
        name, addr, base_delay
    );

    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
