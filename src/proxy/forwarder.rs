// ────────────────────────────────
// src/proxy/forwarder.rs
// Per-request forwarding pipeline: pick a backend, rebuild the request,
// execute it upstream, relay the response.
// ────────────────────────────────
use crate::load_balancer::LoadBalancer;
use hyper::client::HttpConnector;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, HOST};
use hyper::http::uri::InvalidUri;
use hyper::{Body, Client, Request, Response, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

/// Appended to every upstream request so backends can tell the call came
/// through the proxy. Existing headers are left untouched.
const FORWARDED_BY: &str = "x-forwarded-by";
const FORWARDED_BY_VALUE: &str = "weighted-proxy";

pub struct Forwarder {
    balancer: Arc<dyn LoadBalancer>,
    client: Client<HttpsConnector<HttpConnector>, Body>,
    upstream_timeout: Option<Duration>,
}

impl Forwarder {
    pub fn new(balancer: Arc<dyn LoadBalancer>, upstream_timeout: Option<Duration>) -> Self {
        // One shared client; connection reuse is whatever hyper's pool does.
        let client = Client::builder().build(HttpsConnector::new());

        Self {
            balancer,
            client,
            upstream_timeout,
        }
    }

    /// Forward one inbound request to a weighted-randomly selected backend.
    ///
    /// The inbound body stream is handed to the upstream request as-is and
    /// the upstream response is returned verbatim, so neither body is ever
    /// fully buffered. Errors are per-request: a failed forward never affects
    /// any other in-flight request.
    pub async fn forward(&self, inbound: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let backend = self.balancer.pick();
        let target = build_target_uri(&backend.address, inbound.uri())?;

        let request_id = Uuid::new_v4();
        debug!(
            %request_id,
            method = %inbound.method(),
            path = %inbound.uri(),
            %target,
            "forwarding request"
        );

        let (parts, body) = inbound.into_parts();

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = target;

        for (name, value) in parts.headers.iter() {
            // Host belongs to the selected backend; hyper derives it from
            // the target URI.
            if name == HOST {
                continue;
            }
            outbound.headers_mut().append(name, value.clone());
        }
        outbound.headers_mut().append(
            HeaderName::from_static(FORWARDED_BY),
            HeaderValue::from_static(FORWARDED_BY_VALUE),
        );

        let response = match self.upstream_timeout {
            Some(limit) => timeout(limit, self.client.request(outbound))
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(limit))??,
            None => self.client.request(outbound).await?,
        };

        debug!(%request_id, status = %response.status(), "relaying upstream response");

        // Status, headers, and the still-streaming body pass through
        // untouched; dropping the body mid-relay closes the upstream stream.
        Ok(response)
    }
}

/// Join a backend base address with the inbound path-and-query.
fn build_target_uri(base: &str, inbound: &Uri) -> Result<Uri, ProxyError> {
    let path_and_query = inbound
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let target = format!("{}{}", base.trim_end_matches('/'), path_and_query);
    target
        .parse::<Uri>()
        .map_err(|source| ProxyError::InvalidTarget { target, source })
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The outbound request could not be constructed. Not retryable.
    #[error("invalid upstream target '{target}': {source}")]
    InvalidTarget {
        target: String,
        source: InvalidUri,
    },

    /// The backend was unreachable or failed at the transport level. Not
    /// retryable, against this backend or any other.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper::Error),

    #[error("upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Upstream(_) | ProxyError::UpstreamTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

// Caller-facing rendering of a failed forward. Once the upstream response
// head has been relayed this mapping is unreachable for that request; a
// mid-stream failure can only truncate the body.
impl From<ProxyError> for Response<Body> {
    fn from(err: ProxyError) -> Self {
        let status = err.status();
        let message = match status {
            StatusCode::BAD_GATEWAY => "Bad Gateway",
            _ => "Service Unavailable",
        };

        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(message))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_uri_joins_base_and_path() {
        let inbound: Uri = "/search?q=rust".parse().unwrap();
        let target = build_target_uri("http://127.0.0.1:8001", &inbound).unwrap();

        assert_eq!(target.to_string(), "http://127.0.0.1:8001/search?q=rust");
    }

    #[test]
    fn target_uri_tolerates_trailing_slash_on_base() {
        let inbound: Uri = "/".parse().unwrap();
        let target = build_target_uri("http://app-a:5678/", &inbound).unwrap();

        assert_eq!(target.to_string(), "http://app-a:5678/");
    }

    #[test]
    fn unparseable_base_is_a_construction_error() {
        let inbound: Uri = "/".parse().unwrap();
        let err = build_target_uri("http://bad host", &inbound).unwrap_err();

        assert!(matches!(err, ProxyError::InvalidTarget { .. }));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn transport_errors_render_as_service_unavailable() {
        let err = ProxyError::UpstreamTimeout(Duration::from_secs(1));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response: Response<Body> = err.into();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
