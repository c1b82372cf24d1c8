//! Middleware that records a hit for every request it wraps.

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::client::hit_forwarder::HitRecorder;

const UNKNOWN_IP: &str = "unknown";

/// Records `(path, client ip)` on the hit queue, then runs the request.
///
/// The hit is enqueued before the handler runs and never delays it.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = spawn_hit_forwarder("main-server", stats, 1024, 8, false);
/// let app = Router::new()
///     .route("/events/{id}", get(event_handler))
///     .layer(middleware::from_fn_with_state(recorder, record_hits));
/// ```
pub async fn record_hits(
    State(recorder): State<HitRecorder>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let peer = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|ConnectInfo(addr)| addr);

    let ip = client_ip(&parts.headers, peer, recorder.behind_proxy());
    recorder.record(parts.uri.path(), ip);

    next.run(Request::from_parts(parts, body)).await
}

/// Picks the client address: proxy headers first when `behind_proxy`, then
/// the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.map_or_else(|| UNKNOWN_IP.to_string(), |addr| addr.ip().to_string())
}
