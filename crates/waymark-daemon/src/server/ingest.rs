//! Location ingestion endpoint.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use tracing::info;

use waymark_core::{LocationReport, UNKNOWN_PLACE};

use super::AppState;

/// Arrival timestamp format: fixed-width and lexicographically sortable.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `POST /location` - receive one location report.
///
/// `ip` and `user_agent` are always overwritten from request metadata; a
/// client cannot assert its own identity fields. The response echoes the
/// enriched record back to its own caller, never anyone else's data.
pub(super) async fn submit_location(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(mut report): Json<LocationReport>,
) -> Json<LocationReport> {
    report.ip = client_address(&headers, peer);
    report.user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if report.timestamp.is_empty() {
        report.timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
    }
    (report.country, report.city) = resolve_geo(&report.ip);

    info!(ip = %report.ip, accuracy_m = report.accuracy, "Location report received");
    state.store.append(report.clone()).await;

    Json(report)
}

/// First `X-Forwarded-For` entry when present, else the peer address.
///
/// The forwarded header wins because the tunnel provider terminates the
/// public connection and proxies to us from localhost.
fn client_address(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| peer.ip().to_string(), ToString::to_string)
}

/// Geo enrichment stub.
///
/// TODO: wire a real resolver (maxminddb) once a database ships with the
/// deployment; until then every report carries the unknown sentinel.
fn resolve_geo(_ip: &str) -> (String, String) {
    (UNKNOWN_PLACE.to_string(), UNKNOWN_PLACE.to_string())
}
