//! Location report model shared by the collector endpoints.

use serde::{Deserialize, Serialize};

/// Sentinel used when geo enrichment cannot resolve a place name.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// One device location observation.
///
/// `latitude` and `longitude` are the only fields a client must supply;
/// everything else defaults and is filled in server-side on ingestion.
/// `ip` and `user_agent` are ALWAYS derived from request metadata - values
/// asserted by the client decode but are discarded before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    /// Signed degrees. Not range-validated by the protocol.
    pub latitude: f64,
    /// Signed degrees. Not range-validated by the protocol.
    pub longitude: f64,
    /// Radius of uncertainty in meters; 0 means unknown.
    #[serde(default)]
    pub accuracy: f64,
    /// Client-supplied capture time; empty means "fill with arrival time".
    #[serde(default)]
    pub timestamp: String,
    /// Server-derived client address.
    #[serde(default)]
    pub ip: String,
    /// Server-derived client software identity.
    #[serde(default)]
    pub user_agent: String,
    /// Geo enrichment, or [`UNKNOWN_PLACE`].
    #[serde(default)]
    pub country: String,
    /// Geo enrichment, or [`UNKNOWN_PLACE`].
    #[serde(default)]
    pub city: String,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_decodes_with_defaults() {
        let report: LocationReport =
            serde_json::from_str(r#"{"latitude": 40.4, "longitude": -3.7}"#).expect("decode");
        assert!((report.latitude - 40.4).abs() < f64::EPSILON);
        assert!((report.accuracy - 0.0).abs() < f64::EPSILON);
        assert!(report.timestamp.is_empty());
        assert!(report.ip.is_empty());
        assert!(report.user_agent.is_empty());
    }

    #[test]
    fn missing_coordinates_is_a_decode_error() {
        let result = serde_json::from_str::<LocationReport>(r#"{"longitude": -3.7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn user_agent_uses_camel_case_on_the_wire() {
        let report: LocationReport = serde_json::from_str(
            r#"{"latitude": 1.0, "longitude": 2.0, "userAgent": "probe/1.0"}"#,
        )
        .expect("decode");
        assert_eq!(report.user_agent, "probe/1.0");

        let encoded = serde_json::to_string(&report).expect("encode");
        assert!(encoded.contains("\"userAgent\""));
    }
}
