//! Wire types shared by the Sagip server and its clients.
//!
//! The server speaks camelCase JSON. Request bodies live in [`payloads`],
//! enumerated status strings in [`status`], and the tolerant decoder for
//! list fields that the database keeps as JSON-encoded strings in
//! [`json_list`].

pub mod json_list;
pub mod payloads;
pub mod status;

use serde::{Deserialize, Serialize};

pub use payloads::{
    AffectedPersonInput, AlertInput, ContactInput, EvacCenterInput, IncidentReportInput,
    LogInput, MessageInput, NewsInput, UserInput,
};
pub use status::{AlertLevel, AlertStatus, CenterStatus, IncidentStatus, LogLevel, UserRole};

/// Body of every non-2xx response from the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// `GET /api/health`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub db: String,
    pub now: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok" && self.db == "ok"
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Composes a point from separately stored coordinates. Both halves must be present.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_skips_missing_details() {
        let body = serde_json::to_value(ErrorBody::new("Report not found")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Report not found" }));
    }

    #[test]
    fn test_geo_point_needs_both_coordinates() {
        assert_eq!(
            GeoPoint::from_parts(Some(14.6), Some(121.0)),
            Some(GeoPoint {
                lat: 14.6,
                lng: 121.0
            })
        );
        assert_eq!(GeoPoint::from_parts(Some(14.6), None), None);
        assert_eq!(GeoPoint::from_parts(None, None), None);
    }
}
