use chrono::{DateTime, Utc};
use sagip_types::{GeoPoint, IncidentReportInput, IncidentStatus, json_list};
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawIncidentReport {
    pub id: i64,
    pub reporter_name: Option<String>,
    pub reporter_contact: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    #[serde(deserialize_with = "json_list::deserialize")]
    pub image_urls: Vec<String>,
    pub status: IncidentStatus,
    pub barangay_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncidentReport {
    pub id: i64,
    pub reporter_name: String,
    pub reporter_contact: Option<String>,
    pub kind: String,
    pub description: String,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub image_urls: Vec<String>,
    pub status: IncidentStatus,
    pub barangay_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IncidentReport {
    pub fn belongs_to(&self, barangay_id: &str) -> bool {
        self.barangay_id.as_deref() == Some(barangay_id)
    }
}

impl Entity for IncidentReport {
    type Raw = RawIncidentReport;
    type Draft = IncidentReportInput;

    const NAME: &'static str = "incident reports";
    const PATH: &'static str = "/api/incident-reports";
    const PLACEMENT: Placement = Placement::Prepend;

    fn from_raw(raw: RawIncidentReport) -> Self {
        let reporter_name = raw
            .reporter_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        Self {
            id: raw.id,
            reporter_name,
            reporter_contact: raw.reporter_contact,
            kind: raw.kind,
            description: raw.description,
            location: GeoPoint::from_parts(raw.latitude, raw.longitude),
            address: raw.address,
            image_urls: raw.image_urls,
            status: raw.status,
            barangay_id: raw.barangay_id,
            created_at: super::timestamp(raw.created_at.as_deref()),
            updated_at: super::timestamp(raw.updated_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for IncidentReport {
    type Patch = IncidentReportInput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reshape() {
        let raw: RawIncidentReport = serde_json::from_value(json!({
            "id": 7,
            "reporterName": "",
            "type": "Flood",
            "description": "Knee-deep water",
            "latitude": 10.3,
            "longitude": 123.9,
            "imageUrls": "[\"a.jpg\",\"b.jpg\"]",
            "status": "in progress",
            "createdAt": "2024-11-02T08:15:00.000Z"
        }))
        .unwrap();

        let report = IncidentReport::from_raw(raw);
        assert_eq!(report.reporter_name, ANONYMOUS);
        assert_eq!(report.image_urls, vec!["a.jpg", "b.jpg"]);
        assert_eq!(report.status, IncidentStatus::Responding);
        assert_eq!(report.location, Some(GeoPoint { lat: 10.3, lng: 123.9 }));
        assert!(report.created_at.is_some());
    }

    #[test]
    fn test_malformed_image_list_is_empty() {
        let raw: RawIncidentReport =
            serde_json::from_value(json!({ "id": 1, "imageUrls": "not json" })).unwrap();
        assert!(IncidentReport::from_raw(raw).image_urls.is_empty());
    }
}
