use sagip_types::{CenterStatus, EvacCenterInput, GeoPoint, json_list};
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEvacCenter {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub barangay_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub capacity: i64,
    pub current_occupancy: i64,
    #[serde(deserialize_with = "json_list::deserialize")]
    pub services: Vec<String>,
    pub status: CenterStatus,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvacuationCenter {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub barangay_id: Option<String>,
    pub location: Option<GeoPoint>,
    pub capacity: i64,
    pub current_occupancy: i64,
    pub services: Vec<String>,
    pub status: CenterStatus,
    pub contact_number: Option<String>,
}

impl EvacuationCenter {
    pub fn belongs_to(&self, barangay_id: &str) -> bool {
        self.barangay_id.as_deref() == Some(barangay_id)
    }

    pub fn available_slots(&self) -> i64 {
        (self.capacity - self.current_occupancy).max(0)
    }

    /// Fraction of capacity in use, 0.0 for centers without a capacity.
    pub fn occupancy_rate(&self) -> f64 {
        if self.capacity <= 0 {
            return 0.0;
        }
        self.current_occupancy as f64 / self.capacity as f64
    }
}

impl Entity for EvacuationCenter {
    type Raw = RawEvacCenter;
    type Draft = EvacCenterInput;

    const NAME: &'static str = "evacuation centers";
    const PATH: &'static str = "/api/evac-centers";
    const PLACEMENT: Placement = Placement::Append;

    fn from_raw(raw: RawEvacCenter) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            address: raw.address,
            barangay_id: raw.barangay_id,
            location: GeoPoint::from_parts(raw.lat, raw.lng),
            capacity: raw.capacity,
            current_occupancy: raw.current_occupancy,
            services: raw.services,
            status: raw.status,
            contact_number: raw.contact_number,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for EvacuationCenter {
    type Patch = EvacCenterInput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_services_in_either_form() {
        let decoded: RawEvacCenter =
            serde_json::from_value(json!({ "id": 1, "name": "Gym", "services": ["Water"] }))
                .unwrap();
        let encoded: RawEvacCenter = serde_json::from_value(
            json!({ "id": 1, "name": "Gym", "services": "[\"Water\"]" }),
        )
        .unwrap();
        assert_eq!(decoded.services, encoded.services);
    }

    #[test]
    fn test_location_needs_both_coordinates() {
        let raw: RawEvacCenter = serde_json::from_value(
            json!({ "id": 2, "name": "School", "lat": 14.6, "lng": 121.0, "status": "full" }),
        )
        .unwrap();
        let center = EvacuationCenter::from_raw(raw);
        assert_eq!(center.location, Some(GeoPoint { lat: 14.6, lng: 121.0 }));
        assert_eq!(center.status, CenterStatus::Full);

        let raw: RawEvacCenter =
            serde_json::from_value(json!({ "id": 3, "name": "Chapel", "lat": 14.6 })).unwrap();
        assert_eq!(EvacuationCenter::from_raw(raw).location, None);
    }

    #[test]
    fn test_available_slots_never_negative() {
        let raw: RawEvacCenter = serde_json::from_value(
            json!({ "id": 4, "name": "Court", "capacity": 10, "currentOccupancy": 12 }),
        )
        .unwrap();
        let center = EvacuationCenter::from_raw(raw);
        assert_eq!(center.available_slots(), 0);
        assert!(center.occupancy_rate() > 1.0);
    }
}
