//! Tools for one barangay's officials.
//!
//! Everything is scoped to the portal's barangay id. Writes re-read the target
//! from the server first and refuse records of other barangays with
//! [`ClientError::OutOfScope`]. Changes are recorded in the audit trail under
//! the signed-in official's name.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use sagip_types::{
    AffectedPersonInput, CenterStatus, EvacCenterInput, IncidentReportInput, IncidentStatus,
    UserRole,
};
use serde_json::json;

use crate::{
    Stores,
    audit::AuditTrail,
    entities::{
        AffectedPerson, Conversation, EvacuationCenter, IncidentReport,
        incidents::RawIncidentReport, messages,
    },
    error::ClientError,
    store::Entity,
};

const TREND_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarangayDashboard {
    pub evacuees: i64,
    pub capacity: i64,
    /// Centers still operating, Full ones included.
    pub open_centers: usize,
    pub active_incidents: usize,
    pub pending_incidents: usize,
    pub affected_people: usize,
    pub evacuated_people: usize,
    /// Reports filed on each of the last seven days, oldest first.
    pub incident_trend: Vec<DailyCount>,
}

pub struct BarangayPortal {
    stores: Arc<Stores>,
    barangay_id: String,
    audit: AuditTrail,
}

impl BarangayPortal {
    pub fn new(
        stores: Arc<Stores>,
        barangay_id: impl Into<String>,
        official: impl Into<String>,
    ) -> Self {
        let audit = AuditTrail::new(stores.logs.clone(), official);
        Self {
            stores,
            barangay_id: barangay_id.into(),
            audit,
        }
    }

    pub fn barangay_id(&self) -> &str {
        &self.barangay_id
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    fn out_of_scope<E: Entity>(&self, id: i64) -> ClientError {
        log::warn!("Barangay {} refused {} {id}", self.barangay_id, E::NAME);
        ClientError::OutOfScope {
            entity: E::NAME,
            id,
            barangay_id: self.barangay_id.clone(),
        }
    }

    pub fn incident_reports(&self) -> Vec<IncidentReport> {
        self.stores
            .incidents
            .get()
            .into_iter()
            .filter(|report| report.belongs_to(&self.barangay_id))
            .collect()
    }

    /// Asks the server directly instead of reading the mirror.
    pub async fn fetch_incident_reports(&self) -> Result<Vec<IncidentReport>, ClientError> {
        let raw: Vec<RawIncidentReport> = self
            .stores
            .backend()
            .api_get_query(IncidentReport::PATH, &[("barangayId", self.barangay_id.as_str())])
            .await?;
        Ok(raw.into_iter().map(IncidentReport::from_raw).collect())
    }

    pub async fn update_report_status(
        &self,
        id: i64,
        status: IncidentStatus,
    ) -> Result<IncidentReport, ClientError> {
        if !self.stores.incidents.fetch(id).await?.belongs_to(&self.barangay_id) {
            return Err(self.out_of_scope::<IncidentReport>(id));
        }

        let report = self
            .stores
            .incidents
            .update(id, &IncidentReportInput::status(status))
            .await?;

        self.audit.record(
            "update_report_status",
            format!("Report {id} marked {status}"),
            json!({
                "entity": IncidentReport::NAME,
                "id": id,
                "status": status.as_str(),
                "barangayId": self.barangay_id
            }),
        );
        Ok(report)
    }

    pub fn evacuation_centers(&self) -> Vec<EvacuationCenter> {
        self.stores
            .evac_centers
            .get()
            .into_iter()
            .filter(|center| center.belongs_to(&self.barangay_id))
            .collect()
    }

    /// Sets a center's head count. A center at capacity becomes Full and one
    /// below it reopens; closed centers stay closed.
    pub async fn update_occupancy(
        &self,
        id: i64,
        occupancy: i64,
    ) -> Result<EvacuationCenter, ClientError> {
        let current = self.stores.evac_centers.fetch(id).await?;
        if !current.belongs_to(&self.barangay_id) {
            return Err(self.out_of_scope::<EvacuationCenter>(id));
        }

        let status = match current.status {
            CenterStatus::Closed => None,
            _ if current.capacity > 0 && occupancy >= current.capacity => Some(CenterStatus::Full),
            CenterStatus::Full => Some(CenterStatus::Open),
            CenterStatus::Open => None,
        };
        let patch = EvacCenterInput {
            current_occupancy: Some(occupancy),
            status,
            ..Default::default()
        };

        let center = self.stores.evac_centers.update(id, &patch).await?;
        self.audit.record(
            "update_occupancy",
            format!("{} occupancy set to {occupancy}", center.name),
            json!({ "entity": EvacuationCenter::NAME, "id": id, "currentOccupancy": occupancy }),
        );
        Ok(center)
    }

    pub fn affected_people(&self) -> Vec<AffectedPerson> {
        self.stores
            .affected_people
            .get()
            .into_iter()
            .filter(|person| person.belongs_to(&self.barangay_id))
            .collect()
    }

    pub async fn register_affected_person(
        &self,
        mut person: AffectedPersonInput,
    ) -> Result<AffectedPerson, ClientError> {
        person.barangay_id = Some(self.barangay_id.clone());
        let person = self.stores.affected_people.add(&person).await?;

        self.audit.record(
            "register_affected_person",
            format!("Registered {}", person.name),
            json!({
                "entity": AffectedPerson::NAME,
                "id": person.id,
                "barangayId": self.barangay_id
            }),
        );
        Ok(person)
    }

    /// Applies a patch to one of this barangay's people. A patch may not move
    /// the person to another barangay.
    pub async fn update_affected_person(
        &self,
        id: i64,
        patch: &AffectedPersonInput,
    ) -> Result<AffectedPerson, ClientError> {
        if patch
            .barangay_id
            .as_deref()
            .is_some_and(|barangay_id| barangay_id != self.barangay_id)
        {
            return Err(self.out_of_scope::<AffectedPerson>(id));
        }
        self.ensure_person_in_scope(id).await?;

        let person = self.stores.affected_people.update(id, patch).await?;
        self.audit.record(
            "update_affected_person",
            format!("Updated {}", person.name),
            json!({ "entity": AffectedPerson::NAME, "id": id }),
        );
        Ok(person)
    }

    pub async fn remove_affected_person(&self, id: i64) -> Result<(), ClientError> {
        self.ensure_person_in_scope(id).await?;
        self.stores.affected_people.delete(id).await?;
        self.audit.record(
            "remove_affected_person",
            format!("Removed person {id}"),
            json!({ "entity": AffectedPerson::NAME, "id": id }),
        );
        Ok(())
    }

    async fn ensure_person_in_scope(&self, id: i64) -> Result<(), ClientError> {
        if self.stores.affected_people.fetch(id).await?.belongs_to(&self.barangay_id) {
            Ok(())
        } else {
            Err(self.out_of_scope::<AffectedPerson>(id))
        }
    }

    pub fn dashboard(&self, today: NaiveDate) -> BarangayDashboard {
        let centers = self.evacuation_centers();
        let reports = self.incident_reports();
        let people = self.affected_people();

        BarangayDashboard {
            evacuees: centers.iter().map(|c| c.current_occupancy).sum(),
            capacity: centers.iter().map(|c| c.capacity).sum(),
            open_centers: centers
                .iter()
                .filter(|c| c.status != CenterStatus::Closed)
                .count(),
            active_incidents: reports.iter().filter(|r| r.status.is_active()).count(),
            pending_incidents: reports
                .iter()
                .filter(|r| r.status == IncidentStatus::Pending)
                .count(),
            affected_people: people.iter().filter(|p| p.affected).count(),
            evacuated_people: people.iter().filter(|p| p.evacuated).count(),
            incident_trend: incident_trend(&reports, today),
        }
    }

    pub fn inbox(&self) -> Vec<Conversation> {
        messages::conversations(&self.stores.messages.get())
            .into_iter()
            .filter(|conversation| conversation.recipient_role() == Some(UserRole::Barangay))
            .collect()
    }
}

fn incident_trend(reports: &[IncidentReport], today: NaiveDate) -> Vec<DailyCount> {
    (0..TREND_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| DailyCount {
            day,
            count: reports
                .iter()
                .filter(|r| r.created_at.map(|at| at.date_naive()) == Some(day))
                .count(),
        })
        .collect()
}
