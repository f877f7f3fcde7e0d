use std::sync::Arc;

use sagip_types::{
    AlertInput, AlertLevel, AlertStatus, CenterStatus, IncidentReportInput, IncidentStatus,
    UserRole,
};
use serde_json::json;

use crate::{
    Stores,
    audit::AuditTrail,
    entities::{Alert, AuditLog, Conversation, IncidentReport, SystemUser, messages},
    error::ClientError,
    store::{Editable, Entity, SharedStore},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSummary {
    pub users: usize,
    pub barangay_officials: usize,
    pub active_alerts: usize,
    pub pending_reports: usize,
    pub active_reports: usize,
    /// Centers still operating, Full ones included.
    pub open_centers: usize,
    pub evacuees: i64,
    pub affected_people: usize,
}

/// City-wide administration. Every change is audited under the admin's name.
pub struct AdminConsole {
    stores: Arc<Stores>,
    audit: AuditTrail,
}

impl AdminConsole {
    pub fn new(stores: Arc<Stores>, admin: impl Into<String>) -> Self {
        let audit = AuditTrail::new(stores.logs.clone(), admin);
        Self { stores, audit }
    }

    pub fn stores(&self) -> &Arc<Stores> {
        &self.stores
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub async fn create<E: Editable>(
        &self,
        store: &SharedStore<E>,
        draft: &E::Draft,
    ) -> Result<E, ClientError> {
        let item = store.add(draft).await?;
        self.audit.record(
            "create",
            format!("Created {} {}", E::NAME, item.id()),
            json!({ "entity": E::NAME, "id": item.id() }),
        );
        Ok(item)
    }

    pub async fn update<E: Editable>(
        &self,
        store: &SharedStore<E>,
        id: i64,
        patch: &E::Patch,
    ) -> Result<E, ClientError> {
        let item = store.update(id, patch).await?;
        self.audit.record(
            "update",
            format!("Updated {} {id}", E::NAME),
            json!({ "entity": E::NAME, "id": id }),
        );
        Ok(item)
    }

    pub async fn remove<E: Editable>(
        &self,
        store: &SharedStore<E>,
        id: i64,
    ) -> Result<(), ClientError> {
        store.delete(id).await?;
        self.audit.record(
            "delete",
            format!("Deleted {} {id}", E::NAME),
            json!({ "entity": E::NAME, "id": id }),
        );
        Ok(())
    }

    pub async fn broadcast_alert(
        &self,
        title: &str,
        message: &str,
        level: AlertLevel,
        area_affected: Option<&str>,
    ) -> Result<Alert, ClientError> {
        let mut draft = AlertInput::new(title, message, level);
        draft.area_affected = area_affected.map(str::to_string);

        let alert = self.stores.alerts.add(&draft).await?;
        self.audit.record(
            "broadcast_alert",
            format!("Broadcast {} alert: {}", alert.level, alert.title),
            json!({ "entity": Alert::NAME, "id": alert.id, "level": alert.level.as_str() }),
        );
        Ok(alert)
    }

    pub async fn resolve_alert(&self, id: i64) -> Result<Alert, ClientError> {
        let patch = AlertInput {
            status: Some(AlertStatus::Resolved),
            ..Default::default()
        };
        let alert = self.stores.alerts.update(id, &patch).await?;
        self.audit.record(
            "resolve_alert",
            format!("Resolved alert: {}", alert.title),
            json!({ "entity": Alert::NAME, "id": id }),
        );
        Ok(alert)
    }

    pub async fn moderate_report(
        &self,
        id: i64,
        status: IncidentStatus,
    ) -> Result<IncidentReport, ClientError> {
        let report = self
            .stores
            .incidents
            .update(id, &IncidentReportInput::status(status))
            .await?;
        self.audit.record(
            "moderate_report",
            format!("Report {id} marked {status}"),
            json!({ "entity": IncidentReport::NAME, "id": id, "status": status.as_str() }),
        );
        Ok(report)
    }

    pub fn summary(&self) -> AdminSummary {
        let users = self.stores.users.get();
        let reports = self.stores.incidents.get();
        let centers = self.stores.evac_centers.get();

        AdminSummary {
            users: users.len(),
            barangay_officials: users.iter().filter(|u| u.role == UserRole::Barangay).count(),
            active_alerts: self.stores.alerts.get().iter().filter(|a| a.is_active()).count(),
            pending_reports: reports
                .iter()
                .filter(|r| r.status == IncidentStatus::Pending)
                .count(),
            active_reports: reports.iter().filter(|r| r.status.is_active()).count(),
            open_centers: centers
                .iter()
                .filter(|c| c.status != CenterStatus::Closed)
                .count(),
            evacuees: centers.iter().map(|c| c.current_occupancy).sum(),
            affected_people: self
                .stores
                .affected_people
                .get()
                .iter()
                .filter(|p| p.affected)
                .count(),
        }
    }

    /// Newest first.
    pub fn recent_logs(&self, limit: usize) -> Vec<AuditLog> {
        self.stores.logs.get().into_iter().take(limit).collect()
    }

    pub fn users_in_barangay(&self, barangay_id: &str) -> Vec<SystemUser> {
        self.stores
            .users
            .get()
            .into_iter()
            .filter(|user| user.barangay_id.as_deref() == Some(barangay_id))
            .collect()
    }

    pub fn inbox(&self) -> Vec<Conversation> {
        messages::conversations(&self.stores.messages.get())
            .into_iter()
            .filter(|conversation| conversation.recipient_role() == Some(UserRole::Admin))
            .collect()
    }
}
