use std::sync::Arc;

use im::Vector;
use sagip_types::{CenterStatus, IncidentReportInput, MessageInput, UserRole};

use crate::{
    Stores,
    entities::{
        Alert, Conversation, EmergencyContact, EvacuationCenter, IncidentReport, Message,
        NewsVideo, messages,
    },
    error::ClientError,
};

/// The public side of the app. Nothing here is audited.
pub struct GuestView {
    stores: Arc<Stores>,
    name: String,
}

impl GuestView {
    /// `name` signs outgoing messages and picks out the guest's own conversations.
    pub fn new(stores: Arc<Stores>, name: impl Into<String>) -> Self {
        Self {
            stores,
            name: name.into(),
        }
    }

    pub fn open_evacuation_centers(&self) -> Vec<EvacuationCenter> {
        self.stores
            .evac_centers
            .get()
            .into_iter()
            .filter(|center| center.status != CenterStatus::Closed)
            .collect()
    }

    /// Active alerts, most severe first.
    pub fn active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .stores
            .alerts
            .get()
            .into_iter()
            .filter(Alert::is_active)
            .collect();
        alerts.sort_by(|a, b| b.level.cmp(&a.level));
        alerts
    }

    pub fn emergency_contacts(&self) -> Vector<EmergencyContact> {
        self.stores.contacts.get()
    }

    pub fn news(&self) -> Vector<NewsVideo> {
        self.stores.news.get()
    }

    pub async fn report_incident(
        &self,
        report: IncidentReportInput,
    ) -> Result<IncidentReport, ClientError> {
        self.stores.incidents.add(&report).await
    }

    /// Starts a conversation when `conversation_id` is `None`, otherwise replies in it.
    pub async fn send_message(
        &self,
        conversation_id: Option<&str>,
        body: &str,
        recipient_role: UserRole,
    ) -> Result<Message, ClientError> {
        let draft = MessageInput {
            conversation_id: conversation_id.map(str::to_string),
            sender: Some(self.name.clone()),
            body: Some(body.to_string()),
            recipient_role: Some(recipient_role),
        };
        self.stores.messages.add(&draft).await
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        messages::conversations(&self.stores.messages.get())
            .into_iter()
            .filter(|conversation| conversation.involves(&self.name))
            .collect()
    }
}
