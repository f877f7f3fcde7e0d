use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
    backend::Backend,
    config::ClientConfig,
    entities::{
        AffectedPerson, Alert, AuditLog, EmergencyContact, EvacuationCenter, IncidentReport,
        Message, NewsVideo, SystemUser,
    },
    error::ClientError,
    store::SharedStore,
};

/// Every collection the app mirrors, sharing one [`Backend`].
///
/// Build it once at startup and hand `Arc<Stores>` to whatever needs data.
pub struct Stores {
    backend: Arc<Backend>,
    pub alerts: Arc<SharedStore<Alert>>,
    pub contacts: Arc<SharedStore<EmergencyContact>>,
    pub evac_centers: Arc<SharedStore<EvacuationCenter>>,
    pub incidents: Arc<SharedStore<IncidentReport>>,
    pub news: Arc<SharedStore<NewsVideo>>,
    pub users: Arc<SharedStore<SystemUser>>,
    pub logs: Arc<SharedStore<AuditLog>>,
    pub messages: Arc<SharedStore<Message>>,
    pub affected_people: Arc<SharedStore<AffectedPerson>>,
}

impl Stores {
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(Arc::new(Backend::new(config)?)))
    }

    pub fn new(backend: Arc<Backend>) -> Self {
        Self {
            alerts: Arc::new(SharedStore::new(backend.clone())),
            contacts: Arc::new(SharedStore::new(backend.clone())),
            evac_centers: Arc::new(SharedStore::new(backend.clone())),
            incidents: Arc::new(SharedStore::new(backend.clone())),
            news: Arc::new(SharedStore::new(backend.clone())),
            users: Arc::new(SharedStore::new(backend.clone())),
            logs: Arc::new(SharedStore::new(backend.clone())),
            messages: Arc::new(SharedStore::new(backend.clone())),
            affected_people: Arc::new(SharedStore::new(backend.clone())),
            backend,
        }
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Loads every store concurrently. True when all of them loaded.
    pub async fn load_all(&self) -> bool {
        let results = tokio::join!(
            self.alerts.load(),
            self.contacts.load(),
            self.evac_centers.load(),
            self.incidents.load(),
            self.news.load(),
            self.users.load(),
            self.logs.load(),
            self.messages.load(),
            self.affected_people.load(),
        );
        let loaded = [
            results.0, results.1, results.2, results.3, results.4, results.5, results.6,
            results.7, results.8,
        ];

        let failed = loaded.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            log::warn!("{failed} of {} stores failed to load", loaded.len());
        }
        failed == 0
    }

    /// Starts [`Stores::load_all`] in the background. Reads return empty snapshots until it lands.
    pub fn spawn_initial_load(self: &Arc<Self>) -> JoinHandle<bool> {
        let stores = self.clone();
        tokio::spawn(async move { stores.load_all().await })
    }

    pub fn spawn_refresh_all(&self, period: Duration) -> Vec<JoinHandle<()>> {
        vec![
            self.alerts.spawn_refresh(period),
            self.contacts.spawn_refresh(period),
            self.evac_centers.spawn_refresh(period),
            self.incidents.spawn_refresh(period),
            self.news.spawn_refresh(period),
            self.users.spawn_refresh(period),
            self.logs.spawn_refresh(period),
            self.messages.spawn_refresh(period),
            self.affected_people.spawn_refresh(period),
        ]
    }
}
