use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use sagip_types::{LogInput, LogLevel};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{entities::AuditLog, store::SharedStore};

/// Writes an audit-log entry for each change made through a portal.
///
/// Entries are sent in the background. A failed write is logged and
/// otherwise ignored, it never fails the change it describes.
pub struct AuditTrail {
    logs: Arc<SharedStore<AuditLog>>,
    actor: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl AuditTrail {
    pub fn new(logs: Arc<SharedStore<AuditLog>>, actor: impl Into<String>) -> Self {
        Self {
            logs,
            actor: actor.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn record(&self, action: &str, message: impl Into<String>, details: Value) {
        let entry = LogInput {
            level: Some(LogLevel::Info),
            message: Some(message.into()),
            user: Some(self.actor.clone()),
            action: Some(action.to_string()),
            details: Some(details),
            ..Default::default()
        };

        let logs = self.logs.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = logs.add(&entry).await {
                log::warn!("Failed to record audit entry {:?}: {e}", entry.action);
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    /// Waits for every entry recorded so far.
    pub async fn flush(&self) {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };
        for result in join_all(handles).await {
            if let Err(e) = result {
                log::warn!("Audit task failed: {e}");
            }
        }
    }
}
