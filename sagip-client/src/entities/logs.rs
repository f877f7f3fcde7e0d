use chrono::{DateTime, Utc};
use sagip_types::{LogInput, LogLevel};
use serde::Deserialize;
use serde_json::Value;

use crate::store::{Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAuditLog {
    pub id: i64,
    pub level: LogLevel,
    pub message: String,
    pub user: Option<String>,
    pub action: Option<String>,
    pub details: Option<Value>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    pub id: i64,
    pub level: LogLevel,
    pub message: String,
    pub user: Option<String>,
    pub action: Option<String>,
    pub details: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The server keeps details as a JSON string. Text that isn't JSON stays text.
fn details(raw: Option<Value>) -> Option<Value> {
    match raw? {
        Value::Null => None,
        Value::String(s) => Some(serde_json::from_str(&s).unwrap_or(Value::String(s))),
        other => Some(other),
    }
}

impl Entity for AuditLog {
    type Raw = RawAuditLog;
    type Draft = LogInput;

    const NAME: &'static str = "audit logs";
    const PATH: &'static str = "/api/logs";
    const PLACEMENT: Placement = Placement::Prepend;

    fn from_raw(raw: RawAuditLog) -> Self {
        Self {
            id: raw.id,
            level: raw.level,
            message: raw.message,
            user: raw.user,
            action: raw.action,
            details: details(raw.details),
            created_at: super::timestamp(raw.created_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_decoding() {
        assert_eq!(
            details(Some(json!("{\"entity\":\"alerts\"}"))),
            Some(json!({ "entity": "alerts" }))
        );
        assert_eq!(details(Some(json!("free text"))), Some(json!("free text")));
        assert_eq!(details(Some(Value::Null)), None);
        assert_eq!(details(Some(json!({ "id": 3 }))), Some(json!({ "id": 3 })));
    }
}
