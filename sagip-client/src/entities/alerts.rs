use chrono::{DateTime, Utc};
use sagip_types::{AlertInput, AlertLevel, AlertStatus};
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAlert {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub level: AlertLevel,
    pub area_affected: Option<String>,
    pub status: AlertStatus,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub level: AlertLevel,
    pub area_affected: Option<String>,
    pub status: AlertStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

impl Entity for Alert {
    type Raw = RawAlert;
    type Draft = AlertInput;

    const NAME: &'static str = "alerts";
    const PATH: &'static str = "/api/alerts";
    const PLACEMENT: Placement = Placement::Prepend;

    fn from_raw(raw: RawAlert) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            message: raw.message,
            level: raw.level,
            area_affected: raw.area_affected,
            status: raw.status,
            created_at: super::timestamp(raw.created_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for Alert {
    type Patch = AlertInput;
}
