use sagip_types::ContactInput;
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawContact {
    pub id: i64,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub phone_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A hotline shown to guests. Missing fields read as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyContact {
    pub id: i64,
    pub name: String,
    pub organization: String,
    pub phone_number: String,
    pub kind: String,
}

impl Entity for EmergencyContact {
    type Raw = RawContact;
    type Draft = ContactInput;

    const NAME: &'static str = "contacts";
    const PATH: &'static str = "/api/contacts";
    const PLACEMENT: Placement = Placement::Append;

    fn from_raw(raw: RawContact) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            organization: raw.organization.unwrap_or_default(),
            phone_number: raw.phone_number.unwrap_or_default(),
            kind: raw.kind.unwrap_or_default(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for EmergencyContact {
    type Patch = ContactInput;
}
