use chrono::{DateTime, NaiveDate, Utc};
use sagip_types::AffectedPersonInput;
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAffectedPerson {
    pub id: i64,
    pub name: String,
    pub sex: Option<String>,
    pub age: Option<u32>,
    pub purok: Option<String>,
    pub birthday: Option<String>,
    pub affected: bool,
    pub evacuated: bool,
    pub barangay_id: String,
    pub created_at: Option<String>,
}

/// A resident on a barangay's roster of people hit by a disaster.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectedPerson {
    pub id: i64,
    pub name: String,
    pub sex: Option<String>,
    pub age: Option<u32>,
    pub purok: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub affected: bool,
    pub evacuated: bool,
    pub barangay_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl AffectedPerson {
    pub fn belongs_to(&self, barangay_id: &str) -> bool {
        self.barangay_id == barangay_id
    }
}

impl Entity for AffectedPerson {
    type Raw = RawAffectedPerson;
    type Draft = AffectedPersonInput;

    const NAME: &'static str = "affected people";
    const PATH: &'static str = "/api/barangay/affected-people";
    const PLACEMENT: Placement = Placement::Append;

    fn from_raw(raw: RawAffectedPerson) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            sex: raw.sex,
            age: raw.age,
            purok: raw.purok,
            birthday: super::date(raw.birthday.as_deref()),
            affected: raw.affected,
            evacuated: raw.evacuated,
            barangay_id: raw.barangay_id,
            created_at: super::timestamp(raw.created_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for AffectedPerson {
    type Patch = AffectedPersonInput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_flags_default_to_false() {
        let raw: RawAffectedPerson = serde_json::from_value(
            json!({ "id": 1, "name": "Juan", "barangayId": "b1", "birthday": "1990-04-02" }),
        )
        .unwrap();
        let person = AffectedPerson::from_raw(raw);
        assert!(!person.affected);
        assert!(!person.evacuated);
        assert_eq!(person.birthday, NaiveDate::from_ymd_opt(1990, 4, 2));
    }
}
