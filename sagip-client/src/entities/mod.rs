//! Local shapes of every server collection, and how raw records become them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub mod affected_people;
pub mod alerts;
pub mod contacts;
pub mod evac_centers;
pub mod incidents;
pub mod logs;
pub mod messages;
pub mod news;
pub mod users;

pub use affected_people::AffectedPerson;
pub use alerts::Alert;
pub use contacts::EmergencyContact;
pub use evac_centers::EvacuationCenter;
pub use incidents::IncidentReport;
pub use logs::AuditLog;
pub use messages::{Conversation, Message};
pub use news::NewsVideo;
pub use users::SystemUser;

/// Reads an RFC 3339 timestamp, or SQLite's `YYYY-MM-DD HH:MM:SS` in UTC.
pub(crate) fn timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        Ok(parsed) => Some(parsed.and_utc()),
        Err(e) => {
            log::warn!("Ignoring unreadable timestamp `{value}`: {e}");
            None
        }
    }
}

/// Reads a calendar date. A full timestamp keeps only its date part.
pub(crate) fn date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let day = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("Ignoring unreadable date `{value}`: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_timestamp_formats() {
        let rfc = timestamp(Some("2024-11-02T08:15:00.000Z")).unwrap();
        assert_eq!(rfc.hour(), 8);

        let sqlite = timestamp(Some("2024-11-02 08:15:00")).unwrap();
        assert_eq!(sqlite, rfc);

        assert_eq!(timestamp(Some("yesterday")), None);
        assert_eq!(timestamp(None), None);
    }

    #[test]
    fn test_date_accepts_timestamps() {
        let day = date(Some("1990-04-02T00:00:00.000Z")).unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (1990, 4, 2));
        assert_eq!(date(Some("")), None);
    }
}
