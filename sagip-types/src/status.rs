//! Enumerated status strings.
//!
//! Rows written by older clients carry whatever casing and wording they were
//! given ("in_progress", "MEDIUM", "inactive"), so decoding is lenient: every
//! enum here deserializes through [`From<String>`] and falls back to a fixed
//! variant instead of failing. Serialization always emits the canonical form.

use std::fmt;

use serde::{Deserialize, Serialize};

fn key(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', '-'], " ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum IncidentStatus {
    #[default]
    Pending,
    Verified,
    Responding,
    Resolved,
    Rejected,
}

impl IncidentStatus {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "verified" | "confirmed" | "approved" => Self::Verified,
            "responding" | "in progress" | "ongoing" | "dispatched" => Self::Responding,
            "resolved" | "closed" | "done" => Self::Resolved,
            "rejected" | "invalid" | "dismissed" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Verified => "Verified",
            Self::Responding => "Responding",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }

    /// Still needs attention from responders.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Verified | Self::Responding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum CenterStatus {
    #[default]
    Open,
    Full,
    Closed,
}

impl CenterStatus {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "full" | "at capacity" => Self::Full,
            "closed" | "inactive" => Self::Closed,
            _ => Self::Open,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Full => "Full",
            Self::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum AlertLevel {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl AlertLevel {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "moderate" | "medium" => Self::Moderate,
            "high" => Self::High,
            "critical" | "severe" | "extreme" => Self::Critical,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum AlertStatus {
    #[default]
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "resolved" | "inactive" | "expired" | "cancelled" | "canceled" => Self::Resolved,
            _ => Self::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Resolved => "Resolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Barangay,
    #[default]
    Guest,
}

impl UserRole {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "admin" | "administrator" | "superadmin" => Self::Admin,
            "barangay" | "barangay official" | "official" | "lgu" => Self::Barangay,
            _ => Self::Guest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Barangay => "barangay",
            Self::Guest => "guest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn normalize(s: &str) -> Self {
        match key(s).as_str() {
            "warn" | "warning" => Self::Warning,
            "error" | "err" | "critical" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

macro_rules! lenient_string_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<String> for $ty {
                fn from(s: String) -> Self {
                    Self::normalize(&s)
                }
            }

            impl From<&str> for $ty {
                fn from(s: &str) -> Self {
                    Self::normalize(s)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

lenient_string_conversions!(
    IncidentStatus,
    CenterStatus,
    AlertLevel,
    AlertStatus,
    UserRole,
    LogLevel
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_status_synonyms() {
        assert_eq!(
            IncidentStatus::normalize("in_progress"),
            IncidentStatus::Responding
        );
        assert_eq!(
            IncidentStatus::normalize(" RESOLVED "),
            IncidentStatus::Resolved
        );
        assert_eq!(IncidentStatus::normalize("???"), IncidentStatus::Pending);
    }

    #[test]
    fn test_deserialize_is_lenient_and_serialize_is_canonical() {
        let level: AlertLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(level, AlertLevel::Moderate);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"Moderate\"");

        let role: UserRole = serde_json::from_str("\"Barangay Official\"").unwrap();
        assert_eq!(role, UserRole::Barangay);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"barangay\"");

        let level: LogLevel = serde_json::from_str("\"WARN\"").unwrap();
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"warning\"");
    }

    #[test]
    fn test_display_matches_canonical_form() {
        assert_eq!(CenterStatus::normalize("closed").to_string(), "Closed");
        assert_eq!(AlertStatus::normalize("expired").to_string(), "Resolved");
        assert!(IncidentStatus::Verified.is_active());
        assert!(!IncidentStatus::Rejected.is_active());
    }
}
