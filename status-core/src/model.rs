use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use status_registry::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Strings go over the wire as `as_str()`. Decoding never fails: values
/// outside the known vocabulary land in `Other` and render as sent.
macro_rules! wire_string {
    ($ty:ident) => {
        impl $ty {
            fn from_wire(raw: String) -> Self {
                Self::ALL
                    .into_iter()
                    .find(|known| known.as_str() == raw)
                    .unwrap_or($ty::Other(raw))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from_wire)
            }
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    #[default]
    Operational,
    DegradedPerformance,
    PartialOutage,
    MajorOutage,
    Other(String),
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Operational,
        ServiceStatus::DegradedPerformance,
        ServiceStatus::PartialOutage,
        ServiceStatus::MajorOutage,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Operational => "Operational",
            ServiceStatus::DegradedPerformance => "Degraded Performance",
            ServiceStatus::PartialOutage => "Partial Outage",
            ServiceStatus::MajorOutage => "Major Outage",
            ServiceStatus::Other(raw) => raw,
        }
    }

    /// Higher is worse. An unrecognized status counts as a major outage.
    pub fn severity(&self) -> u8 {
        match self {
            ServiceStatus::Operational => 0,
            ServiceStatus::DegradedPerformance => 1,
            ServiceStatus::PartialOutage => 2,
            ServiceStatus::MajorOutage | ServiceStatus::Other(_) => 3,
        }
    }

    /// Badge class used by both the browser and terminal renderers.
    pub fn tone(&self) -> &'static str {
        match self.severity() {
            0 => "ok",
            1 => "degraded",
            2 => "partial",
            _ => "major",
        }
    }
}

wire_string!(ServiceStatus);

impl FromStr for ServiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        status_registry::validate_service_status(s)?;
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::Invalid {
                field: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IncidentKind {
    #[default]
    Incident,
    Maintenance,
    Other(String),
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 2] = [IncidentKind::Incident, IncidentKind::Maintenance];

    pub fn as_str(&self) -> &str {
        match self {
            IncidentKind::Incident => "incident",
            IncidentKind::Maintenance => "maintenance",
            IncidentKind::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            IncidentKind::Incident => "Incident",
            IncidentKind::Maintenance => "Maintenance",
            IncidentKind::Other(raw) => raw,
        }
    }

    /// Status an item of this kind is closed with.
    pub fn resolved_status(&self) -> IncidentStatus {
        match self {
            IncidentKind::Maintenance => IncidentStatus::Completed,
            IncidentKind::Incident | IncidentKind::Other(_) => IncidentStatus::Resolved,
        }
    }
}

wire_string!(IncidentKind);

impl FromStr for IncidentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        status_registry::validate_incident_type(s)?;
        match s {
            "maintenance" => Ok(IncidentKind::Maintenance),
            _ => Ok(IncidentKind::Incident),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IncidentStatus {
    #[default]
    Investigating,
    Identified,
    Monitoring,
    Resolved,
    Scheduled,
    InProgress,
    Completed,
    Other(String),
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 7] = [
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Monitoring,
        IncidentStatus::Resolved,
        IncidentStatus::Scheduled,
        IncidentStatus::InProgress,
        IncidentStatus::Completed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::Resolved => "Resolved",
            IncidentStatus::Scheduled => "Scheduled",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Completed => "Completed",
            IncidentStatus::Other(raw) => raw,
        }
    }
}

wire_string!(IncidentStatus);

impl FromStr for IncidentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        status_registry::validate_incident_status(s)?;
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::Invalid {
                field: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub status: ServiceStatus,
    #[serde(default)]
    pub organization_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub status: IncidentStatus,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub organization_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<Service>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updates: Vec<IncidentUpdate>,
}

impl Incident {
    pub fn service_ids(&self) -> Vec<String> {
        self.services.iter().map(|s| s.id.clone()).collect()
    }

    /// Updates oldest first. Equal timestamps keep server order.
    pub fn timeline(&self) -> Vec<&IncidentUpdate> {
        let mut updates: Vec<&IncidentUpdate> = self.updates.iter().collect();
        updates.sort_by_key(|u| u.created_at);
        updates
    }

    /// Comma-joined names of affected services, or "None".
    pub fn affected_names(&self) -> String {
        if self.services.is_empty() {
            return "None".into();
        }
        self.services
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The collections a page keeps a copy of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Incidents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceInput {
    pub name: String,
    pub status: ServiceStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentInput {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub status: IncidentStatus,
    pub service_ids: Vec<String>,
}

/// Full replacement body for `PUT /api/incidents/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPatch {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub status: IncidentStatus,
    pub is_resolved: bool,
    pub service_ids: Vec<String>,
}

impl IncidentPatch {
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            title: incident.title.clone(),
            description: incident.description.clone(),
            kind: incident.kind.clone(),
            status: incident.status.clone(),
            is_resolved: incident.is_resolved,
            service_ids: incident.service_ids(),
        }
    }

    pub fn resolving(incident: &Incident) -> Self {
        Self {
            status: incident.kind.resolved_status(),
            is_resolved: true,
            ..Self::from_incident(incident)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateInput {
    pub message: String,
}

/// The backend encodes empty collections as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
