use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SERVICE_STATUSES: [&str; 4] = [
    "Operational",
    "Degraded Performance",
    "Partial Outage",
    "Major Outage",
];

pub const INCIDENT_TYPES: [&str; 2] = ["incident", "maintenance"];

pub const INCIDENT_STATUSES: [&str; 7] = [
    "Investigating",
    "Identified",
    "Monitoring",
    "Resolved",
    "Scheduled",
    "In Progress",
    "Completed",
];

/// Tags the backend broadcasts on `/api/stream`.
pub const EVENT_TAGS: [&str; 7] = [
    "service_created",
    "service_updated",
    "service_deleted",
    "incident_created",
    "incident_updated",
    "incident_deleted",
    "incident_update_added",
];

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("invalid {field} '{value}'")]
    Invalid { field: &'static str, value: String },
    #[error("invalid event payload: {0}")]
    Payload(String),
}

/// Body of a single `data:` frame on the event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl StreamEnvelope {
    pub fn is_known(&self) -> bool {
        EVENT_TAGS.contains(&self.event.as_str())
    }
}

pub fn parse_envelope(data: &str) -> Result<StreamEnvelope, ValidationError> {
    let envelope: StreamEnvelope =
        serde_json::from_str(data.trim()).map_err(|e| ValidationError::Payload(e.to_string()))?;
    if envelope.event.trim().is_empty() {
        return Err(ValidationError::Required { field: "event" });
    }
    Ok(envelope)
}

/// Returns the trimmed value, or an error when nothing is left.
pub fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

pub fn validate_service_status(value: &str) -> Result<(), ValidationError> {
    one_of("status", value, &SERVICE_STATUSES)
}

pub fn validate_incident_type(value: &str) -> Result<(), ValidationError> {
    one_of("type", value, &INCIDENT_TYPES)
}

pub fn validate_incident_status(value: &str) -> Result<(), ValidationError> {
    one_of("status", value, &INCIDENT_STATUSES)
}

fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_envelope() {
        let env = parse_envelope(r#"{"event":"service_created","id":"svc-1"}"#).expect("parse");
        assert_eq!(env.event, "service_created");
        assert_eq!(env.id.as_deref(), Some("svc-1"));
        assert!(env.is_known());
    }

    #[test]
    fn envelope_without_id_is_accepted() {
        let env = parse_envelope(r#"{"event":"something_new"}"#).expect("parse");
        assert_eq!(env.id, None);
        assert!(!env.is_known());
    }

    #[test]
    fn rejects_garbage_and_blank_event() {
        assert!(matches!(
            parse_envelope("ping"),
            Err(ValidationError::Payload(_))
        ));
        assert_eq!(
            parse_envelope(r#"{"event":"  "}"#),
            Err(ValidationError::Required { field: "event" })
        );
    }

    #[test]
    fn require_trims() {
        assert_eq!(require("name", "  API  ").as_deref(), Ok("API"));
        assert_eq!(
            require("name", "   "),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn status_vocabulary() {
        assert!(validate_service_status("Partial Outage").is_ok());
        assert!(validate_service_status("Outage").is_err());
        assert!(validate_incident_status("In Progress").is_ok());
        assert!(validate_incident_type("maintenance").is_ok());
        assert!(validate_incident_type("Maintenance").is_err());
    }
}
