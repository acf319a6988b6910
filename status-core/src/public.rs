//! Derived views for the unauthenticated status page.

use crate::model::{Incident, Service, ServiceStatus};

pub const ACTIVE_HEADING: &str = "Active Incidents & Maintenance";
pub const NO_ACTIVE_TEXT: &str = "No active incidents or maintenance.";
pub const NO_UPDATES_TEXT: &str = "No updates yet.";

/// Incidents and maintenance that are still open, in server order.
pub fn active_incidents(incidents: &[Incident]) -> Vec<&Incident> {
    incidents.iter().filter(|i| !i.is_resolved).collect()
}

/// Worst status across all services; an empty page counts as operational.
pub fn overall_status(services: &[Service]) -> ServiceStatus {
    services
        .iter()
        .map(|s| &s.status)
        .max_by_key(|status| status.severity())
        .cloned()
        .unwrap_or_default()
}

pub fn overall_headline(status: &ServiceStatus) -> &'static str {
    match status.severity() {
        0 => "All Systems Operational",
        1 => "Some Systems Degraded",
        2 => "Partial System Outage",
        _ => "Major System Outage",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentKind, IncidentStatus};
    use chrono::{TimeZone, Utc};

    fn service(id: &str, status: ServiceStatus) -> Service {
        Service {
            id: id.into(),
            name: id.to_uppercase(),
            status,
            organization_id: "org_1".into(),
        }
    }

    fn incident(id: &str, is_resolved: bool) -> Incident {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Incident {
            id: id.into(),
            title: format!("incident {id}"),
            description: String::new(),
            kind: IncidentKind::Incident,
            status: if is_resolved {
                IncidentStatus::Resolved
            } else {
                IncidentStatus::Investigating
            },
            is_resolved,
            organization_id: "org_1".into(),
            created_at: at,
            updated_at: at,
            services: Vec::new(),
            updates: Vec::new(),
        }
    }

    #[test]
    fn resolved_incidents_are_not_active() {
        let incidents = vec![incident("i1", true), incident("i2", false)];
        let active = active_incidents(&incidents);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "i2");
    }

    #[test]
    fn headline_follows_worst_service() {
        assert_eq!(
            overall_headline(&overall_status(&[])),
            "All Systems Operational"
        );
        let services = [
            service("api", ServiceStatus::Operational),
            service("db", ServiceStatus::PartialOutage),
            service("web", ServiceStatus::DegradedPerformance),
        ];
        assert_eq!(overall_status(&services), ServiceStatus::PartialOutage);
    }

    #[test]
    fn unlisted_service_status_reads_as_outage() {
        let services = [
            service("api", ServiceStatus::DegradedPerformance),
            service("db", ServiceStatus::Other("Outage".into())),
        ];
        let overall = overall_status(&services);
        assert_eq!(overall, ServiceStatus::Other("Outage".into()));
        assert_eq!(overall_headline(&overall), "Major System Outage");
    }
}
