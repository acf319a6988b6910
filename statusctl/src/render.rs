use chrono::{DateTime, Utc};
use status_core::model::{Incident, Service};
use status_core::page::UptimeView;
use status_core::public::{ACTIVE_HEADING, NO_ACTIVE_TEXT, NO_UPDATES_TEXT};
use status_core::uptime::UptimeReport;
use std::fmt::Write;

fn when(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Left-aligned columns sized to the widest cell.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<w$}", w = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(header.to_vec());
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn services_table(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services\n".into();
    }
    let rows: Vec<Vec<String>> = services
        .iter()
        .map(|s| vec![s.id.clone(), s.name.clone(), s.status.to_string()])
        .collect();
    table(&["ID", "NAME", "STATUS"], &rows)
}

pub fn incidents_table(incidents: &[Incident]) -> String {
    if incidents.is_empty() {
        return "No incidents\n".into();
    }
    let rows: Vec<Vec<String>> = incidents
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.title.clone(),
                i.kind.label().to_string(),
                i.status.to_string(),
                i.affected_names(),
                when(&i.updated_at),
            ]
        })
        .collect();
    table(&["ID", "TITLE", "TYPE", "STATUS", "AFFECTED", "UPDATED"], &rows)
}

pub fn incident_detail(incident: &Incident) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", incident.title, incident.status);
    let _ = writeln!(out, "{} {}", incident.kind.label(), incident.id);
    if !incident.description.is_empty() {
        let _ = writeln!(out, "{}", incident.description);
    }
    let _ = writeln!(out, "Affected: {}", incident.affected_names());
    for update in incident.timeline() {
        let _ = writeln!(out, "  {}  {}", when(&update.created_at), update.message);
    }
    out
}

pub fn uptime_report(view: &UptimeView, report: &UptimeReport) -> String {
    let mut out = format!(
        "Uptime for {} over {}: {}\n",
        view.service_id,
        view.period,
        report.percent_label()
    );
    if let Some(current) = report.latest() {
        let _ = writeln!(out, "Current: {} since {}", current.status, when(&current.changed_at));
    }
    for point in &report.history {
        let _ = writeln!(out, "  {}  {}", when(&point.changed_at), point.status);
    }
    out
}

pub fn public_page(headline: &str, services: &[Service], active: &[&Incident]) -> String {
    let mut out = format!("{headline}\n\n");
    out.push_str(&services_table(services));
    let _ = writeln!(out, "\n{ACTIVE_HEADING}");
    if active.is_empty() {
        let _ = writeln!(out, "{NO_ACTIVE_TEXT}");
    }
    for incident in active {
        let _ = writeln!(
            out,
            "\n{} [{}] [{}]",
            incident.title,
            incident.kind,
            incident.status
        );
        if !incident.description.is_empty() {
            let _ = writeln!(out, "{}", incident.description);
        }
        let _ = writeln!(out, "Affected: {}", incident.affected_names());
        let _ = writeln!(out, "Started: {}", when(&incident.created_at));
        let timeline = incident.timeline();
        if timeline.is_empty() {
            let _ = writeln!(out, "  {NO_UPDATES_TEXT}");
        }
        for update in timeline {
            let _ = writeln!(out, "  {}  {}", when(&update.created_at), update.message);
        }
    }
    out
}
