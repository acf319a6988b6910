use crate::render;
use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use status_core::forms::{IncidentForm, ServiceForm};
use status_core::model::{Collection, Incident, IncidentKind, IncidentStatus, Service, ServiceStatus};
use status_core::uptime::UptimePeriod;
use status_core::{
    Access, ClientConfig, DashboardPage, HttpApi, IncidentsPage, Notifier, PublicStatusPage,
    Toast, ToastLevel, ViewCore,
};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Toasts go to stderr so `--json` output stays parseable.
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, toast: Toast) {
        let mark = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "event",
            ToastLevel::Error => "error",
        };
        eprintln!("[{mark}] {}", toast.message);
    }
}

pub struct Context {
    pub api: Rc<HttpApi>,
    pub access: Access,
    pub reload_delay: Duration,
    pub json: bool,
}

impl Context {
    pub fn new(config: &ClientConfig, json: bool) -> Result<Self> {
        let api = HttpApi::new(&config.api_base_url)?;
        let access = config.access();
        debug!(base_url = %api.base_url(), access = ?access, "client configured");
        Ok(Self {
            api: Rc::new(api),
            access,
            reload_delay: config.reload_delay,
            json,
        })
    }

    pub fn core(&self) -> ViewCore<HttpApi> {
        ViewCore::new(self.api.clone(), self.access.clone())
            .with_notifier(Rc::new(TermNotifier))
            .with_reload_delay(self.reload_delay)
    }

    pub fn emit<T>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }
}

/// Optional field overrides for `incident add` and `incident edit`.
pub struct IncidentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<IncidentKind>,
    pub status: Option<IncidentStatus>,
    pub services: Vec<String>,
}

impl IncidentDraft {
    fn apply(self, form: &mut IncidentForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(kind) = self.kind {
            form.kind = kind;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        for id in &self.services {
            form.toggle_service(id);
        }
    }
}

fn dialog_outcome(succeeded: bool, error: Option<&str>) -> Result<()> {
    if succeeded {
        return Ok(());
    }
    Err(anyhow!("{}", error.unwrap_or("request failed")))
}

fn find_service(services: &[Service], id: &str) -> Result<Service> {
    services
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("no service with id '{id}'"))
}

fn find_incident(incidents: &[Incident], id: &str) -> Result<Incident> {
    incidents
        .iter()
        .find(|i| i.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("no incident with id '{id}'"))
}

pub async fn list_services(ctx: &Context) -> Result<()> {
    let mut core = ctx.core();
    core.refetch(Collection::Services).await?;
    ctx.emit(core.state.services.as_slice(), |s| render::services_table(s))
}

pub async fn add_service(ctx: &Context, name: String, status: ServiceStatus) -> Result<()> {
    let mut page = DashboardPage::new(ctx.core());
    page.open_create();
    page.service_dialog.form = ServiceForm { name, status };
    let succeeded = page.submit_service().await;
    dialog_outcome(succeeded, page.service_dialog.error.as_deref())?;
    ctx.emit(page.core.state.services.as_slice(), |s| render::services_table(s))
}

pub async fn edit_service(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    status: Option<ServiceStatus>,
) -> Result<()> {
    let mut page = DashboardPage::new(ctx.core());
    page.core.refetch(Collection::Services).await?;
    let service = find_service(&page.core.state.services, id)?;

    page.open_edit(&service);
    if let Some(name) = name {
        page.service_dialog.form.name = name;
    }
    if let Some(status) = status {
        page.service_dialog.form.status = status;
    }
    let succeeded = page.submit_service().await;
    dialog_outcome(succeeded, page.service_dialog.error.as_deref())?;
    ctx.emit(page.core.state.services.as_slice(), |s| render::services_table(s))
}

pub async fn delete_service(ctx: &Context, id: &str) -> Result<()> {
    let mut page = DashboardPage::new(ctx.core());
    page.core.refetch(Collection::Services).await?;
    let service = find_service(&page.core.state.services, id)?;

    page.open_delete(&service);
    let succeeded = page.confirm_delete().await;
    dialog_outcome(succeeded, page.delete_dialog.error.as_deref())?;
    ctx.emit(page.core.state.services.as_slice(), |s| render::services_table(s))
}

pub async fn uptime(ctx: &Context, id: &str, period: &str) -> Result<()> {
    let mut page = DashboardPage::new(ctx.core());
    page.load_uptime(id, UptimePeriod::from_query(period)).await;
    let Some(view) = page.uptime else {
        bail!("uptime was not loaded");
    };
    match (&view.report, &view.error) {
        (Some(report), _) => ctx.emit(report, |r| render::uptime_report(&view, r)),
        (None, Some(error)) => bail!("{error}"),
        (None, None) => bail!("uptime was not loaded"),
    }
}

pub async fn list_incidents(ctx: &Context) -> Result<()> {
    let mut core = ctx.core();
    core.refetch(Collection::Incidents).await?;
    ctx.emit(core.state.incidents.as_slice(), |i| render::incidents_table(i))
}

pub async fn add_incident(ctx: &Context, draft: IncidentDraft) -> Result<()> {
    let mut page = IncidentsPage::new(ctx.core());
    page.open_create();
    if draft.kind == Some(IncidentKind::Maintenance) && draft.status.is_none() {
        page.incident_dialog.form.status = IncidentStatus::Scheduled;
    }
    draft.apply(&mut page.incident_dialog.form);
    let succeeded = page.submit_incident().await;
    dialog_outcome(succeeded, page.incident_dialog.error.as_deref())?;
    ctx.emit(page.core.state.incidents.as_slice(), |i| render::incidents_table(i))
}

pub async fn edit_incident(ctx: &Context, id: &str, draft: IncidentDraft) -> Result<()> {
    let mut page = IncidentsPage::new(ctx.core());
    page.core.refetch(Collection::Incidents).await?;
    let incident = find_incident(&page.core.state.incidents, id)?;

    page.open_edit(&incident);
    draft.apply(&mut page.incident_dialog.form);
    let succeeded = page.submit_incident().await;
    dialog_outcome(succeeded, page.incident_dialog.error.as_deref())?;
    ctx.emit(page.core.state.incidents.as_slice(), |i| render::incidents_table(i))
}

pub async fn resolve_incident(ctx: &Context, id: &str) -> Result<()> {
    let mut page = IncidentsPage::new(ctx.core());
    page.core.refetch(Collection::Incidents).await?;
    let incident = find_incident(&page.core.state.incidents, id)?;
    if incident.is_resolved {
        bail!("incident '{id}' is already resolved");
    }

    page.open_resolve(&incident);
    let succeeded = page.confirm_resolve().await;
    dialog_outcome(succeeded, page.resolve_dialog.error.as_deref())?;
    ctx.emit(page.core.state.incidents.as_slice(), |i| render::incidents_table(i))
}

pub async fn add_update(ctx: &Context, id: &str, message: String) -> Result<()> {
    let mut page = IncidentsPage::new(ctx.core());
    page.core.refetch(Collection::Incidents).await?;
    let incident = find_incident(&page.core.state.incidents, id)?;

    page.open_update(&incident);
    page.update_dialog.form.message = message;
    let succeeded = page.submit_update().await;
    dialog_outcome(succeeded, page.update_dialog.error.as_deref())?;
    let updated = find_incident(&page.core.state.incidents, id)?;
    ctx.emit(&updated, render::incident_detail)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicSummary<'a> {
    overall: ServiceStatus,
    headline: &'static str,
    services: &'a [Service],
    active_incidents: Vec<&'a Incident>,
}

pub async fn public_status(ctx: &Context) -> Result<()> {
    let mut page = PublicStatusPage::new(ctx.api.clone());
    page.load().await?;

    let overall = page.overall_status();
    let headline = status_core::public::overall_headline(&overall);
    let summary = PublicSummary {
        overall,
        headline,
        services: &page.core.state.services,
        active_incidents: page.active_incidents(),
    };
    ctx.emit(&summary, |s| {
        render::public_page(s.headline, s.services, &s.active_incidents)
    })
}
