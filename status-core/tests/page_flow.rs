use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::executor::block_on;
use status_core::forms::{IncidentForm, ServiceForm, UpdateForm};
use status_core::model::{
    Incident, IncidentInput, IncidentKind, IncidentPatch, IncidentStatus, Service, ServiceInput,
    ServiceStatus, UpdateInput,
};
use status_core::uptime::{UptimePeriod, UptimeReport};
use status_core::{
    Access, DashboardPage, IncidentsPage, Notifier, Organization, PublicStatusPage, Result, Scope,
    StaticTokenProvider, StatusApi, StatusError, Toast, ToastLevel, ViewCore,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct FakeApi {
    services: RefCell<Vec<Service>>,
    incidents: RefCell<Vec<Incident>>,
    calls: RefCell<Vec<String>>,
    tokens: RefCell<Vec<String>>,
    patches: RefCell<Vec<IncidentPatch>>,
    reject: RefCell<Option<StatusError>>,
    fail_reads: Cell<bool>,
}

impl FakeApi {
    fn record(&self, call: &str, token: Option<&str>) {
        self.calls.borrow_mut().push(call.to_string());
        if let Some(token) = token {
            self.tokens.borrow_mut().push(token.to_string());
        }
    }

    fn read(&self, call: &str, scope: &Scope) -> Result<()> {
        let prefix = match scope {
            Scope::Public => "public:",
            Scope::Bearer(_) => "",
        };
        self.record(&format!("{prefix}{call}"), scope.token());
        if self.fail_reads.get() {
            return Err(StatusError::Http {
                status: 500,
                message: None,
            });
        }
        Ok(())
    }

    fn write(&self, call: &str, token: &str) -> Result<()> {
        self.record(call, Some(token));
        match self.reject.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl StatusApi for FakeApi {
    async fn list_services(&self, scope: &Scope) -> Result<Vec<Service>> {
        self.read("list_services", scope)?;
        Ok(self.services.borrow().clone())
    }

    async fn list_incidents(&self, scope: &Scope) -> Result<Vec<Incident>> {
        self.read("list_incidents", scope)?;
        Ok(self.incidents.borrow().clone())
    }

    async fn service_uptime(
        &self,
        scope: &Scope,
        _service_id: &str,
        _period: UptimePeriod,
    ) -> Result<UptimeReport> {
        self.read("service_uptime", scope)?;
        Ok(UptimeReport {
            uptime: 99.5,
            history: Vec::new(),
        })
    }

    async fn create_service(&self, token: &str, input: &ServiceInput) -> Result<()> {
        self.write("create_service", token)?;
        self.services.borrow_mut().push(service("s_new", &input.name, input.status.clone()));
        Ok(())
    }

    async fn update_service(&self, token: &str, _id: &str, _input: &ServiceInput) -> Result<()> {
        self.write("update_service", token)
    }

    async fn delete_service(&self, token: &str, id: &str) -> Result<()> {
        self.write("delete_service", token)?;
        self.services.borrow_mut().retain(|s| s.id != id);
        Ok(())
    }

    async fn create_incident(&self, token: &str, input: &IncidentInput) -> Result<()> {
        self.write("create_incident", token)?;
        let mut created = incident("i1", false);
        created.title = input.title.clone();
        self.incidents.borrow_mut().push(created);
        Ok(())
    }

    async fn update_incident(&self, token: &str, _id: &str, patch: &IncidentPatch) -> Result<()> {
        self.write("update_incident", token)?;
        self.patches.borrow_mut().push(patch.clone());
        Ok(())
    }

    async fn add_incident_update(
        &self,
        token: &str,
        _id: &str,
        _input: &UpdateInput,
    ) -> Result<()> {
        self.write("add_incident_update", token)
    }
}

#[derive(Default)]
struct CaptureNotifier {
    seen: RefCell<Vec<Toast>>,
}

impl Notifier for CaptureNotifier {
    fn notify(&self, toast: Toast) {
        self.seen.borrow_mut().push(toast);
    }
}

fn service(id: &str, name: &str, status: ServiceStatus) -> Service {
    Service {
        id: id.into(),
        name: name.into(),
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

fn org_access(token: Option<&str>) -> Access {
    Access::organization(
        Organization::new("org_1"),
        Rc::new(StaticTokenProvider::new(token.map(str::to_string))),
    )
}

fn org_core(api: &Rc<FakeApi>, notifier: &Rc<CaptureNotifier>) -> ViewCore<FakeApi> {
    ViewCore::new(api.clone(), org_access(Some("tok"))).with_notifier(notifier.clone())
}

#[test]
fn created_incident_closes_dialog_and_refetches_once() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut page = IncidentsPage::new(org_core(&api, &notifier));

    page.open_create();
    page.incident_dialog.form = IncidentForm {
        title: "DB down".into(),
        ..IncidentForm::default()
    };
    assert!(block_on(page.submit_incident()));

    assert!(!page.incident_dialog.open);
    assert_eq!(api.calls(), vec!["create_incident", "list_incidents"]);
    assert_eq!(
        notifier.seen.borrow().as_slice(),
        &[Toast::success("Incident created successfully")]
    );
    assert_eq!(page.core.state.incidents.len(), 1);
    assert_eq!(page.core.state.incidents[0].id, "i1");
    assert_eq!(page.core.state.incidents[0].title, "DB down");
    assert_eq!(api.tokens.borrow().as_slice(), &["tok", "tok"]);
}

#[test]
fn rejected_edit_keeps_dialog_and_input() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    *api.reject.borrow_mut() = Some(StatusError::Http {
        status: 400,
        message: Some("Name and status required".into()),
    });
    let mut page = DashboardPage::new(org_core(&api, &notifier));

    page.open_edit(&service("s1", "API", ServiceStatus::Operational));
    page.service_dialog.form.status = ServiceStatus::MajorOutage;
    assert!(!block_on(page.submit_service()));

    assert!(page.service_dialog.open);
    assert!(!page.service_dialog.pending);
    assert_eq!(
        page.service_dialog.error.as_deref(),
        Some("Name and status required")
    );
    assert_eq!(
        page.service_dialog.form,
        ServiceForm {
            name: "API".into(),
            status: ServiceStatus::MajorOutage,
        }
    );
    assert_eq!(api.calls(), vec!["update_service"]);
    assert!(notifier.seen.borrow().is_empty());
}

#[test]
fn silent_failure_uses_generic_message() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    *api.reject.borrow_mut() = Some(StatusError::Http {
        status: 500,
        message: None,
    });
    let mut page = IncidentsPage::new(org_core(&api, &notifier));

    page.open_create();
    page.incident_dialog.form.title = "DB down".into();
    assert!(!block_on(page.submit_incident()));
    assert_eq!(
        page.incident_dialog.error.as_deref(),
        Some("Failed to create incident")
    );
}

#[test]
fn missing_token_sends_nothing() {
    let api = Rc::new(FakeApi::default());
    let mut page = DashboardPage::new(ViewCore::new(api.clone(), org_access(None)));

    page.open_create();
    page.service_dialog.form.name = "API".into();
    assert!(!block_on(page.submit_service()));

    assert_eq!(page.service_dialog.error.as_deref(), Some("No token"));
    assert!(api.calls().is_empty());
}

#[test]
fn blank_input_is_rejected_before_sending() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut page = IncidentsPage::new(org_core(&api, &notifier));

    page.open_update(&incident("i1", false));
    page.update_dialog.form = UpdateForm {
        message: "  ".into(),
    };
    assert!(!block_on(page.submit_update()));

    assert!(page.update_dialog.open);
    assert_eq!(page.update_dialog.error.as_deref(), Some("message is required"));
    assert!(api.calls().is_empty());
}

#[test]
fn delete_refetches_services_only() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    api.services
        .borrow_mut()
        .push(service("s1", "API", ServiceStatus::Operational));
    let mut page = DashboardPage::new(org_core(&api, &notifier));
    block_on(page.core.load()).expect("load");
    api.calls.borrow_mut().clear();

    let target = page.core.state.services[0].clone();
    page.open_delete(&target);
    assert!(block_on(page.confirm_delete()));

    assert!(!page.delete_dialog.open);
    assert_eq!(api.calls(), vec!["delete_service", "list_services"]);
    assert!(page.core.state.services.is_empty());
}

#[test]
fn resolve_marks_incident_closed() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut page = IncidentsPage::new(org_core(&api, &notifier));

    let mut maintenance = incident("i2", false);
    maintenance.kind = IncidentKind::Maintenance;
    maintenance.status = IncidentStatus::InProgress;
    page.open_resolve(&maintenance);
    assert!(block_on(page.confirm_resolve()));

    let patches = api.patches.borrow();
    assert_eq!(patches.len(), 1);
    assert!(patches[0].is_resolved);
    assert_eq!(patches[0].status, IncidentStatus::Completed);
    assert_eq!(api.calls(), vec!["update_incident", "list_incidents"]);
    assert_eq!(
        notifier.seen.borrow()[0],
        Toast::success("Incident resolved successfully")
    );
}

#[test]
fn any_stream_message_refetches_everything_once() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut core = org_core(&api, &notifier);

    for message in [
        r#"{"event":"service_created","id":"s1"}"#,
        r#"{"event":"heartbeat"}"#,
        "not json",
    ] {
        api.calls.borrow_mut().clear();
        block_on(core.on_stream_message(message));
        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["list_incidents", "list_services"], "{message}");
    }

    let seen = notifier.seen.borrow();
    assert_eq!(seen.as_slice(), &[Toast::info("Service created")]);
}

#[test]
fn stream_failure_closes_and_schedules_reload() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut core = org_core(&api, &notifier).with_reload_delay(Duration::from_secs(2));

    assert!(core.open_stream());
    assert!(!core.open_stream());
    let directive = core
        .on_stream_error(&StatusError::Stream("reset".into()))
        .expect("reload");

    assert_eq!(directive.after, Duration::from_secs(2));
    assert!(!core.subscription().is_open());
    assert_eq!(notifier.seen.borrow()[0].level, ToastLevel::Error);
    assert!(api.calls().is_empty());

    // A second error on the dead stream neither toasts nor reschedules.
    assert_eq!(core.on_stream_error(&StatusError::Stream("again".into())), None);
    assert_eq!(notifier.seen.borrow().len(), 1);
}

#[test]
fn public_access_never_opens_a_stream() {
    let api = Rc::new(FakeApi::default());
    let mut page = PublicStatusPage::new(api);
    assert!(!page.core.open_stream());
}

#[test]
fn failed_reload_keeps_previous_data() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    api.incidents.borrow_mut().push(incident("i1", false));
    let mut core = org_core(&api, &notifier);
    block_on(core.load()).expect("load");

    api.fail_reads.set(true);
    assert!(block_on(core.load()).is_err());

    assert_eq!(core.state.incidents.len(), 1);
    assert!(!core.state.loading);
    assert_eq!(core.state.error.as_deref(), Some("Failed to fetch data"));
}

#[test]
fn public_page_lists_only_open_incidents() {
    let api = Rc::new(FakeApi::default());
    api.incidents
        .borrow_mut()
        .extend([incident("i1", true), incident("i2", false)]);
    api.services
        .borrow_mut()
        .push(service("s1", "API", ServiceStatus::DegradedPerformance));
    let mut page = PublicStatusPage::new(api.clone());
    block_on(page.load()).expect("load");

    let active: Vec<&str> = page.active_incidents().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(active, vec!["i2"]);
    assert_eq!(page.overall_status(), ServiceStatus::DegradedPerformance);
    assert!(api.tokens.borrow().is_empty());
    assert!(api.calls().iter().all(|c| c.starts_with("public:")));
}

#[test]
fn uptime_panel_records_report() {
    let api = Rc::new(FakeApi::default());
    let notifier = Rc::new(CaptureNotifier::default());
    let mut page = DashboardPage::new(org_core(&api, &notifier));

    block_on(page.load_uptime("s1", UptimePeriod::Month));
    let view = page.uptime.as_ref().expect("uptime view");
    assert_eq!(view.period, UptimePeriod::Month);
    assert_eq!(view.report.as_ref().map(|r| r.percent_label()).as_deref(), Some("99.50%"));

    api.fail_reads.set(true);
    block_on(page.load_uptime("s1", UptimePeriod::Day));
    let view = page.uptime.as_ref().expect("uptime view");
    assert_eq!(view.report, None);
    assert_eq!(view.error.as_deref(), Some("Failed to fetch uptime"));
}
