//! View controllers: what each page holds and how it reacts to loads,
//! submits and stream messages.
//!
//! Every change is followed by a refetch. Nothing here patches the local
//! copy from a response body.

use crate::api::{fetch_collection, fetch_snapshot, Refetched, Snapshot, StatusApi};
use crate::auth::Access;
use crate::error::{Result, StatusError};
use crate::events::parse_message;
use crate::forms::{Dialog, IncidentForm, ResolveForm, ServiceForm, UpdateForm};
use crate::model::{Collection, Incident, Service, ServiceStatus};
use crate::public::{active_incidents, overall_status};
use crate::stream::{ReloadDirective, Subscription, DEFAULT_RELOAD_DELAY};
use crate::submit::{submit, Mutation};
use crate::uptime::{UptimePeriod, UptimeReport};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Where transient notifications go: a toast stack in the browser, stderr in the CLI.
pub trait Notifier {
    fn notify(&self, toast: Toast);
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _toast: Toast) {}
}

pub const STREAM_LOST_MESSAGE: &str = "Lost connection to live updates, reloading";

/// The last successfully fetched collections plus load flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageState {
    pub services: Vec<Service>,
    pub incidents: Vec<Incident>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PageState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A failed load only sets the banner; the previous data stays on screen.
    pub fn finish_load(&mut self, result: &Result<Snapshot>) {
        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.services = snapshot.services.clone();
                self.incidents = snapshot.incidents.clone();
                self.error = None;
            }
            Err(err) => self.error = Some(err.banner()),
        }
    }

    pub fn apply_refetched(&mut self, result: &Result<Refetched>) {
        match result {
            Ok(Refetched::Services(services)) => self.services = services.clone(),
            Ok(Refetched::Incidents(incidents)) => self.incidents = incidents.clone(),
            Err(err) => self.error = Some(err.banner()),
        }
    }
}

/// Shared machinery behind every page: one access context, one copy of
/// the data, one stream subscription.
pub struct ViewCore<A> {
    api: Rc<A>,
    access: Access,
    notifier: Rc<dyn Notifier>,
    reload_delay: Duration,
    pub state: PageState,
    subscription: Subscription,
}

impl<A: StatusApi> ViewCore<A> {
    pub fn new(api: Rc<A>, access: Access) -> Self {
        Self {
            api,
            access,
            notifier: Rc::new(NoopNotifier),
            reload_delay: DEFAULT_RELOAD_DELAY,
            state: PageState::default(),
            subscription: Subscription::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn notify(&self, toast: Toast) {
        self.notifier.notify(toast);
    }

    /// Fetches services and incidents together.
    pub async fn load(&mut self) -> Result<()> {
        self.state.begin_load();
        let result = match self.access.scope().await {
            Ok(scope) => fetch_snapshot(self.api.as_ref(), &scope).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(error = %err, "load failed");
        }
        self.state.finish_load(&result);
        result.map(|_| ())
    }

    pub async fn refetch(&mut self, collection: Collection) -> Result<()> {
        debug!(?collection, "refetching");
        let result = match self.access.scope().await {
            Ok(scope) => fetch_collection(self.api.as_ref(), &scope, collection).await,
            Err(err) => Err(err),
        };
        self.state.apply_refetched(&result);
        result.map(|_| ())
    }

    /// Sends one mutation. `Err` carries the text for the dialog's inline error.
    pub async fn send(&self, mutation: &Mutation) -> Result<(), String> {
        submit(self.api.as_ref(), &self.access, mutation)
            .await
            .map_err(|err| err.inline(mutation.failure_message()))
    }

    /// Success toast, then exactly one refetch of the affected collection.
    pub async fn after_mutation(&mut self, mutation: &Mutation) {
        self.notify(Toast::success(mutation.success_message()));
        if let Err(err) = self.refetch(mutation.affects()).await {
            warn!(error = %err, "refetch after mutation failed");
        }
    }

    /// Runs one dialog submit: send, close on success, then refetch.
    async fn run_dialog<F: Default>(
        &mut self,
        dialog: &mut Dialog<F>,
        mutation: Result<Mutation, String>,
    ) -> bool {
        if !dialog.begin() {
            return false;
        }
        let mutation = match mutation {
            Ok(mutation) => mutation,
            Err(message) => {
                dialog.finish(Err(message));
                return false;
            }
        };
        let outcome = self.send(&mutation).await;
        let succeeded = outcome.is_ok();
        dialog.finish(outcome);
        if succeeded {
            self.after_mutation(&mutation).await;
        }
        succeeded
    }

    /// Returns true when the caller must connect a new stream.
    pub fn open_stream(&mut self) -> bool {
        self.subscription.open(self.access.organization_id())
    }

    pub fn close_stream(&mut self) -> bool {
        self.subscription.close()
    }

    /// Any message, recognized or not, triggers one full refetch.
    pub async fn on_stream_message(&mut self, data: &str) {
        match parse_message(data) {
            Some(event) => {
                if let Some(text) = event.tag.notification() {
                    self.notify(Toast::info(text));
                }
            }
            None => debug!(data, "unparseable stream message"),
        }
        if let Err(err) = self.load().await {
            debug!(error = %err, "refetch after stream event failed");
        }
    }

    /// Tears the subscription down; the owner reloads the whole view after
    /// the returned delay. Only the first failure of a stream returns one.
    pub fn on_stream_error(&mut self, err: &StatusError) -> Option<ReloadDirective> {
        let directive = self.subscription.fail(self.reload_delay)?;
        warn!(error = %err, "event stream failed");
        self.notify(Toast::error(STREAM_LOST_MESSAGE));
        Some(directive)
    }
}

/// Uptime panel for one service.
#[derive(Clone, Debug, PartialEq)]
pub struct UptimeView {
    pub service_id: String,
    pub period: UptimePeriod,
    pub report: Option<UptimeReport>,
    pub error: Option<String>,
}

/// Loads one service's uptime; failures land in `error` instead of a banner.
pub async fn fetch_uptime_view<A>(
    api: &A,
    access: &Access,
    service_id: &str,
    period: UptimePeriod,
) -> UptimeView
where
    A: StatusApi + ?Sized,
{
    let result = match access.scope().await {
        Ok(scope) => api.service_uptime(&scope, service_id, period).await,
        Err(err) => Err(err),
    };
    let (report, error) = match result {
        Ok(report) => (Some(report), None),
        Err(err) => {
            warn!(service_id, error = %err, "uptime fetch failed");
            (None, Some(err.inline("Failed to fetch uptime")))
        }
    };
    UptimeView {
        service_id: service_id.to_string(),
        period,
        report,
        error,
    }
}

/// Service management: list, create/edit dialog, delete confirmation, uptime.
pub struct DashboardPage<A> {
    pub core: ViewCore<A>,
    pub service_dialog: Dialog<ServiceForm>,
    pub delete_dialog: Dialog<()>,
    pub uptime: Option<UptimeView>,
}

impl<A: StatusApi> DashboardPage<A> {
    pub fn new(core: ViewCore<A>) -> Self {
        Self {
            core,
            service_dialog: Dialog::default(),
            delete_dialog: Dialog::default(),
            uptime: None,
        }
    }

    pub fn open_create(&mut self) {
        self.service_dialog.open_new();
    }

    pub fn open_edit(&mut self, service: &Service) {
        self.service_dialog
            .open_for(service.id.clone(), ServiceForm::from_service(service));
    }

    pub fn open_delete(&mut self, service: &Service) {
        self.delete_dialog.open_for(service.id.clone(), ());
    }

    pub async fn submit_service(&mut self) -> bool {
        let mutation = self.service_dialog.mutation();
        self.core.run_dialog(&mut self.service_dialog, mutation).await
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let mutation = self.delete_dialog.mutation();
        self.core.run_dialog(&mut self.delete_dialog, mutation).await
    }

    pub async fn load_uptime(&mut self, service_id: &str, period: UptimePeriod) {
        let view =
            fetch_uptime_view(self.core.api(), self.core.access(), service_id, period).await;
        self.uptime = Some(view);
    }
}

/// Incident management: create/edit, resolve and timeline updates.
pub struct IncidentsPage<A> {
    pub core: ViewCore<A>,
    pub incident_dialog: Dialog<IncidentForm>,
    pub resolve_dialog: Dialog<ResolveForm>,
    pub update_dialog: Dialog<UpdateForm>,
}

impl<A: StatusApi> IncidentsPage<A> {
    pub fn new(core: ViewCore<A>) -> Self {
        Self {
            core,
            incident_dialog: Dialog::default(),
            resolve_dialog: Dialog::default(),
            update_dialog: Dialog::default(),
        }
    }

    pub fn open_create(&mut self) {
        self.incident_dialog.open_new();
    }

    pub fn open_edit(&mut self, incident: &Incident) {
        self.incident_dialog
            .open_for(incident.id.clone(), IncidentForm::from_incident(incident));
    }

    pub fn open_resolve(&mut self, incident: &Incident) {
        self.resolve_dialog
            .open_for(incident.id.clone(), ResolveForm::from_incident(incident));
    }

    pub fn open_update(&mut self, incident: &Incident) {
        self.update_dialog
            .open_for(incident.id.clone(), UpdateForm::default());
    }

    pub async fn submit_incident(&mut self) -> bool {
        let mutation = self.incident_dialog.mutation();
        self.core.run_dialog(&mut self.incident_dialog, mutation).await
    }

    pub async fn confirm_resolve(&mut self) -> bool {
        let mutation = self.resolve_dialog.mutation();
        self.core.run_dialog(&mut self.resolve_dialog, mutation).await
    }

    pub async fn submit_update(&mut self) -> bool {
        let mutation = self.update_dialog.mutation();
        self.core.run_dialog(&mut self.update_dialog, mutation).await
    }
}

/// Read-only page served from `/api/public/*`.
pub struct PublicStatusPage<A> {
    pub core: ViewCore<A>,
}

impl<A: StatusApi> PublicStatusPage<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self {
            core: ViewCore::new(api, Access::Public),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.core.load().await
    }

    pub fn active_incidents(&self) -> Vec<&Incident> {
        active_incidents(&self.core.state.incidents)
    }

    pub fn overall_status(&self) -> ServiceStatus {
        overall_status(&self.core.state.services)
    }
}
