use leptos::*;
use status_core::api::{fetch_collection, fetch_snapshot};
use status_core::events::parse_message;
use status_core::forms::Dialog;
use status_core::model::Collection;
use status_core::page::{fetch_uptime_view, UptimeView, STREAM_LOST_MESSAGE};
use status_core::stream::Subscription;
use status_core::uptime::UptimePeriod;
use status_core::{submit, Access, HttpApi, Mutation, Notifier, PageState, Toast};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;

use crate::bridge;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Debug, PartialEq)]
pub struct ToastItem {
    pub id: u64,
    pub toast: Toast,
}

#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<ToastItem>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: create_rw_signal(Vec::new()),
            next_id: store_value(0),
        }
    }

    pub fn items(&self) -> RwSignal<Vec<ToastItem>> {
        self.items
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|t| t.id != id));
    }
}

impl Notifier for Toasts {
    fn notify(&self, toast: Toast) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|items| items.push(ToastItem { id, toast }));
        let toasts = *self;
        set_timeout(move || toasts.dismiss(id), TOAST_TTL);
    }
}

/// One page's data and access context, shared by its components.
///
/// Every async step clones the api and access out of the store before
/// awaiting, so nothing reactive is borrowed across a suspension point.
#[derive(Clone, Copy)]
pub struct Shell {
    api: StoredValue<Rc<HttpApi>>,
    access: StoredValue<Access>,
    subscription: StoredValue<Subscription>,
    live: StoredValue<Option<bridge::LiveStream>>,
    reload_delay: Duration,
    pub state: RwSignal<PageState>,
    pub toasts: Toasts,
}

impl Shell {
    pub fn new(api: Rc<HttpApi>, access: Access, toasts: Toasts) -> Self {
        Self {
            api: store_value(api),
            access: store_value(access),
            subscription: store_value(Subscription::default()),
            live: store_value(None),
            reload_delay: bridge::reload_delay(),
            state: create_rw_signal(PageState::default()),
            toasts,
        }
    }

    pub fn api(&self) -> Rc<HttpApi> {
        self.api.get_value()
    }

    pub fn access(&self) -> Access {
        self.access.get_value()
    }

    pub fn load(self) {
        self.state.update(PageState::begin_load);
        spawn_local(async move {
            let api = self.api();
            let result = match self.access().scope().await {
                Ok(scope) => fetch_snapshot(api.as_ref(), &scope).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(error = %e, "load failed");
            }
            self.state.update(|s| s.finish_load(&result));
        });
    }

    pub fn refetch(self, collection: Collection) {
        spawn_local(async move {
            let api = self.api();
            let result = match self.access().scope().await {
                Ok(scope) => fetch_collection(api.as_ref(), &scope, collection).await,
                Err(e) => Err(e),
            };
            self.state.update(|s| s.apply_refetched(&result));
        });
    }

    /// Submits a dialog: closes it on success and then refetches the one
    /// collection the write touched; on failure the form stays as typed.
    pub fn run<F: Default + 'static>(
        self,
        dialog: RwSignal<Dialog<F>>,
        mutation: Result<Mutation, String>,
    ) {
        let mut started = false;
        dialog.update(|d| started = d.begin());
        if !started {
            return;
        }
        let mutation = match mutation {
            Ok(mutation) => mutation,
            Err(message) => {
                dialog.update(|d| d.finish(Err(message)));
                return;
            }
        };

        spawn_local(async move {
            let api = self.api();
            let access = self.access();
            let outcome = submit(api.as_ref(), &access, &mutation)
                .await
                .map_err(|e| e.inline(mutation.failure_message()));
            let succeeded = outcome.is_ok();
            dialog.update(|d| d.finish(outcome));
            if succeeded {
                self.toasts.notify(Toast::success(mutation.success_message()));
                self.refetch(mutation.affects());
            }
        });
    }

    pub fn load_uptime(
        self,
        service_id: String,
        period: UptimePeriod,
        into: RwSignal<Option<UptimeView>>,
    ) {
        spawn_local(async move {
            let api = self.api();
            let access = self.access();
            let view = fetch_uptime_view(api.as_ref(), &access, &service_id, period).await;
            into.set(Some(view));
        });
    }

    /// Opens the live connection for this organization unless one is
    /// already up. Public access never subscribes.
    pub fn connect_stream(self) {
        let organization_id = self.access().organization_id().map(str::to_string);
        let mut connect = false;
        self.subscription
            .update_value(|s| connect = s.open(organization_id.as_deref()));
        if !connect {
            return;
        }

        let url = match self.api().stream_url() {
            Ok(url) => url,
            Err(e) => return self.stream_failed(&e.to_string()),
        };
        let opened = bridge::open_event_source(
            url.as_str(),
            move |data| self.on_stream_message(&data),
            move || self.stream_failed("connection error"),
        );
        match opened {
            Ok(stream) => self.live.set_value(Some(stream)),
            Err(e) => self.stream_failed(&e),
        }
    }

    pub fn disconnect_stream(self) {
        self.subscription.update_value(|s| {
            s.close();
        });
        self.live.set_value(None);
    }

    fn on_stream_message(self, data: &str) {
        match parse_message(data).and_then(|event| event.tag.notification()) {
            Some(text) => self.toasts.notify(Toast::info(text)),
            None => debug!(data, "stream message without notification"),
        }
        self.load();
    }

    /// Only the first failure schedules the reload; the stream is already
    /// closed when later errors arrive.
    fn stream_failed(self, reason: &str) {
        let mut directive = None;
        self.subscription
            .update_value(|s| directive = s.fail(self.reload_delay));
        let Some(directive) = directive else {
            return;
        };
        self.live.with_value(|live| {
            if let Some(live) = live {
                live.close();
            }
        });
        warn!(reason, "event stream failed");
        self.toasts.notify(Toast::error(STREAM_LOST_MESSAGE));
        bridge::schedule_reload(directive.after);
    }
}
