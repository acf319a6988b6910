use crate::bridge::{self, BrowserTokenProvider};
use crate::pages::{Dashboard, Incidents, PublicStatus};
use crate::shell::{Shell, Toasts};
use leptos::*;
use status_core::page::ToastLevel;
use status_core::{Access, HttpApi, Organization};
use std::rc::Rc;
use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Incidents,
    Status,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Incidents, Tab::Status];

    fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Incidents => "Incidents",
            Tab::Status => "Status",
        }
    }
}

fn toast_class(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Success => "toast ok",
        ToastLevel::Info => "toast info",
        ToastLevel::Error => "toast warn",
    }
}

#[component]
fn ToastStack(toasts: Toasts) -> impl IntoView {
    view! {
      <div class="toasts">
        <For
          each=move || toasts.items().get()
          key=|t| t.id
          children=move |t| {
            let id = t.id;
            view! {
              <div class=toast_class(t.toast.level) on:click=move |_| toasts.dismiss(id)>
                {t.toast.message}
              </div>
            }
          }
        />
      </div>
    }
}

/// Dashboard and incident management for the signed-in organization.
/// Owns the live stream for as long as it is mounted.
#[component]
fn Workspace(api: Rc<HttpApi>, organization: Organization, tab: RwSignal<Tab>, toasts: Toasts) -> impl IntoView {
    let name = organization.display_name().to_string();
    let shell = Shell::new(
        api,
        Access::organization(organization, Rc::new(BrowserTokenProvider)),
        toasts,
    );
    shell.load();
    shell.connect_stream();
    on_cleanup(move || shell.disconnect_stream());

    view! {
      <p class="meta">{name}</p>
      {move || match tab.get() {
          Tab::Incidents => view! { <Incidents shell=shell/> }.into_view(),
          _ => view! { <Dashboard shell=shell/> }.into_view(),
      }}
    }
}

#[component]
fn StatusTab(api: Rc<HttpApi>, toasts: Toasts) -> impl IntoView {
    let shell = Shell::new(api, Access::Public, toasts);
    shell.load();
    view! { <PublicStatus shell=shell/> }
}

#[component]
pub fn App() -> impl IntoView {
    let tab = create_rw_signal(Tab::Dashboard);
    let toasts = Toasts::new();

    let api = match HttpApi::new(&bridge::api_base_url()) {
        Ok(api) => Rc::new(api),
        Err(e) => {
            error!(error = %e, "invalid api base url");
            return view! { <pre class="error">{format!("Cannot start: {e}")}</pre> }.into_view();
        }
    };
    let organization = bridge::active_organization();

    let tabs = Tab::ALL
        .into_iter()
        .map(|t| {
            let class = move || if tab.get() == t { "tab active" } else { "tab" };
            view! { <button class=class on:click=move |_| tab.set(t)>{t.label()}</button> }
        })
        .collect_view();

    // Switching between Dashboard and Incidents keeps the same workspace
    // and its stream; only leaving for Status tears it down.
    let on_status = create_memo(move |_| tab.get() == Tab::Status);
    let body = {
        let api = api.clone();
        move || match (on_status.get(), organization.clone()) {
            (true, _) => view! { <StatusTab api=api.clone() toasts=toasts/> }.into_view(),
            (false, Some(org)) => view! {
              <Workspace api=api.clone() organization=org tab=tab toasts=toasts/>
            }
            .into_view(),
            (false, None) => view! {
              <p class="meta">"Sign in and select an organization to manage services and incidents."</p>
            }
            .into_view(),
        }
    };

    view! {
      <div class="app">
        <header class="row">
          <h1>"Status"</h1>
          <nav class="row">{tabs}</nav>
        </header>
        <main>{body}</main>
        <ToastStack toasts=toasts/>
      </div>
    }
    .into_view()
}
