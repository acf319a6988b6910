use chrono::{DateTime, Utc};
use leptos::*;
use status_core::model::ServiceStatus;
use status_core::PageState;

pub fn when(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y %H:%M UTC").to_string()
}

#[component]
pub fn StatusBadge(status: ServiceStatus) -> impl IntoView {
    view! { <span class=format!("badge {}", status.tone())>{status.to_string()}</span> }
}

#[component]
pub fn Modal(#[prop(into)] title: String, children: Children) -> impl IntoView {
    view! {
      <div class="modal-backdrop">
        <div class="modal" role="dialog">
          <h3>{title}</h3>
          {children()}
        </div>
      </div>
    }
}

#[component]
pub fn InlineError(error: Signal<Option<String>>) -> impl IntoView {
    view! {
      <Show when=move || error.with(Option::is_some) fallback=|| ()>
        <p class="error">{move || error.get().unwrap_or_default()}</p>
      </Show>
    }
}

/// Loading line plus the page-level error banner.
#[component]
pub fn LoadBanner(state: RwSignal<PageState>) -> impl IntoView {
    let error = Signal::derive(move || state.with(|s| s.error.clone()));
    view! {
      <Show when=move || state.with(|s| s.loading) fallback=|| ()>
        <p class="meta">"Loading..."</p>
      </Show>
      <InlineError error=error/>
    }
}
