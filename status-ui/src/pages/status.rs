use crate::shell::Shell;
use crate::widgets::{when, LoadBanner, StatusBadge};
use leptos::*;
use status_core::public::{
    active_incidents, overall_headline, overall_status, ACTIVE_HEADING, NO_ACTIVE_TEXT, NO_UPDATES_TEXT,
};

/// Read-only page anyone can see. `shell` must use public access.
#[component]
pub fn PublicStatus(shell: Shell) -> impl IntoView {
    let state = shell.state;
    let overall = move || state.with(|s| overall_status(&s.services));

    let services = move || {
        state.with(|s| {
            s.services
                .iter()
                .map(|svc| view! {
                  <li class="row">
                    <span>{svc.name.clone()}</span>
                    <StatusBadge status=svc.status.clone()/>
                  </li>
                })
                .collect_view()
        })
    };

    let incidents = move || {
        state.with(|s| {
            let active = active_incidents(&s.incidents);
            if active.is_empty() {
                return view! { <p class="meta">{NO_ACTIVE_TEXT}</p> }.into_view();
            }
            active
                .into_iter()
                .map(|incident| {
                    let timeline = incident.timeline();
                    let updates = if timeline.is_empty() {
                        view! { <p class="meta">{NO_UPDATES_TEXT}</p> }.into_view()
                    } else {
                        timeline
                            .into_iter()
                            .map(|u| view! {
                              <li>
                                <div class="meta">{when(&u.created_at)}</div>
                                <div>{u.message.clone()}</div>
                              </li>
                            })
                            .collect_view()
                    };
                    view! {
                      <article class="card">
                        <div class="row">
                          <h3>{incident.title.clone()}</h3>
                          <span class="tag">{incident.kind.to_string()}</span>
                          <span class="badge major">{incident.status.to_string()}</span>
                        </div>
                        <p>{incident.description.clone()}</p>
                        <p class="meta">{format!("Affected: {}", incident.affected_names())}</p>
                        <p class="meta">{format!("Started: {}", when(&incident.created_at))}</p>
                        <ul class="timeline">{updates}</ul>
                      </article>
                    }
                })
                .collect_view()
        })
    };

    view! {
      <section>
        <div class=move || format!("headline {}", overall().tone())>
          <h2>{move || overall_headline(&overall())}</h2>
        </div>
        <LoadBanner state=state/>
        <h3>"Services"</h3>
        <ul class="services">{services}</ul>
        <h3>{ACTIVE_HEADING}</h3>
        {incidents}
      </section>
    }
}
