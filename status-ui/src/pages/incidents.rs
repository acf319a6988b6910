use crate::shell::Shell;
use crate::widgets::{when, InlineError, LoadBanner, Modal};
use leptos::*;
use status_core::forms::{Dialog, IncidentForm, ResolveForm, UpdateForm};
use status_core::model::{Incident, IncidentKind, IncidentStatus};

#[component]
fn IncidentDialog(shell: Shell, dialog: RwSignal<Dialog<IncidentForm>>) -> impl IntoView {
    let state = shell.state;
    let error = Signal::derive(move || dialog.with(|d| d.error.clone()));
    let title = if dialog.with_untracked(|d| d.is_edit()) {
        "Edit Incident"
    } else {
        "Create Incident"
    };

    let service_checks = move || {
        state.with(|s| {
            s.services
                .iter()
                .map(|service| {
                    let id = service.id.clone();
                    let checked_id = service.id.clone();
                    view! {
                      <label class="check">
                        <input
                          type="checkbox"
                          prop:checked=move || dialog.with(|d| d.form.has_service(&checked_id))
                          on:change=move |_| dialog.update(|d| d.form.toggle_service(&id))
                        />
                        {service.name.clone()}
                      </label>
                    }
                })
                .collect_view()
        })
    };

    view! {
      <Modal title=title>
        <label>"Title"</label>
        <input
          prop:value=move || dialog.with(|d| d.form.title.clone())
          on:input=move |ev| dialog.update(|d| d.form.title = event_target_value(&ev))
        />
        <label>"Description"</label>
        <textarea
          prop:value=move || dialog.with(|d| d.form.description.clone())
          on:input=move |ev| dialog.update(|d| d.form.description = event_target_value(&ev))
        ></textarea>
        <label>"Type"</label>
        <select on:change=move |ev| {
            if let Ok(kind) = event_target_value(&ev).parse::<IncidentKind>() {
                dialog.update(|d| d.form.kind = kind);
            }
        }>
          {IncidentKind::ALL
              .into_iter()
              .map(|kind| {
                  let value = kind.to_string();
                  let label = kind.label().to_string();
                  view! {
                    <option value=value selected=move || dialog.with(|d| d.form.kind == kind)>
                      {label}
                    </option>
                  }
              })
              .collect_view()}
        </select>
        <label>"Status"</label>
        <select on:change=move |ev| {
            if let Ok(status) = event_target_value(&ev).parse::<IncidentStatus>() {
                dialog.update(|d| d.form.status = status);
            }
        }>
          {IncidentStatus::ALL
              .into_iter()
              .map(|status| {
                  let value = status.to_string();
                  view! {
                    <option value=value.clone() selected=move || dialog.with(|d| d.form.status == status)>
                      {value}
                    </option>
                  }
              })
              .collect_view()}
        </select>
        <label>"Affected services"</label>
        <div class="checks">{service_checks}</div>
        <InlineError error=error/>
        <div class="row">
          <button on:click=move |_| dialog.update(Dialog::close)>"Cancel"</button>
          <button
            on:click=move |_| shell.run(dialog, dialog.with_untracked(|d| d.mutation()))
            disabled=move || dialog.with(|d| d.pending)
          >
            {move || if dialog.with(|d| d.pending) { "Saving..." } else { "Save" }}
          </button>
        </div>
      </Modal>
    }
}

#[component]
fn IncidentCard(
    incident: Incident,
    dialog: RwSignal<Dialog<IncidentForm>>,
    resolve: RwSignal<Dialog<ResolveForm>>,
    update: RwSignal<Dialog<UpdateForm>>,
) -> impl IntoView {
    let edit = incident.clone();
    let to_resolve = incident.clone();
    let id = incident.id.clone();
    let resolved = incident.is_resolved;
    let updates = incident
        .timeline()
        .into_iter()
        .map(|u| view! { <li><span class="meta">{when(&u.created_at)}</span> " " {u.message.clone()}</li> })
        .collect_view();

    view! {
      <article class="card">
        <div class="row">
          <h3>{incident.title.clone()}</h3>
          <span class="tag">{incident.kind.label().to_string()}</span>
          <span class="badge">{incident.status.to_string()}</span>
        </div>
        <p>{incident.description.clone()}</p>
        <p class="meta">
          {format!("Affected: {}", incident.affected_names())}
          " · "
          {format!("Updated {}", when(&incident.updated_at))}
        </p>
        <ul class="updates">{updates}</ul>
        <div class="row">
          <button on:click=move |_| {
              dialog.update(|d| d.open_for(edit.id.clone(), IncidentForm::from_incident(&edit)))
          }>"Edit"</button>
          <button on:click=move |_| update.update(|d| d.open_for(id.clone(), UpdateForm::default()))>
            "Add Update"
          </button>
          {(!resolved).then(move || view! {
            <button on:click=move |_| {
                resolve.update(|d| d.open_for(to_resolve.id.clone(), ResolveForm::from_incident(&to_resolve)))
            }>"Resolve"</button>
          })}
        </div>
      </article>
    }
}

#[component]
pub fn Incidents(shell: Shell) -> impl IntoView {
    let state = shell.state;
    let dialog = create_rw_signal(Dialog::<IncidentForm>::default());
    let resolve = create_rw_signal(Dialog::<ResolveForm>::default());
    let update = create_rw_signal(Dialog::<UpdateForm>::default());

    let resolve_error = Signal::derive(move || resolve.with(|d| d.error.clone()));
    let update_error = Signal::derive(move || update.with(|d| d.error.clone()));

    view! {
      <section>
        <div class="row">
          <h2>"Incidents"</h2>
          <button on:click=move |_| dialog.update(Dialog::open_new)>"+ New Incident"</button>
        </div>
        <LoadBanner state=state/>

        <Show
          when=move || state.with(|s| !s.incidents.is_empty())
          fallback=|| view! { <p class="meta">"No incidents reported."</p> }
        >
          <For
            each=move || state.with(|s| s.incidents.clone())
            key=|i| (i.id.clone(), i.updated_at, i.updates.len(), i.services.len())
            children=move |incident| view! {
              <IncidentCard incident=incident dialog=dialog resolve=resolve update=update/>
            }
          />
        </Show>

        <Show when=move || dialog.with(|d| d.open) fallback=|| ()>
          <IncidentDialog shell=shell dialog=dialog/>
        </Show>

        <Show when=move || resolve.with(|d| d.open) fallback=|| ()>
          <Modal title="Resolve Incident">
            <p>{move || format!("Mark \"{}\" as resolved?", resolve.with(|d| d.form.title.clone()))}</p>
            <InlineError error=resolve_error/>
            <div class="row">
              <button on:click=move |_| resolve.update(Dialog::close)>"Cancel"</button>
              <button
                on:click=move |_| shell.run(resolve, resolve.with_untracked(|d| d.mutation()))
                disabled=move || resolve.with(|d| d.pending)
              >
                "Resolve"
              </button>
            </div>
          </Modal>
        </Show>

        <Show when=move || update.with(|d| d.open) fallback=|| ()>
          <Modal title="Add Update">
            <textarea
              prop:value=move || update.with(|d| d.form.message.clone())
              on:input=move |ev| update.update(|d| d.form.message = event_target_value(&ev))
              placeholder="What changed?"
            ></textarea>
            <InlineError error=update_error/>
            <div class="row">
              <button on:click=move |_| update.update(Dialog::close)>"Cancel"</button>
              <button
                on:click=move |_| shell.run(update, update.with_untracked(|d| d.mutation()))
                disabled=move || update.with(|d| d.pending)
              >
                "Post Update"
              </button>
            </div>
          </Modal>
        </Show>
      </section>
    }
}
