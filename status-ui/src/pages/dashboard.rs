use crate::shell::Shell;
use crate::widgets::{when, InlineError, LoadBanner, Modal, StatusBadge};
use leptos::*;
use status_core::forms::{Dialog, ServiceForm};
use status_core::model::{Service, ServiceStatus};
use status_core::page::UptimeView;
use status_core::uptime::UptimePeriod;

#[component]
fn UptimePanel(shell: Shell, panel: UptimeView, target: RwSignal<Option<UptimeView>>) -> impl IntoView {
    let service_id = panel.service_id.clone();
    let name = shell.state.with_untracked(|s| {
        s.services
            .iter()
            .find(|svc| svc.id == service_id)
            .map(|svc| svc.name.clone())
            .unwrap_or_else(|| service_id.clone())
    });
    let current = panel.period;

    let periods = UptimePeriod::ALL
        .into_iter()
        .map(|period| {
            let id = service_id.clone();
            let class = if period == current { "tab active" } else { "tab" };
            view! {
              <button class=class on:click=move |_| shell.load_uptime(id.clone(), period, target)>
                {period.as_str()}
              </button>
            }
        })
        .collect_view();

    let body = match (&panel.report, &panel.error) {
        (Some(report), _) => {
            let history = report
                .history
                .iter()
                .rev()
                .map(|point| view! { <li>{when(&point.changed_at)} " " <b>{point.status.clone()}</b></li> })
                .collect_view();
            view! {
              <p class="uptime">{report.percent_label()}</p>
              <ul class="history">{history}</ul>
            }
            .into_view()
        }
        (None, error) => view! { <p class="error">{error.clone().unwrap_or_default()}</p> }.into_view(),
    };

    view! {
      <section class="panel">
        <div class="row">
          <h3>{format!("Uptime: {name}")}</h3>
          <button on:click=move |_| target.set(None)>"Close"</button>
        </div>
        <div class="row">{periods}</div>
        {body}
      </section>
    }
}

#[component]
pub fn Dashboard(shell: Shell) -> impl IntoView {
    let state = shell.state;
    let dialog = create_rw_signal(Dialog::<ServiceForm>::default());
    let delete = create_rw_signal(Dialog::<()>::default());
    let uptime = create_rw_signal(None::<UptimeView>);

    let save = move |_| shell.run(dialog, dialog.with_untracked(|d| d.mutation()));
    let confirm_delete = move |_| shell.run(delete, delete.with_untracked(|d| d.mutation()));
    let dialog_title = move || {
        if dialog.with_untracked(|d| d.is_edit()) {
            "Edit Service"
        } else {
            "Add Service"
        }
    };
    let dialog_error = Signal::derive(move || dialog.with(|d| d.error.clone()));
    let delete_error = Signal::derive(move || delete.with(|d| d.error.clone()));

    let row = move |service: Service| {
        let edit = service.clone();
        let id = service.id.clone();
        let uptime_id = service.id.clone();
        view! {
          <tr>
            <td>{service.name.clone()}</td>
            <td><StatusBadge status=service.status.clone()/></td>
            <td class="row">
              <button on:click=move |_| {
                  dialog.update(|d| d.open_for(edit.id.clone(), ServiceForm::from_service(&edit)))
              }>"Edit"</button>
              <button on:click=move |_| {
                  shell.load_uptime(uptime_id.clone(), UptimePeriod::default(), uptime)
              }>"Uptime"</button>
              <button class="danger" on:click=move |_| delete.update(|d| d.open_for(id.clone(), ()))>
                "Delete"
              </button>
            </td>
          </tr>
        }
    };

    view! {
      <section>
        <div class="row">
          <h2>"Services"</h2>
          <button on:click=move |_| dialog.update(Dialog::open_new)>"+ Add Service"</button>
        </div>
        <LoadBanner state=state/>

        <Show
          when=move || state.with(|s| !s.services.is_empty())
          fallback=|| view! { <p class="meta">"No services yet."</p> }
        >
          <table>
            <thead>
              <tr><th>"Name"</th><th>"Status"</th><th></th></tr>
            </thead>
            <tbody>
              <For
                each=move || state.with(|s| s.services.clone())
                key=|s| (s.id.clone(), s.name.clone(), s.status.clone())
                children=row
              />
            </tbody>
          </table>
        </Show>

        {move || uptime.get().map(|panel| view! { <UptimePanel shell=shell panel=panel target=uptime/> })}

        <Show when=move || dialog.with(|d| d.open) fallback=|| ()>
          <Modal title=dialog_title()>
            <label>"Name"</label>
            <input
              prop:value=move || dialog.with(|d| d.form.name.clone())
              on:input=move |ev| dialog.update(|d| d.form.name = event_target_value(&ev))
              placeholder="Service name"
            />
            <label>"Status"</label>
            <select on:change=move |ev| {
                if let Ok(status) = event_target_value(&ev).parse::<ServiceStatus>() {
                    dialog.update(|d| d.form.status = status);
                }
            }>
              {ServiceStatus::ALL
                  .into_iter()
                  .map(|status| {
                      let value = status.to_string();
                      view! {
                        <option
                          value=value.clone()
                          selected=move || dialog.with(|d| d.form.status == status)
                        >
                          {value}
                        </option>
                      }
                  })
                  .collect_view()}
            </select>
            <InlineError error=dialog_error/>
            <div class="row">
              <button on:click=move |_| dialog.update(Dialog::close)>"Cancel"</button>
              <button on:click=save disabled=move || dialog.with(|d| d.pending)>
                {move || if dialog.with(|d| d.pending) { "Saving..." } else { "Save" }}
              </button>
            </div>
          </Modal>
        </Show>

        <Show when=move || delete.with(|d| d.open) fallback=|| ()>
          <Modal title="Delete Service">
            <p>
              {move || {
                  let target = delete.with(|d| d.target.clone()).unwrap_or_default();
                  let name = state.with(|s| {
                      s.services.iter().find(|svc| svc.id == target).map(|svc| svc.name.clone())
                  });
                  format!("Delete {}? This cannot be undone.", name.unwrap_or(target))
              }}
            </p>
            <InlineError error=delete_error/>
            <div class="row">
              <button on:click=move |_| delete.update(Dialog::close)>"Cancel"</button>
              <button class="danger" on:click=confirm_delete disabled=move || delete.with(|d| d.pending)>
                "Delete"
              </button>
            </div>
          </Modal>
        </Show>
      </section>
    }
}
