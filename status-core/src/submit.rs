use crate::api::StatusApi;
use crate::auth::Access;
use crate::error::Result;
use crate::forms::{Dialog, IncidentForm, ResolveForm, ServiceForm, UpdateForm};
use crate::model::{Collection, IncidentInput, IncidentPatch, ServiceInput, UpdateInput};
use tracing::{info, warn};

/// A validated write against the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    CreateService(ServiceInput),
    UpdateService { id: String, input: ServiceInput },
    DeleteService { id: String },
    CreateIncident(IncidentInput),
    UpdateIncident { id: String, patch: IncidentPatch },
    ResolveIncident { id: String, patch: IncidentPatch },
    AddUpdate { incident_id: String, input: UpdateInput },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::CreateService(_) => "create_service",
            Mutation::UpdateService { .. } => "update_service",
            Mutation::DeleteService { .. } => "delete_service",
            Mutation::CreateIncident(_) => "create_incident",
            Mutation::UpdateIncident { .. } => "update_incident",
            Mutation::ResolveIncident { .. } => "resolve_incident",
            Mutation::AddUpdate { .. } => "add_update",
        }
    }

    /// The one collection to refetch after this succeeds.
    pub fn affects(&self) -> Collection {
        match self {
            Mutation::CreateService(_)
            | Mutation::UpdateService { .. }
            | Mutation::DeleteService { .. } => Collection::Services,
            Mutation::CreateIncident(_)
            | Mutation::UpdateIncident { .. }
            | Mutation::ResolveIncident { .. }
            | Mutation::AddUpdate { .. } => Collection::Incidents,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Mutation::CreateService(_) => "Service created successfully",
            Mutation::UpdateService { .. } => "Service updated successfully",
            Mutation::DeleteService { .. } => "Service deleted successfully",
            Mutation::CreateIncident(_) => "Incident created successfully",
            Mutation::UpdateIncident { .. } => "Incident updated successfully",
            Mutation::ResolveIncident { .. } => "Incident resolved successfully",
            Mutation::AddUpdate { .. } => "Update added successfully",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Mutation::CreateService(_) => "Failed to create service",
            Mutation::UpdateService { .. } => "Failed to update service",
            Mutation::DeleteService { .. } => "Failed to delete service",
            Mutation::CreateIncident(_) => "Failed to create incident",
            Mutation::UpdateIncident { .. } => "Failed to update incident",
            Mutation::ResolveIncident { .. } => "Failed to resolve incident",
            Mutation::AddUpdate { .. } => "Failed to add update",
        }
    }
}

fn no_target(what: &str) -> String {
    format!("No {what} selected")
}

// Turning dialog state into a write. `Err` is the inline error text.

impl Dialog<ServiceForm> {
    pub fn mutation(&self) -> Result<Mutation, String> {
        let input = self.form.to_input().map_err(|e| e.to_string())?;
        Ok(match self.target.clone() {
            Some(id) => Mutation::UpdateService { id, input },
            None => Mutation::CreateService(input),
        })
    }
}

impl Dialog<()> {
    /// Delete confirmation for the targeted service.
    pub fn mutation(&self) -> Result<Mutation, String> {
        let id = self.target.clone().ok_or_else(|| no_target("service"))?;
        Ok(Mutation::DeleteService { id })
    }
}

impl Dialog<IncidentForm> {
    pub fn mutation(&self) -> Result<Mutation, String> {
        match self.target.clone() {
            Some(id) => {
                let patch = self.form.to_patch().map_err(|e| e.to_string())?;
                Ok(Mutation::UpdateIncident { id, patch })
            }
            None => {
                let input = self.form.to_input().map_err(|e| e.to_string())?;
                Ok(Mutation::CreateIncident(input))
            }
        }
    }
}

impl Dialog<ResolveForm> {
    pub fn mutation(&self) -> Result<Mutation, String> {
        let id = self.target.clone().ok_or_else(|| no_target("incident"))?;
        Ok(Mutation::ResolveIncident {
            id,
            patch: self.form.patch.clone(),
        })
    }
}

impl Dialog<UpdateForm> {
    pub fn mutation(&self) -> Result<Mutation, String> {
        let incident_id = self.target.clone().ok_or_else(|| no_target("incident"))?;
        let input = self.form.to_input().map_err(|e| e.to_string())?;
        Ok(Mutation::AddUpdate { incident_id, input })
    }
}

/// Fetches a fresh token for the active organization and sends `mutation`.
/// Nothing is sent when no token can be obtained.
pub async fn submit<A>(api: &A, access: &Access, mutation: &Mutation) -> Result<()>
where
    A: StatusApi + ?Sized,
{
    let token = access.bearer().await.map_err(|err| {
        warn!(mutation = mutation.name(), error = %err, "mutation blocked");
        err
    })?;

    let result = match mutation {
        Mutation::CreateService(input) => api.create_service(&token, input).await,
        Mutation::UpdateService { id, input } => api.update_service(&token, id, input).await,
        Mutation::DeleteService { id } => api.delete_service(&token, id).await,
        Mutation::CreateIncident(input) => api.create_incident(&token, input).await,
        Mutation::UpdateIncident { id, patch } | Mutation::ResolveIncident { id, patch } => {
            api.update_incident(&token, id, patch).await
        }
        Mutation::AddUpdate { incident_id, input } => {
            api.add_incident_update(&token, incident_id, input).await
        }
    };

    match &result {
        Ok(()) => info!(mutation = mutation.name(), "mutation accepted"),
        Err(err) => warn!(mutation = mutation.name(), error = %err, "mutation failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentKind, IncidentStatus, ServiceStatus};

    #[test]
    fn writes_refetch_their_own_collection() {
        let service = Mutation::DeleteService { id: "s1".into() };
        assert_eq!(service.affects(), Collection::Services);

        let update = Mutation::AddUpdate {
            incident_id: "i1".into(),
            input: UpdateInput {
                message: "fixed".into(),
            },
        };
        assert_eq!(update.affects(), Collection::Incidents);
    }

    #[test]
    fn dialog_target_picks_create_or_update() {
        let mut dialog: Dialog<ServiceForm> = Dialog::default();
        dialog.open_new();
        dialog.form.name = "API".into();
        assert!(matches!(dialog.mutation(), Ok(Mutation::CreateService(_))));

        dialog.target = Some("s1".into());
        assert!(matches!(
            dialog.mutation(),
            Ok(Mutation::UpdateService { ref id, .. }) if id == "s1"
        ));

        dialog.form.name.clear();
        assert_eq!(dialog.mutation(), Err("name is required".to_string()));
    }

    #[test]
    fn untargeted_confirmation_is_rejected() {
        let dialog: Dialog<ResolveForm> = Dialog::default();
        assert_eq!(dialog.mutation(), Err("No incident selected".to_string()));
    }

    #[test]
    fn messages_name_the_action() {
        let create = Mutation::CreateIncident(IncidentInput {
            title: "DB down".into(),
            description: String::new(),
            kind: IncidentKind::Incident,
            status: IncidentStatus::Investigating,
            service_ids: Vec::new(),
        });
        assert_eq!(create.failure_message(), "Failed to create incident");
        assert_eq!(create.success_message(), "Incident created successfully");

        let edit = Mutation::UpdateService {
            id: "s1".into(),
            input: ServiceInput {
                name: "API".into(),
                status: ServiceStatus::Operational,
            },
        };
        assert_eq!(edit.failure_message(), "Failed to update service");
    }
}
