//! Dialog input state. Forms hold raw text; validation happens when the
//! dialog is submitted, and a failed submit keeps everything the user typed.

use crate::model::{
    Incident, IncidentInput, IncidentKind, IncidentPatch, IncidentStatus, Service, ServiceInput,
    ServiceStatus, UpdateInput,
};
use status_registry::{require, ValidationError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub name: String,
    pub status: ServiceStatus,
}

impl ServiceForm {
    pub fn from_service(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            status: service.status.clone(),
        }
    }

    pub fn to_input(&self) -> Result<ServiceInput, ValidationError> {
        Ok(ServiceInput {
            name: require("name", &self.name)?,
            status: self.status.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentForm {
    pub title: String,
    pub description: String,
    pub kind: IncidentKind,
    pub status: IncidentStatus,
    pub service_ids: Vec<String>,
    /// Carried through edits so an edit never reopens a resolved incident.
    pub is_resolved: bool,
}

impl IncidentForm {
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            title: incident.title.clone(),
            description: incident.description.clone(),
            kind: incident.kind.clone(),
            status: incident.status.clone(),
            service_ids: incident.service_ids(),
            is_resolved: incident.is_resolved,
        }
    }

    pub fn toggle_service(&mut self, service_id: &str) {
        match self.service_ids.iter().position(|id| id == service_id) {
            Some(index) => {
                self.service_ids.remove(index);
            }
            None => self.service_ids.push(service_id.to_string()),
        }
    }

    pub fn has_service(&self, service_id: &str) -> bool {
        self.service_ids.iter().any(|id| id == service_id)
    }

    pub fn to_input(&self) -> Result<IncidentInput, ValidationError> {
        Ok(IncidentInput {
            title: require("title", &self.title)?,
            description: self.description.trim().to_string(),
            kind: self.kind.clone(),
            status: self.status.clone(),
            service_ids: self.service_ids.clone(),
        })
    }

    pub fn to_patch(&self) -> Result<IncidentPatch, ValidationError> {
        let input = self.to_input()?;
        Ok(IncidentPatch {
            title: input.title,
            description: input.description,
            kind: input.kind,
            status: input.status,
            is_resolved: self.is_resolved,
            service_ids: input.service_ids,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateForm {
    pub message: String,
}

impl UpdateForm {
    pub fn to_input(&self) -> Result<UpdateInput, ValidationError> {
        Ok(UpdateInput {
            message: require("message", &self.message)?,
        })
    }
}

/// Confirmation state for resolving; the body is fixed when the dialog opens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveForm {
    pub title: String,
    pub patch: IncidentPatch,
}

impl ResolveForm {
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            title: incident.title.clone(),
            patch: IncidentPatch::resolving(incident),
        }
    }
}

/// Open/closed state of one modal plus its in-flight and error flags.
///
/// `target` is the id of the record being edited; `None` means "create".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dialog<F> {
    pub open: bool,
    pub form: F,
    pub target: Option<String>,
    pub pending: bool,
    pub error: Option<String>,
}

impl<F: Default> Dialog<F> {
    pub fn open_new(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn open_for(&mut self, target: impl Into<String>, form: F) {
        *self = Self {
            open: true,
            form,
            target: Some(target.into()),
            pending: false,
            error: None,
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    /// Marks the dialog as submitting. Returns false if a submit is already
    /// in flight or the dialog is closed.
    pub fn begin(&mut self) -> bool {
        if !self.open || self.pending {
            return false;
        }
        self.pending = true;
        self.error = None;
        true
    }

    /// Success closes and clears the dialog; failure keeps the form and shows `error`.
    pub fn finish(&mut self, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.close(),
            Err(message) => {
                self.pending = false;
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_service_name_is_rejected() {
        let form = ServiceForm {
            name: "   ".into(),
            status: ServiceStatus::Operational,
        };
        assert_eq!(
            form.to_input(),
            Err(ValidationError::Required { field: "name" })
        );

        let form = ServiceForm {
            name: "  API ".into(),
            status: ServiceStatus::PartialOutage,
        };
        assert_eq!(form.to_input().expect("input").name, "API");
    }

    #[test]
    fn toggling_services_adds_and_removes() {
        let mut form = IncidentForm::default();
        form.toggle_service("s1");
        form.toggle_service("s2");
        assert!(form.has_service("s1"));
        form.toggle_service("s1");
        assert_eq!(form.service_ids, vec!["s2".to_string()]);
    }

    #[test]
    fn edit_patch_keeps_resolution_flag() {
        let form = IncidentForm {
            title: "DB down".into(),
            is_resolved: true,
            status: IncidentStatus::Resolved,
            ..IncidentForm::default()
        };
        let patch = form.to_patch().expect("patch");
        assert!(patch.is_resolved);
        assert_eq!(patch.status, IncidentStatus::Resolved);
    }

    #[test]
    fn failed_submit_keeps_input() {
        let mut dialog: Dialog<UpdateForm> = Dialog::default();
        dialog.open_for("i1", UpdateForm::default());
        dialog.form.message = "rolling back".into();

        assert!(dialog.begin());
        assert!(!dialog.begin());
        dialog.finish(Err("Failed to add update".into()));

        assert!(dialog.open);
        assert!(!dialog.pending);
        assert_eq!(dialog.form.message, "rolling back");
        assert_eq!(dialog.error.as_deref(), Some("Failed to add update"));

        assert!(dialog.begin());
        assert_eq!(dialog.error, None);
        dialog.finish(Ok(()));
        assert_eq!(dialog, Dialog::default());
    }

    #[test]
    fn closed_dialog_cannot_submit() {
        let mut dialog: Dialog<ServiceForm> = Dialog::default();
        assert!(!dialog.begin());
        dialog.open_new();
        assert!(!dialog.is_edit());
        assert!(dialog.begin());
    }
}
