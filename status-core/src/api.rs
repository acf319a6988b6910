use crate::error::Result;
use crate::model::{
    Collection, Incident, IncidentInput, IncidentPatch, Service, ServiceInput, UpdateInput,
};
use crate::uptime::{UptimePeriod, UptimeReport};
use async_trait::async_trait;

/// Which API prefix a read goes to, and with what credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Scope {
    /// `/api/public/*`, no Authorization header.
    Public,
    /// `/api/*` with `Authorization: Bearer <token>`.
    Bearer(String),
}

impl Scope {
    pub fn token(&self) -> Option<&str> {
        match self {
            Scope::Public => None,
            Scope::Bearer(token) => Some(token.as_str()),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Public => f.write_str("Public"),
            Scope::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// The remote status API. Mutations return nothing: callers refetch instead
/// of trusting response bodies.
#[async_trait(?Send)]
pub trait StatusApi {
    async fn list_services(&self, scope: &Scope) -> Result<Vec<Service>>;
    async fn list_incidents(&self, scope: &Scope) -> Result<Vec<Incident>>;
    async fn service_uptime(
        &self,
        scope: &Scope,
        service_id: &str,
        period: UptimePeriod,
    ) -> Result<UptimeReport>;

    async fn create_service(&self, token: &str, input: &ServiceInput) -> Result<()>;
    async fn update_service(&self, token: &str, id: &str, input: &ServiceInput) -> Result<()>;
    async fn delete_service(&self, token: &str, id: &str) -> Result<()>;

    async fn create_incident(&self, token: &str, input: &IncidentInput) -> Result<()>;
    async fn update_incident(&self, token: &str, id: &str, patch: &IncidentPatch) -> Result<()>;
    async fn add_incident_update(&self, token: &str, id: &str, input: &UpdateInput)
        -> Result<()>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub services: Vec<Service>,
    pub incidents: Vec<Incident>,
}

/// Services and incidents requested together; either failure fails the whole load.
pub async fn fetch_snapshot<A>(api: &A, scope: &Scope) -> Result<Snapshot>
where
    A: StatusApi + ?Sized,
{
    let (services, incidents) =
        futures::try_join!(api.list_services(scope), api.list_incidents(scope))?;
    Ok(Snapshot {
        services,
        incidents,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub enum Refetched {
    Services(Vec<Service>),
    Incidents(Vec<Incident>),
}

pub async fn fetch_collection<A>(api: &A, scope: &Scope, collection: Collection) -> Result<Refetched>
where
    A: StatusApi + ?Sized,
{
    match collection {
        Collection::Services => api.list_services(scope).await.map(Refetched::Services),
        Collection::Incidents => api.list_incidents(scope).await.map(Refetched::Incidents),
    }
}
