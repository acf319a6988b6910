use crate::api::{Scope, StatusApi};
use crate::error::{Result, StatusError};
use crate::model::{Incident, IncidentInput, IncidentPatch, Service, ServiceInput, UpdateInput};
use crate::uptime::{UptimePeriod, UptimeReport};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| StatusError::Network(format!("invalid api base url '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| StatusError::Network(format!("invalid path '{path}': {e}")))
    }

    /// `api/<kind>/<id>[/<tail>]` with `id` sent as a single percent-encoded segment.
    fn resource_url(&self, kind: &str, id: &str, tail: Option<&str>) -> Result<Url> {
        if matches!(id, "" | "." | "..") {
            return Err(StatusError::Network(format!("invalid resource id '{id}'")));
        }
        let mut url = self.base.clone();
        let base = &self.base;
        url.path_segments_mut()
            .map_err(|_| StatusError::Network(format!("api base url '{base}' cannot hold a path")))?
            .pop_if_empty()
            .extend(["api", kind, id])
            .extend(tail);
        Ok(url)
    }

    pub fn stream_url(&self) -> Result<Url> {
        self.url("api/stream")
    }

    fn collection_url(&self, scope: &Scope, name: &str) -> Result<Url> {
        match scope {
            Scope::Public => self.url(&format!("api/public/{name}")),
            Scope::Bearer(_) => self.url(&format!("api/{name}")),
        }
    }

    pub(crate) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, scope: &Scope, name: &str) -> Result<Vec<T>> {
        let url = self.collection_url(scope, name)?;
        debug!(%url, "fetching collection");
        let response = check(self.request(Method::GET, url, scope.token()).send().await?).await?;
        let items: Option<Vec<T>> = response.json().await?;
        Ok(items.unwrap_or_default())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<&B>,
    ) -> Result<()> {
        debug!(%method, %url, "sending mutation");
        let mut builder = self.request(method, url, Some(token));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        check(builder.send().await?).await?;
        Ok(())
    }
}

/// Maps non-2xx responses to `StatusError::Http`, keeping the server's `error` text.
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty());
    warn!(status = status.as_u16(), message = ?message, "request rejected");
    Err(StatusError::Http {
        status: status.as_u16(),
        message,
    })
}

#[async_trait(?Send)]
impl StatusApi for HttpApi {
    async fn list_services(&self, scope: &Scope) -> Result<Vec<Service>> {
        self.get_list(scope, "services").await
    }

    async fn list_incidents(&self, scope: &Scope) -> Result<Vec<Incident>> {
        self.get_list(scope, "incidents").await
    }

    async fn service_uptime(
        &self,
        scope: &Scope,
        service_id: &str,
        period: UptimePeriod,
    ) -> Result<UptimeReport> {
        let mut url = self.resource_url("services", service_id, Some("uptime"))?;
        url.query_pairs_mut().append_pair("period", period.as_str());
        debug!(%url, "fetching uptime");
        let response = check(self.request(Method::GET, url, scope.token()).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create_service(&self, token: &str, input: &ServiceInput) -> Result<()> {
        self.send_json(Method::POST, self.url("api/services")?, token, Some(input))
            .await
    }

    async fn update_service(&self, token: &str, id: &str, input: &ServiceInput) -> Result<()> {
        self.send_json(Method::PUT, self.resource_url("services", id, None)?, token, Some(input))
            .await
    }

    async fn delete_service(&self, token: &str, id: &str) -> Result<()> {
        self.send_json::<()>(Method::DELETE, self.resource_url("services", id, None)?, token, None)
            .await
    }

    async fn create_incident(&self, token: &str, input: &IncidentInput) -> Result<()> {
        self.send_json(Method::POST, self.url("api/incidents")?, token, Some(input))
            .await
    }

    async fn update_incident(&self, token: &str, id: &str, patch: &IncidentPatch) -> Result<()> {
        self.send_json(Method::PUT, self.resource_url("incidents", id, None)?, token, Some(patch))
            .await
    }

    async fn add_incident_update(
        &self,
        token: &str,
        id: &str,
        input: &UpdateInput,
    ) -> Result<()> {
        self.send_json(
            Method::POST,
            self.resource_url("incidents", id, Some("update"))?,
            token,
            Some(input),
        )
        .await
    }
}
