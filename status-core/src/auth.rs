//! Access contexts and the identity-provider seam.
//!
//! Tokens are never cached here: every authenticated call asks the provider
//! again, scoped to the active organization.

use crate::api::Scope;
use crate::error::{Result, StatusError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

pub const DEFAULT_TOKEN_TEMPLATE: &str = "status_jwt";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Organization {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub template: String,
    pub organization_id: String,
}

#[async_trait(?Send)]
pub trait TokenProvider {
    /// `Ok(None)` means the provider has no session for this organization.
    async fn token(&self, request: &TokenRequest) -> Result<Option<String>>;
}

/// Hands out a fixed token, e.g. one taken from the environment.
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait(?Send)]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _request: &TokenRequest) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

#[derive(Clone)]
pub enum Access {
    Public,
    Organization {
        organization: Organization,
        tokens: Rc<dyn TokenProvider>,
        template: String,
    },
}

impl Access {
    pub fn organization(organization: Organization, tokens: Rc<dyn TokenProvider>) -> Self {
        Access::Organization {
            organization,
            tokens,
            template: DEFAULT_TOKEN_TEMPLATE.to_string(),
        }
    }

    pub fn organization_id(&self) -> Option<&str> {
        match self {
            Access::Public => None,
            Access::Organization { organization, .. } => Some(organization.id.as_str()),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }

    /// Fresh bearer token for the active organization.
    pub async fn bearer(&self) -> Result<String> {
        let Access::Organization {
            organization,
            tokens,
            template,
        } = self
        else {
            return Err(StatusError::NoOrganization);
        };
        let request = TokenRequest {
            template: template.clone(),
            organization_id: organization.id.clone(),
        };
        tokens
            .token(&request)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or(StatusError::NoToken)
    }

    pub async fn scope(&self) -> Result<Scope> {
        match self {
            Access::Public => Ok(Scope::Public),
            Access::Organization { .. } => self.bearer().await.map(Scope::Bearer),
        }
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("Public"),
            Access::Organization {
                organization,
                template,
                ..
            } => f
                .debug_struct("Organization")
                .field("organization", organization)
                .field("template", template)
                .finish(),
        }
    }
}
