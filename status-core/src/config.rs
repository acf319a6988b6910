use crate::auth::{Access, Organization, StaticTokenProvider, DEFAULT_TOKEN_TEMPLATE};
use crate::http::DEFAULT_BASE_URL;
use crate::stream::DEFAULT_RELOAD_DELAY;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub organization_id: Option<String>,
    pub token: Option<String>,
    pub token_template: String,
    pub reload_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            organization_id: None,
            token: None,
            token_template: DEFAULT_TOKEN_TEMPLATE.into(),
            reload_delay: DEFAULT_RELOAD_DELAY,
        }
    }
}

impl ClientConfig {
    /// Reads `STATUS_API_BASE_URL`, `STATUS_ORG_ID`, `STATUS_API_TOKEN`,
    /// `STATUS_TOKEN_TEMPLATE` and `STATUS_RELOAD_DELAY_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_base_url: get("STATUS_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            organization_id: get("STATUS_ORG_ID"),
            token: get("STATUS_API_TOKEN"),
            token_template: get("STATUS_TOKEN_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_TOKEN_TEMPLATE.into()),
            reload_delay: get("STATUS_RELOAD_DELAY_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RELOAD_DELAY),
        }
    }

    /// Organization access backed by the configured token, or public access
    /// when no organization is set.
    pub fn access(&self) -> Access {
        match &self.organization_id {
            Some(id) => Access::Organization {
                organization: Organization::new(id.clone()),
                tokens: Rc::new(StaticTokenProvider::new(self.token.clone())),
                template: self.token_template.clone(),
            },
            None => Access::Public,
        }
    }
}
