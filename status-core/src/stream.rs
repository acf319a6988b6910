#[cfg(not(target_arch = "wasm32"))]
use crate::error::{Result, StatusError};
#[cfg(not(target_arch = "wasm32"))]
use crate::events::SseDecoder;
#[cfg(not(target_arch = "wasm32"))]
use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(5);

/// One live connection per organization context. There is no reconnecting
/// state: a failed stream closes and the whole view is reloaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubscriptionState {
    #[default]
    Closed,
    Open {
        organization_id: String,
    },
}

/// What the owner must do after a stream failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadDirective {
    pub after: Duration,
}

#[derive(Debug, Default)]
pub struct Subscription {
    state: SubscriptionState,
}

impl Subscription {
    pub fn state(&self) -> &SubscriptionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SubscriptionState::Open { .. })
    }

    /// Returns true when the caller has to establish a new connection: either
    /// nothing was open, or the organization changed.
    pub fn open(&mut self, organization_id: Option<&str>) -> bool {
        let Some(org) = organization_id else {
            self.close();
            return false;
        };
        if matches!(&self.state, SubscriptionState::Open { organization_id } if organization_id == org)
        {
            return false;
        }
        info!(organization_id = org, "event stream open");
        self.state = SubscriptionState::Open {
            organization_id: org.to_string(),
        };
        true
    }

    /// Returns whether a connection was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        if was_open {
            info!("event stream closed");
        }
        self.state = SubscriptionState::Closed;
        was_open
    }

    /// Only a failure of an open stream asks for a reload. Errors that arrive
    /// after the stream is already closed return `None`.
    pub fn fail(&mut self, delay: Duration) -> Option<ReloadDirective> {
        if !self.is_open() {
            return None;
        }
        self.state = SubscriptionState::Closed;
        Some(ReloadDirective { after: delay })
    }
}

/// Native reader for `/api/stream`. The browser uses `EventSource` instead.
#[cfg(not(target_arch = "wasm32"))]
pub struct EventStream {
    response: reqwest::Response,
    decoder: SseDecoder,
    ready: VecDeque<String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl EventStream {
    pub async fn connect(api: &crate::http::HttpApi, bearer: Option<&str>) -> Result<Self> {
        let url = api.stream_url()?;
        info!(%url, "connecting event stream");
        let response = api
            .request(reqwest::Method::GET, url, bearer)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| StatusError::Stream(e.to_string()))?;
        let response = crate::http::check(response).await?;
        Ok(Self {
            response,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
        })
    }

    /// Next `data` payload. `Ok(None)` once the server ends the stream.
    pub async fn next_message(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Ok(Some(message));
            }
            let chunk = self
                .response
                .chunk()
                .await
                .map_err(|e| StatusError::Stream(e.to_string()))?;
            match chunk {
                Some(bytes) => self.ready.extend(self.decoder.feed(&bytes)),
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_once_per_organization() {
        let mut sub = Subscription::default();
        assert!(!sub.open(None));
        assert_eq!(sub.state(), &SubscriptionState::Closed);

        assert!(sub.open(Some("org_1")));
        assert!(!sub.open(Some("org_1")));
        assert!(sub.open(Some("org_2")));
        assert_eq!(
            sub.state(),
            &SubscriptionState::Open {
                organization_id: "org_2".into()
            }
        );
    }

    #[test]
    fn organization_loss_closes() {
        let mut sub = Subscription::default();
        sub.open(Some("org_1"));
        assert!(!sub.open(None));
        assert!(!sub.is_open());
        assert!(!sub.close());
    }

    #[test]
    fn failure_closes_and_schedules_reload() {
        let mut sub = Subscription::default();
        sub.open(Some("org_1"));
        let directive = sub.fail(DEFAULT_RELOAD_DELAY).expect("reload");
        assert_eq!(directive.after, Duration::from_secs(5));
        assert!(!sub.is_open());
    }

    #[test]
    fn later_failures_are_ignored() {
        let mut sub = Subscription::default();
        assert_eq!(sub.fail(DEFAULT_RELOAD_DELAY), None);

        sub.open(Some("org_1"));
        assert!(sub.fail(DEFAULT_RELOAD_DELAY).is_some());
        assert_eq!(sub.fail(DEFAULT_RELOAD_DELAY), None);
    }
}
