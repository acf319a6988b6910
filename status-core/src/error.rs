use status_registry::ValidationError;
use thiserror::Error;

pub type Result<T, E = StatusError> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum StatusError {
    /// The identity provider returned no token for the organization.
    #[error("No token")]
    NoToken,
    #[error("no active organization")]
    NoOrganization,
    /// Non-2xx response. `message` is the server's `error` field when it sent one.
    #[error("{}", http_text(.message))]
    Http {
        status: u16,
        message: Option<String>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("event stream error: {0}")]
    Stream(String),
}

fn http_text(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("request failed")
}

impl StatusError {
    /// Text for the page-level banner after a failed load.
    pub fn banner(&self) -> String {
        match self {
            StatusError::Http { .. } | StatusError::Decode(_) => "Failed to fetch data".into(),
            other => other.to_string(),
        }
    }

    /// Text for an inline dialog error; `generic` stands in when the server said nothing.
    pub fn inline(&self, generic: &str) -> String {
        match self {
            StatusError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            StatusError::Http { .. } | StatusError::Network(_) | StatusError::Decode(_) => {
                generic.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for StatusError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StatusError::Decode(err.to_string())
        } else {
            StatusError::Network(err.to_string())
        }
    }
}
