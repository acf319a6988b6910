pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod forms;
pub mod http;
pub mod model;
pub mod page;
pub mod public;
pub mod stream;
pub mod submit;
pub mod uptime;

pub use api::{fetch_collection, fetch_snapshot, Refetched, Scope, Snapshot, StatusApi};
pub use auth::{Access, Organization, StaticTokenProvider, TokenProvider, TokenRequest};
pub use config::ClientConfig;
pub use error::{Result, StatusError};
pub use http::HttpApi;
pub use page::{
    DashboardPage, IncidentsPage, Notifier, PageState, PublicStatusPage, Toast, ToastLevel,
    ViewCore,
};
pub use submit::{submit, Mutation};
