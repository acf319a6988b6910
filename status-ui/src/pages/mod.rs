mod dashboard;
mod incidents;
mod status;

pub use dashboard::Dashboard;
pub use incidents::Incidents;
pub use status::PublicStatus;
