use crate::model::null_as_empty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Window accepted by `GET /api/services/{id}/uptime?period=`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UptimePeriod {
    Day,
    #[default]
    Week,
    Month,
}

impl UptimePeriod {
    pub const ALL: [UptimePeriod; 3] = [UptimePeriod::Day, UptimePeriod::Week, UptimePeriod::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            UptimePeriod::Day => "1d",
            UptimePeriod::Week => "7d",
            UptimePeriod::Month => "30d",
        }
    }

    /// Unrecognized values fall back to seven days, as the server does.
    pub fn from_query(value: &str) -> Self {
        match value.trim() {
            "1d" => UptimePeriod::Day,
            "30d" => UptimePeriod::Month,
            _ => UptimePeriod::Week,
        }
    }
}

impl fmt::Display for UptimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a service's status history. The server sends these keys capitalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPoint {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "ChangedAt")]
    pub changed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UptimeReport {
    #[serde(default = "full_uptime")]
    pub uptime: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<StatusPoint>,
}

fn full_uptime() -> f64 {
    100.0
}

impl UptimeReport {
    pub fn percent_label(&self) -> String {
        format!("{:.2}%", self.uptime)
    }

    pub fn latest(&self) -> Option<&StatusPoint> {
        self.history.last()
    }
}
