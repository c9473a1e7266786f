//! Finding model

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::payload::{fetch_f64, fetch_str};

const IP_PATH: &str = "detail/service/action/networkConnectionAction/remoteIpDetails/ipAddressV4";
const DIRECTION_PATH: &str = "detail/service/action/networkConnectionAction/connectionDirection";
const THREAT_LIST_PATH: &str = "detail/service/additionalInfo/threatListName";
const SEVERITY_PATH: &str = "detail/service/severity";
const DETAIL_SEVERITY_PATH: &str = "detail/severity";
const LAST_SEEN_PATH: &str = "detail/service/eventLastSeen";
const ID_PATH: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
    Unknown,
}

impl Direction {
    /// Parse a GuardDuty connection direction; other values are not recognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INBOUND" => Some(Direction::Inbound),
            "OUTBOUND" => Some(Direction::Outbound),
            "UNKNOWN" => Some(Direction::Unknown),
            _ => None,
        }
    }
}

/// Normalized view of one network-connection finding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finding {
    pub finding_id: Option<String>,
    pub ip: Option<String>,
    pub direction: Option<Direction>,
    pub severity: Option<f64>,
    pub threat_list_name: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Finding {
    /// Extract the fields the classifier and ledger need from a raw event.
    pub fn from_event(event: &Value) -> Self {
        let non_empty = |path: &str| {
            fetch_str(event, path)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let last_seen = fetch_str(event, LAST_SEEN_PATH).and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| tracing::warn!("Unparsable eventLastSeen {:?}: {}", raw, e))
                .ok()
        });

        Self {
            finding_id: non_empty(ID_PATH),
            ip: non_empty(IP_PATH),
            direction: fetch_str(event, DIRECTION_PATH).and_then(Direction::parse),
            severity: fetch_f64(event, SEVERITY_PATH)
                .or_else(|| fetch_f64(event, DETAIL_SEVERITY_PATH)),
            threat_list_name: non_empty(THREAT_LIST_PATH),
            last_seen,
        }
    }
}
