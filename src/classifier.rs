//! Finding Classifier
//!
//! Decides whether a finding warrants blocking its remote IP.
//! Input: Finding + severity floor
//! Output: Verdict

use crate::models::{Direction, Finding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    IgnoreNoIp,
    IgnoreOutbound,
    IgnoreUnknownUntagged,
    IgnoreLowSeverity,
    Accept,
}

impl Verdict {
    pub fn is_accept(self) -> bool {
        self == Verdict::Accept
    }

    /// Human-readable reason for ignore verdicts; `None` for `Accept`.
    pub fn ignore_reason(self, min_severity: f64) -> Option<String> {
        match self {
            Verdict::IgnoreNoIp => Some("IP not found".to_string()),
            Verdict::IgnoreOutbound => Some("Ignore OUTBOUND connection".to_string()),
            Verdict::IgnoreUnknownUntagged => {
                Some("Ignore UNKNOWN connection due to undefined threat list name".to_string())
            }
            Verdict::IgnoreLowSeverity => {
                Some(format!("Ignore due to severity less than {}", min_severity))
            }
            Verdict::Accept => None,
        }
    }
}

/// Main classification function, first matching rule wins.
///
/// Only externally directed traffic is ever blocked: inbound findings, or
/// findings of unknown direction that a threat list has tagged. Those still
/// have to reach `min_severity`; a missing severity never does.
pub fn classify(finding: &Finding, min_severity: f64) -> Verdict {
    if finding.ip.is_none() {
        return Verdict::IgnoreNoIp;
    }

    match finding.direction {
        Some(Direction::Outbound) => return Verdict::IgnoreOutbound,
        Some(Direction::Unknown) if finding.threat_list_name.is_none() => {
            return Verdict::IgnoreUnknownUntagged;
        }
        _ => {}
    }

    match finding.severity {
        Some(severity) if severity >= min_severity => Verdict::Accept,
        _ => Verdict::IgnoreLowSeverity,
    }
}
