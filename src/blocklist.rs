//! Block-list merge
//!
//! The stored list is plain text, one IP per line. Merging only ever
//! appends: existing lines are left exactly as they are, duplicates
//! among them included.

use std::collections::HashSet;

use crate::models::LedgerEntry;

/// Terminator written after every appended IP
pub const LINE_TERMINATOR: &str = "\r\n";

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Text to persist
    pub updated_text: String,
    /// IPs appended by this merge, in append order
    pub added_ips: Vec<String>,
    /// Every IP in the updated list
    pub all_ips: HashSet<String>,
    /// Distinct IPs seen in the ledger
    pub found: usize,
}

/// Append every distinct ledger IP that the existing text does not list yet.
///
/// New IPs keep the order in which they first appear in `entries`, so the
/// result is deterministic for a given input.
pub fn merge(existing_text: &str, entries: &[LedgerEntry]) -> MergeOutcome {
    let mut updated_text = if existing_text.trim().is_empty() {
        String::new()
    } else {
        existing_text.to_string()
    };

    let mut all_ips: HashSet<String> = parse_lines(&updated_text).map(str::to_string).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut added_ips = Vec::new();

    for ip in entries.iter().map(|e| e.ip.trim()).filter(|ip| !ip.is_empty()) {
        if !seen.insert(ip) || all_ips.contains(ip) {
            continue;
        }

        // Never glue a new IP onto an unterminated last line. A trailing
        // bare `\r` only needs its `\n`.
        if updated_text.ends_with('\r') {
            updated_text.push('\n');
        } else if !updated_text.is_empty() && !updated_text.ends_with('\n') {
            updated_text.push_str(LINE_TERMINATOR);
        }
        updated_text.push_str(ip);
        updated_text.push_str(LINE_TERMINATOR);

        all_ips.insert(ip.to_string());
        added_ips.push(ip.to_string());
    }

    MergeOutcome {
        updated_text,
        added_ips,
        all_ips,
        found: seen.len(),
    }
}

/// Non-empty lines of a stored list, trimmed.
pub fn parse_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
