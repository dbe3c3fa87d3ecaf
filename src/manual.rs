//! Manual bulk line input
//!
//! When a platform blocks scraping, the operator pastes its board as
//! plain text. Row format: `player, stat_type, line[, team]`. Malformed
//! rows are rejected individually with a reason and never abort the
//! batch.

use serde::{Deserialize, Serialize};

use crate::models::{normalize_stat, Platform};

/// One accepted row from a manual batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualLineEntry {
    pub player_name: String,
    pub stat_type: String,
    pub line: f64,
    pub team: Option<String>,
}

/// One rejected row with the reason it was thrown out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub raw: String,
    pub reason: String,
}

/// Outcome of applying a manual batch for one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub platform: Platform,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Parse pasted board text into accepted entries and rejected rows.
/// Blank rows are skipped without counting either way.
pub fn parse_manual_batch(raw: &str) -> (Vec<ManualLineEntry>, Vec<RejectedRow>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, row) in raw.lines().enumerate() {
        let row = row.trim();
        if row.is_empty() {
            continue;
        }

        match parse_row(row) {
            Ok(entry) => accepted.push(entry),
            Err(reason) => rejected.push(RejectedRow {
                row_number: index + 1,
                raw: row.to_string(),
                reason,
            }),
        }
    }

    (accepted, rejected)
}

fn parse_row(row: &str) -> Result<ManualLineEntry, String> {
    let parts: Vec<&str> = row.split(',').map(|p| p.trim()).collect();

    if parts.len() < 3 {
        return Err("expected: player, stat_type, line[, team]".to_string());
    }

    let player_name = parts[0];
    if player_name.is_empty() {
        return Err("player name is empty".to_string());
    }

    let stat_type = normalize_stat(parts[1]);
    if stat_type.is_empty() {
        return Err("stat type is empty".to_string());
    }

    let line: f64 = parts[2]
        .parse()
        .map_err(|_| format!("line '{}' is not a number", parts[2]))?;
    if !line.is_finite() || line < 0.0 {
        return Err(format!("line {} is out of range", line));
    }

    let team = match parts.get(3) {
        Some(team) if !team.is_empty() => Some(team.to_string()),
        _ => None,
    };

    Ok(ManualLineEntry {
        player_name: player_name.to_string(),
        stat_type,
        line,
        team,
    })
}
