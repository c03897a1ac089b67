//! Terminal rendering for the `randm` binary.

use chrono::{TimeZone, Utc};
use colored::{ColoredString, Colorize};

use crate::models::CharacterRecord;

fn colored_status(status: &str) -> ColoredString {
    match status.to_ascii_lowercase().as_str() {
        "alive" => status.green(),
        "dead" => status.red(),
        _ => status.dimmed(),
    }
}

/// One line per character: id, name, status, species, gender
pub fn render_list(records: &[CharacterRecord]) -> String {
    if records.is_empty() {
        return "No characters found".dimmed().to_string();
    }

    let width = records.iter().map(|r| r.name().len()).max().unwrap_or(0);
    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "{:>5}  {:<width$}  {:<8}  {} / {}\n",
            record.id(),
            record.name(),
            colored_status(record.status()),
            record.species(),
            record.gender(),
            width = width
        ));
    }

    let partial = records.iter().filter(|r| r.is_partial()).count();
    if partial > 0 {
        out.push_str(&format!("{}\n", "(served from local cache)".dimmed()));
    }
    out
}

/// Multi-line detail view; notes which fields the cache could not provide
pub fn render_detail(record: &CharacterRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} #{}\n", record.name().bold(), record.id()));
    out.push_str(&format!("  Status:   {}\n", colored_status(record.status())));
    out.push_str(&format!("  Species:  {}\n", record.species()));
    if !record.kind().is_empty() {
        out.push_str(&format!("  Type:     {}\n", record.kind()));
    }
    out.push_str(&format!("  Gender:   {}\n", record.gender()));
    out.push_str(&format!("  Origin:   {}\n", record.origin_name()));
    out.push_str(&format!("  Location: {}\n", record.location_name()));
    out.push_str(&format!("  Image:    {}\n", record.image()));
    out.push_str(&format!("  Created:  {}\n", record.created()));

    match record.episode() {
        Some(episodes) => out.push_str(&format!("  Episodes: {}\n", episodes.len())),
        None => out.push_str(&format!(
            "  {}\n",
            "Episodes and links unavailable offline".dimmed()
        )),
    }
    out
}

/// Human readable form of a millisecond timestamp
pub fn format_millis(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}
