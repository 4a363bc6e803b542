//! Plain-text views of the session and of preview tables.

use crate::models::Profile;
use crate::session::{SessionState, Tab};
use serde_json::Value;
use std::fmt::Write;

/// Rows shown by `preview`, header excluded
const PREVIEW_ROWS: usize = 10;

/// Plain-text rendering of the task pane
pub fn render(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "DataSetIQ [{}] {}", state.view, state.message);

    if let Some(profile) = state.profile() {
        render_profile(&mut out, profile);
    }
    if state.view.shows_connect_form() {
        let _ = writeln!(out, "  Connect with: connect <api-key>");
    }
    if !state.view.is_connected() {
        return out.trim_end().to_string();
    }

    let (label, empty) = match state.active_tab {
        Tab::Search => ("Search", "No results yet."),
        Tab::Favorites => ("Favorites", "No favorites yet. Use `fav <id>` to add series."),
        Tab::Recent => ("Recent", "No recent series yet. Insert a formula to track history."),
    };
    let _ = writeln!(
        out,
        "  {} | favorites {} | recent {}",
        label,
        state.favorites.len(),
        state.recent.len()
    );

    let ids = state.visible_ids();
    if ids.is_empty() {
        let _ = writeln!(out, "    {}", empty);
    }
    for id in ids {
        let star = if state.is_favorite(&id) { '*' } else { ' ' };
        let title = state
            .results
            .iter()
            .find(|r| r.id == id && state.active_tab == Tab::Search)
            .map(|r| r.title.as_str())
            .unwrap_or("");
        let _ = writeln!(out, "   {} {:<24} {}", star, id, title);
    }
    out.trim_end().to_string()
}

fn render_profile(out: &mut String, profile: &Profile) {
    let _ = writeln!(out, "  {} ({}, {})", profile.email, profile.plan, profile.status);
    let _ = writeln!(out, "  Quota: {}, {} left", profile.quota, profile.quota.remaining());
}

pub(super) fn render_table(table: &[Vec<Value>]) -> String {
    let total = table.len().saturating_sub(1);
    let mut lines: Vec<String> = table
        .iter()
        .take(PREVIEW_ROWS + 1)
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Value::String(s) => format!("{:<12}", s),
                    other => format!("{:<12}", other),
                })
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end()
                .to_string()
        })
        .collect();
    if total > PREVIEW_ROWS {
        lines.push(format!("... {} more rows", total - PREVIEW_ROWS));
    }
    lines.join("\n")
}
