// 🃏 Flashcard Export - one TSV row per group
//
// Columns: bold group label, HTML table of members, generation date.
// Rows whose HTML is over the size ceiling are dropped, never truncated.

use crate::error::Result;
use crate::registry::{ExportRow, GroupRegistry};
use std::path::Path;

/// Flashcard decks reject fields over this many characters
pub const MAX_FLASHCARD_HTML_LEN: usize = 131_072;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardRow {
    pub label: String,
    pub html: String,
    pub generated_on: String,
}

/// A group left out of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGroup {
    pub key: String,
    pub html_len: usize,
}

fn member_table(rows: &[ExportRow]) -> String {
    let mut html = String::from("<table><tbody>");

    for row in rows {
        html.push_str("<tr valign='top'>");
        html.push_str(&format!("<td>{}</td>", row.headword));
        html.push_str(&format!("<td><div style='color: #FF6600'>{}</div></td>", row.pos));
        html.push_str(&format!("<td><div style='color: #FFB380'>{}</div></td>", row.gloss));
        html.push_str(&format!(
            "<td><div style='color: #FF6600'>{}</div></td></tr>",
            row.construction
        ));
    }

    html.push_str("</tbody></table>");
    html
}

/// Build flashcard rows for every group with at least one exportable member
pub fn flashcard_rows(
    registry: &GroupRegistry,
    generated_on: &str,
    max_len: usize,
) -> (Vec<FlashcardRow>, Vec<SkippedGroup>) {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (key, item) in registry.iter() {
        if item.export_rows.is_empty() {
            continue;
        }

        let html = member_table(&item.export_rows);
        let html_len = html.chars().count();

        if html_len > max_len {
            tracing::warn!(group = %key, html_len, max_len, "flashcard too long, skipped");
            skipped.push(SkippedGroup {
                key: key.clone(),
                html_len,
            });
            continue;
        }

        rows.push(FlashcardRow {
            label: format!("<b>{}</b>", key),
            html,
            generated_on: generated_on.to_string(),
        });
    }

    (rows, skipped)
}

/// Write rows as headerless tab-separated values
pub fn write_flashcards(path: &Path, rows: &[FlashcardRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)?;

    for row in rows {
        wtr.write_record([&row.label, &row.html, &row.generated_on])?;
    }
    wtr.flush()?;

    Ok(rows.len())
}
