//! Plain-text rendering of pages and dataset status.

use crate::dataset::Dataset;
use crate::record::Record;

/// Shown in place of the table when there are no rows.
pub const NO_DATA: &str = "No data to display for this page.";

/// `Page: 2/5 | Records: 230 | Encoding: IBM037 | <message>`
///
/// The page number is 1-based, and 0 when no page is loaded.
pub fn status_line(dataset: &Dataset, message: &str) -> String {
    let page = dataset.current_page_index().map_or(0, |n| n + 1);
    format!(
        "Page: {}/{} | Records: {} | Encoding: {} | {}",
        page,
        dataset.total_pages(),
        dataset.total_records(),
        dataset.encoding_name(),
        message
    )
}

/// Render rows as a table with one column per field, in layout order.
pub fn render_table<'a>(
    field_names: &[&str],
    rows: impl IntoIterator<Item = &'a Record>,
) -> String {
    let rows: Vec<Vec<&str>> = rows.into_iter().map(|r| r.values().collect()).collect();
    if rows.is_empty() {
        return NO_DATA.to_string();
    }

    let mut widths: Vec<usize> = field_names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(field_names, &widths));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row(row, &widths));
    }

    lines.join("\n")
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, &w)| format!("{:<w$}", cells.get(i).copied().unwrap_or("")))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
