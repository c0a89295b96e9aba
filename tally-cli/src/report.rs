//! Plain-text table and summary output.

use tally_core::{JournalRecord, TrackerRecord};

pub fn amount_cell(amount: Option<f64>) -> String {
    amount.map(|a| format!("{a:.2}")).unwrap_or_default()
}

fn text_cell(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

pub fn tracker_rows(records: &[TrackerRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                text_cell(&r.date),
                text_cell(&r.description),
                amount_cell(r.amount),
                text_cell(&r.category),
            ]
        })
        .collect()
}

pub fn journal_rows(records: &[JournalRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                text_cell(&r.date),
                text_cell(&r.category),
                text_cell(&r.note),
                amount_cell(r.amount),
                r.direction.map(|d| d.as_str().to_string()).unwrap_or_default(),
            ]
        })
        .collect()
}

fn table_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{:<w$}", c.as_ref()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string();
    line.push('\n');
    line
}

/// Left-aligned columns separated by two spaces, header underlined
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&table_line(headers, &widths));
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&table_line(dashes.as_slice(), &widths));
    for row in rows {
        out.push_str(&table_line(row.as_slice(), &widths));
    }
    out
}

/// One `label  total` line per category, in the given order
pub fn format_summary(sorted: &[(String, f64)]) -> String {
    let width = sorted.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    sorted
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v:>12.2}\n"))
        .collect()
}
