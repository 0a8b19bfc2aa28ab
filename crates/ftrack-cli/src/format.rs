//! Result formatting: Table and JSON output.

use chrono::Local;
use serde::Serialize;

use ftrack_core::PathRecord;
use ftrack_core::time::LEGACY_TIME_FORMAT;

/// Output format for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Serialize)]
struct Listing<'a> {
    records: &'a [PathRecord],
    total: usize,
}

/// Format a history view in the specified output format.
#[must_use]
pub fn format_records(records: &[PathRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(records),
        OutputFormat::Table => format_table(records),
    }
}

fn format_json(records: &[PathRecord]) -> String {
    let listing = Listing {
        records,
        total: records.len(),
    };
    serde_json::to_string_pretty(&listing).unwrap_or_else(|_| "{}".to_string())
}

fn format_table(records: &[PathRecord]) -> String {
    if records.is_empty() {
        return "(no history)".to_string();
    }

    let header = ["#", "", "visits", "last access", "path"];
    let rows: Vec<[String; 5]> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                (i + 1).to_string(),
                if r.is_pinned { "*" } else { "" }.to_string(),
                r.access_count.to_string(),
                r.last_access_time
                    .with_timezone(&Local)
                    .format(LEGACY_TIME_FORMAT)
                    .to_string(),
                r.path.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &header.map(str::to_string), &widths);
    let sep: Vec<String> = widths[..4].iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&sep.join("  "));
    output.push_str("  ----\n");
    for row in &rows {
        push_row(&mut output, row, &widths);
    }
    output.pop();
    output
}

fn push_row(output: &mut String, cells: &[String; 5], widths: &[usize]) {
    // The path column is last and left unpadded.
    output.push_str(&format!(
        "{:>w0$}  {:<w1$}  {:>w2$}  {:<w3$}  {}\n",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        cells[4],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    ));
}
