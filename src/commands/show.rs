use anyhow::Result;
use std::path::PathBuf;

use crate::catalog::config::load_config;
use crate::catalog::hints;
use crate::catalog::record::{COLUMNS, Record};
use crate::catalog::store::RecordStore;
use crate::catalog::util::truncate_with_ellipsis;
use crate::commands::CommandReport;

fn cell(record: &Record, column: &str) -> String {
    match column {
        "Subject" => record.subject.clone(),
        "Path" => record.path.clone(),
        "Sender" => record.sender.clone().unwrap_or_default(),
        "Recipients" => record.recipients.clone().unwrap_or_default(),
        "Archive" => record.archive.clone().unwrap_or_default(),
        "Date" => record.date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        _ => String::new(),
    }
}

fn render_row(widths: &[(String, usize)], fields: impl Fn(&str) -> String) -> String {
    let mut out = String::new();
    for (column, width) in widths {
        let value = truncate_with_ellipsis(&fields(column), *width);
        out.push_str(&format!("{value:<w$}  ", w = *width));
    }
    out.trim_end().to_string()
}

pub fn run(limit: usize) -> Result<CommandReport> {
    let cfg = load_config()?;
    let store = RecordStore::new(
        PathBuf::from(&cfg.store.ledger_path),
        cfg.store.cache_path.as_ref().map(PathBuf::from),
    );

    let mut report = CommandReport::new("show");
    let table = store.load()?;
    report.detail(format!("rows={}", table.len()));

    let stored_hints = store.read_presentation_hints();
    let effective = if stored_hints.is_empty() {
        hints::derive_from(&table)
    } else {
        stored_hints
    };

    let widths: Vec<(String, usize)> = COLUMNS
        .iter()
        .map(|column| {
            let width = effective
                .width_for(column)
                .map(usize::from)
                .unwrap_or(column.chars().count());
            (column.to_string(), width.max(column.chars().count()))
        })
        .collect();

    println!("{}", render_row(&widths, |c| c.to_string()));
    for record in table.iter().take(limit) {
        println!("{}", render_row(&widths, |c| cell(record, c)));
    }
    if table.len() > limit {
        report.detail(format!("showing first {limit} rows"));
    }

    Ok(report)
}
