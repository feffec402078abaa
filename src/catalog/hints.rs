use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::record::{COLUMNS, Record};

/// Widest a derived column is allowed to grow when rendering.
const MAX_DERIVED_WIDTH: u16 = 60;

/// Cosmetic layout carried across ledger rewrites: display width per
/// column. Losing or failing to write these never affects the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationHints {
    #[serde(default)]
    pub column_widths: BTreeMap<String, u16>,
}

impl PresentationHints {
    pub fn is_empty(&self) -> bool {
        self.column_widths.is_empty()
    }

    pub fn width_for(&self, column: &str) -> Option<u16> {
        self.column_widths.get(column).copied()
    }
}

fn cell<'a>(record: &'a Record, column: &str) -> &'a str {
    match column {
        "Subject" => &record.subject,
        "Path" => &record.path,
        "Sender" => record.sender.as_deref().unwrap_or(""),
        "Recipients" => record.recipients.as_deref().unwrap_or(""),
        "Archive" => record.archive.as_deref().unwrap_or(""),
        _ => "",
    }
}

/// Derive widths from the data itself, for stores that have no recorded
/// hints yet: the widest cell per column, clamped, never narrower than
/// the column name.
pub fn derive_from(rows: &[Record]) -> PresentationHints {
    let mut column_widths = BTreeMap::new();
    for column in COLUMNS {
        let mut width = column.chars().count();
        for record in rows {
            let len = if *column == "Date" {
                record.date.map(|d| d.to_rfc3339().chars().count()).unwrap_or(0)
            } else {
                cell(record, column).chars().count()
            };
            width = width.max(len);
        }
        let clamped = width.min(MAX_DERIVED_WIDTH as usize) as u16;
        column_widths.insert(column.to_string(), clamped);
    }
    PresentationHints { column_widths }
}
