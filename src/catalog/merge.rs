use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::catalog::record::{Record, RecordKey, Table};

/// Fill the unknown fields of `keep` from `other`. Values already in
/// `keep` always take precedence; a fresh scan can only supply fields
/// the store does not know yet, never replace them.
fn coalesce_into(keep: &mut Record, other: Record) {
    if keep.sender.is_none() {
        keep.sender = other.sender;
    }
    if keep.recipients.is_none() {
        keep.recipients = other.recipients;
    }
    if keep.archive.is_none() {
        keep.archive = other.archive;
    }
    if keep.date.is_none() {
        keep.date = other.date;
    }
}

/// Fold a batch of freshly observed records into the existing table.
///
/// Rows join on `(subject, path)`. A row only in `existing` is retained
/// unchanged; a row only in `incoming` is appended; a key present in both
/// keeps the existing row and coalesces its absent fields from the
/// incoming one. Duplicate keys within either input resolve the same way:
/// the first occurrence holds the row, later ones only fill gaps. Output
/// order is existing rows first (original order), then new rows in
/// arrival order, and it never contains two rows with the same key.
pub fn merge(existing: Table, incoming: Vec<Record>) -> Table {
    let mut out: Table = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<RecordKey, usize> =
        HashMap::with_capacity(existing.len() + incoming.len());

    for row in existing.into_iter().chain(incoming) {
        match index.entry(row.key()) {
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push(row);
            }
            Entry::Occupied(slot) => {
                coalesce_into(&mut out[*slot.get()], row);
            }
        }
    }

    out
}
