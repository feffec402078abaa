use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of the persisted ledger, in row order. External tools
/// consuming the ledger rely on these exact keys.
pub const COLUMNS: &[&str] = &["Subject", "Path", "Sender", "Recipients", "Archive", "Date"];

/// One cataloged message entry.
///
/// `subject` and `path` form the identity of a row; everything else is
/// payload that may be absent. A field that is `None` means "unknown",
/// and a known value is never replaced by an unknown one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Sender", default)]
    pub sender: Option<String>,
    #[serde(rename = "Recipients", default)]
    pub recipients: Option<String>,
    #[serde(rename = "Archive", default)]
    pub archive: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<DateTime<Utc>>,
}

/// The `(subject, path)` pair that uniquely determines a row in the
/// catalog. Field content never participates in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub subject: String,
    pub path: String,
}

impl Record {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            subject: self.subject.clone(),
            path: self.path.clone(),
        }
    }
}

/// The full catalog at a point in time, in persisted row order.
pub type Table = Vec<Record>;
