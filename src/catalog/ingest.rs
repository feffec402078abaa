use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;

use crate::catalog::config::CatalogConfig;
use crate::catalog::merge;
use crate::catalog::normalize::normalize;
use crate::catalog::pacing::Pacer;
use crate::catalog::reader::MessageReader;
use crate::catalog::record::{Record, RecordKey};
use crate::catalog::scanner::{self, ScanOptions};
use crate::catalog::store::RecordStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOutcome {
    /// Candidate files the scanner yielded.
    pub scanned: usize,
    /// Candidates dropped by the known-key pre-filter, without reading.
    pub pre_filtered: usize,
    /// Candidates whose read failed with a tolerated error.
    pub skipped: usize,
    /// Rows the merge added to the table.
    pub added: usize,
    /// Rows in the merged table.
    pub total_rows: usize,
    pub saved: bool,
}

/// One full catalog pass: load the stored table, scan the root for new
/// message files, merge what was found, and persist the result.
///
/// Files whose name-derived key is already in the store are dropped
/// before the reader ever sees them, so a re-scan of an unchanged tree
/// does no message parsing at all. Read failures of a tolerated kind
/// skip the file with a diagnostic; any other failure aborts the run.
pub fn ingest(
    cfg: &CatalogConfig,
    store: &RecordStore,
    reader: &dyn MessageReader,
    pacer: &mut dyn Pacer,
    dry_run: bool,
) -> Result<IngestOutcome> {
    let existing = store.load()?;
    let existing_rows = existing.len();
    let hints = store.read_presentation_hints();

    let known: HashSet<RecordKey> = existing.iter().map(Record::key).collect();

    let scan_opts = ScanOptions {
        extension: cfg.scan.extension.clone(),
        max_path_len: cfg.scan.max_path_len,
    };

    let mut outcome = IngestOutcome::default();
    let mut batch: Vec<Record> = Vec::new();

    for candidate in scanner::scan(Path::new(&cfg.scan.dir_path), &scan_opts) {
        outcome.scanned += 1;

        let file_key = RecordKey {
            subject: normalize(&candidate.file_name),
            path: candidate.folder.clone(),
        };
        if known.contains(&file_key) {
            outcome.pre_filtered += 1;
            continue;
        }

        let fields = match reader.read(&candidate.file_path) {
            Ok(fields) => fields,
            Err(err) if err.is_skippable() => {
                eprintln!("skipping {}: {err}", candidate.file_path.display());
                outcome.skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("failed to read {}", candidate.file_path.display())));
            }
        };

        batch.push(Record {
            subject: normalize(&fields.subject),
            path: candidate.folder,
            sender: fields.sender,
            recipients: fields.recipients,
            archive: None,
            date: Some(Utc::now()),
        });
        pacer.processed(batch.len());
    }

    let merged = merge::merge(existing, batch);
    outcome.added = merged.len().saturating_sub(existing_rows);
    outcome.total_rows = merged.len();

    if !dry_run {
        store.save(&merged).context("failed to persist catalog")?;
        if let Err(err) = store.apply_presentation_hints(&hints) {
            eprintln!("failed to reapply presentation hints: {err:#}");
        }
        outcome.saved = true;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reader::{MessageFields, ReadError};
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    struct StubReader {
        calls: Cell<usize>,
        fail_with: Option<fn() -> ReadError>,
    }

    impl StubReader {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail_with: None,
            }
        }

        fn failing(kind: fn() -> ReadError) -> Self {
            Self {
                calls: Cell::new(0),
                fail_with: Some(kind),
            }
        }
    }

    impl MessageReader for StubReader {
        fn read(&self, path: &Path) -> Result<MessageFields, ReadError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(kind) = self.fail_with {
                return Err(kind());
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            Ok(MessageFields {
                subject: stem.to_string(),
                sender: Some("sender@example.com".to_string()),
                recipients: None,
            })
        }
    }

    fn test_config(root: &Path, ledger: &Path) -> CatalogConfig {
        let mut cfg = CatalogConfig::default();
        cfg.scan.dir_path = root.display().to_string();
        cfg.store.ledger_path = ledger.display().to_string();
        cfg.pacing.pause_enabled = false;
        cfg
    }

    fn test_store(cfg: &CatalogConfig) -> RecordStore {
        RecordStore::new(cfg.store.ledger_path.clone().into(), None)
    }

    struct CountingPacer {
        ticks: usize,
    }

    impl Pacer for CountingPacer {
        fn processed(&mut self, _count: usize) {
            self.ticks += 1;
        }
    }

    #[test]
    fn known_files_never_reach_the_reader() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("alpha.eml"), "x").expect("write");
        fs::write(root.join("beta.eml"), "x").expect("write");

        let cfg = test_config(&root, &tmp.path().join("catalog.jsonl"));
        let store = test_store(&cfg);
        store
            .save(&vec![Record {
                subject: "alpha".to_string(),
                path: root.display().to_string(),
                sender: None,
                recipients: None,
                archive: None,
                date: None,
            }])
            .expect("seed store");

        let reader = StubReader::new();
        let mut pacer = CountingPacer { ticks: 0 };
        let outcome = ingest(&cfg, &store, &reader, &mut pacer, false).expect("ingest");

        assert_eq!(reader.calls.get(), 1, "known file was re-read");
        assert_eq!(outcome.scanned, 2);
        assert_eq!(outcome.pre_filtered, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(pacer.ticks, 1);
    }

    #[test]
    fn tolerated_read_failures_skip_the_file_and_continue() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("bad.eml"), "x").expect("write");

        let cfg = test_config(&root, &tmp.path().join("catalog.jsonl"));
        let store = test_store(&cfg);

        for kind in [
            (|| ReadError::MalformedContainer) as fn() -> ReadError,
            || ReadError::FieldAccess("sender".to_string()),
            || ReadError::Unimplemented("nested container".to_string()),
            || ReadError::UnrecognizedSubtype("report".to_string()),
        ] {
            let reader = StubReader::failing(kind);
            let mut pacer = CountingPacer { ticks: 0 };
            let outcome = ingest(&cfg, &store, &reader, &mut pacer, true).expect("ingest");
            assert_eq!(outcome.skipped, 1);
            assert_eq!(outcome.added, 0);
        }
    }

    #[test]
    fn untolerated_read_failures_abort_the_run() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("bad.eml"), "x").expect("write");

        let cfg = test_config(&root, &tmp.path().join("catalog.jsonl"));
        let store = test_store(&cfg);
        let reader = StubReader::failing(|| ReadError::Io(std::io::Error::other("boom")));
        let mut pacer = CountingPacer { ticks: 0 };
        assert!(ingest(&cfg, &store, &reader, &mut pacer, true).is_err());
    }

    #[test]
    fn dry_run_reports_counts_without_saving() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("one.eml"), "x").expect("write");

        let cfg = test_config(&root, &tmp.path().join("catalog.jsonl"));
        let store = test_store(&cfg);
        let reader = StubReader::new();
        let mut pacer = CountingPacer { ticks: 0 };
        let outcome = ingest(&cfg, &store, &reader, &mut pacer, true).expect("ingest");

        assert_eq!(outcome.added, 1);
        assert!(!outcome.saved);
        assert!(!store.ledger_path().exists());
    }

    #[test]
    fn corrupt_store_aborts_before_any_scan() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("one.eml"), "x").expect("write");

        let ledger = tmp.path().join("catalog.jsonl");
        fs::write(&ledger, "{broken\n").expect("write");

        let cfg = test_config(&root, &ledger);
        let store = test_store(&cfg);
        let reader = StubReader::new();
        let mut pacer = CountingPacer { ticks: 0 };
        assert!(ingest(&cfg, &store, &reader, &mut pacer, false).is_err());
        assert_eq!(reader.calls.get(), 0);
    }

    #[test]
    fn second_pass_over_an_unchanged_tree_adds_nothing() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("mail");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("one.eml"), "x").expect("write");
        fs::write(root.join("two.eml"), "x").expect("write");

        let cfg = test_config(&root, &tmp.path().join("catalog.jsonl"));
        let store = test_store(&cfg);

        let reader = StubReader::new();
        let mut pacer = CountingPacer { ticks: 0 };
        let first = ingest(&cfg, &store, &reader, &mut pacer, false).expect("first pass");
        assert_eq!(first.added, 2);

        let reader = StubReader::new();
        let second = ingest(&cfg, &store, &reader, &mut pacer, false).expect("second pass");
        assert_eq!(second.added, 0);
        assert_eq!(second.pre_filtered, 2);
        assert_eq!(reader.calls.get(), 0, "unchanged tree was re-parsed");
        assert_eq!(second.total_rows, 2);
    }
}
