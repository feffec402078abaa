use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::catalog::config::load_config;
use crate::catalog::ingest::ingest;
use crate::catalog::pacing::ConsolePacer;
use crate::catalog::reader::MailFileReader;
use crate::catalog::store::RecordStore;
use crate::commands::CommandReport;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub root: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub no_pause: bool,
    pub dry_run: bool,
}

pub fn run(opts: &ScanOptions) -> Result<CommandReport> {
    let mut cfg = load_config()?;
    if let Some(root) = &opts.root {
        cfg.scan.dir_path = root.display().to_string();
    }
    if let Some(store) = &opts.store {
        cfg.store.ledger_path = store.display().to_string();
    }

    let mut report = CommandReport::new("scan");
    report.detail(format!("root={}", cfg.scan.dir_path));
    report.detail(format!("ledger={}", cfg.store.ledger_path));
    report.detail(format!("extension={}", cfg.scan.extension));

    let root = Path::new(&cfg.scan.dir_path);
    if !root.is_dir() {
        report.issue(format!("scan root is not a directory: {}", root.display()));
        return Ok(report);
    }

    let store = RecordStore::new(
        PathBuf::from(&cfg.store.ledger_path),
        cfg.store.cache_path.as_ref().map(PathBuf::from),
    );
    let reader = MailFileReader;
    let mut pacer = ConsolePacer::new(
        cfg.pacing.progress_every,
        cfg.pacing.checkpoint_every,
        cfg.pacing.pause_enabled && !opts.no_pause,
    );

    let outcome = ingest(&cfg, &store, &reader, &mut pacer, opts.dry_run)?;

    report.detail(format!("scanned={}", outcome.scanned));
    report.detail(format!("already_known={}", outcome.pre_filtered));
    report.detail(format!("skipped={}", outcome.skipped));
    report.detail(format!("added={}", outcome.added));
    report.detail(format!("total_rows={}", outcome.total_rows));
    if opts.dry_run {
        report.detail("dry-run: merged table not saved");
    }

    Ok(report)
}
