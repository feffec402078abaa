use anyhow::Result;
use std::path::PathBuf;

use crate::catalog::config::load_config;
use crate::catalog::store::RecordStore;
use crate::catalog::util::file_age_secs;
use crate::commands::CommandReport;

pub fn run() -> Result<CommandReport> {
    let cfg = load_config()?;
    let store = RecordStore::new(
        PathBuf::from(&cfg.store.ledger_path),
        cfg.store.cache_path.as_ref().map(PathBuf::from),
    );

    let mut report = CommandReport::new("status");
    report.detail(format!("build={}", env!("BUILD_UUID")));
    report.detail(format!("ledger={}", store.ledger_path().display()));

    match store.load_ledger() {
        Ok(Some(table)) => {
            report.detail(format!("rows={}", table.len()));
            if let Some(age) = file_age_secs(store.ledger_path()) {
                report.detail(format!("ledger_age_secs={age}"));
            }
        }
        Ok(None) => report.detail("ledger missing (no scan has run yet)"),
        Err(err) => report.issue(format!("ledger unreadable: {err:#}")),
    }

    let backup = store.backup_path();
    if backup.exists() {
        report.detail(format!("backup={}", backup.display()));
        if let Some(age) = file_age_secs(&backup) {
            report.detail(format!("backup_age_secs={age}"));
        }
    } else {
        report.detail("backup absent");
    }

    match store.cache_path() {
        Some(cache) if cache.exists() => report.detail(format!("cache={}", cache.display())),
        Some(cache) => report.detail(format!("cache not yet written: {}", cache.display())),
        None => report.detail("cache not configured"),
    }

    let hints = store.hints_path();
    if hints.exists() {
        report.detail(format!("hints={}", hints.display()));
    }

    Ok(report)
}
