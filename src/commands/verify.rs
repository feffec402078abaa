use anyhow::Result;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use crate::catalog::config::load_config;
use crate::catalog::record::Table;
use crate::catalog::store::RecordStore;
use crate::commands::CommandReport;

include!(concat!(env!("OUT_DIR"), "/msgcat_env_allowlist.rs"));

fn check_duplicate_keys(report: &mut CommandReport, label: &str, table: &Table) {
    let mut seen = HashSet::new();
    for row in table {
        if !seen.insert(row.key()) {
            report.issue(format!(
                "{label} has duplicate key (subject={:?}, path={:?})",
                row.subject, row.path
            ));
        }
    }
}

fn check_env_allowlist(report: &mut CommandReport) {
    for (key, _) in env::vars() {
        if key.starts_with("MSGCAT_") && !GENERATED_MSGCAT_ENV_ALLOWLIST.contains(&key.as_str()) {
            report.issue(format!("unrecognized environment variable: {key}"));
        }
    }
}

pub fn run() -> Result<CommandReport> {
    let cfg = load_config()?;
    let store = RecordStore::new(
        PathBuf::from(&cfg.store.ledger_path),
        cfg.store.cache_path.as_ref().map(PathBuf::from),
    );

    let mut report = CommandReport::new("verify");
    report.detail(format!("ledger={}", store.ledger_path().display()));

    let mut ledger_rows: Option<usize> = None;
    match store.load_ledger() {
        Ok(Some(table)) => {
            report.detail(format!("ledger rows={}", table.len()));
            check_duplicate_keys(&mut report, "ledger", &table);
            ledger_rows = Some(table.len());
        }
        Ok(None) => report.detail("ledger missing (no scan has run yet)"),
        Err(err) => report.issue(format!("ledger unreadable: {err:#}")),
    }

    match store.load_backup() {
        Ok(Some(backup)) => report.detail(format!("backup rows={}", backup.len())),
        Ok(None) => report.detail("backup absent"),
        Err(err) => report.issue(format!("backup unreadable: {err:#}")),
    }

    match store.load_cache() {
        Ok(Some(cache)) => {
            report.detail(format!("cache rows={}", cache.len()));
            if let Some(rows) = ledger_rows
                && cache.len() != rows
            {
                report.issue(format!(
                    "cache rows ({}) disagree with ledger rows ({rows})",
                    cache.len()
                ));
            }
        }
        Ok(None) => report.detail("cache absent"),
        Err(err) => report.issue(format!("cache unreadable: {err:#}")),
    }

    check_env_allowlist(&mut report);

    Ok(report)
}
