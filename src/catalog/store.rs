use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::hints::PresentationHints;
use crate::catalog::record::{Record, Table};

/// Durable home of the catalog.
///
/// The authoritative representation is a JSON-lines ledger with one row
/// per record. An optional binary cache of the same table is consulted
/// first on load. Saves replace the ledger atomically: the previous file
/// is moved to a `-old` backup before the new one is written, so an
/// interrupted save always leaves either the old ledger or the new one
/// recoverable on disk.
#[derive(Debug, Clone)]
pub struct RecordStore {
    ledger_path: PathBuf,
    cache_path: Option<PathBuf>,
}

fn sibling_with_old_suffix(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-old.{}", ext.to_string_lossy()),
        None => format!("{stem}-old"),
    };
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn hints_sidecar(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".hints.json");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

impl RecordStore {
    pub fn new(ledger_path: PathBuf, cache_path: Option<PathBuf>) -> Self {
        Self {
            ledger_path,
            cache_path,
        }
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling_with_old_suffix(&self.ledger_path)
    }

    pub fn hints_path(&self) -> PathBuf {
        hints_sidecar(&self.ledger_path)
    }

    fn backup_hints_path(&self) -> PathBuf {
        hints_sidecar(&self.backup_path())
    }

    fn parse_ledger(path: &Path) -> Result<Table> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut out = Table::new();
        for (lineno, line) in raw.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let row: Record = serde_json::from_str(trimmed).with_context(|| {
                format!("failed to parse line {} of {}", lineno + 1, path.display())
            })?;
            out.push(row);
        }
        Ok(out)
    }

    fn parse_cache(path: &Path) -> Result<Table> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let table: Table = rmp_serde::from_slice(&raw)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        Ok(table)
    }

    /// Read the canonical ledger directly, bypassing the cache.
    pub fn load_ledger(&self) -> Result<Option<Table>> {
        if !self.ledger_path.exists() {
            return Ok(None);
        }
        Self::parse_ledger(&self.ledger_path).map(Some)
    }

    /// Read the table behind the backup file, when one exists.
    pub fn load_backup(&self) -> Result<Option<Table>> {
        let backup = self.backup_path();
        if !backup.exists() {
            return Ok(None);
        }
        Self::parse_ledger(&backup).map(Some)
    }

    /// Read the cached table, when a cache is configured and present.
    pub fn load_cache(&self) -> Result<Option<Table>> {
        let Some(cache) = &self.cache_path else {
            return Ok(None);
        };
        if !cache.exists() {
            return Ok(None);
        }
        Self::parse_cache(cache).map(Some)
    }

    /// Load the persisted table.
    ///
    /// The cache is consulted first; a cache that fails to decode falls
    /// back to the ledger with a diagnostic. A missing ledger is an empty
    /// table (first run bootstraps cleanly); a ledger that exists but
    /// cannot be read or parsed is a hard error and nothing downstream
    /// may mutate the store.
    pub fn load(&self) -> Result<Table> {
        match self.load_cache() {
            Ok(Some(table)) => return Ok(table),
            Ok(None) => {}
            Err(err) => {
                eprintln!("catalog cache unreadable, falling back to ledger: {err:#}");
            }
        }

        if !self.ledger_path.exists() {
            return Ok(Table::new());
        }
        Self::parse_ledger(&self.ledger_path)
    }

    fn write_cache(&self, table: &Table) -> Result<()> {
        let Some(cache) = &self.cache_path else {
            return Ok(());
        };
        if let Some(parent) = cache.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let encoded = rmp_serde::to_vec(table).context("failed to encode catalog cache")?;
        fs::write(cache, encoded).with_context(|| format!("failed to write {}", cache.display()))?;
        Ok(())
    }

    /// Persist the table, rotating the previous ledger to the backup path
    /// first.
    ///
    /// Order matters: if the move to backup fails, the save aborts with
    /// the current ledger untouched; if the write of the new ledger fails
    /// afterwards, the backup still holds the previous version. The hints
    /// sidecar rotates alongside the ledger, and the cache is rewritten
    /// last (a cache failure does not fail the save).
    pub fn save(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.ledger_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if self.ledger_path.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                fs::remove_file(&backup)
                    .with_context(|| format!("failed to replace stale backup {}", backup.display()))?;
            }
            fs::rename(&self.ledger_path, &backup).with_context(|| {
                format!(
                    "failed to move {} to {}",
                    self.ledger_path.display(),
                    backup.display()
                )
            })?;

            let hints = self.hints_path();
            if hints.exists() {
                let backup_hints = self.backup_hints_path();
                if backup_hints.exists() {
                    let _ = fs::remove_file(&backup_hints);
                }
                if let Err(err) = fs::rename(&hints, &backup_hints) {
                    eprintln!("failed to rotate hints sidecar: {err}");
                }
            }
        }

        let mut out = String::new();
        for row in table {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        fs::write(&self.ledger_path, out)
            .with_context(|| format!("failed to write {}", self.ledger_path.display()))?;

        if let Err(err) = self.write_cache(table) {
            eprintln!("catalog cache write failed (ledger saved): {err:#}");
        }

        Ok(())
    }

    /// Capture the cosmetic layout before a rewrite. Unreadable hints are
    /// reported and treated as absent; they never block a scan.
    pub fn read_presentation_hints(&self) -> PresentationHints {
        let path = self.hints_path();
        if !path.exists() {
            return PresentationHints::default();
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from));
        match parsed {
            Ok(hints) => hints,
            Err(err) => {
                eprintln!(
                    "presentation hints unreadable ({}): {err:#}",
                    path.display()
                );
                PresentationHints::default()
            }
        }
    }

    /// Write the captured layout back next to the freshly saved ledger.
    pub fn apply_presentation_hints(&self, hints: &PresentationHints) -> Result<()> {
        if hints.is_empty() {
            return Ok(());
        }
        let path = self.hints_path();
        let data = serde_json::to_string_pretty(hints)?;
        fs::write(&path, format!("{data}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
