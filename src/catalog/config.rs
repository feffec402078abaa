use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root of the directory tree to catalog.
    pub dir_path: String,
    /// Message file extension, without the dot.
    pub extension: String,
    /// Files whose full path renders longer than this are skipped.
    pub max_path_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dir_path: ".".to_string(),
            extension: "eml".to_string(),
            max_path_len: 260,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Canonical ledger location. Empty means the per-user default.
    pub ledger_path: String,
    /// Optional faster-load cache consulted before the ledger.
    pub cache_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Progress line after every this many processed messages.
    pub progress_every: usize,
    /// Interactive checkpoint after every this many processed messages.
    pub checkpoint_every: usize,
    pub pause_enabled: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            progress_every: 1_000,
            checkpoint_every: 10_000,
            pause_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub scan: ScanConfig,
    pub store: StoreConfig,
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PartialCatalogConfig {
    scan: Option<ScanConfig>,
    store: Option<StoreConfig>,
    pacing: Option<PacingConfig>,
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_opt_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn validate(cfg: &CatalogConfig) -> Result<()> {
    if cfg.scan.dir_path.trim().is_empty() {
        return Err(anyhow!("invalid scan root: cannot be empty"));
    }
    let ext = cfg.scan.extension.trim();
    if ext.is_empty() {
        return Err(anyhow!("invalid extension: cannot be empty"));
    }
    if ext.starts_with('.') || ext.contains('/') || ext.contains('\\') {
        return Err(anyhow!(
            "invalid extension `{ext}`: use the bare extension without a dot"
        ));
    }
    if cfg.scan.max_path_len == 0 {
        return Err(anyhow!("invalid max path length: must be >= 1"));
    }
    if cfg.store.ledger_path.trim().is_empty() {
        return Err(anyhow!("invalid ledger path: cannot be empty"));
    }
    if cfg
        .store
        .cache_path
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(anyhow!("invalid cache path: cannot be empty when set"));
    }
    if cfg.pacing.progress_every == 0 {
        return Err(anyhow!("invalid progress interval: must be >= 1"));
    }
    if cfg.pacing.checkpoint_every == 0 {
        return Err(anyhow!("invalid checkpoint interval: must be >= 1"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("MSGCAT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".msgcat").join("msgcat.toml"))
}

fn apply_file_config(base: &mut CatalogConfig, raw: &str, origin: &str) -> Result<()> {
    let parsed: PartialCatalogConfig =
        toml::from_str(raw).map_err(|err| anyhow!("failed to parse config {origin}: {err}"))?;
    if let Some(scan) = parsed.scan {
        base.scan = scan;
    }
    if let Some(store) = parsed.store {
        base.store = store;
    }
    if let Some(pacing) = parsed.pacing {
        base.pacing = pacing;
    }
    Ok(())
}

fn merge_file_config(base: &mut CatalogConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    apply_file_config(base, &raw, &path.display().to_string())
}

fn default_ledger_path() -> Result<String> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("HOME directory could not be resolved"))?;
    Ok(home.join(".msgcat").join("catalog.jsonl").display().to_string())
}

pub fn load_config() -> Result<CatalogConfig> {
    let mut cfg = CatalogConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.scan.dir_path = env_or_string("MSGCAT_DIR_PATH", &cfg.scan.dir_path);
    cfg.scan.extension = env_or_string("MSGCAT_EXTENSION", &cfg.scan.extension);
    cfg.scan.max_path_len = env_or_usize("MSGCAT_MAX_PATH_LEN", cfg.scan.max_path_len);
    cfg.store.ledger_path = env_or_string("MSGCAT_LEDGER_PATH", &cfg.store.ledger_path);
    cfg.store.cache_path = env_or_opt_string("MSGCAT_CACHE_PATH", cfg.store.cache_path.take());
    cfg.pacing.progress_every = env_or_usize("MSGCAT_PROGRESS_EVERY", cfg.pacing.progress_every);
    cfg.pacing.checkpoint_every =
        env_or_usize("MSGCAT_CHECKPOINT_EVERY", cfg.pacing.checkpoint_every);
    cfg.pacing.pause_enabled = env_or_bool("MSGCAT_PAUSE_ENABLED", cfg.pacing.pause_enabled);

    if cfg.store.ledger_path.trim().is_empty() {
        cfg.store.ledger_path = default_ledger_path()?;
    }

    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CatalogConfig {
        let mut cfg = CatalogConfig::default();
        cfg.store.ledger_path = "/tmp/catalog.jsonl".to_string();
        cfg
    }

    #[test]
    fn defaults_pass_validation_once_ledger_is_set() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_dotted_extension() {
        let mut cfg = valid_config();
        cfg.scan.extension = ".eml".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut cfg = valid_config();
        cfg.pacing.progress_every = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.pacing.checkpoint_every = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.scan.max_path_len = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn file_config_replaces_whole_sections() {
        let mut cfg = valid_config();
        let raw = r#"
[scan]
dir_path = "/mail"
extension = "msg"
max_path_len = 200
"#;
        apply_file_config(&mut cfg, raw, "test").expect("apply");
        assert_eq!(cfg.scan.dir_path, "/mail");
        assert_eq!(cfg.scan.extension, "msg");
        assert_eq!(cfg.scan.max_path_len, 200);
        // Untouched sections keep their values.
        assert_eq!(cfg.store.ledger_path, "/tmp/catalog.jsonl");
    }

    #[test]
    fn file_config_with_bad_toml_is_an_error() {
        let mut cfg = valid_config();
        assert!(apply_file_config(&mut cfg, "not = [toml", "test").is_err());
    }
}
