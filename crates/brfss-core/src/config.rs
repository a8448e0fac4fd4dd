use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, DownloadEntry};

/// Directory used when `dest_dir` is unset, relative to the working directory.
pub const DEFAULT_DEST_DIR: &str = "data/raw";

/// Suffix of the extracted survey files.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".XPT";

/// libcurl transfer parameters (optional `[transfer]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard wall-clock limit for a single transfer.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            user_agent: format!("brfss-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Global configuration loaded from `~/.config/brfss/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Where archives are downloaded and unpacked. Relative paths resolve
    /// against the working directory; `None` means `data/raw`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_dir: Option<PathBuf>,
    /// Retry once without TLS peer/host verification when the verified attempt fails.
    #[serde(default)]
    pub insecure_fallback: bool,
    /// Suffix (case-insensitive) of the files reported after a run.
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Replaces the built-in catalog when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<DownloadEntry>>,
}

fn default_artifact_suffix() -> String {
    DEFAULT_ARTIFACT_SUFFIX.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            dest_dir: None,
            insecure_fallback: false,
            artifact_suffix: default_artifact_suffix(),
            transfer: TransferConfig::default(),
            entries: None,
        }
    }
}

impl FetchConfig {
    /// Destination directory resolved against `cwd`.
    pub fn resolve_dest_dir(&self, cwd: &Path) -> PathBuf {
        let dir = self
            .dest_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR));
        if dir.is_absolute() {
            dir
        } else {
            cwd.join(dir)
        }
    }

    /// The configured catalog, or the built-in one. Configured entries are validated.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.entries {
            Some(entries) => Catalog::new(entries.clone()).context("invalid [[entries]] in config"),
            None => Ok(Catalog::builtin()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("brfss")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
