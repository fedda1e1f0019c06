use anyhow::{Context, Result};
use dirs_next as dirs;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use super::model::DiagnosticsConfig;

const CONFIG_DIR_NAME: &str = "proxy-diagnostics";
const CONFIG_FILE_NAME: &str = "proxy-diagnostics.json";

fn join_default_path(base: &Path) -> PathBuf {
    let mut p = base.to_path_buf();
    p.push("config");
    p.push(CONFIG_FILE_NAME);
    p
}

/// Default config location under the platform config dir
///
/// Falls back to the current directory when no config dir is known.
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir()
        .map(|mut dir| {
            dir.push(CONFIG_DIR_NAME);
            dir
        })
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    join_default_path(&base)
}

pub fn load_or_init() -> Result<DiagnosticsConfig> {
    load_or_init_at_path(&default_config_path())
}

pub fn load_or_init_at(base_dir: &Path) -> Result<DiagnosticsConfig> {
    load_or_init_at_path(&join_default_path(base_dir))
}

pub fn save_at(cfg: &DiagnosticsConfig, base_dir: &Path) -> Result<()> {
    save_at_path(cfg, &join_default_path(base_dir))
}

/// Read a config file without creating it
pub fn load_from_path(path: &Path) -> Result<DiagnosticsConfig> {
    let data = fs::read(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: DiagnosticsConfig =
        serde_json::from_slice(&data).context("parse diagnostics config json")?;
    Ok(cfg)
}

fn load_or_init_at_path(path: &Path) -> Result<DiagnosticsConfig> {
    if path.exists() {
        load_from_path(path)
    } else {
        let cfg = DiagnosticsConfig::default();
        save_at_path(&cfg, path)?;
        Ok(cfg)
    }
}

fn save_at_path(cfg: &DiagnosticsConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create config dir: {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(cfg).context("serialize config")?;
    let mut f =
        fs::File::create(path).with_context(|| format!("create config: {}", path.display()))?;
    f.write_all(json.as_bytes()).context("write config")?;
    tracing::info!(target = "config", path = %path.display(), "diagnostics config saved");
    Ok(())
}
