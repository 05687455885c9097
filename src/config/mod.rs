//! 인스톨러 설정 (`config/installer.toml`)
//!
//! ```toml
//! log_level = "debug"
//!
//! [engine]
//! release_url = "https://example.com/Release.zip"
//! work_dir = "C:\\Tools\\cet"
//! ```
//!
//! 누락된 키는 기본값 유지. `CET_INSTALL_WORK_DIR` 환경변수가 `work_dir`보다 우선한다.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cet_install_engine::EngineConfig;
use serde::Deserialize;

pub const CONFIG_RELATIVE_PATH: &str = "config/installer.toml";
pub const WORK_DIR_ENV: &str = "CET_INSTALL_WORK_DIR";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct InstallerConfig {
    /// tracing 필터 (RUST_LOG가 설정되어 있으면 그쪽이 우선)
    pub log_level: Option<String>,
    pub engine: EngineConfig,
}

impl InstallerConfig {
    /// 실행 파일 옆 → 현재 작업 디렉터리 순으로 설정 파일 탐색, 없으면 기본값
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match Self::resolve_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides(std::env::var(WORK_DIR_ENV).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let cfg: Self = toml::from_str(&s)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(cfg)
    }

    fn resolve_path() -> Option<PathBuf> {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let candidate = dir.join(CONFIG_RELATIVE_PATH);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        let cwd = PathBuf::from(CONFIG_RELATIVE_PATH);
        cwd.is_file().then_some(cwd)
    }

    fn apply_env_overrides(&mut self, work_dir: Option<String>) {
        if let Some(dir) = work_dir.filter(|d| !d.trim().is_empty()) {
            self.engine.work_dir = Some(dir);
        }
    }
}
