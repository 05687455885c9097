//! 설치 트리 안의 패치 설정 파일 동기화
//!
//! `<install_root>/plugins/<plugin>/config.json`을 읽고 쓴다.
//! 로드 실패는 "아직 설정 없음"으로 간주되어 호출 측에서 기본값으로 복구한다.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::options::PatchOptions;

pub const SETTINGS_FILE_NAME: &str = "config.json";

pub struct ConfigSynchronizer {
    plugin_dir_name: String,
}

impl ConfigSynchronizer {
    pub fn new(plugin_dir_name: &str) -> Self {
        Self {
            plugin_dir_name: plugin_dir_name.to_string(),
        }
    }

    /// `<install_root>/plugins/<plugin>`
    pub fn plugin_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join("plugins").join(&self.plugin_dir_name)
    }

    pub fn settings_path(&self, install_root: &Path) -> PathBuf {
        self.plugin_dir(install_root).join(SETTINGS_FILE_NAME)
    }

    /// 패치 런타임이 게임 실행 중에 남기는 로그 파일
    pub fn log_path(&self, install_root: &Path) -> PathBuf {
        self.plugin_dir(install_root)
            .join(format!("{}.log", self.plugin_dir_name))
    }

    /// 설정 파일 로드 + 범위 검증
    pub fn load(&self, install_root: &Path) -> Result<PatchOptions, EngineError> {
        let path = self.settings_path(install_root);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            EngineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let options: PatchOptions = serde_json::from_str(&content).map_err(|e| {
            EngineError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        options.validate()?;
        tracing::debug!("[Config] Loaded settings from {}", path.display());
        Ok(options)
    }

    /// 로드 실패 시 기본값
    pub fn load_or_default(&self, install_root: &Path) -> PatchOptions {
        match self.load(install_root) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!("[Config] Using default settings: {}", e);
                PatchOptions::default()
            }
        }
    }

    /// 전체 옵션을 한 번에 저장 (부분 갱신 없음)
    pub fn save(&self, install_root: &Path, options: &PatchOptions) -> Result<(), EngineError> {
        options.validate()?;

        let dir = self.plugin_dir(install_root);
        if !dir.is_dir() {
            tracing::warn!("[Config] Plugin directory missing: {}", dir.display());
            return Err(EngineError::NotInstalled);
        }

        let json = serde_json::to_string_pretty(options)
            .map_err(|e| EngineError::Config(format!("serialize error: {}", e)))?;

        let path = self.settings_path(install_root);
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| EngineError::io("save settings", &dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| EngineError::io("save settings", tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| EngineError::io("save settings", &path, e.error))?;

        tracing::info!("[Config] Saved settings to {}", path.display());
        Ok(())
    }
}
