//! 시작 시 상태 보고
//!
//! 1. 인스톨러 새 버전 확인 (실패해도 계속 진행)
//! 2. 설치 기록으로 "설치" / "이미 설치됨" 판단
//! 3. 설치된 경우 패치 설정 로드 (손상 시 기본값)
//! 4. 미설치면 게임 폴더 후보 탐색

use std::path::PathBuf;

use cet_install_engine::{
    EngineConfig, InstallLifecycle, LifecycleState, LifecycleStatus, PatchOptions, ReleaseSource,
    UpdateCheck,
};
use serde::Serialize;

use crate::path_detector::{install_root_for, PathDetector};
use crate::process_monitor;

#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub installer_version: String,
    /// 버전 확인 실패 시 None
    pub update: Option<UpdateCheck>,
    pub status: LifecycleStatus,
    pub options: Option<PatchOptions>,
    /// 게임 실행 중 패치 런타임이 남기는 로그
    pub runtime_log: Option<PathBuf>,
    /// 미설치 상태에서 찾은 설치 루트 후보 (`<game>/bin/x64`)
    pub install_candidates: Vec<PathBuf>,
    pub game_running: bool,
}

pub async fn check_installer_update(config: &EngineConfig) -> Option<UpdateCheck> {
    let client = match config.github_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Version check unavailable: {}", e);
            return None;
        }
    };
    match client.check_for_update(env!("CARGO_PKG_VERSION")).await {
        Ok(check) => Some(check),
        Err(e) => {
            tracing::warn!("Version check failed [{}]: {}", e.error_code(), e);
            None
        }
    }
}

pub async fn build_startup_report<S: ReleaseSource>(
    config: &EngineConfig,
    lifecycle: &InstallLifecycle<S>,
) -> StartupReport {
    let update = check_installer_update(config).await;
    let status = lifecycle.status();

    let (options, runtime_log, install_candidates) = match (&status.state, &status.install_root) {
        (LifecycleState::Installed, Some(root)) => {
            tracing::info!("Already installed at {}", root.display());
            let options = lifecycle.options().ok();
            (options, Some(lifecycle.settings().log_path(root)), Vec::new())
        }
        _ => {
            tracing::info!("Patch not installed, looking for game folders");
            let candidates = match PathDetector::detect_default_game_dirs() {
                Ok(dirs) => dirs.iter().map(|d| install_root_for(d)).collect(),
                Err(e) => {
                    tracing::warn!("Game folder detection failed: {}", e);
                    Vec::new()
                }
            };
            (None, None, candidates)
        }
    };

    let game_running = process_monitor::is_game_running_async().await;
    if game_running {
        tracing::warn!("Cyberpunk 2077 is running; close it before updating or uninstalling");
    }

    StartupReport {
        installer_version: env!("CARGO_PKG_VERSION").to_string(),
        update,
        status,
        options,
        runtime_log,
        install_candidates,
        game_running,
    }
}
