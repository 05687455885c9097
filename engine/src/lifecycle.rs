//! 설치/업데이트/제거 라이프사이클
//!
//! ```text
//! Uninstalled  -> Installing
//! Installing   -> Installed | Failed
//! Installed    -> Updating | Uninstalling
//! Updating     -> Installed | Failed
//! Uninstalling -> Uninstalled | Failed
//! Failed       -> Installing | Updating | Uninstalling
//! ```
//!
//! 설치(Installing)는 설치 기록이 없을 때만 허용된다. 따라서 `Failed`에서의
//! 설치는 실패한 최초 설치의 재시도뿐이다.
//!
//! 실패 시 자동 롤백은 없다. 부분적으로 병합된 파일은 그대로 남고,
//! 설치/업데이트를 다시 실행하면 남은 부분이 덮어써진다.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config_sync::ConfigSynchronizer;
use crate::error::EngineError;
use crate::fetcher::{HttpReleaseSource, ReleaseFetcher, ReleaseSource};
use crate::merge::{DirectoryMerger, MergeReport};
use crate::options::PatchOptions;
use crate::state::InstallStateStore;
use crate::EngineConfig;

/// 패치가 설치 루트에 남기는 센티널 파일 (게임이 로드하는 프록시 DLL)
pub const SENTINEL_FILE_NAME: &str = "version.dll";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Uninstalled,
    Installing,
    Installed,
    Updating,
    Uninstalling,
    Failed(String),
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Updating => write!(f, "updating"),
            Self::Uninstalling => write!(f, "uninstalling"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

pub struct StateMachine {
    pub state: LifecycleState,
}

impl StateMachine {
    pub fn new(initial: LifecycleState) -> Self {
        Self { state: initial }
    }

    pub fn can_transition(&self, to: &LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (&self.state, to),
            (Uninstalled, Installing)
                | (Installing, Installed)
                | (Installing, Failed(_))
                | (Installed, Updating)
                | (Installed, Uninstalling)
                | (Updating, Installed)
                | (Updating, Failed(_))
                | (Uninstalling, Uninstalled)
                | (Uninstalling, Failed(_))
                | (Failed(_), Installing)
                | (Failed(_), Updating)
                | (Failed(_), Uninstalling)
        )
    }

    /// 전환 시도. 불가능하면 현재 상태를 유지하고 `InvalidTransition` 반환.
    pub fn transition(&mut self, to: LifecycleState, action: &'static str) -> Result<(), EngineError> {
        if self.can_transition(&to) {
            tracing::info!("[Lifecycle] State transition: {} -> {}", self.state, to);
            self.state = to;
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                from: self.state.to_string(),
                action,
            })
        }
    }
}

/// 설치/업데이트 성공 결과
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    pub root: PathBuf,
    pub report: MergeReport,
    /// UI 초기 상태용 설정 (파일이 없거나 손상되면 기본값)
    pub options: PatchOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleStatus {
    pub state: LifecycleState,
    pub install_root: Option<PathBuf>,
}

/// 라이프사이클 오케스트레이터
///
/// 모든 작업이 `&mut self`를 요구하므로 한 인스턴스에서 동시에 두 작업이
/// 진행될 수 없다.
pub struct InstallLifecycle<S> {
    fetcher: ReleaseFetcher<S>,
    store: InstallStateStore,
    settings: ConfigSynchronizer,
    machine: StateMachine,
}

impl InstallLifecycle<HttpReleaseSource> {
    /// 설정값 기반 HTTP 다운로드를 사용하는 기본 구성
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let source = HttpReleaseSource::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::new(config, source))
    }
}

impl<S: ReleaseSource> InstallLifecycle<S> {
    pub fn new(config: &EngineConfig, source: S) -> Self {
        let store = InstallStateStore::with_path(config.marker_path());
        let initial = match store.load() {
            Ok(root) => {
                tracing::info!("[Lifecycle] Patch already installed at {}", root.display());
                LifecycleState::Installed
            }
            Err(_) => LifecycleState::Uninstalled,
        };

        Self {
            fetcher: ReleaseFetcher::new(config, source),
            store,
            settings: ConfigSynchronizer::new(&config.plugin_dir_name),
            machine: StateMachine::new(initial),
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.machine.state
    }

    pub fn status(&self) -> LifecycleStatus {
        LifecycleStatus {
            state: self.machine.state.clone(),
            install_root: self.store.load().ok(),
        }
    }

    pub fn store(&self) -> &InstallStateStore {
        &self.store
    }

    pub fn settings(&self) -> &ConfigSynchronizer {
        &self.settings
    }

    /// 선택한 설치 루트(게임 바이너리 디렉터리)에 최초 설치
    ///
    /// 설치 기록이 남아 있으면 (업데이트/제거 실패 후 `Failed` 포함) 거부한다.
    /// 기록을 덮어쓰면 이전 루트의 패치 파일 위치를 잃는다.
    pub async fn install(&mut self, target_root: &Path) -> Result<LifecycleOutcome, EngineError> {
        let root = absolute(target_root)?;
        if let Ok(recorded) = self.store.load() {
            tracing::warn!(
                "[Lifecycle] Install rejected, patch still recorded at {}",
                recorded.display()
            );
            return Err(EngineError::InvalidTransition {
                from: self.machine.state.to_string(),
                action: "install",
            });
        }
        self.machine.transition(LifecycleState::Installing, "install")?;
        tracing::info!("[Lifecycle] Installing into {}", root.display());

        let result = self.deploy(&root).await;
        self.finish(result, LifecycleState::Installed)
    }

    /// 기록된 설치 루트에 최신 릴리즈를 다시 병합
    ///
    /// 설치 기록이 없으면 파일 시스템을 건드리지 않고 `NotInstalled`.
    pub async fn update(&mut self) -> Result<LifecycleOutcome, EngineError> {
        let root = self.store.load()?;
        self.machine.transition(LifecycleState::Updating, "update")?;
        tracing::info!("[Lifecycle] Updating {}", root.display());

        let result = self.deploy(&root).await;
        self.finish(result, LifecycleState::Installed)
    }

    /// 병합된 패치 파일 제거 후 설치 기록 삭제
    ///
    /// 삭제에 실패하면 재시도할 수 있도록 설치 기록을 유지한다.
    pub async fn uninstall(&mut self) -> Result<PathBuf, EngineError> {
        let root = self.store.load()?;
        self.machine.transition(LifecycleState::Uninstalling, "uninstall")?;
        tracing::info!("[Lifecycle] Uninstalling from {}", root.display());

        let result = self.remove_patch(&root).map(|_| root);
        self.finish(result, LifecycleState::Uninstalled)
    }

    /// 기록된 설치 루트의 현재 설정 (없으면 기본값)
    pub fn options(&self) -> Result<PatchOptions, EngineError> {
        let root = self.store.load()?;
        Ok(self.settings.load_or_default(&root))
    }

    /// 기록된 설치 루트에 설정 전체 저장
    pub fn save_options(&self, options: &PatchOptions) -> Result<(), EngineError> {
        let root = self.store.load()?;
        self.settings.save(&root, options)
    }

    async fn deploy(&self, root: &Path) -> Result<LifecycleOutcome, EngineError> {
        let staged = self.fetcher.fetch_latest().await?;
        let report = DirectoryMerger::merge(&staged.staging_dir, root)?;
        self.store.save(root)?;
        self.fetcher.cleanup()?;
        let options = self.settings.load_or_default(root);

        Ok(LifecycleOutcome {
            root: root.to_path_buf(),
            report,
            options,
        })
    }

    fn remove_patch(&self, root: &Path) -> Result<(), EngineError> {
        let plugins = root.join("plugins");
        match std::fs::remove_dir_all(&plugins) {
            Ok(()) => tracing::info!("[Lifecycle] Removed {}", plugins.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::io("remove plugins", &plugins, e)),
        }

        let sentinel = root.join(SENTINEL_FILE_NAME);
        match std::fs::remove_file(&sentinel) {
            Ok(()) => tracing::info!("[Lifecycle] Removed {}", sentinel.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::io("remove sentinel", &sentinel, e)),
        }

        self.store.clear()
    }

    /// 작업 결과에 따라 성공 상태 또는 `Failed`로 전환
    fn finish<T>(
        &mut self,
        result: Result<T, EngineError>,
        success: LifecycleState,
    ) -> Result<T, EngineError> {
        let next = match &result {
            Ok(_) => success,
            Err(e) => {
                tracing::error!(
                    "[Lifecycle] {} failed [{}]: {}",
                    self.machine.state,
                    e.error_code(),
                    e
                );
                if e.is_retryable() {
                    tracing::info!("[Lifecycle] The operation can be retried once the cause is resolved");
                }
                LifecycleState::Failed(e.to_string())
            }
        };
        self.machine.transition(next, "complete")?;
        result
    }
}

fn absolute(path: &Path) -> Result<PathBuf, EngineError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| EngineError::io("resolve install root", path, e))
}
