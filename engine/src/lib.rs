//! # CET 설치 엔진
//!
//! Cyber Engine Tweaks 릴리즈를 게임 바이너리 디렉터리(`<game>/bin/x64`)에
//! 설치/업데이트/제거하고, 설치 트리 안의 `config.json`을 사용자 옵션과 동기화한다.
//!
//! ## 구성
//! - **fetcher.rs**: 릴리즈 다운로드, 검증, 스테이징 디렉터리에 압축 해제
//! - **merge.rs**: 스테이징 트리를 설치 루트에 파일 단위로 덮어쓰기 병합
//! - **state.rs**: "어디에 설치되었는가" 기록 (`game_path` 마커 파일)
//! - **config_sync.rs**: `plugins/cyber_engine_tweaks/config.json` 읽기/쓰기
//! - **lifecycle.rs**: 위 구성 요소를 묶는 설치/업데이트/제거 상태 머신
//! - **github.rs / version.rs**: 인스톨러 자체의 새 버전 확인
//!
//! ## 작업 디렉터리
//! ```text
//! <work_dir>/
//!   game_path      # 설치 루트 절대 경로 (설치 기록)
//!   Release.zip    # 다운로드한 아카이브 (병합 후 삭제)
//!   Patch/         # 스테이징 트리 (병합 후 삭제)
//! ```

// ══════════════════════════════════════════════════════
// 모듈
// ══════════════════════════════════════════════════════

pub mod config_sync;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod lifecycle;
pub mod merge;
pub mod options;
pub mod state;
pub mod version;


// Re-exports for convenience
pub use config_sync::ConfigSynchronizer;
pub use error::EngineError;
pub use fetcher::{extract_archive, HttpReleaseSource, ReleaseFetcher, ReleaseSource, StagedRelease};
pub use github::{GitHubClient, UpdateCheck};
pub use lifecycle::{InstallLifecycle, LifecycleOutcome, LifecycleState, LifecycleStatus};
pub use merge::{DirectoryMerger, MergeReport};
pub use options::PatchOptions;
pub use state::InstallStateStore;
pub use version::Version;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ARCHIVE_FILE_NAME: &str = "Release.zip";
pub const STAGING_DIR_NAME: &str = "Patch";

/// 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 최신 릴리즈 아카이브 URL
    pub release_url: String,
    /// 선택: 아카이브 SHA256 해시 (불일치 시 설치 중단)
    pub expected_sha256: Option<String>,
    /// 설치 기록/스크래치 파일 위치 (기본값: 현재 작업 디렉터리)
    pub work_dir: Option<String>,
    /// `plugins/` 아래 패치 디렉터리 이름
    pub plugin_dir_name: String,
    /// 인스톨러 GitHub 레포지토리 (버전 확인용)
    pub github_owner: String,
    pub github_repo: String,
    /// API 베이스 URL 오버라이드 (테스트용 로컬 서버 지원,
    /// 예: "http://127.0.0.1:9876" 처럼 GitHub API 대신 사용할 URL 설정)
    pub api_base_url: Option<String>,
    /// HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            release_url:
                "https://github.com/yamashi/PerformanceOverhaulCyberpunk/releases/latest/download/Release.zip"
                    .to_string(),
            expected_sha256: None,
            work_dir: None,
            plugin_dir_name: "cyber_engine_tweaks".to_string(),
            github_owner: "LittleZen".to_string(),
            github_repo: "Cyberpunk2077-Patch-Easy-Installer".to_string(),
            api_base_url: None,
            request_timeout_secs: 60,
        }
    }
}

impl EngineConfig {
    pub fn resolve_work_dir(&self) -> PathBuf {
        self.work_dir
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn marker_path(&self) -> PathBuf {
        self.resolve_work_dir().join(state::MARKER_FILE_NAME)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.resolve_work_dir().join(ARCHIVE_FILE_NAME)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.resolve_work_dir().join(STAGING_DIR_NAME)
    }

    /// 설정값 기반 GitHub 클라이언트 (api_base_url 오버라이드 지원)
    pub fn github_client(&self) -> Result<GitHubClient, EngineError> {
        GitHubClient::with_base_url(
            &self.github_owner,
            &self.github_repo,
            self.api_base_url.as_deref(),
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}

/// 사용자가 고른 게임 폴더 → 패치가 병합될 바이너리 디렉터리
pub fn game_binary_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("bin").join("x64")
}
