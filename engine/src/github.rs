//! GitHub Release API 클라이언트
//!
//! 인스톨러 자신의 최신 릴리즈 태그를 가져와 빌드 시점 버전과 비교한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EngineError;
use crate::version::Version;

/// GitHub Release 응답 (필요한 필드만)
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    pub html_url: String,
}

/// 버전 확인 결과
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCheck {
    pub current: String,
    pub latest: String,
    pub update_available: bool,
    /// 새 버전을 받을 수 있는 릴리즈 페이지
    pub release_url: String,
}

/// GitHub API 클라이언트
pub struct GitHubClient {
    owner: String,
    repo: String,
    http: reqwest::Client,
    /// API 베이스 URL (기본: "https://api.github.com")
    /// 로컬 mock 서버 테스트 시 "http://127.0.0.1:9876" 등으로 오버라이드
    base_url: String,
}

impl GitHubClient {
    /// base_url을 오버라이드할 수 있는 생성자 (테스트/mock 서버용)
    pub fn with_base_url(
        owner: &str,
        repo: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cet-easy-install/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::from_reqwest(&e, "create HTTP client"))?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            http,
            base_url: base_url
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("https://api.github.com")
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// 최신 릴리스 가져오기 (프리릴리스 제외)
    pub async fn fetch_latest_release(&self) -> Result<GitHubRelease, EngineError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, self.owner, self.repo
        );

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest(&e, "version check"))?;

        if !response.status().is_success() {
            return Err(EngineError::Network {
                operation: "version check".to_string(),
                message: format!("GitHub API error ({})", response.status()),
            });
        }

        response
            .json::<GitHubRelease>()
            .await
            .map_err(|e| EngineError::from_reqwest(&e, "version check"))
    }

    /// 최신 릴리즈 태그와 `current` 버전을 비교
    pub async fn check_for_update(&self, current: &str) -> Result<UpdateCheck, EngineError> {
        let release = self.fetch_latest_release().await?;
        let latest = Version::parse(&release.tag_name).ok_or_else(|| EngineError::Network {
            operation: "version check".to_string(),
            message: format!("unrecognized release tag '{}'", release.tag_name),
        })?;
        let current = Version::parse(current).unwrap_or_else(Version::current);

        let update_available = latest.is_newer_than(&current);
        if update_available {
            tracing::info!("[VersionCheck] New version available: {} -> {}", current, latest);
        } else {
            tracing::debug!("[VersionCheck] Up to date ({})", current);
        }

        Ok(UpdateCheck {
            current: current.to_string(),
            latest: latest.to_string(),
            update_available,
            release_url: release.html_url,
        })
    }
}
