//! 릴리즈 아카이브 다운로드 및 스테이징
//!
//! ## 스크래치 공간
//! - `<work_dir>/Release.zip`: 다운로드한 아카이브
//! - `<work_dir>/Patch/`: 압축 해제된 스테이징 트리
//!
//! 두 경로 모두 단일 슬롯이다. 새 fetch는 항상 이전 스테이징을 먼저 지우므로
//! 서로 다른 릴리즈의 파일이 섞이지 않는다.

use sha2::{Digest, Sha256};
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EngineError;
use crate::EngineConfig;

/// "fetch(url) -> archive bytes" 전송 계약
///
/// 엔진은 전송 방식에 관여하지 않는다. 기본 구현은 [`HttpReleaseSource`].
pub trait ReleaseSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, EngineError>> + Send;
}

/// reqwest 기반 HTTP 다운로드
pub struct HttpReleaseSource {
    http: reqwest::Client,
}

impl HttpReleaseSource {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cet-easy-install/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::from_reqwest(&e, "create HTTP client"))?;
        Ok(Self { http })
    }
}

impl ReleaseSource for HttpReleaseSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, EngineError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest(&e, "release download"))?;

        if !response.status().is_success() {
            return Err(EngineError::Network {
                operation: "release download".to_string(),
                message: format!("HTTP {} for {}", response.status(), url),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::from_reqwest(&e, "release download"))?;
        Ok(bytes.to_vec())
    }
}

/// 다운로드/압축 해제가 끝난 릴리즈
#[derive(Debug, Clone)]
pub struct StagedRelease {
    pub archive_path: PathBuf,
    pub staging_dir: PathBuf,
    pub size: u64,
    pub sha256: String,
    /// 스테이징에 풀린 파일 수
    pub file_count: usize,
}

/// 최신 릴리즈를 받아 스테이징 디렉터리에 풀어 두는 컴포넌트
pub struct ReleaseFetcher<S> {
    source: S,
    release_url: String,
    expected_sha256: Option<String>,
    archive_path: PathBuf,
    staging_dir: PathBuf,
}

impl<S: ReleaseSource> ReleaseFetcher<S> {
    pub fn new(config: &EngineConfig, source: S) -> Self {
        Self {
            source,
            release_url: config.release_url.clone(),
            expected_sha256: config
                .expected_sha256
                .as_ref()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty()),
            archive_path: config.archive_path(),
            staging_dir: config.staging_dir(),
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// 최신 릴리즈를 다운로드하고 깨끗한 스테이징 디렉터리에 압축 해제
    ///
    /// 네트워크 실패는 재시도 없이 그대로 반환한다.
    pub async fn fetch_latest(&self) -> Result<StagedRelease, EngineError> {
        tracing::info!("[Fetcher] Downloading {}", self.release_url);
        let bytes = self.source.fetch(&self.release_url).await?;

        if bytes.is_empty() {
            return Err(EngineError::Archive(format!(
                "empty release payload from {}",
                self.release_url
            )));
        }

        let sha256 = hex::encode(Sha256::digest(&bytes));
        if let Some(ref expected) = self.expected_sha256 {
            if *expected != sha256 {
                return Err(EngineError::Archive(format!(
                    "checksum mismatch: expected {}, got {}",
                    expected, sha256
                )));
            }
        }

        if let Some(parent) = self.archive_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::io("create work directory", parent, e))?;
        }
        std::fs::write(&self.archive_path, &bytes)
            .map_err(|e| EngineError::io("write archive", &self.archive_path, e))?;
        tracing::info!(
            "[Fetcher] Downloaded {} bytes -> {}",
            bytes.len(),
            self.archive_path.display()
        );

        self.reset_staging()?;
        let file_count = extract_archive(&bytes, &self.staging_dir)?;
        tracing::info!(
            "[Fetcher] Extracted {} files into {}",
            file_count,
            self.staging_dir.display()
        );

        Ok(StagedRelease {
            archive_path: self.archive_path.clone(),
            staging_dir: self.staging_dir.clone(),
            size: bytes.len() as u64,
            sha256,
            file_count,
        })
    }

    /// 이전 릴리즈 잔여물이 남지 않도록 스테이징 디렉터리를 비운다
    fn reset_staging(&self) -> Result<(), EngineError> {
        if self.staging_dir.exists() {
            tracing::debug!("[Fetcher] Removing stale staging dir {}", self.staging_dir.display());
            std::fs::remove_dir_all(&self.staging_dir)
                .map_err(|e| EngineError::io("clear staging", &self.staging_dir, e))?;
        }
        Ok(())
    }

    /// 병합이 끝난 아카이브 파일과 스테이징 디렉터리 삭제
    pub fn cleanup(&self) -> Result<(), EngineError> {
        match std::fs::remove_file(&self.archive_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::io("remove archive", &self.archive_path, e)),
        }
        match std::fs::remove_dir_all(&self.staging_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::io("remove staging", &self.staging_dir, e)),
        }
        tracing::debug!("[Fetcher] Scratch space cleaned");
        Ok(())
    }
}

/// zip 바이트를 `dest`에 그대로 풀어낸다. 풀린 파일 수를 반환.
///
/// `dest` 밖을 가리키는 엔트리가 있으면 아카이브 전체를 거부한다.
pub fn extract_archive(bytes: &[u8], dest: &Path) -> Result<usize, EngineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| EngineError::Archive(format!("unreadable archive: {}", e)))?;

    std::fs::create_dir_all(dest).map_err(|e| extraction_error(dest, e))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| EngineError::Archive(format!("corrupt entry #{}: {}", i, e)))?;

        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            EngineError::Archive(format!("entry '{}' escapes the staging directory", entry.name()))
        })?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| extraction_error(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| extraction_error(parent, e))?;
        }
        let mut outfile =
            std::fs::File::create(&out_path).map_err(|e| extraction_error(&out_path, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| extraction_error(&out_path, e))?;
        tracing::debug!("[Fetcher] Extracted {}", out_path.display());
        files += 1;
    }

    Ok(files)
}

fn extraction_error(path: &Path, err: std::io::Error) -> EngineError {
    EngineError::Archive(format!("extraction interrupted at '{}': {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_zip, MemorySource};
    use tempfile::TempDir;

    fn fetcher(work: &Path, source: MemorySource) -> ReleaseFetcher<MemorySource> {
        let config = EngineConfig {
            work_dir: Some(work.to_string_lossy().to_string()),
            ..Default::default()
        };
        ReleaseFetcher::new(&config, source)
    }

    #[tokio::test]
    async fn fetch_extracts_into_staging() {
        let work = TempDir::new().unwrap();
        let zip = make_zip(&[("version.dll", "dll"), ("plugins/cyber_engine_tweaks/readme.txt", "hi")]);
        let f = fetcher(work.path(), MemorySource::new(zip));

        let staged = f.fetch_latest().await.unwrap();
        assert_eq!(staged.file_count, 2);
        assert!(staged.archive_path.ends_with("Release.zip"));
        assert!(staged.archive_path.exists());
        assert_eq!(std::fs::read_to_string(staged.staging_dir.join("version.dll")).unwrap(), "dll");
        assert!(staged
            .staging_dir
            .join("plugins/cyber_engine_tweaks/readme.txt")
            .exists());
    }

    #[tokio::test]
    async fn second_fetch_never_sees_previous_release_files() {
        let work = TempDir::new().unwrap();
        let source = MemorySource::new(make_zip(&[("old.dll", "old"), ("shared.dll", "v1")]));
        let f = fetcher(work.path(), source.clone());
        f.fetch_latest().await.unwrap();

        source.replace(make_zip(&[("shared.dll", "v2")]));
        let staged = f.fetch_latest().await.unwrap();

        assert!(!staged.staging_dir.join("old.dll").exists());
        assert_eq!(std::fs::read_to_string(staged.staging_dir.join("shared.dll")).unwrap(), "v2");
    }

    #[tokio::test]
    async fn checksum_mismatch_is_archive_error() {
        let work = TempDir::new().unwrap();
        let config = EngineConfig {
            work_dir: Some(work.path().to_string_lossy().to_string()),
            expected_sha256: Some("00".repeat(32)),
            ..Default::default()
        };
        let f = ReleaseFetcher::new(&config, MemorySource::new(make_zip(&[("a.dll", "a")])));

        let err = f.fetch_latest().await.unwrap_err();
        assert!(matches!(err, EngineError::Archive(_)), "{err}");
        assert!(!f.staging_dir().exists());
    }

    #[tokio::test]
    async fn matching_checksum_is_accepted() {
        let work = TempDir::new().unwrap();
        let zip = make_zip(&[("a.dll", "a")]);
        let digest = hex::encode(Sha256::digest(&zip));
        let config = EngineConfig {
            work_dir: Some(work.path().to_string_lossy().to_string()),
            expected_sha256: Some(digest.to_uppercase()),
            ..Default::default()
        };
        let f = ReleaseFetcher::new(&config, MemorySource::new(zip));
        let staged = f.fetch_latest().await.unwrap();
        assert_eq!(staged.sha256, digest);
    }

    #[tokio::test]
    async fn garbage_payload_is_archive_error() {
        let work = TempDir::new().unwrap();
        let f = fetcher(work.path(), MemorySource::new(b"definitely not a zip".to_vec()));
        let err = f.fetch_latest().await.unwrap_err();
        assert_eq!(err.error_code(), "ARCHIVE_ERROR");
    }

    #[tokio::test]
    async fn network_failure_is_propagated() {
        let work = TempDir::new().unwrap();
        let f = fetcher(work.path(), MemorySource::failing());
        let err = f.fetch_latest().await.unwrap_err();
        assert!(matches!(err, EngineError::Network { .. }));
        assert!(!f.archive_path().exists());
    }

    #[test]
    fn zip_slip_entry_is_rejected() {
        let dest = TempDir::new().unwrap();
        let zip = make_zip(&[("../evil.dll", "x")]);
        let err = extract_archive(&zip, &dest.path().join("Patch")).unwrap_err();
        assert!(matches!(err, EngineError::Archive(_)));
        assert!(!dest.path().join("evil.dll").exists());
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_scratch() {
        let work = TempDir::new().unwrap();
        let f = fetcher(work.path(), MemorySource::new(make_zip(&[("a.dll", "a")])));
        f.cleanup().unwrap();

        f.fetch_latest().await.unwrap();
        f.cleanup().unwrap();
        assert!(!f.archive_path().exists());
        assert!(!f.staging_dir().exists());
    }
}
