//! 설치 기록 저장소: `<work_dir>/game_path`
//!
//! 파일 내용 전체가 설치 루트(게임 바이너리 디렉터리)의 절대 경로다.
//! 파일이 있으면 "이미 설치됨", 없으면 "설치 안 됨".

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

pub const MARKER_FILE_NAME: &str = "game_path";

pub struct InstallStateStore {
    path: PathBuf,
}

impl InstallStateStore {
    /// `work_dir` 아래 기본 마커 파일을 사용
    pub fn new(work_dir: &Path) -> Self {
        Self {
            path: work_dir.join(MARKER_FILE_NAME),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 설치 루트 기록 (전체 덮어쓰기)
    ///
    /// 같은 디렉터리의 임시 파일에 쓴 뒤 rename하므로 쓰기 도중 실패해도
    /// 이전 기록은 손상되지 않는다.
    pub fn save(&self, install_root: &Path) -> Result<(), EngineError> {
        // 마커 파일은 UTF-8 텍스트
        let encoded = install_root.to_str().ok_or_else(|| {
            EngineError::io(
                "save install state",
                install_root,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "install root is not valid UTF-8"),
            )
        })?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| EngineError::io("create state directory", dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| EngineError::io("save install state", dir, e))?;
        tmp.write_all(encoded.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| EngineError::io("save install state", tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| EngineError::io("save install state", &self.path, e.error))?;

        tracing::info!("[StateStore] Recorded install root {} -> {}", install_root.display(), self.path.display());
        Ok(())
    }

    /// 기록된 설치 루트 로드. 기록이 없거나 비어 있으면 `NotInstalled`.
    pub fn load(&self) -> Result<PathBuf, EngineError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::NotInstalled)
            }
            Err(e) => return Err(EngineError::io("load install state", &self.path, e)),
        };

        let root = content.trim_end_matches(['\r', '\n']);
        if root.trim().is_empty() {
            tracing::warn!("[StateStore] Empty install marker at {}", self.path.display());
            return Err(EngineError::NotInstalled);
        }
        Ok(PathBuf::from(root))
    }

    pub fn is_installed(&self) -> bool {
        self.load().is_ok()
    }

    /// 설치 기록 삭제. 이미 없으면 성공으로 취급.
    pub fn clear(&self) -> Result<(), EngineError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("[StateStore] Cleared install marker {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::io("clear install state", &self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_after_save_returns_same_path() {
        let dir = TempDir::new().unwrap();
        let store = InstallStateStore::new(dir.path());
        let root = PathBuf::from("/games/Cyberpunk 2077/bin/x64");

        store.save(&root).unwrap();

        assert_eq!(store.load().unwrap(), root);
        // 파일 내용이 경로 그 자체여야 한다
        assert_eq!(
            std::fs::read_to_string(dir.path().join(MARKER_FILE_NAME)).unwrap(),
            "/games/Cyberpunk 2077/bin/x64"
        );
    }

    #[test]
    fn load_after_clear_reports_not_installed() {
        let dir = TempDir::new().unwrap();
        let store = InstallStateStore::new(dir.path());
        store.save(Path::new("/games/cp/bin/x64")).unwrap();

        store.clear().unwrap();

        assert!(matches!(store.load(), Err(EngineError::NotInstalled)));
        assert!(!store.is_installed());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = InstallStateStore::new(dir.path());
        store.save(Path::new("/first/bin/x64")).unwrap();
        store.save(Path::new("/second/bin/x64")).unwrap();
        assert_eq!(store.load().unwrap(), PathBuf::from("/second/bin/x64"));
    }

    #[test]
    fn missing_or_blank_marker_is_not_installed() {
        let dir = TempDir::new().unwrap();
        let store = InstallStateStore::new(dir.path());
        assert!(matches!(store.load(), Err(EngineError::NotInstalled)));

        std::fs::write(store.path(), "  \r\n").unwrap();
        assert!(matches!(store.load(), Err(EngineError::NotInstalled)));
    }

    #[test]
    fn trailing_newline_from_hand_edit_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = InstallStateStore::new(dir.path());
        std::fs::write(store.path(), "D:\\Games\\Cyberpunk 2077\\bin\\x64\r\n").unwrap();
        assert_eq!(store.load().unwrap(), PathBuf::from("D:\\Games\\Cyberpunk 2077\\bin\\x64"));
    }

    #[test]
    fn clear_without_record_is_ok() {
        let dir = TempDir::new().unwrap();
        InstallStateStore::new(dir.path()).clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_root_is_rejected_without_touching_marker() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let work = TempDir::new().unwrap();
        let store = InstallStateStore::new(work.path());
        store.save(Path::new("/games/cp/bin/x64")).unwrap();

        let bad = work.path().join(OsStr::from_bytes(b"game\xff"));
        let err = store.save(&bad).unwrap_err();

        assert!(matches!(err, EngineError::Io { .. }), "{err}");
        assert_eq!(store.load().unwrap(), PathBuf::from("/games/cp/bin/x64"));
    }
}
