use std::path::{Path, PathBuf};
use anyhow::Result;
use glob::glob;

/// 게임 폴더 이름 (Steam/GOG 공통)
pub const GAME_FOLDER_NAME: &str = "Cyberpunk 2077";
/// 게임 실행 파일 이름
pub const GAME_EXECUTABLE: &str = "Cyberpunk2077.exe";

pub struct PathDetector;

impl PathDetector {
    /// 게임 폴더인지 확인: `bin/x64/Cyberpunk2077.exe` 존재 여부
    pub fn looks_like_game_dir(dir: &Path) -> bool {
        install_root_for(dir).join(GAME_EXECUTABLE).is_file()
    }

    /// glob 패턴 목록에서 게임 폴더 탐색 (중복 제거, 발견 순서 유지)
    pub fn detect_game_dirs(patterns: &[String]) -> Result<Vec<PathBuf>> {
        let mut found: Vec<PathBuf> = Vec::new();
        for pattern in patterns {
            let paths = match glob(pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::debug!("Skipping invalid pattern {}: {}", pattern, e);
                    continue;
                }
            };
            for path in paths.flatten() {
                if path.is_dir() && Self::looks_like_game_dir(&path) && !found.contains(&path) {
                    tracing::info!("Found game at: {}", path.display());
                    found.push(path);
                }
            }
        }

        if found.is_empty() {
            tracing::warn!("Could not find a {} installation", GAME_FOLDER_NAME);
        }
        Ok(found)
    }

    /// 기본 라이브러리 위치에서 게임 폴더 탐색
    pub fn detect_default_game_dirs() -> Result<Vec<PathBuf>> {
        let patterns: Vec<String> = Self::get_default_library_paths()
            .into_iter()
            .map(|lib| {
                let escaped = glob::Pattern::escape(&lib.to_string_lossy());
                format!("{}/{}*", escaped, glob::Pattern::escape(GAME_FOLDER_NAME))
            })
            .collect();
        Self::detect_game_dirs(&patterns)
    }

    /// 게임 라이브러리 기본 경로 목록 (Steam/GOG, 플랫폼별)
    pub fn get_default_library_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        #[cfg(target_os = "windows")]
        {
            if let Some(program_files_x86) = std::env::var_os("ProgramFiles(x86)") {
                let pf = PathBuf::from(program_files_x86);
                paths.push(pf.join("Steam").join("steamapps").join("common"));
                paths.push(pf.join("GOG Galaxy").join("Games"));
            }

            // 추가 드라이브의 Steam 라이브러리 / GOG 기본 폴더
            for drive in &["C:", "D:", "E:", "F:"] {
                paths.push(PathBuf::from(format!("{}\\SteamLibrary\\steamapps\\common", drive)));
                paths.push(PathBuf::from(format!("{}\\GOG Games", drive)));
                paths.push(PathBuf::from(format!("{}\\Games", drive)));
            }
        }

        #[cfg(target_os = "linux")]
        {
            // Proton/Wine 환경
            if let Some(home) = std::env::var_os("HOME") {
                let home = PathBuf::from(home);
                paths.push(home.join(".steam").join("steam").join("steamapps").join("common"));
                paths.push(home.join(".local").join("share").join("Steam").join("steamapps").join("common"));
                paths.push(home.join(".var").join("app").join("com.valvesoftware.Steam")
                    .join(".steam").join("steam").join("steamapps").join("common"));
                paths.push(home.join("Games").join("gog"));
            }
        }

        paths
    }
}

/// 선택한 게임 폴더 → 패치 설치 루트 (`<game>/bin/x64`)
pub fn install_root_for(game_dir: &Path) -> PathBuf {
    cet_install_engine::game_binary_dir(game_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_game(library: &Path, folder: &str) -> PathBuf {
        let game = library.join(folder);
        let bin = install_root_for(&game);
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(GAME_EXECUTABLE), b"MZ").unwrap();
        game
    }

    #[test]
    fn install_root_is_bin_x64() {
        assert_eq!(
            install_root_for(Path::new("/games/Cyberpunk 2077")),
            PathBuf::from("/games/Cyberpunk 2077/bin/x64")
        );
    }

    #[test]
    fn detects_game_dirs_by_executable() {
        let library = TempDir::new().unwrap();
        let game = fake_game(library.path(), GAME_FOLDER_NAME);
        std::fs::create_dir_all(library.path().join("Cyberpunk 2077 Soundtrack")).unwrap();

        let pattern = format!(
            "{}/Cyberpunk*",
            glob::Pattern::escape(&library.path().to_string_lossy())
        );
        let found = PathDetector::detect_game_dirs(&[pattern.clone(), pattern]).unwrap();

        assert_eq!(found, vec![game]);
    }

    #[test]
    fn empty_library_finds_nothing() {
        let library = TempDir::new().unwrap();
        let pattern = format!(
            "{}/*",
            glob::Pattern::escape(&library.path().to_string_lossy())
        );
        assert!(PathDetector::detect_game_dirs(&[pattern]).unwrap().is_empty());
        assert!(!PathDetector::looks_like_game_dir(library.path()));
    }
}
