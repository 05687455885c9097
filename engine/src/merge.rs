//! 스테이징 트리를 설치 루트에 병합
//!
//! 파일 단위로 복사하며 기존 파일은 무조건 덮어쓴다 (내용 비교/백업 없음).
//! 트리 전체에 대한 원자성은 없다. 중간에 실패하면 그 시점까지 복사된 파일은
//! 그대로 남고 에러가 즉시 반환된다. 같은 병합을 다시 실행하면 남은 부분이 덮어써진다.
//!
//! 대상에만 있는 파일은 지우지 않는다. 패치 파일 제거는 언인스톨만 담당한다.

use std::path::Path;

use crate::error::EngineError;

/// 병합 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub files_copied: usize,
    /// 새로 만든 디렉터리 수 (이미 존재하던 디렉터리는 제외)
    pub dirs_created: usize,
}

pub struct DirectoryMerger;

impl DirectoryMerger {
    /// `source` 아래 모든 파일을 `target`의 같은 상대 경로로 복사
    pub fn merge(source: &Path, target: &Path) -> Result<MergeReport, EngineError> {
        tracing::info!("[Merger] Merging {} -> {}", source.display(), target.display());
        let mut report = MergeReport::default();
        Self::merge_dir(source, target, &mut report)?;
        tracing::info!(
            "[Merger] Merged {} files ({} new directories)",
            report.files_copied,
            report.dirs_created
        );
        Ok(report)
    }

    fn merge_dir(src: &Path, dst: &Path, report: &mut MergeReport) -> Result<(), EngineError> {
        if !dst.is_dir() {
            std::fs::create_dir_all(dst)
                .map_err(|e| EngineError::io("create directory", dst, e))?;
            report.dirs_created += 1;
        }

        let mut entries = std::fs::read_dir(src)
            .map_err(|e| EngineError::io("read directory", src, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::io("read directory", src, e))?;
        // 실행마다 같은 순서로 복사되도록 정렬
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let dest = dst.join(entry.file_name());
            if path.is_dir() {
                Self::merge_dir(&path, &dest, report)?;
            } else {
                std::fs::copy(&path, &dest).map_err(|e| EngineError::io("copy file", &dest, e))?;
                tracing::debug!("[Merger] Copying {}", dest.display());
                report.files_copied += 1;
            }
        }
        Ok(())
    }
}
