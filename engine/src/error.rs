//! 엔진 에러 타입
//!
//! ## 에러 분류
//! - 네트워크 실패 (릴리즈 다운로드, 버전 확인)
//! - 손상된/읽을 수 없는 아카이브
//! - 파일 시스템 오류 (병합, 삭제, 상태 기록)
//! - 설정 파일 누락/손상: 항상 기본값으로 복구되며 라이프사이클 실패로 이어지지 않음
//! - 설치되지 않은 상태에서 설치가 필요한 작업 호출

use std::path::Path;

/// 라이프사이클 작업 중 발생할 수 있는 에러 유형
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// 원격 서버 연결 실패/타임아웃/HTTP 오류
    #[error("Network error during {operation}: {message}")]
    Network { operation: String, message: String },

    /// 아카이브 손상, 해시 불일치, 압축 해제 중단
    #[error("Archive error: {0}")]
    Archive(String),

    /// 병합/삭제/상태 기록 중 파일 시스템 오류
    #[error("File system error during {operation} on '{path}': {source}")]
    Io {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 설정 파일 누락 또는 파싱 실패
    #[error("Configuration error: {0}")]
    Config(String),

    /// 설치 기록이 없는 상태에서 설치가 필요한 작업을 호출함
    #[error("Patch is not installed")]
    NotInstalled,

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: String, action: &'static str },
}

impl EngineError {
    /// IO 에러를 작업/경로 정보와 함께 감싼다
    pub fn io(operation: &str, path: &Path, source: std::io::Error) -> Self {
        EngineError::Io {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }

    /// reqwest 에러를 EngineError로 변환
    pub fn from_reqwest(err: &reqwest::Error, operation: &str) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else if let Some(status) = err.status() {
            format!("HTTP {}", status)
        } else {
            err.to_string()
        };
        EngineError::Network {
            operation: operation.to_string(),
            message,
        }
    }

    /// 머신 리더블 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotInstalled => "NOT_INSTALLED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// 호출 측이 같은 작업을 다시 시도해 볼 만한 에러인지
    ///
    /// 엔진은 스스로 재시도하지 않는다. 재시도 여부는 호출 측이 결정한다.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            // 재다운로드로 복구 가능
            Self::Archive(_) => true,
            // 게임 프로세스가 파일을 잡고 있는 경우 종료 후 재시도 가능
            Self::Io { .. } => true,
            Self::Config(_) | Self::NotInstalled | Self::InvalidTransition { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_path_and_operation() {
        let err = EngineError::io(
            "merge",
            Path::new("/games/cp2077/bin/x64/version.dll"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("merge"));
        assert!(msg.contains("version.dll"));
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn not_installed_is_not_retryable() {
        assert!(!EngineError::NotInstalled.is_retryable());
        assert!(!EngineError::Config("bad".into()).is_retryable());
        assert!(EngineError::Archive("crc".into()).is_retryable());
    }
}
