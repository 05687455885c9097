use serde::Serialize;
use sysinfo::System;

/// 게임 프로세스 이름 (확장자 제외 부분 일치)
pub const GAME_PROCESS_NAME: &str = "Cyberpunk2077";

#[derive(Debug, Clone, Serialize)]
pub struct RunningProcess {
    pub pid: u32,
    pub name: String,
    pub executable_path: Option<String>,
}

/// 실행 중인 모든 프로세스 목록
pub fn get_running_processes() -> Vec<RunningProcess> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let processes: Vec<RunningProcess> = sys.processes()
        .iter()
        .map(|(pid, process)| RunningProcess {
            pid: pid.as_u32(),
            name: process.name().to_string(),
            executable_path: process.exe().and_then(|p| p.to_str()).map(String::from),
        })
        .collect();

    tracing::debug!("Found {} running processes", processes.len());
    processes
}

/// 이름 부분 일치 검색 (대소문자 무시)
pub fn find_by_name(name: &str) -> Vec<RunningProcess> {
    filter_by_name(get_running_processes(), name)
}

fn filter_by_name(processes: Vec<RunningProcess>, name: &str) -> Vec<RunningProcess> {
    let name_lower = name.to_lowercase();
    processes
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&name_lower))
        .collect()
}

/// 게임이 실행 중이면 설치 트리의 DLL이 잠겨 업데이트/제거가 실패한다.
pub fn find_game_processes() -> Vec<RunningProcess> {
    find_by_name(GAME_PROCESS_NAME)
}

pub fn is_game_running() -> bool {
    !find_game_processes().is_empty()
}

// ── Async wrappers ─────────────────────────────────────────
// 프로세스 테이블 스캔은 동기 호출이므로 블로킹 스레드풀에서 실행한다.

pub async fn is_game_running_async() -> bool {
    tokio::task::spawn_blocking(is_game_running)
        .await
        .unwrap_or(false)
}
