// 통합 테스트에서 사용하기 위한 라이브러리 진입점
pub mod config;
pub mod path_detector;
pub mod process_monitor;
pub mod report;
