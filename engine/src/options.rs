//! 패치 옵션: `config.json` 필드 집합
//!
//! 필드명이 곧 디스크 키이며, 다른 경우(`dump_game_options`)만 serde 속성으로 선언한다.
//! 모든 필드가 로드 시 필수이므로 저장된 파일은 누락 필드 없이 왕복된다.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// 콘솔 토글 기본 키: `VK_OEM_3` (`~`)
pub const DEFAULT_CONSOLE_KEY: u32 = 0xC0;

/// 유효한 Windows 가상 키 코드 범위
pub const VIRTUAL_KEY_RANGE: std::ops::RangeInclusive<u32> = 0x01..=0xFE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOptions {
    pub avx: bool,
    pub smt: bool,
    pub spectre: bool,
    pub virtual_input: bool,
    pub memory_pool: bool,
    pub unlock_menu: bool,
    /// 0.0 ~ 1.0
    pub cpu_memory_pool_fraction: f64,
    /// 0.0 ~ 1.0
    pub gpu_memory_pool_fraction: f64,
    pub remove_pedestrians: bool,
    pub skip_start_menu: bool,
    pub disable_async_compute: bool,
    pub disable_antialiasing: bool,
    pub console: bool,
    #[serde(rename = "dump_game_options")]
    pub dump_option: bool,
    pub disable_boundary_teleport: bool,
    pub disable_intro_movies: bool,
    pub disable_vignette: bool,
    /// 콘솔 토글 가상 키 코드
    pub console_key: u32,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            avx: false,
            smt: true,
            spectre: true,
            virtual_input: true,
            memory_pool: true,
            unlock_menu: false,
            cpu_memory_pool_fraction: 0.5,
            gpu_memory_pool_fraction: 1.0,
            remove_pedestrians: false,
            skip_start_menu: true,
            disable_async_compute: false,
            disable_antialiasing: false,
            console: true,
            dump_option: false,
            disable_boundary_teleport: false,
            disable_intro_movies: false,
            disable_vignette: false,
            console_key: DEFAULT_CONSOLE_KEY,
        }
    }
}

impl PatchOptions {
    /// 범위 검증: 메모리 풀 비율 [0, 1], 콘솔 키는 유효한 가상 키 코드
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("cpu_memory_pool_fraction", self.cpu_memory_pool_fraction),
            ("gpu_memory_pool_fraction", self.gpu_memory_pool_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !VIRTUAL_KEY_RANGE.contains(&self.console_key) {
            return Err(EngineError::Config(format!(
                "console_key {:#04x} is not a valid virtual-key code",
                self.console_key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let opts = PatchOptions::default();
        opts.validate().unwrap();
        assert_eq!(opts.console_key, 192);
    }

    #[test]
    fn on_disk_keys_are_snake_case_names() {
        let value = serde_json::to_value(PatchOptions::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 18);
        assert!(obj.contains_key("dump_game_options"));
        assert!(!obj.contains_key("dump_option"));
        assert_eq!(obj["console_key"], 192);
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let opts = PatchOptions {
            gpu_memory_pool_fraction: 1.5,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(EngineError::Config(_))));

        let opts = PatchOptions {
            cpu_memory_pool_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn invalid_console_key_is_rejected() {
        for key in [0, 0xFF, 1000] {
            let opts = PatchOptions {
                console_key: key,
                ..Default::default()
            };
            assert!(opts.validate().is_err(), "key {key} accepted");
        }
    }

    #[test]
    fn missing_field_fails_to_parse() {
        let mut value = serde_json::to_value(PatchOptions::default()).unwrap();
        value.as_object_mut().unwrap().remove("smt");
        assert!(serde_json::from_value::<PatchOptions>(value).is_err());
    }
}
