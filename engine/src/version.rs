//! 프로그램 버전 비교 유틸리티
//!
//! 릴리즈 태그는 `v1.3`, `1.3.0`, `1.3.0.0` 등 형식이 제각각이므로
//! (major, minor, patch) 튜플로 정규화하여 비교한다.

use std::cmp::Ordering;
use std::fmt;

/// 빌드 시점에 고정되는 실행 프로그램 버전
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// major.minor.patch 버전
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// "v1.2.3", "1.2", "1.2.3.0", "1.2.3-beta" 형식을 파싱
    ///
    /// 누락된 구성 요소는 0으로 취급하고 네 번째 이후 구성 요소와
    /// 프리릴리즈 접미사는 무시한다.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix('v')
            .or_else(|| s.strip_prefix('V'))
            .unwrap_or(s);
        let core = s.split(['-', '+']).next()?;
        if core.is_empty() {
            return None;
        }

        let mut parts = core.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };

        Some(Self { major, minor, patch })
    }

    /// 빌드 시점 버전
    pub fn current() -> Self {
        Self::parse(ENGINE_VERSION).unwrap_or(Self::new(0, 0, 0))
    }

    fn as_tuple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    pub fn is_newer_than(&self, other: &Version) -> bool {
        self > other
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_tuple().cmp(&other.as_tuple())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
