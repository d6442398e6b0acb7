//! 분석기 설정
//!
//! [`AnalyzerConfig`]는 core의 [`AnalyzerSection`](depcap_core::config::AnalyzerSection)과
//! [`CacheConfig`](depcap_core::config::CacheConfig)를 합쳐 분석기가 실제로 쓰는
//! 값으로 만든 것입니다.
//!
//! # 사용 예시
//!
//! ```
//! use depcap_analyzer::AnalyzerConfig;
//!
//! let config = AnalyzerConfig::default();
//! config.validate().unwrap();
//!
//! use depcap_analyzer::AnalyzerConfigBuilder;
//!
//! let config = AnalyzerConfigBuilder::new()
//!     .max_concurrent_scans(4)
//!     .cache_max_size(1_000)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use depcap_core::config::{DEFAULT_CACHE_SIZE, DepcapConfig, KNOWN_SCANNERS};

use crate::error::AnalyzerError;

/// 분석기 설정
///
/// # 필드
///
/// - **archive_extensions**: 스캔 대상 파일 확장자
/// - **max_archive_size**: 아카이브 파일 최대 크기 (바이트)
/// - **max_entry_size**: 아카이브 엔트리 하나의 최대 압축 해제 크기 (바이트)
/// - **max_concurrent_scans**: 동시에 실행할 아티팩트 스캔 수
/// - **scanners**: 사용할 스캐너 이름 (비어 있으면 전부)
/// - **cache_max_size**: 캐시 영역별 최대 엔트리 수 (음수면 무제한)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub archive_extensions: Vec<String>,
    pub max_archive_size: u64,
    pub max_entry_size: u64,
    pub max_concurrent_scans: usize,
    pub scanners: Vec<String>,
    pub cache_max_size: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["jar".to_owned(), "aar".to_owned()],
            max_archive_size: 512 * 1024 * 1024, // 512 MB
            max_entry_size: 16 * 1024 * 1024,    // 16 MB
            max_concurrent_scans: 8,
            scanners: Vec::new(),
            cache_max_size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// 동시 스캔 상한
const MAX_CONCURRENT_SCANS: usize = 256;

impl AnalyzerConfig {
    /// core 설정에서 분석기 설정을 생성합니다.
    pub fn from_core(core: &DepcapConfig) -> Self {
        Self {
            archive_extensions: core
                .analyzer
                .archive_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_archive_size: core.analyzer.max_archive_size,
            max_entry_size: core.analyzer.max_entry_size,
            max_concurrent_scans: core.analyzer.max_concurrent_scans,
            scanners: core.analyzer.scanners.clone(),
            cache_max_size: core.cache.max_size,
        }
    }

    /// 스캐너가 활성화되어 있는지 확인합니다.
    pub fn scanner_enabled(&self, name: &str) -> bool {
        self.scanners.is_empty() || self.scanners.iter().any(|s| s == name)
    }

    /// 파일 이름이 스캔 대상 확장자를 가졌는지 확인합니다.
    pub fn accepts_file(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self
                .archive_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// 캐시 영역 크기 제한. 음수 설정은 `None` (무제한)
    pub fn cache_bound(&self) -> Option<usize> {
        usize::try_from(self.cache_max_size).ok()
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `archive_extensions`: 하나 이상, 빈 문자열 불가
    /// - `max_archive_size`, `max_entry_size`: 0 불가, 엔트리 크기 ≤ 아카이브 크기
    /// - `max_concurrent_scans`: 1-256
    /// - `scanners`: 알려진 이름만
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.archive_extensions.is_empty()
            || self.archive_extensions.iter().any(|e| e.is_empty())
        {
            return Err(AnalyzerError::Config {
                field: "archive_extensions".to_owned(),
                reason: "at least one non-empty extension required".to_owned(),
            });
        }

        if self.max_archive_size == 0 {
            return Err(AnalyzerError::Config {
                field: "max_archive_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_entry_size == 0 || self.max_entry_size > self.max_archive_size {
            return Err(AnalyzerError::Config {
                field: "max_entry_size".to_owned(),
                reason: format!("must be 1-{}", self.max_archive_size),
            });
        }

        if self.max_concurrent_scans == 0 || self.max_concurrent_scans > MAX_CONCURRENT_SCANS {
            return Err(AnalyzerError::Config {
                field: "max_concurrent_scans".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_SCANS}"),
            });
        }

        if let Some(unknown) = self
            .scanners
            .iter()
            .find(|s| !KNOWN_SCANNERS.contains(&s.as_str()))
        {
            return Err(AnalyzerError::Config {
                field: "scanners".to_owned(),
                reason: format!("unknown scanner '{unknown}'"),
            });
        }

        Ok(())
    }
}

/// [`AnalyzerConfig`] 빌더
#[derive(Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archive_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.archive_extensions = extensions;
        self
    }

    pub fn max_archive_size(mut self, size: u64) -> Self {
        self.config.max_archive_size = size;
        self
    }

    pub fn max_entry_size(mut self, size: u64) -> Self {
        self.config.max_entry_size = size;
        self
    }

    pub fn max_concurrent_scans(mut self, n: usize) -> Self {
        self.config.max_concurrent_scans = n;
        self
    }

    pub fn scanners(mut self, names: Vec<String>) -> Self {
        self.config.scanners = names;
        self
    }

    /// 캐시 영역별 최대 크기. 음수면 무제한
    pub fn cache_max_size(mut self, size: i64) -> Self {
        self.config.cache_max_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `AnalyzerError::Config` 반환
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
