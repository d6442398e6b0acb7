//! 설정 관리 -- depcap.toml 파싱 및 런타임 설정
//!
//! [`DepcapConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DEPCAP_CACHE_MAX_SIZE=1000` 형식)
//! 3. 설정 파일 (`depcap.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), depcap_core::error::DepcapError> {
//! use depcap_core::config::DepcapConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DepcapConfig::load("depcap.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DepcapConfig::parse("[cache]\nmax_size = 500")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DepcapError};

/// 캐시 크기 기본값. 음수는 크기 제한 없음을 뜻합니다.
pub const DEFAULT_CACHE_SIZE: i64 = -1;

/// depcap 통합 설정
///
/// `depcap.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepcapConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 아티팩트 분석기 설정
    #[serde(default)]
    pub analyzer: AnalyzerSection,
}

impl DepcapConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DepcapError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DepcapError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DepcapError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DepcapError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DepcapError> {
        toml::from_str(toml_str).map_err(|e| {
            DepcapError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DEPCAP_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DEPCAP_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DEPCAP_GENERAL_LOG_FORMAT");

        // Cache
        override_parsed(&mut self.cache.max_size, "DEPCAP_CACHE_MAX_SIZE");

        // Analyzer
        override_csv(
            &mut self.analyzer.archive_extensions,
            "DEPCAP_ANALYZER_ARCHIVE_EXTENSIONS",
        );
        override_parsed(
            &mut self.analyzer.max_archive_size,
            "DEPCAP_ANALYZER_MAX_ARCHIVE_SIZE",
        );
        override_parsed(
            &mut self.analyzer.max_entry_size,
            "DEPCAP_ANALYZER_MAX_ENTRY_SIZE",
        );
        override_parsed(
            &mut self.analyzer.max_concurrent_scans,
            "DEPCAP_ANALYZER_MAX_CONCURRENT_SCANS",
        );
        override_csv(&mut self.analyzer.scanners, "DEPCAP_ANALYZER_SCANNERS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DepcapError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.analyzer.archive_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.archive_extensions".to_owned(),
                reason: "at least one archive extension required".to_owned(),
            }
            .into());
        }

        if self.analyzer.max_concurrent_scans == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.max_concurrent_scans".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        for scanner in &self.analyzer.scanners {
            if !KNOWN_SCANNERS.contains(&scanner.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "analyzer.scanners".to_owned(),
                    reason: format!(
                        "unknown scanner '{scanner}', expected one of: {}",
                        KNOWN_SCANNERS.join(", ")
                    ),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 설정에서 이름으로 지정할 수 있는 스캐너 목록
pub const KNOWN_SCANNERS: [&str; 7] = [
    "service_loader",
    "class_file",
    "annotation_processor",
    "native_lib",
    "android_linter",
    "android_manifest",
    "android_res",
];

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 분석 캐시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 캐시 영역별 최대 엔트리 수. 0 미만이면 제한 없음
    pub max_size: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl CacheConfig {
    /// 크기 제한을 `Option`으로 반환합니다. 음수는 `None` (무제한)
    pub fn bound(&self) -> Option<usize> {
        usize::try_from(self.max_size).ok()
    }
}

/// 아티팩트 분석기 설정 섹션
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSection {
    /// 스캔 대상 아카이브 확장자 (점 제외)
    pub archive_extensions: Vec<String>,
    /// 아카이브 최대 크기 (바이트)
    pub max_archive_size: u64,
    /// 아카이브 내부 엔트리 최대 크기 (바이트)
    pub max_entry_size: u64,
    /// 동시에 실행할 최대 스캔 수
    pub max_concurrent_scans: usize,
    /// 활성화할 스캐너 이름. 비어 있으면 전체
    pub scanners: Vec<String>,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["jar".to_owned(), "aar".to_owned()],
            max_archive_size: 512 * 1024 * 1024, // 512 MB
            max_entry_size: 16 * 1024 * 1024,    // 16 MB
            max_concurrent_scans: 8,
            scanners: Vec::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

/// 파싱에 실패한 값은 경고 후 무시합니다.
fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = std::any::type_name::<T>(),
                "ignoring unparsable env override"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
