//! 분석기 에러 타입
//!
//! [`AnalyzerError`]는 분석기 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<AnalyzerError> for DepcapError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **아카이브**: `ArchiveOpen`, `ArchiveEntry`, `FileTooBig`
//! - **내용 파싱**: `ClassFile`, `Manifest`
//! - **식별자 해석**: `Resolve` (치명적)
//! - **설정**: `Config`
//! - **실행**: `Io`, `Join`

use depcap_core::error::{ConfigError, DepcapError, ResolveError, ScanError};

/// 분석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// 아카이브를 열 수 없음 (zip 구조가 아니거나 손상됨)
    #[error("cannot open archive {path}: {reason}")]
    ArchiveOpen { path: String, reason: String },

    /// 아카이브 엔트리를 읽을 수 없음
    #[error("cannot read entry {entry} in {path}: {reason}")]
    ArchiveEntry {
        path: String,
        entry: String,
        reason: String,
    },

    /// 클래스 파일 파싱 실패
    #[error("malformed class file {entry}: {reason}")]
    ClassFile { entry: String, reason: String },

    /// 매니페스트(MANIFEST.MF, AndroidManifest.xml) 파싱 실패
    #[error("malformed manifest {entry}: {reason}")]
    Manifest { entry: String, reason: String },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// 크기 제한 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig { path: String, size: u64, max: u64 },

    /// 식별자 해석 실패
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// 블로킹 스캔 작업이 비정상 종료됨
    #[error("scan task failed: {0}")]
    Join(String),
}

impl AnalyzerError {
    /// 아티팩트 하나에 국한된 실패인지 여부
    ///
    /// `false`이면 분석 전체를 중단해야 합니다.
    pub fn is_artifact_local(&self) -> bool {
        !matches!(self, Self::Resolve(_) | Self::Config { .. })
    }
}

impl From<AnalyzerError> for DepcapError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::ArchiveOpen { path, reason } => {
                DepcapError::Scan(ScanError::Archive { path, reason })
            }
            AnalyzerError::ArchiveEntry {
                path,
                entry,
                reason,
            } => DepcapError::Scan(ScanError::Archive {
                path,
                reason: format!("{entry}: {reason}"),
            }),
            AnalyzerError::ClassFile { entry, reason } => {
                DepcapError::Scan(ScanError::Malformed {
                    path: entry,
                    reason,
                })
            }
            AnalyzerError::Manifest { entry, reason } => {
                DepcapError::Scan(ScanError::Malformed {
                    path: entry,
                    reason,
                })
            }
            AnalyzerError::Config { field, reason } => {
                DepcapError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnalyzerError::Io { source, .. } => DepcapError::Io(source),
            AnalyzerError::FileTooBig { path, size, max } => {
                DepcapError::Scan(ScanError::Archive {
                    path,
                    reason: format!("{size} bytes exceeds limit of {max}"),
                })
            }
            AnalyzerError::Resolve(e) => DepcapError::Resolve(e),
            AnalyzerError::Join(msg) => DepcapError::Scan(ScanError::Task(msg)),
        }
    }
}
