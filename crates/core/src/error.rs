//! 에러 타입 -- 도메인별 에러 정의
//!
//! - [`ResolveError`]: 식별자 해석 중 만난 미지원 참조 타입. 복구 불가능한 설정 에러입니다.
//! - [`ScanError`]: 아티팩트 단위 스캔 실패. 해당 아티팩트에만 국한되며 전체 분석을 중단하지 않습니다.

/// depcap 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum DepcapError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 의존성 식별 에러 (치명적)
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// 아티팩트 스캔 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 의존성 식별 에러
///
/// 호스트 빌드 시스템이 이 코어가 알지 못하는 참조 타입을 넘겼을 때 발생합니다.
/// 어느 경우든 빌드 단계를 즉시 중단해야 합니다.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// 해석된 그래프 노드의 컴포넌트 식별자 타입을 알 수 없음
    #[error("cannot identify component identifier subtype '{kind}', named {display_name}")]
    UnsupportedComponent { kind: String, display_name: String },

    /// 요청(selector) 타입을 알 수 없음
    #[error("cannot identify component selector subtype '{kind}', named {display_name}")]
    UnsupportedSelector { kind: String, display_name: String },

    /// 선언된 의존성 타입을 알 수 없음
    #[error("unknown dependency subtype '{kind}': {display_name}")]
    UnsupportedDependency { kind: String, display_name: String },

    /// composite 치환 결과가 프로젝트가 아님
    #[error("composite substitution of {requested} resolved to non-project component {selected}")]
    CompositeTargetNotProject { requested: String, selected: String },

    /// 참조가 빈 식별자로 해석됨
    #[error("'{kind}' reference resolves to an empty identifier")]
    EmptyIdentifier { kind: &'static str },
}

/// 아티팩트 스캔 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 아카이브를 열거나 읽을 수 없음
    #[error("unreadable archive {path}: {reason}")]
    Archive { path: String, reason: String },

    /// 아카이브 내용 파싱 실패
    #[error("malformed content in {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// 스캔 작업 실행 실패
    #[error("scan task failed: {0}")]
    Task(String),
}
