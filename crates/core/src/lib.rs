//! # depcap-core
//!
//! 의존성 능력 분석의 공용 모델입니다.
//!
//! - [`coordinates`]: 의존성이 *무엇인지* 나타내는 정규화된 좌표
//! - [`capability`]: 아티팩트가 *무엇을 제공하는지* 나타내는 증거
//! - [`error`]: 도메인 에러 계층
//! - [`config`]: `depcap.toml` 설정
//! - [`metrics`]: 메트릭 이름 상수
//!
//! 분석 로직은 `depcap-analyzer` 크레이트에 있습니다.

pub mod capability;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DepcapError, ResolveError, ScanError};

// 설정
pub use config::DepcapConfig;

// 좌표
pub use coordinates::{
    Coordinates, FlatCoordinates, IncludedBuildCoordinates, ModuleCoordinates, ProjectCoordinates,
};

// 능력
pub use capability::{Capability, CapabilityKind, CapabilitySet};
