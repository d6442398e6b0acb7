//! 아티팩트 스캐너 -- 아카이브 내용에서 능력 추출
//!
//! [`ArtifactScanner`] trait은 각 스캐너가 구현해야 하는 인터페이스입니다.
//! 스캐너끼리는 조율이 필요 없으며, 같은 아카이브에 대해 독립적으로 실행됩니다.
//!
//! # 지원 스캐너
//!
//! | 이름 | 스캐너 | 능력 |
//! |---|---|---|
//! | `service_loader` | [`ServiceLoaderScanner`] | `ServiceLoader` |
//! | `class_file` | [`ClassFileScanner`] | `Class`, `Constant`, `SecurityProvider`, `Inferred` |
//! | `annotation_processor` | [`AnnotationProcessorScanner`] | `AnnotationProcessor` |
//! | `native_lib` | [`NativeLibScanner`] | `NativeLib` |
//! | `android_linter` | [`AndroidLinterScanner`] | `AndroidLinter` |
//! | `android_manifest` | [`AndroidManifestScanner`] | `AndroidManifest` |
//! | `android_res` | [`AndroidResScanner`] | `AndroidRes` |
//!
//! # 확장
//!
//! 새로운 스캐너를 추가하려면 `ArtifactScanner`를 구현하고 [`default_scanners`]에
//! 등록합니다. 설정에서 이름으로 고를 수 있도록 `KNOWN_SCANNERS`에도 추가합니다.

pub mod android_linter;
pub mod android_manifest;
pub mod android_res;
pub mod annotation_processor;
pub mod archive;
pub mod class_file;
pub mod classfile;
pub mod native_lib;
pub mod service_loader;

use std::sync::Arc;

use depcap_core::capability::Capability;
use depcap_core::coordinates::Coordinates;

use crate::cache::AnalysisCache;
use crate::error::AnalyzerError;

pub use android_linter::AndroidLinterScanner;
pub use android_manifest::AndroidManifestScanner;
pub use android_res::AndroidResScanner;
pub use annotation_processor::AnnotationProcessorScanner;
pub use archive::{ArchiveLimits, JarArchive};
pub use class_file::{ClassFileScanner, ExplodedArchive};
pub use native_lib::NativeLibScanner;
pub use service_loader::ServiceLoaderScanner;

/// 스캔 한 번에 필요한 주변 정보
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// 아티팩트의 좌표 (귀속용, 파싱에는 쓰이지 않음)
    pub coordinates: &'a Coordinates,
    /// 빌드 전체에서 공유되는 캐시
    pub cache: &'a AnalysisCache,
}

/// 아티팩트 스캐너 trait
///
/// 구현체는 호출 사이에 공유되는 가변 상태를 가지면 안 됩니다. 같은 아카이브에 대한
/// 스캔은 항상 같은 결과를 내야 하며, 여러 번 실행해도 안전해야 합니다.
pub trait ArtifactScanner: Send + Sync {
    /// 설정에서 쓰는 스캐너 이름
    fn name(&self) -> &'static str;

    /// 아카이브를 검사해 능력을 반환합니다.
    ///
    /// 해당하는 내용이 없으면 빈 목록을 반환합니다 (에러 아님).
    /// 에러는 이 아티팩트의 이 스캐너에만 국한됩니다.
    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError>;
}

/// 모든 기본 스캐너를 등록 순서대로 반환합니다.
pub fn default_scanners() -> Vec<Arc<dyn ArtifactScanner>> {
    vec![
        Arc::new(ServiceLoaderScanner),
        Arc::new(ClassFileScanner),
        Arc::new(AnnotationProcessorScanner),
        Arc::new(NativeLibScanner),
        Arc::new(AndroidLinterScanner),
        Arc::new(AndroidManifestScanner),
        Arc::new(AndroidResScanner),
    ]
}

/// 자바 내부 이름(`a/b/C`)을 점 표기(`a.b.C`)로 바꿉니다.
pub(crate) fn dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

/// 클래스 엔트리 이름(`a/b/C.class`)을 FQCN으로 바꿉니다.
pub(crate) fn class_entry_to_fqcn(entry: &str) -> Option<String> {
    entry.strip_suffix(".class").map(dotted)
}
