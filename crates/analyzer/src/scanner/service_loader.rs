//! 서비스 프로바이더 스캐너
//!
//! `META-INF/services/<인터페이스 FQCN>` 파일마다 하나의
//! [`ServiceLoaderCapability`]를 만듭니다. 각 줄은 구현 클래스 이름이며,
//! `#`으로 시작하는 줄과 빈 줄은 무시됩니다.
//!
//! `META-INF/services/javax.annotation.processing.Processor`는 컴파일러 플러그인의
//! 자기 등록이므로 제외합니다 (어노테이션 프로세서 스캐너가 다룸).
//!
//! 예: `kotlinx-coroutines-android`
//! 1. `META-INF/services/kotlinx.coroutines.internal.MainDispatcherFactory`
//! 2. `META-INF/services/kotlinx.coroutines.CoroutineExceptionHandler`

use std::collections::BTreeSet;

use tracing::debug;

use depcap_core::capability::{Capability, ServiceLoaderCapability};

use super::{ArtifactScanner, JarArchive, ScanContext};
use crate::error::AnalyzerError;

/// 서비스 디스크립터 디렉토리
pub const SERVICE_LOADER_PATH: &str = "META-INF/services/";

/// 어노테이션 프로세서 자기 등록 디스크립터
pub const ANNOTATION_PROCESSOR_PATH: &str =
    "META-INF/services/javax.annotation.processing.Processor";

/// 엔트리가 런타임 서비스 디스크립터인지 확인합니다.
pub fn is_service_descriptor(entry: &str) -> bool {
    entry.starts_with(SERVICE_LOADER_PATH)
        && !entry.starts_with(ANNOTATION_PROCESSOR_PATH)
        && entry.len() > SERVICE_LOADER_PATH.len()
        && !entry.ends_with('/')
}

/// 디스크립터 내용에서 프로바이더 클래스 이름을 읽습니다.
pub fn parse_descriptor(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// 서비스 프로바이더 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceLoaderScanner;

impl ServiceLoaderScanner {
    /// 아카이브의 서비스 디스크립터를 발견 순서대로 읽습니다.
    ///
    /// 같은 디스크립터 경로가 두 번 나오면 하나로 합칩니다.
    pub fn find(&self, archive: &mut JarArchive) -> Result<Vec<ServiceLoaderCapability>, AnalyzerError> {
        let descriptors: Vec<String> = archive
            .entry_names()
            .iter()
            .filter(|name| is_service_descriptor(name))
            .cloned()
            .collect();

        let mut found: Vec<ServiceLoaderCapability> = Vec::with_capacity(descriptors.len());
        for entry in descriptors {
            let Some(content) = archive.read_entry_string(&entry)? else {
                continue;
            };
            let provider_file = entry[SERVICE_LOADER_PATH.len()..].to_owned();
            let provider_classes = parse_descriptor(&content);

            match found.iter_mut().find(|c| c.provider_file == provider_file) {
                Some(existing) => existing.provider_classes.extend(provider_classes),
                None => found.push(ServiceLoaderCapability {
                    provider_file,
                    provider_classes,
                }),
            }
        }
        Ok(found)
    }
}

impl ArtifactScanner for ServiceLoaderScanner {
    fn name(&self) -> &'static str {
        "service_loader"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let found = self.find(archive)?;
        if !found.is_empty() {
            debug!(
                artifact = %ctx.coordinates,
                descriptors = found.len(),
                "found service loaders"
            );
        }
        Ok(found.into_iter().map(Capability::ServiceLoader).collect())
    }
}
