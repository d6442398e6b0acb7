//! 네이티브 라이브러리 스캐너
//!
//! JNI로 로드되는 공유 라이브러리 엔트리를 찾습니다.

use std::collections::BTreeSet;

use tracing::debug;

use depcap_core::capability::{Capability, NativeLibCapability};

use super::{ArtifactScanner, JarArchive, ScanContext};
use crate::error::AnalyzerError;

/// 네이티브 라이브러리 확장자
pub const NATIVE_LIB_EXTENSIONS: [&str; 4] = [".so", ".dylib", ".dll", ".jnilib"];

/// 엔트리가 네이티브 라이브러리인지 확인합니다.
pub fn is_native_lib(entry: &str) -> bool {
    NATIVE_LIB_EXTENSIONS.iter().any(|ext| entry.ends_with(ext))
}

/// 네이티브 라이브러리 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLibScanner;

impl ArtifactScanner for NativeLibScanner {
    fn name(&self) -> &'static str {
        "native_lib"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let file_names: BTreeSet<String> = archive
            .entry_names()
            .iter()
            .filter(|name| is_native_lib(name))
            .map(|name| name.rsplit('/').next().unwrap_or(name).to_owned())
            .collect();

        if file_names.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            artifact = %ctx.coordinates,
            libraries = file_names.len(),
            "found native libraries"
        );
        Ok(vec![Capability::NativeLib(NativeLibCapability { file_names })])
    }
}
