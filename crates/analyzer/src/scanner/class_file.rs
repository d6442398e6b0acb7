//! 클래스 파일 스캐너
//!
//! 아카이브의 모든 `.class` 엔트리를 읽어 [`ExplodedArchive`] 요약을 만들고,
//! 그로부터 다음 능력을 만듭니다.
//!
//! - `Class`: 포함된 클래스 FQCN
//! - `Constant`: `ConstantValue`를 가진 static final 필드, Kotlin 파일 파사드
//! - `SecurityProvider`: `java.security.Provider`의 직접 하위 클래스
//! - `Inferred`: 모든 클래스가 RUNTIME이 아닌 retention의 어노테이션 타입인지
//!
//! 요약은 캐시의 `archives` 영역에 아카이브 경로를 키로 저장됩니다.
//! `module-info`와 `META-INF/` 아래(멀티 릴리스 사본 포함)는 건너뜁니다.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use depcap_core::capability::{
    Capability, ClassCapability, ConstantCapability, InferredCapability, KtFile,
    SecurityProviderCapability,
};

use super::classfile::ClassFile;
use super::{ArtifactScanner, JarArchive, ScanContext, dotted};
use crate::error::AnalyzerError;

const SECURITY_PROVIDER: &str = "java/security/Provider";

/// Kotlin 메타데이터 종류: 파일 파사드
const KOTLIN_FILE_FACADE: i32 = 2;

/// 아카이브의 클래스 파일 분석 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplodedArchive {
    /// 포함된 클래스 FQCN
    pub classes: BTreeSet<String>,
    /// FQCN → 상수 필드 이름
    pub constants: BTreeMap<String, BTreeSet<String>>,
    pub kt_files: BTreeSet<KtFile>,
    pub security_providers: BTreeSet<String>,
    /// 클래스가 하나 이상 있고 전부 컴파일 타임 전용 어노테이션인지
    pub compile_only_annotations: bool,
}

impl ExplodedArchive {
    /// 파싱된 클래스 파일들로부터 요약을 만듭니다.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a ClassFile>) -> Self {
        let mut exploded = Self::default();
        let mut all_compile_only = true;

        for class in classes {
            let fqcn = dotted(&class.this_class);

            if class.is_annotation() {
                all_compile_only &= class.retention() != "RUNTIME";
            } else {
                all_compile_only = false;
            }

            if class.super_class.as_deref() == Some(SECURITY_PROVIDER) {
                exploded.security_providers.insert(fqcn.clone());
            }

            let constant_fields: BTreeSet<String> = class
                .fields
                .iter()
                .filter(|f| f.is_constant())
                .map(|f| f.name.clone())
                .collect();
            if !constant_fields.is_empty() {
                exploded.constants.insert(fqcn.clone(), constant_fields);
            }

            if class.kotlin_kind() == Some(KOTLIN_FILE_FACADE) {
                exploded.kt_files.insert(KtFile::from_facade(fqcn.clone()));
            }

            exploded.classes.insert(fqcn);
        }

        exploded.compile_only_annotations = all_compile_only && !exploded.classes.is_empty();
        exploded
    }

    /// 요약을 능력 목록으로 바꿉니다. 빈 증거는 능력을 만들지 않습니다.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut out = Vec::new();
        if self.classes.is_empty() {
            return out;
        }

        out.push(Capability::Class(ClassCapability {
            classes: self.classes.clone(),
        }));
        if !self.constants.is_empty() || !self.kt_files.is_empty() {
            out.push(Capability::Constant(ConstantCapability {
                constants: self.constants.clone(),
                kt_files: self.kt_files.clone(),
            }));
        }
        if !self.security_providers.is_empty() {
            out.push(Capability::SecurityProvider(SecurityProviderCapability {
                security_providers: self.security_providers.clone(),
            }));
        }
        out.push(Capability::Inferred(InferredCapability {
            is_compile_only_annotations: self.compile_only_annotations,
        }));
        out
    }
}

/// 스캔 대상 클래스 엔트리인지 확인합니다.
pub fn is_scannable_class(entry: &str) -> bool {
    entry.ends_with(".class")
        && !entry.starts_with("META-INF/")
        && !entry.ends_with("module-info.class")
}

/// 아카이브를 열어 클래스 파일을 모두 읽고 요약합니다.
pub fn explode(archive: &mut JarArchive, ctx: &ScanContext<'_>) -> Result<ExplodedArchive, AnalyzerError> {
    let entries: Vec<String> = archive
        .entry_names()
        .iter()
        .filter(|name| is_scannable_class(name))
        .cloned()
        .collect();

    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(bytes) = archive.read_entry(&entry)? else {
            continue;
        };
        let class = ClassFile::parse(&bytes).map_err(|e| AnalyzerError::ClassFile {
            entry: format!("{}!/{entry}", archive.path().display()),
            reason: e.to_string(),
        })?;
        if class.is_module() {
            continue;
        }
        ctx.cache.record_class(&dotted(&class.this_class));
        parsed.push(class);
    }

    Ok(ExplodedArchive::from_classes(&parsed))
}

/// 클래스 파일 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileScanner;

impl ClassFileScanner {
    /// 캐시를 거쳐 요약을 얻습니다.
    pub fn exploded(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Arc<ExplodedArchive>, AnalyzerError> {
        let key = archive.path().display().to_string();
        ctx.cache
            .archives()
            .get_or_insert_with(&key, || explode(archive, ctx).map(Arc::new))
    }
}

impl ArtifactScanner for ClassFileScanner {
    fn name(&self) -> &'static str {
        "class_file"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let exploded = self.exploded(archive, ctx)?;
        debug!(
            artifact = %ctx.coordinates,
            classes = exploded.classes.len(),
            constants = exploded.constants.len(),
            "exploded archive"
        );
        Ok(exploded.capabilities())
    }
}
