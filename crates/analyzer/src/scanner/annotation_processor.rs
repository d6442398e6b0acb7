//! 어노테이션 프로세서 스캐너
//!
//! `META-INF/services/javax.annotation.processing.Processor`에 등록된 첫 번째
//! 프로세서를 찾고, 그 클래스 파일에 `@SupportedAnnotationTypes`가 있으면 읽습니다.
//! 결과는 캐시의 `procs` 영역에 저장됩니다 (프로세서가 없다는 결과도 포함).

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use depcap_core::capability::{AnnotationProcessorCapability, Capability};

use super::classfile::{ClassFile, ConstantValue, ElementValue};
use super::service_loader::ANNOTATION_PROCESSOR_PATH;
use super::{ArtifactScanner, JarArchive, ScanContext};
use crate::error::AnalyzerError;

const SUPPORTED_ANNOTATION_TYPES: &str = "Ljavax/annotation/processing/SupportedAnnotationTypes;";

/// 디스크립터에서 첫 번째 프로세서 클래스 이름을 찾습니다.
pub fn first_processor(descriptor: &str) -> Option<&str> {
    descriptor
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// 프로세서 클래스의 `@SupportedAnnotationTypes` 값
fn supported_types(class: &ClassFile) -> BTreeSet<String> {
    let Some(value) = class
        .annotation(SUPPORTED_ANNOTATION_TYPES)
        .and_then(|a| a.element("value"))
    else {
        return BTreeSet::new();
    };

    let mut types = BTreeSet::new();
    let mut push = |v: &ElementValue| {
        if let ElementValue::Const(ConstantValue::String(s)) = v {
            types.insert(s.clone());
        }
    };
    match value {
        ElementValue::Array(values) => values.iter().for_each(&mut push),
        single => push(single),
    }
    types
}

fn find_processor(
    archive: &mut JarArchive,
) -> Result<Option<AnnotationProcessorCapability>, AnalyzerError> {
    let Some(descriptor) = archive.read_entry_string(ANNOTATION_PROCESSOR_PATH)? else {
        return Ok(None);
    };
    let Some(processor) = first_processor(&descriptor) else {
        return Ok(None);
    };

    let class_entry = format!("{}.class", processor.replace('.', "/"));
    let supported_annotation_types = match archive.read_entry(&class_entry)? {
        Some(bytes) => match ClassFile::parse(&bytes) {
            Ok(class) => supported_types(&class),
            Err(e) => {
                // 프로세서 등록 자체는 유효하므로 타입 정보 없이 계속 진행
                warn!(
                    archive = %archive.path().display(),
                    entry = %class_entry,
                    error = %e,
                    "cannot read processor class"
                );
                BTreeSet::new()
            }
        },
        None => BTreeSet::new(),
    };

    Ok(Some(AnnotationProcessorCapability {
        processor: processor.to_owned(),
        supported_annotation_types,
    }))
}

/// 어노테이션 프로세서 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationProcessorScanner;

impl ArtifactScanner for AnnotationProcessorScanner {
    fn name(&self) -> &'static str {
        "annotation_processor"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let key = archive.path().display().to_string();
        let processor = ctx
            .cache
            .procs()
            .get_or_insert_with(&key, || find_processor(archive).map(|p| p.map(Arc::new)))?;

        Ok(match processor {
            Some(found) => {
                debug!(
                    artifact = %ctx.coordinates,
                    processor = %found.processor,
                    "found annotation processor"
                );
                vec![Capability::AnnotationProcessor(found.as_ref().clone())]
            }
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::classfile::builder::{BuilderValue, ClassBuilder};
    use super::*;

    #[test]
    fn first_processor_skips_comments() {
        let descriptor = "# generated\n\n  com.example.FirstProcessor \ncom.example.Second\n";
        assert_eq!(first_processor(descriptor), Some("com.example.FirstProcessor"));
        assert_eq!(first_processor("# only comments\n"), None);
    }

    #[test]
    fn reads_supported_types_array() {
        let bytes = ClassBuilder::new("com/example/Proc")
            .annotation(
                SUPPORTED_ANNOTATION_TYPES,
                vec![(
                    "value",
                    BuilderValue::StrArray(vec!["com.example.Gen".to_owned(), "*".to_owned()]),
                )],
            )
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        let types = supported_types(&class);
        assert!(types.contains("com.example.Gen"));
        assert!(types.contains("*"));
    }

    #[test]
    fn reads_single_supported_type() {
        let bytes = ClassBuilder::new("com/example/Proc")
            .annotation(
                SUPPORTED_ANNOTATION_TYPES,
                vec![("value", BuilderValue::Str("com.example.Only".to_owned()))],
            )
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(supported_types(&class).len(), 1);
    }

    #[test]
    fn missing_annotation_is_empty() {
        let class = ClassFile::parse(&ClassBuilder::new("a/P").build()).unwrap();
        assert!(supported_types(&class).is_empty());
    }
}
