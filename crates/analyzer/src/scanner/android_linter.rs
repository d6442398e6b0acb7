//! Android lint 스캐너
//!
//! lint 검사를 제공하는 아카이브는 `META-INF/MANIFEST.MF`에 레지스트리 클래스를
//! 선언합니다 (`Lint-Registry-v2`, 구버전은 `Lint-Registry`).
//! 아카이브의 모든 클래스가 레지스트리의 패키지 아래에 있으면 lint 전용
//! 아카이브로 봅니다.

use tracing::debug;

use depcap_core::capability::{AndroidLinterCapability, Capability};

use super::{ArtifactScanner, JarArchive, ScanContext, class_entry_to_fqcn};
use crate::error::AnalyzerError;

pub const JAR_MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// 우선순위 순서의 레지스트리 속성 이름
pub const LINT_REGISTRY_ATTRIBUTES: [&str; 2] = ["Lint-Registry-v2", "Lint-Registry"];

/// jar 매니페스트의 메인 섹션에서 속성 값을 찾습니다.
///
/// 공백 하나로 시작하는 줄은 앞 줄의 이어쓰기입니다. 메인 섹션은 첫 빈 줄에서
/// 끝납니다.
pub fn manifest_attribute(content: &str, name: &str) -> Result<Option<String>, AnalyzerError> {
    let mut current: Option<(String, String)> = None;

    for line in content.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        if let Some(continued) = line.strip_prefix(' ') {
            match current.as_mut() {
                Some((_, value)) => value.push_str(continued),
                None => {
                    return Err(AnalyzerError::Manifest {
                        entry: JAR_MANIFEST_PATH.to_owned(),
                        reason: "continuation line before any header".to_owned(),
                    });
                }
            }
            continue;
        }

        if let Some((key, value)) = current.take()
            && key.eq_ignore_ascii_case(name)
        {
            return Ok(Some(value.trim().to_owned()));
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(AnalyzerError::Manifest {
                entry: JAR_MANIFEST_PATH.to_owned(),
                reason: format!("invalid header line: {line}"),
            });
        };
        current = Some((key.trim().to_owned(), value.trim_start().to_owned()));
    }

    Ok(current
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim().to_owned()))
}

/// 모든 클래스가 레지스트리 패키지 아래에 있는지 확인합니다.
///
/// 클래스가 하나도 없으면 `false`입니다.
pub fn is_lint_only<'a>(registry: &str, classes: impl IntoIterator<Item = &'a str>) -> bool {
    let prefix = match registry.rsplit_once('.') {
        Some((package, _)) => format!("{package}."),
        None => String::new(),
    };

    let mut seen = false;
    for class in classes {
        if !class.starts_with(&prefix) {
            return false;
        }
        seen = true;
    }
    seen
}

/// Android lint 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidLinterScanner;

impl ArtifactScanner for AndroidLinterScanner {
    fn name(&self) -> &'static str {
        "android_linter"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let Some(manifest) = archive.read_entry_string(JAR_MANIFEST_PATH)? else {
            return Ok(Vec::new());
        };

        let mut registry = None;
        for attribute in LINT_REGISTRY_ATTRIBUTES {
            if let Some(value) = manifest_attribute(&manifest, attribute)?
                && !value.is_empty()
            {
                registry = Some(value);
                break;
            }
        }
        let Some(lint_registry) = registry else {
            return Ok(Vec::new());
        };

        let classes: Vec<String> = archive
            .entry_names()
            .iter()
            .filter(|name| !name.starts_with("META-INF/"))
            .filter_map(|name| class_entry_to_fqcn(name))
            .collect();
        let is_lint_jar = is_lint_only(&lint_registry, classes.iter().map(String::as_str));

        debug!(
            artifact = %ctx.coordinates,
            registry = %lint_registry,
            is_lint_jar,
            "found lint registry"
        );
        Ok(vec![Capability::AndroidLinter(AndroidLinterCapability {
            lint_registry,
            is_lint_jar,
        })])
    }
}
