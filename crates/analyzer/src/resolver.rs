//! 식별자 해석기 -- 그래프 참조를 [`Coordinates`]로 변환
//!
//! 모든 함수는 상태가 없으며 병렬로 호출해도 안전합니다.
//!
//! # 규칙
//!
//! 1. 프로젝트 참조 → [`ProjectCoordinates`]
//! 2. 외부 모듈 → `group:name` (group이 비면 `name`). 버전이 있으면
//!    [`ModuleCoordinates`], 비어 있으면 [`FlatCoordinates`]
//! 3. group/module 개념이 없는 참조 → [`FlatCoordinates`] (표시 이름)
//! 4. composite 치환 + 외부 모듈 요청 → [`IncludedBuildCoordinates`]
//! 5. 그 밖의 타입 → [`ResolveError`]

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use depcap_core::coordinates::{
    Coordinates, FlatCoordinates, IncludedBuildCoordinates, ModuleCoordinates, ProjectCoordinates,
};
use depcap_core::error::ResolveError;

use crate::graph::{ComponentId, ComponentSelector, Dependency, FileSet, ResolvedDependency};

/// 플랫폼 카테고리 속성 키
pub const CATEGORY_ATTRIBUTE: &str = "org.gradle.category";

/// java platform 프로젝트가 적용하는 플러그인
pub const JAVA_PLATFORM_PLUGIN: &str = "java-platform";

const PLATFORM_CATEGORIES: [&str; 2] = ["platform", "enforced-platform"];

/// 비어 있지 않은 값만 남깁니다.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `group:name`, group이 비어 있으면 `name`
fn module_identifier(group: Option<&str>, name: &str) -> String {
    match non_blank(group) {
        Some(group) => format!("{group}:{name}"),
        None => name.to_owned(),
    }
}

fn module_coordinates(identifier: String, version: Option<&str>) -> Coordinates {
    match non_blank(version) {
        Some(version) => ModuleCoordinates::new(identifier, version).into(),
        None => FlatCoordinates::new(identifier).into(),
    }
}

// ─── 해석된 컴포넌트 ──────────────────────────────────────────────

/// 컴포넌트의 정규 식별자
///
/// 외부 모듈은 `group:name`, 프로젝트는 빌드 경로, 불투명 컴포넌트는 표시 이름입니다.
pub fn component_identifier(id: &ComponentId) -> Result<String, ResolveError> {
    let (kind, value) = match id {
        ComponentId::Project { path } => ("project", path.as_str()),
        ComponentId::Module { group, name, .. } => {
            let name = non_blank(Some(name.as_str()))
                .ok_or(ResolveError::EmptyIdentifier { kind: "module" })?;
            return Ok(module_identifier(group.as_deref(), name));
        }
        ComponentId::Opaque { display_name } => ("opaque", display_name.as_str()),
        ComponentId::OpaqueArtifact { display_name } => ("opaque_artifact", display_name.as_str()),
        ComponentId::Unsupported { kind, display_name } => {
            return Err(ResolveError::UnsupportedComponent {
                kind: kind.clone(),
                display_name: display_name.clone(),
            });
        }
    };
    non_blank(Some(value))
        .map(str::to_owned)
        .ok_or(ResolveError::EmptyIdentifier { kind })
}

/// 해석된 버전. 요청된 버전과 다를 수 있으며, 비어 있으면 `None`
pub fn component_resolved_version(id: &ComponentId) -> Result<Option<String>, ResolveError> {
    match id {
        ComponentId::Module { version, .. } => Ok(non_blank(version.as_deref()).map(str::to_owned)),
        ComponentId::Project { .. } | ComponentId::Opaque { .. } | ComponentId::OpaqueArtifact { .. } => {
            Ok(None)
        }
        ComponentId::Unsupported { kind, display_name } => {
            Err(ResolveError::UnsupportedComponent {
                kind: kind.clone(),
                display_name: display_name.clone(),
            })
        }
    }
}

/// 컴포넌트 식별자를 좌표로 변환합니다.
pub fn resolve_component(id: &ComponentId) -> Result<Coordinates, ResolveError> {
    let identifier = component_identifier(id)?;
    let coordinates = match id {
        ComponentId::Project { .. } => ProjectCoordinates::new(identifier).into(),
        ComponentId::Module { .. } => {
            module_coordinates(identifier, component_resolved_version(id)?.as_deref())
        }
        _ => FlatCoordinates::new(identifier).into(),
    };
    Ok(coordinates)
}

/// composite 치환이면 요청된 모듈 좌표를 반환합니다.
fn composite_request(edge: &ResolvedDependency) -> Option<ModuleCoordinates> {
    if !edge.selection_reason.composite_substitution {
        return None;
    }
    match &edge.requested {
        ComponentSelector::Module {
            group,
            name,
            version,
        } => Some(ModuleCoordinates::new(
            module_identifier(group.as_deref(), name),
            version.clone().unwrap_or_default(),
        )),
        _ => None,
    }
}

/// 그래프 엣지를 좌표로 변환합니다.
///
/// composite 치환으로 외부 모듈 요청이 로컬 프로젝트로 해석된 경우에만
/// [`IncludedBuildCoordinates`]를 만듭니다.
pub fn resolve_edge(edge: &ResolvedDependency) -> Result<Coordinates, ResolveError> {
    if let ComponentSelector::Unsupported { kind, display_name } = &edge.requested {
        return Err(ResolveError::UnsupportedSelector {
            kind: kind.clone(),
            display_name: display_name.clone(),
        });
    }

    let selected = resolve_component(&edge.selected)?;
    let Some(requested) = composite_request(edge) else {
        return Ok(selected);
    };

    match selected {
        Coordinates::Project(resolved) => {
            debug!(
                requested = %requested.identifier,
                resolved = %resolved.identifier,
                "composite substitution"
            );
            Ok(IncludedBuildCoordinates {
                requested,
                resolved,
            }
            .into())
        }
        other => Err(ResolveError::CompositeTargetNotProject {
            requested: requested.gav(),
            selected: other.gav(),
        }),
    }
}

// ─── 선언된 의존성 ────────────────────────────────────────────────

fn is_java_platform(dep: &Dependency) -> bool {
    match dep {
        Dependency::Project { plugins, .. } => plugins.iter().any(|p| p == JAVA_PLATFORM_PLUGIN),
        Dependency::Module { attributes, .. } => attributes
            .get(CATEGORY_ATTRIBUTE)
            .is_some_and(|c| PLATFORM_CATEGORIES.contains(&c.as_str())),
        _ => false,
    }
}

/// 파일 컬렉션의 첫 번째 파일 이름
///
/// 여러 파일이 있어도 첫 번째만 사용합니다.
fn first_file_name(files: &FileSet) -> Option<String> {
    match files {
        FileSet::Configurable { from } => from.first().map(|path| {
            path.rsplit_once('/')
                .map_or(path.as_str(), |(_, last)| last)
                .to_owned()
        }),
        FileSet::Tree { files } => files
            .first()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned()),
        FileSet::Other => None,
    }
}

/// 선언된 의존성의 식별자
///
/// 식별 정보가 없는 자체 해석 의존성과 알 수 없는 파일 집합은 `None`입니다.
/// java platform 의존성이면 `platform_sink`에 `identifier → true`를 기록합니다.
pub fn declared_identifier(
    dep: &Dependency,
    platform_sink: &mut BTreeMap<String, bool>,
) -> Result<Option<String>, ResolveError> {
    let identifier = match dep {
        Dependency::Project { path, .. } => Some(path.clone()),
        Dependency::Module { group, name, .. } => Some(module_identifier(group.as_deref(), name)),
        Dependency::FileCollection { files } => first_file_name(files),
        Dependency::SelfResolving { .. } => None,
        Dependency::Unsupported { kind, display_name } => {
            return Err(ResolveError::UnsupportedDependency {
                kind: kind.clone(),
                display_name: display_name.clone(),
            });
        }
    };

    if let Some(id) = &identifier
        && is_java_platform(dep)
    {
        platform_sink.insert(id.clone(), true);
    }
    Ok(identifier)
}

/// 선언된 의존성 목록을 식별자 집합으로 변환합니다.
pub fn declared_identifiers<'a>(
    deps: impl IntoIterator<Item = &'a Dependency>,
    platform_sink: &mut BTreeMap<String, bool>,
) -> Result<BTreeSet<String>, ResolveError> {
    let mut identifiers = BTreeSet::new();
    for dep in deps {
        if let Some(id) = declared_identifier(dep, platform_sink)? {
            identifiers.insert(id);
        }
    }
    Ok(identifiers)
}

/// 선언된 의존성을 좌표로 변환합니다.
pub fn resolve_declared(dep: &Dependency) -> Result<Option<Coordinates>, ResolveError> {
    let mut ignored = BTreeMap::new();
    let Some(identifier) = declared_identifier(dep, &mut ignored)? else {
        return Ok(None);
    };

    let coordinates = match dep {
        Dependency::Project { .. } => ProjectCoordinates::new(identifier).into(),
        Dependency::Module { version, .. } => module_coordinates(identifier, version.as_deref()),
        _ => FlatCoordinates::new(identifier).into(),
    };
    Ok(Some(coordinates))
}
