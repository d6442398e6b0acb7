//! 의존성 그래프 입력 타입
//!
//! 호스트 빌드 시스템이 JSON으로 내보낸 해석 결과를 표현합니다.
//! 각 참조 타입은 `kind` 필드로 구분되며, 이 크레이트가 모르는 `kind`는
//! 역직렬화 단계에서 `Unsupported` 변형으로 보존됩니다. 해석기는 이 변형을 만나면
//! 타입 이름을 담은 치명적 에러를 냅니다.
//!
//! ```json
//! {
//!   "edges": [{
//!     "requested": { "kind": "module", "group": "com.example", "name": "lib", "version": "1.0" },
//!     "selected":  { "kind": "project", "path": ":lib" },
//!     "selection_reason": { "composite_substitution": true }
//!   }],
//!   "artifacts": [{ "component": { "kind": "module", "group": "com.squareup.okio",
//!                   "name": "okio", "version": "3.9.0" }, "file": "/cache/okio-3.9.0.jar" }],
//!   "declared": [{ "kind": "project", "path": ":core", "plugins": ["java-library"] }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// 해석된 그래프 노드의 컴포넌트 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawReference")]
pub enum ComponentId {
    /// 같은 빌드 내 프로젝트
    Project { path: String },
    /// 외부 모듈. group과 version은 비어 있거나 없을 수 있음
    Module {
        group: Option<String>,
        name: String,
        version: Option<String>,
    },
    /// 플랫폼 API 등 불투명 컴포넌트 (예: "Gradle API")
    Opaque { display_name: String },
    /// 파일 의존성
    OpaqueArtifact { display_name: String },
    /// 알 수 없는 식별자 타입
    Unsupported { kind: String, display_name: String },
}

impl ComponentId {
    /// 진단 메시지용 이름
    pub fn display_name(&self) -> String {
        match self {
            Self::Project { path } => format!("project {path}"),
            Self::Module {
                group,
                name,
                version,
            } => {
                let mut s = String::new();
                if let Some(g) = group {
                    s.push_str(g);
                    s.push(':');
                }
                s.push_str(name);
                if let Some(v) = version {
                    s.push(':');
                    s.push_str(v);
                }
                s
            }
            Self::Opaque { display_name }
            | Self::OpaqueArtifact { display_name }
            | Self::Unsupported { display_name, .. } => display_name.clone(),
        }
    }
}

/// 그래프 엣지의 요청 측 (무엇을 요청했는가)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawReference")]
pub enum ComponentSelector {
    Module {
        group: Option<String>,
        name: String,
        version: Option<String>,
    },
    Project {
        path: String,
    },
    Unsupported {
        kind: String,
        display_name: String,
    },
}

/// 선택 사유 플래그
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionReason {
    /// composite 빌드 치환 여부
    #[serde(default)]
    pub composite_substitution: bool,
    /// 사람이 읽는 설명 (진단용)
    #[serde(default)]
    pub descriptions: Vec<String>,
}

/// 해석된 의존성 엣지
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedDependency {
    pub requested: ComponentSelector,
    pub selected: ComponentId,
    #[serde(default)]
    pub selection_reason: SelectionReason,
}

/// 파일 컬렉션 의존성이 가리키는 파일 집합
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileSet {
    /// 명시적 경로 목록
    Configurable {
        #[serde(default)]
        from: Vec<String>,
    },
    /// 디렉토리 트리에서 수집된 파일
    Tree {
        #[serde(default)]
        files: Vec<PathBuf>,
    },
    /// 식별 정보가 없는 기타 컬렉션
    #[serde(other)]
    Other,
}

/// 선언된 (해석 전) 의존성
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawReference")]
pub enum Dependency {
    Project {
        path: String,
        plugins: Vec<String>,
    },
    Module {
        group: Option<String>,
        name: String,
        version: Option<String>,
        attributes: BTreeMap<String, String>,
    },
    FileCollection {
        files: FileSet,
    },
    /// 식별에 필요한 정보가 없는 자체 해석 의존성
    SelfResolving {
        display_name: String,
    },
    Unsupported {
        kind: String,
        display_name: String,
    },
}

/// 해석된 아티팩트 파일
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedArtifact {
    pub component: ComponentId,
    pub file: PathBuf,
}

/// 호스트가 내보낸 그래프 전체
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphExport {
    #[serde(default)]
    pub edges: Vec<ResolvedDependency>,
    #[serde(default)]
    pub artifacts: Vec<ResolvedArtifact>,
    #[serde(default)]
    pub declared: Vec<Dependency>,
}

impl GraphExport {
    /// JSON 문자열에서 그래프를 읽습니다.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ─── 역직렬화 보조 ────────────────────────────────────────────────

/// 모든 참조 타입이 공유하는 평탄한 JSON 형태
#[derive(Debug, Deserialize)]
struct RawReference {
    kind: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    plugins: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    files: Option<FileSet>,
}

impl RawReference {
    fn require(field: Option<String>, kind: &str, name: &str) -> Result<String, String> {
        match field {
            Some(value) if !value.trim().is_empty() => Ok(value),
            Some(_) => Err(format!("'{kind}' reference has blank field '{name}'")),
            None => Err(format!("'{kind}' reference is missing field '{name}'")),
        }
    }

    /// 알 수 없는 타입의 표시 이름은 가능한 정보로 최대한 구성
    fn fallback_display_name(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.name.clone())
            .or_else(|| self.path.clone())
            .unwrap_or_default()
    }
}

impl TryFrom<RawReference> for ComponentId {
    type Error = String;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "project" => Ok(Self::Project {
                path: RawReference::require(raw.path, "project", "path")?,
            }),
            "module" => Ok(Self::Module {
                group: raw.group,
                name: RawReference::require(raw.name, "module", "name")?,
                version: raw.version,
            }),
            "opaque" => Ok(Self::Opaque {
                display_name: RawReference::require(raw.display_name, "opaque", "display_name")?,
            }),
            "opaque_artifact" => Ok(Self::OpaqueArtifact {
                display_name: RawReference::require(
                    raw.display_name,
                    "opaque_artifact",
                    "display_name",
                )?,
            }),
            _ => Ok(Self::Unsupported {
                display_name: raw.fallback_display_name(),
                kind: raw.kind,
            }),
        }
    }
}

impl TryFrom<RawReference> for ComponentSelector {
    type Error = String;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "module" => Ok(Self::Module {
                group: raw.group,
                name: RawReference::require(raw.name, "module", "name")?,
                version: raw.version,
            }),
            "project" => Ok(Self::Project {
                path: RawReference::require(raw.path, "project", "path")?,
            }),
            _ => Ok(Self::Unsupported {
                display_name: raw.fallback_display_name(),
                kind: raw.kind,
            }),
        }
    }
}

impl TryFrom<RawReference> for Dependency {
    type Error = String;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "project" => Ok(Self::Project {
                path: RawReference::require(raw.path, "project", "path")?,
                plugins: raw.plugins,
            }),
            "module" => Ok(Self::Module {
                group: raw.group,
                name: RawReference::require(raw.name, "module", "name")?,
                version: raw.version,
                attributes: raw.attributes,
            }),
            "file_collection" => Ok(Self::FileCollection {
                files: raw.files.unwrap_or(FileSet::Other),
            }),
            "self_resolving" => Ok(Self::SelfResolving {
                display_name: raw.fallback_display_name(),
            }),
            _ => Ok(Self::Unsupported {
                display_name: raw.fallback_display_name(),
                kind: raw.kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_component_kinds() {
        let ids: Vec<ComponentId> = serde_json::from_str(
            r#"[
                {"kind": "project", "path": ":app"},
                {"kind": "module", "group": "g", "name": "a", "version": "1"},
                {"kind": "opaque", "display_name": "Gradle API"},
                {"kind": "opaque_artifact", "display_name": "libs/foo.jar"},
                {"kind": "library_binary", "display_name": "android.jar"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            ids[0],
            ComponentId::Project {
                path: ":app".to_owned()
            }
        );
        assert!(matches!(&ids[1], ComponentId::Module { version: Some(v), .. } if v == "1"));
        assert!(matches!(&ids[2], ComponentId::Opaque { .. }));
        assert!(matches!(&ids[3], ComponentId::OpaqueArtifact { .. }));
        assert_eq!(
            ids[4],
            ComponentId::Unsupported {
                kind: "library_binary".to_owned(),
                display_name: "android.jar".to_owned()
            }
        );
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let result: Result<ComponentId, _> = serde_json::from_str(r#"{"kind": "project"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("path"), "{err}");
    }

    #[test]
    fn blank_required_field_is_an_error() {
        for json in [
            r#"{"kind": "project", "path": ""}"#,
            r#"{"kind": "module", "group": "com.example", "name": "  ", "version": "1.0"}"#,
            r#"{"kind": "opaque", "display_name": ""}"#,
        ] {
            let err = serde_json::from_str::<ComponentId>(json).unwrap_err().to_string();
            assert!(err.contains("blank field"), "{json}: {err}");
        }

        let selector = serde_json::from_str::<ComponentSelector>(r#"{"kind": "module", "name": ""}"#);
        assert!(selector.is_err());
    }

    #[test]
    fn module_without_group_or_version() {
        let id: ComponentId = serde_json::from_str(r#"{"kind": "module", "name": "flat"}"#).unwrap();
        assert_eq!(
            id,
            ComponentId::Module {
                group: None,
                name: "flat".to_owned(),
                version: None
            }
        );
        assert_eq!(id.display_name(), "flat");
    }

    #[test]
    fn parses_declared_dependencies() {
        let deps: Vec<Dependency> = serde_json::from_str(
            r#"[
                {"kind": "project", "path": ":platform", "plugins": ["java-platform"]},
                {"kind": "module", "group": "g", "name": "bom", "version": "1",
                 "attributes": {"org.gradle.category": "platform"}},
                {"kind": "file_collection", "files": {"kind": "configurable", "from": ["libs/a.jar"]}},
                {"kind": "file_collection", "files": {"kind": "tree", "files": ["libs/b.jar"]}},
                {"kind": "file_collection", "files": {"kind": "lazy"}},
                {"kind": "self_resolving", "display_name": "gradleApi()"},
                {"kind": "client_module", "name": "x"}
            ]"#,
        )
        .unwrap();

        assert!(matches!(&deps[0], Dependency::Project { plugins, .. } if plugins.len() == 1));
        assert!(
            matches!(&deps[1], Dependency::Module { attributes, .. } if attributes.len() == 1)
        );
        assert!(matches!(
            &deps[2],
            Dependency::FileCollection {
                files: FileSet::Configurable { .. }
            }
        ));
        assert!(matches!(
            &deps[3],
            Dependency::FileCollection {
                files: FileSet::Tree { .. }
            }
        ));
        assert_eq!(
            deps[4],
            Dependency::FileCollection {
                files: FileSet::Other
            }
        );
        assert!(matches!(&deps[5], Dependency::SelfResolving { .. }));
        assert_eq!(
            deps[6],
            Dependency::Unsupported {
                kind: "client_module".to_owned(),
                display_name: "x".to_owned()
            }
        );
    }

    #[test]
    fn parses_full_export() {
        let graph = GraphExport::from_json(
            r#"{
                "edges": [{
                    "requested": {"kind": "module", "group": "com.example", "name": "lib", "version": "1.0"},
                    "selected": {"kind": "project", "path": ":lib"},
                    "selection_reason": {"composite_substitution": true}
                }],
                "artifacts": [{
                    "component": {"kind": "module", "group": "g", "name": "a", "version": "1"},
                    "file": "/cache/a-1.jar"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges[0].selection_reason.composite_substitution);
        assert_eq!(graph.artifacts[0].file, PathBuf::from("/cache/a-1.jar"));
        assert!(graph.declared.is_empty());
    }

    #[test]
    fn selection_reason_defaults_to_plain() {
        let edge: ResolvedDependency = serde_json::from_str(
            r#"{"requested": {"kind": "project", "path": ":a"},
                "selected": {"kind": "project", "path": ":a"}}"#,
        )
        .unwrap();
        assert!(!edge.selection_reason.composite_substitution);
    }
}
