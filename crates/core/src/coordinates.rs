//! 좌표 모델 -- "이 의존성이 무엇인가"의 정규화된 표현
//!
//! 네 가지 변형은 모두 불변이며, 정규 식별자 문자열로 비교할 수 있습니다.
//!
//! | 변형 | 식별자 | 버전 |
//! |---|---|---|
//! | [`ModuleCoordinates`] | `group:artifact` | 해석된 버전 |
//! | [`ProjectCoordinates`] | 빌드 내 경로 (`:lib:core`) | 없음 |
//! | [`FlatCoordinates`] | 표시 이름 | 없음 |
//! | [`IncludedBuildCoordinates`] | 요청된 `group:artifact` | 요청된 버전 |

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 외부 모듈 좌표
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleCoordinates {
    /// `group:artifact` (group이 없으면 `artifact`)
    pub identifier: String,
    /// 해석된 버전. 요청 버전과 다를 수 있음
    pub resolved_version: String,
}

impl ModuleCoordinates {
    pub fn new(identifier: impl Into<String>, resolved_version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            resolved_version: resolved_version.into(),
        }
    }

    /// `group:artifact:version` 형식 문자열
    pub fn gav(&self) -> String {
        format!("{}:{}", self.identifier, self.resolved_version)
    }
}

/// 같은 빌드 내 형제 프로젝트 좌표
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectCoordinates {
    /// 빌드 상대 경로 (예: `:lib:core`)
    pub identifier: String,
}

impl ProjectCoordinates {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// group/version 개념이 없는 의존성 (로컬 파일, 플랫폼 API 등)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlatCoordinates {
    /// 표시 이름
    pub identifier: String,
}

impl FlatCoordinates {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// composite 빌드 치환: 외부 모듈로 요청되었으나 로컬 프로젝트로 해석됨
///
/// 사용자가 무엇을 요청했는지와 실제로 무엇이 쓰였는지를 모두 보존합니다.
/// 요청 버전은 선언된 그대로이며, 버전 없이 선언된 경우 빈 문자열일 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncludedBuildCoordinates {
    /// 원래 요청된 외부 모듈
    pub requested: ModuleCoordinates,
    /// 실제로 해석된 프로젝트
    pub resolved: ProjectCoordinates,
}

/// 정규화된 의존성 좌표
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Coordinates {
    Module(ModuleCoordinates),
    Project(ProjectCoordinates),
    Flat(FlatCoordinates),
    IncludedBuild(IncludedBuildCoordinates),
}

impl Coordinates {
    /// 캐시/맵 키로 쓸 수 있는 안정적인 식별자
    pub fn identifier(&self) -> &str {
        match self {
            Self::Module(c) => &c.identifier,
            Self::Project(c) => &c.identifier,
            Self::Flat(c) => &c.identifier,
            Self::IncludedBuild(c) => &c.requested.identifier,
        }
    }

    /// 해석된 버전. 프로젝트와 flat 좌표는 `None`
    pub fn resolved_version(&self) -> Option<&str> {
        match self {
            Self::Module(c) => Some(&c.resolved_version),
            Self::IncludedBuild(c) if !c.requested.resolved_version.is_empty() => {
                Some(&c.requested.resolved_version)
            }
            Self::Project(_) | Self::Flat(_) | Self::IncludedBuild(_) => None,
        }
    }

    /// 사람이 읽는 표시 문자열 (모듈은 `g:a:v`, 나머지는 식별자)
    pub fn gav(&self) -> String {
        match self.resolved_version() {
            Some(version) => format!("{}:{}", self.identifier(), version),
            None => self.identifier().to_owned(),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Module(_) => 0,
            Self::IncludedBuild(_) => 1,
            Self::Project(_) => 2,
            Self::Flat(_) => 3,
        }
    }

    fn resolved_project(&self) -> Option<&str> {
        match self {
            Self::IncludedBuild(c) => Some(&c.resolved.identifier),
            _ => None,
        }
    }
}

impl Ord for Coordinates {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier()
            .cmp(other.identifier())
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
            .then_with(|| self.resolved_version().cmp(&other.resolved_version()))
            .then_with(|| self.resolved_project().cmp(&other.resolved_project()))
            .then_with(|| match (self, other) {
                (Self::IncludedBuild(a), Self::IncludedBuild(b)) => a
                    .requested
                    .resolved_version
                    .cmp(&b.requested.resolved_version),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for Coordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncludedBuild(c) => {
                write!(f, "{} (substituted by {})", self.gav(), c.resolved.identifier)
            }
            _ => write!(f, "{}", self.gav()),
        }
    }
}

impl From<ModuleCoordinates> for Coordinates {
    fn from(c: ModuleCoordinates) -> Self {
        Self::Module(c)
    }
}

impl From<ProjectCoordinates> for Coordinates {
    fn from(c: ProjectCoordinates) -> Self {
        Self::Project(c)
    }
}

impl From<FlatCoordinates> for Coordinates {
    fn from(c: FlatCoordinates) -> Self {
        Self::Flat(c)
    }
}

impl From<IncludedBuildCoordinates> for Coordinates {
    fn from(c: IncludedBuildCoordinates) -> Self {
        Self::IncludedBuild(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn included(version: &str) -> Coordinates {
        IncludedBuildCoordinates {
            requested: ModuleCoordinates::new("com.example:lib", version),
            resolved: ProjectCoordinates::new(":lib"),
        }
        .into()
    }

    #[test]
    fn module_identifier_and_version() {
        let c: Coordinates = ModuleCoordinates::new("org.jetbrains:annotations", "24.1.0").into();
        assert_eq!(c.identifier(), "org.jetbrains:annotations");
        assert_eq!(c.resolved_version(), Some("24.1.0"));
        assert_eq!(c.gav(), "org.jetbrains:annotations:24.1.0");
    }

    #[test]
    fn project_and_flat_have_no_version() {
        let p: Coordinates = ProjectCoordinates::new(":app").into();
        let f: Coordinates = FlatCoordinates::new("Gradle API").into();
        assert_eq!(p.resolved_version(), None);
        assert_eq!(f.resolved_version(), None);
        assert_eq!(p.gav(), ":app");
        assert_eq!(f.gav(), "Gradle API");
    }

    #[test]
    fn included_build_reports_requested_identity() {
        let c = included("1.0");
        assert_eq!(c.identifier(), "com.example:lib");
        assert_eq!(c.resolved_version(), Some("1.0"));
        assert_eq!(c.to_string(), "com.example:lib:1.0 (substituted by :lib)");
    }

    #[test]
    fn included_build_without_requested_version() {
        let c = included("");
        assert_eq!(c.resolved_version(), None);
        assert_eq!(c.gav(), "com.example:lib");
    }

    #[test]
    fn ordering_is_by_identifier_first() {
        let mut coords: Vec<Coordinates> = vec![
            ProjectCoordinates::new(":z").into(),
            ModuleCoordinates::new("b:b", "1").into(),
            FlatCoordinates::new("a.jar").into(),
        ];
        coords.sort();
        let ids: Vec<_> = coords.iter().map(|c| c.identifier()).collect();
        assert_eq!(ids, vec![":z", "a.jar", "b:b"]);
    }

    #[test]
    fn ordering_consistent_with_equality() {
        let a = included("1.0");
        let b = included("2.0");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn serde_uses_type_tag() {
        let c: Coordinates = ProjectCoordinates::new(":core").into();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "project");
        assert_eq!(json["identifier"], ":core");

        let back: Coordinates = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn included_build_serde_roundtrip() {
        let c = included("3.2.1");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"included_build\""));
        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
