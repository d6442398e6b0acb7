//! 능력(capability) 모델 -- 아티팩트가 제공하는 것에 대한 타입 있는 증거
//!
//! 각 변형은 증거만 담고 좌표를 직접 참조하지 않습니다. 의존성과의 연결은
//! aggregator가 아티팩트 식별자를 통해 맺습니다.
//!
//! 한 아티팩트에서 같은 변형은 최대 한 번만 나타나야 하며, 중복 탐지는
//! [`CapabilitySet`]이 병합합니다. 단, service loader는 디스크립터 파일마다
//! 하나씩 존재합니다.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// 아티팩트 하나에서 탐지된 능력
///
/// 변형은 이름의 알파벳 순으로 선언되어 있으며, 파생된 `Ord`는
/// 변형 이름 순서 → 내용 순서로 정렬합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Capability {
    #[serde(rename = "linter")]
    AndroidLinter(AndroidLinterCapability),
    #[serde(rename = "manifest")]
    AndroidManifest(AndroidManifestCapability),
    #[serde(rename = "res")]
    AndroidRes(AndroidResCapability),
    #[serde(rename = "proc")]
    AnnotationProcessor(AnnotationProcessorCapability),
    #[serde(rename = "class")]
    Class(ClassCapability),
    #[serde(rename = "const")]
    Constant(ConstantCapability),
    #[serde(rename = "inferred")]
    Inferred(InferredCapability),
    #[serde(rename = "inline")]
    InlineMember(InlineMemberCapability),
    #[serde(rename = "native")]
    NativeLib(NativeLibCapability),
    #[serde(rename = "security_provider")]
    SecurityProvider(SecurityProviderCapability),
    #[serde(rename = "service_loader")]
    ServiceLoader(ServiceLoaderCapability),
}

/// 변형 종류 (내용 없는 판별자)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    AndroidLinter,
    AndroidManifest,
    AndroidRes,
    AnnotationProcessor,
    Class,
    Constant,
    Inferred,
    InlineMember,
    NativeLib,
    SecurityProvider,
    ServiceLoader,
}

impl CapabilityKind {
    /// 직렬화 레이블과 동일한 짧은 이름
    pub fn label(self) -> &'static str {
        match self {
            Self::AndroidLinter => "linter",
            Self::AndroidManifest => "manifest",
            Self::AndroidRes => "res",
            Self::AnnotationProcessor => "proc",
            Self::Class => "class",
            Self::Constant => "const",
            Self::Inferred => "inferred",
            Self::InlineMember => "inline",
            Self::NativeLib => "native",
            Self::SecurityProvider => "security_provider",
            Self::ServiceLoader => "service_loader",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Android lint 레지스트리
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AndroidLinterCapability {
    pub lint_registry: String,
    /// 아티팩트가 lint jar/레지스트리*만* 담고 있으면 true
    pub is_lint_jar: bool,
}

/// AndroidManifest.xml 에 선언된 컴포넌트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManifestComponent {
    #[serde(rename = "activities")]
    Activity,
    #[serde(rename = "services")]
    Service,
    #[serde(rename = "receivers")]
    Receiver,
    #[serde(rename = "providers")]
    Provider,
}

impl ManifestComponent {
    pub const ALL: [ManifestComponent; 4] = [
        Self::Activity,
        Self::Service,
        Self::Receiver,
        Self::Provider,
    ];

    /// 컴포넌트 클래스 이름을 담는 속성
    pub const ATTR_NAME: &'static str = "android:name";

    /// XML 태그 이름
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Service => "service",
            Self::Receiver => "receiver",
            Self::Provider => "provider",
        }
    }

    /// 직렬화된 맵의 키
    pub fn map_key(self) -> &'static str {
        match self {
            Self::Activity => "activities",
            Self::Service => "services",
            Self::Receiver => "receivers",
            Self::Provider => "providers",
        }
    }

    pub fn from_map_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.map_key() == key)
    }

    pub fn from_tag_name(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag_name() == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AndroidManifestCapability {
    pub package_name: String,
    pub component_map: BTreeMap<ManifestComponent, BTreeSet<String>>,
}

/// `R.txt` 의 한 줄: 리소스 타입과 이름
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResLine {
    #[serde(rename = "type")]
    pub res_type: String,
    pub value: String,
}

impl ResLine {
    pub fn new(res_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            res_type: res_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AndroidResCapability {
    /// 리소스 import 심볼 (`<package>.R`)
    pub r_import: String,
    pub lines: Vec<ResLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationProcessorCapability {
    pub processor: String,
    pub supported_annotation_types: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassCapability {
    pub classes: BTreeSet<String>,
}

/// Kotlin 최상위 선언을 담은 파일 파사드
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KtFile {
    /// 파사드 클래스 FQCN (예: `com.example.UtilsKt`)
    pub fqcn: String,
    /// 소스 파일 이름 (예: `Utils`)
    pub name: String,
}

impl KtFile {
    /// 파사드 클래스 이름에서 `Kt` 접미어를 떼어 파일 이름을 얻습니다.
    pub fn from_facade(fqcn: impl Into<String>) -> Self {
        let fqcn = fqcn.into();
        let simple = fqcn.rsplit('.').next().unwrap_or(&fqcn);
        let name = simple.strip_suffix("Kt").unwrap_or(simple).to_owned();
        Self { fqcn, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstantCapability {
    /// FQCN → 상수 필드 이름
    pub constants: BTreeMap<String, BTreeSet<String>>,
    /// 최상위 선언을 가진 Kotlin 파일
    pub kt_files: BTreeSet<KtFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InferredCapability {
    /// 컴파일 타임 전용 어노테이션(CLASS/SOURCE retention)만 담고 있으면 true
    pub is_compile_only_annotations: bool,
}

/// 패키지 단위의 inline 멤버. 패키지 → 멤버 목록 사전순으로 정렬됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InlineMember {
    pub package_name: String,
    pub inline_members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InlineMemberCapability {
    pub inline_members: BTreeSet<InlineMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeLibCapability {
    pub file_names: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityProviderCapability {
    pub security_providers: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceLoaderCapability {
    /// 서비스 인터페이스 이름 (`META-INF/services/` 접두어 제거)
    pub provider_file: String,
    pub provider_classes: BTreeSet<String>,
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::AndroidLinter(_) => CapabilityKind::AndroidLinter,
            Self::AndroidManifest(_) => CapabilityKind::AndroidManifest,
            Self::AndroidRes(_) => CapabilityKind::AndroidRes,
            Self::AnnotationProcessor(_) => CapabilityKind::AnnotationProcessor,
            Self::Class(_) => CapabilityKind::Class,
            Self::Constant(_) => CapabilityKind::Constant,
            Self::Inferred(_) => CapabilityKind::Inferred,
            Self::InlineMember(_) => CapabilityKind::InlineMember,
            Self::NativeLib(_) => CapabilityKind::NativeLib,
            Self::SecurityProvider(_) => CapabilityKind::SecurityProvider,
            Self::ServiceLoader(_) => CapabilityKind::ServiceLoader,
        }
    }

    /// 같은 아티팩트에서 병합 대상이 되는지 판단하는 키
    fn merge_key(&self) -> (CapabilityKind, Option<&str>) {
        match self {
            Self::ServiceLoader(c) => (CapabilityKind::ServiceLoader, Some(&c.provider_file)),
            other => (other.kind(), None),
        }
    }

    /// 같은 키를 가진 다른 탐지 결과를 흡수합니다.
    ///
    /// 증거 집합은 합집합으로, 스칼라 값은 먼저 들어온 값이 유지됩니다.
    fn absorb(&mut self, other: Capability) {
        match (self, other) {
            (Self::AndroidLinter(_), Self::AndroidLinter(_)) => {}
            (Self::AndroidManifest(a), Self::AndroidManifest(b)) => {
                for (component, names) in b.component_map {
                    a.component_map.entry(component).or_default().extend(names);
                }
            }
            (Self::AndroidRes(a), Self::AndroidRes(b)) => {
                for line in b.lines {
                    if !a.lines.contains(&line) {
                        a.lines.push(line);
                    }
                }
            }
            (Self::AnnotationProcessor(a), Self::AnnotationProcessor(b)) => {
                if a.processor == b.processor {
                    a.supported_annotation_types
                        .extend(b.supported_annotation_types);
                }
            }
            (Self::Class(a), Self::Class(b)) => a.classes.extend(b.classes),
            (Self::Constant(a), Self::Constant(b)) => {
                for (class, fields) in b.constants {
                    a.constants.entry(class).or_default().extend(fields);
                }
                a.kt_files.extend(b.kt_files);
            }
            (Self::Inferred(a), Self::Inferred(b)) => {
                a.is_compile_only_annotations &= b.is_compile_only_annotations;
            }
            (Self::InlineMember(a), Self::InlineMember(b)) => {
                a.inline_members.extend(b.inline_members)
            }
            (Self::NativeLib(a), Self::NativeLib(b)) => a.file_names.extend(b.file_names),
            (Self::SecurityProvider(a), Self::SecurityProvider(b)) => {
                a.security_providers.extend(b.security_providers)
            }
            (Self::ServiceLoader(a), Self::ServiceLoader(b)) => {
                a.provider_classes.extend(b.provider_classes)
            }
            // merge_key가 같으면 변형도 같음
            _ => {}
        }
    }
}

/// 아티팩트 하나의 능력 모음
///
/// 삽입 시 같은 병합 키를 가진 능력은 하나로 합쳐지며, 처음 삽입된 순서가
/// 유지됩니다 (service loader 디스크립터의 발견 순서 보존).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet {
    items: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 능력을 추가하거나 기존 능력에 병합합니다.
    pub fn insert(&mut self, capability: Capability) {
        let key = capability.merge_key();
        match self.items.iter().position(|c| c.merge_key() == key) {
            Some(idx) => self.items[idx].absorb(capability),
            None => self.items.push(capability),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capability> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 특정 종류의 능력만 골라냅니다.
    pub fn of_kind(&self, kind: CapabilityKind) -> impl Iterator<Item = &Capability> {
        self.items.iter().filter(move |c| c.kind() == kind)
    }

    pub fn into_vec(self) -> Vec<Capability> {
        self.items
    }
}

impl Extend<Capability> for CapabilitySet {
    fn extend<I: IntoIterator<Item = Capability>>(&mut self, iter: I) {
        for capability in iter {
            self.insert(capability);
        }
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(items: Vec<Capability>) -> Self {
        items.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.items
    }
}

impl IntoIterator for CapabilitySet {
    type Item = Capability;
    type IntoIter = std::vec::IntoIter<Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
