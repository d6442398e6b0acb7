//! Android 매니페스트 스캐너
//!
//! aar 루트의 `AndroidManifest.xml`(일반 텍스트 XML)에서 패키지 이름과
//! activity/service/receiver/provider 컴포넌트를 읽습니다.
//! `.`으로 시작하는 컴포넌트 이름은 패키지 기준 상대 이름입니다.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use depcap_core::capability::{AndroidManifestCapability, Capability, ManifestComponent};

use super::{ArtifactScanner, JarArchive, ScanContext};
use crate::error::AnalyzerError;

pub const ANDROID_MANIFEST_PATH: &str = "AndroidManifest.xml";

/// 파싱된 Android 매니페스트
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndroidManifest {
    pub package_name: Option<String>,
    /// 비어 있는 종류는 맵에 들어가지 않음
    pub components: BTreeMap<ManifestComponent, BTreeSet<String>>,
}

impl AndroidManifest {
    /// XML 텍스트를 파싱합니다.
    pub fn parse(xml: &str) -> Result<Self, AnalyzerError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut manifest = Self::default();
        let mut relative = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if tag == "manifest" {
                        manifest.package_name = attribute(e, "package").filter(|p| !p.is_empty());
                    } else if let Some(component) = ManifestComponent::from_tag_name(&tag)
                        && let Some(name) = attribute(e, ManifestComponent::ATTR_NAME)
                    {
                        relative.push((component, name));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(AnalyzerError::Manifest {
                        entry: ANDROID_MANIFEST_PATH.to_owned(),
                        reason: format!("XML error at position {}: {e}", reader.buffer_position()),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        // <manifest>가 먼저 나오지만 패키지가 확정된 뒤에 이름을 완성
        for (component, name) in relative {
            let name = match (&manifest.package_name, name.strip_prefix('.')) {
                (Some(package), Some(rest)) => format!("{package}.{rest}"),
                _ => name,
            };
            manifest.components.entry(component).or_default().insert(name);
        }

        Ok(manifest)
    }

    /// 패키지와 컴포넌트가 모두 있을 때만 능력을 만듭니다.
    pub fn capability(&self) -> Option<AndroidManifestCapability> {
        let package_name = self.package_name.clone()?;
        if self.components.is_empty() {
            return None;
        }
        Some(AndroidManifestCapability {
            package_name,
            component_map: self.components.clone(),
        })
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .map(|attr| attr.unescape_value().unwrap_or_default().trim().to_owned())
}

/// 아카이브 루트의 매니페스트를 읽습니다. 없으면 `None`
pub fn read_manifest(archive: &mut JarArchive) -> Result<Option<AndroidManifest>, AnalyzerError> {
    match archive.read_entry_string(ANDROID_MANIFEST_PATH)? {
        Some(xml) => AndroidManifest::parse(&xml).map(Some),
        None => Ok(None),
    }
}

/// Android 매니페스트 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidManifestScanner;

impl ArtifactScanner for AndroidManifestScanner {
    fn name(&self) -> &'static str {
        "android_manifest"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let Some(manifest) = read_manifest(archive)? else {
            return Ok(Vec::new());
        };

        match manifest.capability() {
            Some(capability) => {
                debug!(
                    artifact = %ctx.coordinates,
                    package = %capability.package_name,
                    kinds = capability.component_map.len(),
                    "found manifest components"
                );
                Ok(vec![Capability::AndroidManifest(capability)])
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.lib">
    <uses-permission android:name="android.permission.INTERNET" />
    <application>
        <activity android:name=".ui.MainActivity" android:exported="false">
            <intent-filter>
                <action android:name="android.intent.action.VIEW" />
            </intent-filter>
        </activity>
        <service android:name="com.example.lib.SyncService" />
        <receiver android:name=".BootReceiver" />
        <provider
            android:name="androidx.startup.InitializationProvider"
            android:authorities="${applicationId}.androidx-startup" />
    </application>
</manifest>
"#;

    #[test]
    fn parses_package_and_components() {
        let manifest = AndroidManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.package_name.as_deref(), Some("com.example.lib"));

        let activities = &manifest.components[&ManifestComponent::Activity];
        assert!(activities.contains("com.example.lib.ui.MainActivity"));
        assert!(
            manifest.components[&ManifestComponent::Service].contains("com.example.lib.SyncService")
        );
        assert!(
            manifest.components[&ManifestComponent::Receiver].contains("com.example.lib.BootReceiver")
        );
        assert!(
            manifest.components[&ManifestComponent::Provider]
                .contains("androidx.startup.InitializationProvider")
        );
        // uses-permission, action 은 컴포넌트가 아님
        assert_eq!(manifest.components.values().map(BTreeSet::len).sum::<usize>(), 4);
    }

    #[test]
    fn manifest_without_components_has_no_capability() {
        let manifest = AndroidManifest::parse(
            r#"<manifest package="com.example.empty"><application /></manifest>"#,
        )
        .unwrap();
        assert_eq!(manifest.package_name.as_deref(), Some("com.example.empty"));
        assert!(manifest.capability().is_none());
    }

    #[test]
    fn capability_keeps_component_map() {
        let capability = AndroidManifest::parse(MANIFEST).unwrap().capability().unwrap();
        assert_eq!(capability.package_name, "com.example.lib");
        assert_eq!(capability.component_map.len(), 4);
    }

    #[test]
    fn malformed_xml_is_manifest_error() {
        let err = AndroidManifest::parse("<manifest package=\"a\"><application></manifest>")
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Manifest { .. }));
    }
}
