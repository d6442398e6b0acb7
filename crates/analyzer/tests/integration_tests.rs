//! Integration tests for the artifact analyzer
//!
//! Tests the full flow: graph export -> coordinates -> archive scanners -> cache -> report

mod common;

use std::sync::Arc;

use common::{JarBuilder, coroutines_android};
use depcap_analyzer::scanner::classfile::builder::{BuilderValue, ClassBuilder};
use depcap_analyzer::{
    AnalysisCache, AnalyzerConfig, ArtifactAnalyzer, ArtifactJob, GraphExport,
};
use depcap_core::capability::{Capability, CapabilityKind, ManifestComponent};
use depcap_core::coordinates::{Coordinates, ModuleCoordinates, ProjectCoordinates};

fn module(identifier: &str, version: &str) -> Coordinates {
    ModuleCoordinates::new(identifier, version).into()
}

fn analyzer() -> Arc<ArtifactAnalyzer> {
    Arc::new(ArtifactAnalyzer::builder().build().unwrap())
}

#[test]
fn test_service_loader_basic() {
    let dir = tempfile::tempdir().unwrap();
    let jar = JarBuilder::new()
        .entry(
            "META-INF/services/com.example.Svc",
            "com.example.impl.A\n# a comment\ncom.example.impl.B\n\n",
        )
        .write(dir.path(), "svc-1.0.jar");

    let scan = analyzer().analyze_artifact(&module("com.example:svc", "1.0"), &jar);
    assert!(scan.failures.is_empty());

    let services: Vec<_> = scan
        .capabilities
        .of_kind(CapabilityKind::ServiceLoader)
        .collect();
    assert_eq!(services.len(), 1);
    match services[0] {
        Capability::ServiceLoader(cap) => {
            assert_eq!(cap.provider_file, "com.example.Svc");
            assert_eq!(
                cap.provider_classes.iter().collect::<Vec<_>>(),
                vec!["com.example.impl.A", "com.example.impl.B"]
            );
        }
        other => panic!("unexpected capability: {other:?}"),
    }
}

#[test]
fn test_processor_descriptor_is_not_a_service() {
    let dir = tempfile::tempdir().unwrap();
    let processor = ClassBuilder::new("com/example/GenProcessor").annotation(
        "Ljavax/annotation/processing/SupportedAnnotationTypes;",
        vec![("value", BuilderValue::StrArray(vec!["com.example.Gen".to_owned()]))],
    );
    let jar = JarBuilder::new()
        .entry(
            "META-INF/services/javax.annotation.processing.Processor",
            "com.example.GenProcessor\n",
        )
        .class(processor, "com/example/GenProcessor")
        .write(dir.path(), "gen-processor-1.0.jar");

    let scan = analyzer().analyze_artifact(&module("com.example:gen-processor", "1.0"), &jar);

    assert_eq!(scan.capabilities.of_kind(CapabilityKind::ServiceLoader).count(), 0);
    let procs: Vec<_> = scan
        .capabilities
        .of_kind(CapabilityKind::AnnotationProcessor)
        .collect();
    assert_eq!(procs.len(), 1);
    let Capability::AnnotationProcessor(cap) = procs[0] else {
        panic!("expected annotation processor");
    };
    assert_eq!(cap.processor, "com.example.GenProcessor");
    assert!(cap.supported_annotation_types.contains("com.example.Gen"));
}

#[test]
fn test_empty_archive_yields_no_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    let jar = JarBuilder::new()
        .entry("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n")
        .write(dir.path(), "empty-1.0.jar");

    let scan = analyzer().analyze_artifact(&module("com.example:empty", "1.0"), &jar);
    assert!(scan.failures.is_empty());
    assert!(scan.capabilities.is_empty());
}

#[test]
fn test_class_and_native_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    let jar = JarBuilder::new()
        .class(
            ClassBuilder::new("org/sqlite/JDBC").field(
                0x0019,
                "PREFIX",
                "Ljava/lang/String;",
                Some(depcap_analyzer::scanner::classfile::ConstantValue::String(
                    "jdbc:sqlite:".to_owned(),
                )),
            ),
            "org/sqlite/JDBC",
        )
        .entry("org/sqlite/native/Linux/x86_64/libsqlitejdbc.so", vec![0u8; 16])
        .entry("org/sqlite/native/Mac/aarch64/libsqlitejdbc.dylib", vec![0u8; 16])
        .write(dir.path(), "sqlite-jdbc-3.45.jar");

    let scan = analyzer().analyze_artifact(&module("org.xerial:sqlite-jdbc", "3.45"), &jar);
    assert!(scan.failures.is_empty(), "{:?}", scan.failures);

    let kinds: Vec<_> = scan.capabilities.iter().map(Capability::kind).collect();
    assert!(kinds.contains(&CapabilityKind::Class));
    assert!(kinds.contains(&CapabilityKind::Constant));
    assert!(kinds.contains(&CapabilityKind::Inferred));

    let Some(Capability::NativeLib(native)) =
        scan.capabilities.of_kind(CapabilityKind::NativeLib).next()
    else {
        panic!("expected native libraries");
    };
    assert!(native.file_names.contains("libsqlitejdbc.so"));
    assert!(native.file_names.contains("libsqlitejdbc.dylib"));
}

#[test]
fn test_android_library_archive() {
    let dir = tempfile::tempdir().unwrap();
    let aar = JarBuilder::new()
        .entry(
            "AndroidManifest.xml",
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.ui">
                 <application>
                   <activity android:name=".SettingsActivity" />
                 </application>
               </manifest>"#,
        )
        .entry(
            "R.txt",
            "int string settings_title 0x7f010001\nint layout settings 0x7f020001\n",
        )
        .write(dir.path(), "ui-2.0.aar");

    let scan = analyzer().analyze_artifact(&module("com.example:ui", "2.0"), &aar);
    assert!(scan.failures.is_empty(), "{:?}", scan.failures);

    let Some(Capability::AndroidManifest(manifest)) = scan
        .capabilities
        .of_kind(CapabilityKind::AndroidManifest)
        .next()
    else {
        panic!("expected manifest capability");
    };
    assert!(manifest.component_map[&ManifestComponent::Activity]
        .contains("com.example.ui.SettingsActivity"));

    let Some(Capability::AndroidRes(res)) =
        scan.capabilities.of_kind(CapabilityKind::AndroidRes).next()
    else {
        panic!("expected resource capability");
    };
    assert_eq!(res.r_import, "com.example.ui.R");
    assert_eq!(res.lines.len(), 2);
    assert_eq!(res.lines[0].res_type, "string");
}

#[test]
fn test_lint_jar() {
    let dir = tempfile::tempdir().unwrap();
    let jar = JarBuilder::new()
        .entry(
            "META-INF/MANIFEST.MF",
            "Manifest-Version: 1.0\nLint-Registry-v2: com.example.lint.IssueRegistry\n",
        )
        .class(
            ClassBuilder::new("com/example/lint/IssueRegistry"),
            "com/example/lint/IssueRegistry",
        )
        .class(
            ClassBuilder::new("com/example/lint/checks/LogDetector"),
            "com/example/lint/checks/LogDetector",
        )
        .write(dir.path(), "lint-checks.jar");

    let scan = analyzer().analyze_artifact(&module("com.example:lint-checks", "1.0"), &jar);
    let Some(Capability::AndroidLinter(lint)) =
        scan.capabilities.of_kind(CapabilityKind::AndroidLinter).next()
    else {
        panic!("expected linter capability");
    };
    assert_eq!(lint.lint_registry, "com.example.lint.IssueRegistry");
    assert!(lint.is_lint_jar);
}

#[test]
fn test_malformed_class_only_fails_its_scanner() {
    let dir = tempfile::tempdir().unwrap();
    let jar = JarBuilder::new()
        .entry("com/example/Broken.class", vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00])
        .entry("META-INF/services/com.example.Svc", "com.example.Impl\n")
        .write(dir.path(), "broken-1.0.jar");

    let analyzer = analyzer();
    let scan = analyzer.analyze_artifact(&module("com.example:broken", "1.0"), &jar);

    assert_eq!(scan.failures.len(), 1);
    assert_eq!(scan.failures[0].scanner.as_deref(), Some("class_file"));
    // 다른 스캐너의 결과는 유지됨
    assert_eq!(scan.capabilities.of_kind(CapabilityKind::ServiceLoader).count(), 1);
    assert!(analyzer.cache().capabilities().is_empty());
}

#[test]
fn test_second_scan_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let jar = coroutines_android(dir.path());
    let analyzer = analyzer();
    let coordinates = module("org.jetbrains.kotlinx:kotlinx-coroutines-android", "1.8.1");

    let first = analyzer.analyze_artifact(&coordinates, &jar);
    let second = analyzer.analyze_artifact(&coordinates, &jar);

    assert!(Arc::ptr_eq(&first.capabilities, &second.capabilities));
    assert_eq!(first.capabilities.of_kind(CapabilityKind::ServiceLoader).count(), 2);

    let cache = analyzer.cache();
    assert_eq!(cache.capabilities().len(), 1);
    assert_eq!(cache.archives().len(), 1);
    assert_eq!(cache.archive_count("kotlinx-coroutines-android-1.8.1.jar"), 2);
    // 두 번째 스캔은 아카이브를 다시 열지 않으므로 클래스는 한 번만 집계됨
    assert_eq!(
        cache.class_count("kotlinx.coroutines.android.AndroidDispatcherFactory"),
        1
    );
}

#[test]
fn test_service_loader_order_is_encounter_order() {
    let dir = tempfile::tempdir().unwrap();
    let jar = coroutines_android(dir.path());
    let scan = analyzer().analyze_artifact(&module("g:a", "1"), &jar);

    let files: Vec<_> = scan
        .capabilities
        .iter()
        .filter_map(|c| match c {
            Capability::ServiceLoader(s) => Some(s.provider_file.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        files,
        vec![
            "kotlinx.coroutines.internal.MainDispatcherFactory",
            "kotlinx.coroutines.CoroutineExceptionHandler",
        ]
    );
}

#[tokio::test]
async fn test_analyze_all_keeps_job_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut jobs = Vec::new();
    for i in 0..12 {
        let jar = JarBuilder::new()
            .entry(&format!("META-INF/services/com.example.Svc{i}"), "com.example.Impl\n")
            .write(dir.path(), &format!("lib{i}-1.0.jar"));
        jobs.push(ArtifactJob {
            coordinates: module(&format!("com.example:lib{i}"), "1.0"),
            file: jar,
        });
    }

    let config = AnalyzerConfig {
        max_concurrent_scans: 2,
        ..AnalyzerConfig::default()
    };
    let analyzer = Arc::new(ArtifactAnalyzer::builder().config(config).build().unwrap());
    let scans = analyzer.analyze_all(jobs.clone()).await.unwrap();

    assert_eq!(scans.len(), jobs.len());
    for (scan, job) in scans.iter().zip(&jobs) {
        assert_eq!(scan.coordinates, job.coordinates);
        assert_eq!(scan.capabilities.len(), 1);
    }
    assert_eq!(analyzer.cache().capabilities().len(), 12);
}

#[tokio::test]
async fn test_analyze_graph_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let coroutines = coroutines_android(dir.path());
    let sibling = JarBuilder::new()
        .entry("META-INF/services/com.example.Plugin", "com.example.core.CorePlugin\n")
        .write(dir.path(), "core.jar");
    let corrupt = dir.path().join("corrupt-1.0.jar");
    std::fs::write(&corrupt, b"not a zip archive").unwrap();

    let graph = serde_json::json!({
        "edges": [
            {
                "requested": {"kind": "module", "group": "com.example", "name": "core", "version": "1.0"},
                "selected": {"kind": "project", "path": ":core"},
                "selection_reason": {"composite_substitution": true}
            }
        ],
        "artifacts": [
            {
                "component": {"kind": "module", "group": "org.jetbrains.kotlinx",
                              "name": "kotlinx-coroutines-android", "version": "1.8.1"},
                "file": coroutines
            },
            {"component": {"kind": "project", "path": ":core"}, "file": sibling},
            {
                "component": {"kind": "module", "group": "com.example", "name": "corrupt", "version": "1.0"},
                "file": corrupt
            },
            {"component": {"kind": "opaque", "display_name": "Gradle API"}, "file": dir.path().join("classes")}
        ],
        "declared": [
            {"kind": "module", "group": "org.jetbrains.kotlinx", "name": "kotlinx-coroutines-android", "version": "1.8.1"},
            {"kind": "project", "path": ":core"}
        ]
    });
    let graph = GraphExport::from_json(&graph.to_string()).unwrap();

    let report = analyzer().analyze_graph(&graph).await.unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.summary.failures, 1);

    let coroutines = report
        .record("org.jetbrains.kotlinx:kotlinx-coroutines-android")
        .unwrap();
    assert!(coroutines.declared);
    assert!(coroutines.failures.is_empty());

    let core = report.record("com.example:core").unwrap();
    assert!(matches!(core.coordinates, Coordinates::IncludedBuild(_)));
    assert_eq!(core.capabilities.len(), 1);

    let corrupt = report.record("com.example:corrupt").unwrap();
    assert!(corrupt.capabilities.is_empty());
    assert_eq!(corrupt.failures.len(), 1);

    assert!(report.record("Gradle API").is_none());
}

#[tokio::test]
async fn test_opaque_component_archive_is_not_scanned() {
    let dir = tempfile::tempdir().unwrap();
    let gradle_api = JarBuilder::new()
        .entry("META-INF/services/org.gradle.api.Plugin", "org.gradle.internal.BuiltIn\n")
        .write(dir.path(), "gradle-api-8.5.jar");

    let graph = serde_json::json!({
        "artifacts": [
            {"component": {"kind": "opaque", "display_name": "Gradle API"}, "file": gradle_api}
        ]
    });
    let graph = GraphExport::from_json(&graph.to_string()).unwrap();
    assert!(ArtifactAnalyzer::plan(&graph).unwrap().is_empty());

    let analyzer = analyzer();
    let report = analyzer.analyze_graph(&graph).await.unwrap();
    assert!(report.records.is_empty());
    assert!(analyzer.cache().archives_seen().is_empty());
}

#[tokio::test]
async fn test_unsupported_reference_aborts_analysis() {
    let graph = GraphExport::from_json(
        r#"{"artifacts": [{"component": {"kind": "library_binary", "display_name": "x"}, "file": "x.jar"}]}"#,
    )
    .unwrap();
    let err = analyzer().analyze_graph(&graph).await.unwrap_err();
    assert!(!err.is_artifact_local());
}

#[test]
fn test_cache_shared_between_analyzers() {
    let dir = tempfile::tempdir().unwrap();
    let jar = coroutines_android(dir.path());
    let cache = Arc::new(AnalysisCache::new(Some(64)));

    let first = ArtifactAnalyzer::builder()
        .cache(Arc::clone(&cache))
        .build()
        .unwrap();
    let second = ArtifactAnalyzer::builder()
        .cache(Arc::clone(&cache))
        .build()
        .unwrap();

    let project: Coordinates = ProjectCoordinates::new(":app").into();
    first.analyze_artifact(&project, &jar);
    second.analyze_artifact(&project, &jar);

    assert_eq!(cache.capabilities().len(), 1);
    assert_eq!(cache.archives_seen().values().sum::<u64>(), 2);
}

#[test]
fn test_shared_cache_keeps_results_per_scanner_set() {
    let dir = tempfile::tempdir().unwrap();
    let jar = coroutines_android(dir.path());
    let cache = Arc::new(AnalysisCache::new(Some(64)));
    let project: Coordinates = ProjectCoordinates::new(":app").into();

    let native_only = ArtifactAnalyzer::builder()
        .config(AnalyzerConfig {
            scanners: vec!["native_lib".to_owned()],
            ..AnalyzerConfig::default()
        })
        .cache(Arc::clone(&cache))
        .build()
        .unwrap();
    let partial = native_only.analyze_artifact(&project, &jar);
    assert!(partial.capabilities.is_empty());

    let full = ArtifactAnalyzer::builder()
        .cache(Arc::clone(&cache))
        .build()
        .unwrap();
    let shared = full.analyze_artifact(&project, &jar);

    let fresh = ArtifactAnalyzer::builder().build().unwrap();
    let uncached = fresh.analyze_artifact(&project, &jar);

    assert_eq!(shared.capabilities.of_kind(CapabilityKind::ServiceLoader).count(), 2);
    assert_eq!(shared.capabilities, uncached.capabilities);
    assert_eq!(cache.capabilities().len(), 2);
}
