//! 통합 테스트 공용 헬퍼: 임시 jar/aar 생성

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use depcap_analyzer::scanner::classfile::builder::ClassBuilder;
use zip::write::SimpleFileOptions;

/// 임시 아카이브 생성기
pub struct JarBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_owned(), content.into()));
        self
    }

    /// `internal_name.class` 엔트리로 클래스를 추가합니다.
    pub fn class(self, class: ClassBuilder, internal_name: &str) -> Self {
        let bytes = class.build();
        self.entry(&format!("{internal_name}.class"), bytes)
    }

    pub fn write(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
        path
    }
}

/// `kotlinx-coroutines-android` 형태의 서비스 선언 jar
pub fn coroutines_android(dir: &Path) -> PathBuf {
    JarBuilder::new()
        .entry("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n")
        .entry(
            "META-INF/services/kotlinx.coroutines.internal.MainDispatcherFactory",
            "kotlinx.coroutines.android.AndroidDispatcherFactory\n",
        )
        .entry(
            "META-INF/services/kotlinx.coroutines.CoroutineExceptionHandler",
            "# installed on Android only\nkotlinx.coroutines.android.AndroidExceptionPreHandler\n",
        )
        .class(
            ClassBuilder::new("kotlinx/coroutines/android/AndroidDispatcherFactory"),
            "kotlinx/coroutines/android/AndroidDispatcherFactory",
        )
        .write(dir, "kotlinx-coroutines-android-1.8.1.jar")
}
