//! zip 구조 아카이브(jar/aar) 읽기
//!
//! 엔트리 이름은 중앙 디렉토리의 순서(발견 순서) 그대로 유지됩니다.
//! 아카이브 파일 크기와 엔트리 하나의 압축 해제 크기를 제한합니다.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::error::AnalyzerError;

/// 아카이브 읽기 제한
#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    /// 아카이브 파일 최대 크기 (바이트)
    pub max_archive_size: u64,
    /// 엔트리 하나의 최대 압축 해제 크기 (바이트)
    pub max_entry_size: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_archive_size: 512 * 1024 * 1024,
            max_entry_size: 16 * 1024 * 1024,
        }
    }
}

/// 열린 아카이브
pub struct JarArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
    /// 디렉토리를 제외한 엔트리 이름 (발견 순서)
    names: Vec<String>,
    max_entry_size: u64,
}

impl std::fmt::Debug for JarArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarArchive")
            .field("path", &self.path)
            .field("entries", &self.names.len())
            .finish()
    }
}

impl JarArchive {
    /// 아카이브를 엽니다.
    ///
    /// # Errors
    ///
    /// - 파일이 너무 크면 `FileTooBig`
    /// - 파일을 읽을 수 없으면 `Io`
    /// - zip 구조가 아니면 `ArchiveOpen`
    pub fn open(path: impl AsRef<Path>, limits: ArchiveLimits) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let metadata = std::fs::metadata(path).map_err(|e| AnalyzerError::Io {
            path: shown.clone(),
            source: e,
        })?;
        if metadata.len() > limits.max_archive_size {
            return Err(AnalyzerError::FileTooBig {
                path: shown,
                size: metadata.len(),
                max: limits.max_archive_size,
            });
        }

        let file = File::open(path).map_err(|e| AnalyzerError::Io {
            path: shown.clone(),
            source: e,
        })?;
        let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| {
            AnalyzerError::ArchiveOpen {
                path: shown.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut names = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip.by_index_raw(i).map_err(|e| AnalyzerError::ArchiveOpen {
                path: shown.clone(),
                reason: e.to_string(),
            })?;
            if !entry.is_dir() {
                names.push(entry.name().to_owned());
            }
        }
        debug!(path = %shown, entries = names.len(), "opened archive");

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            names,
            max_entry_size: limits.max_entry_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 아카이브 파일 이름 (예: `okio-3.9.0.jar`)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// 디렉토리를 제외한 엔트리 이름 (발견 순서)
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 엔트리 내용을 읽습니다. 엔트리가 없으면 `None`
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, AnalyzerError> {
        let archive = self.path.display().to_string();
        let entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(AnalyzerError::ArchiveEntry {
                    path: archive,
                    entry: name.to_owned(),
                    reason: e.to_string(),
                });
            }
        };

        if entry.size() > self.max_entry_size {
            return Err(AnalyzerError::FileTooBig {
                path: format!("{archive}!/{name}"),
                size: entry.size(),
                max: self.max_entry_size,
            });
        }

        // 헤더의 크기 정보를 믿지 않고 상한까지만 읽음
        let mut buf = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        let read = entry
            .take(self.max_entry_size + 1)
            .read_to_end(&mut buf)
            .map_err(|e| AnalyzerError::ArchiveEntry {
                path: archive.clone(),
                entry: name.to_owned(),
                reason: e.to_string(),
            })?;
        if read as u64 > self.max_entry_size {
            return Err(AnalyzerError::FileTooBig {
                path: format!("{archive}!/{name}"),
                size: read as u64,
                max: self.max_entry_size,
            });
        }
        Ok(Some(buf))
    }

    /// 엔트리를 UTF-8 텍스트로 읽습니다.
    pub fn read_entry_string(&mut self, name: &str) -> Result<Option<String>, AnalyzerError> {
        let Some(bytes) = self.read_entry(name)? else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| AnalyzerError::ArchiveEntry {
                path: self.path.display().to_string(),
                entry: name.to_owned(),
                reason: e.to_string(),
            })
    }
}
