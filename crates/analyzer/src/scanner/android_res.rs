//! Android 리소스 스캐너
//!
//! aar의 `R.txt`에 선언된 리소스 심볼을 읽습니다. 한 줄의 형식은
//! `<int|int[]> <type> <name> <value>`이며, 결과는 파일 순서를 유지합니다.
//! 리소스를 참조하는 쪽이 import 하는 심볼은 매니페스트 패키지의 `R` 클래스입니다.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use depcap_core::capability::{AndroidResCapability, Capability, ResLine};

use super::android_manifest::read_manifest;
use super::{ArtifactScanner, JarArchive, ScanContext};
use crate::error::AnalyzerError;

pub const R_TXT_PATH: &str = "R.txt";

/// `R.txt` 한 줄을 `(type, name)`으로 읽습니다. 형식이 맞지 않으면 `None`
pub fn parse_r_line(line: &str) -> Option<ResLine> {
    let mut parts = line.split_whitespace();
    let value_type = parts.next()?;
    if value_type != "int" && value_type != "int[]" {
        return None;
    }
    let res_type = parts.next()?;
    let name = parts.next()?;
    // 값 자체는 쓰지 않지만 줄이 완전한지 확인
    parts.next()?;
    Some(ResLine::new(res_type, name))
}

/// `R.txt` 전체를 읽습니다. 잘못된 줄은 건너뜁니다.
pub fn parse_r_txt(content: &str) -> Vec<ResLine> {
    let mut seen = BTreeSet::new();
    let mut lines = Vec::new();
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_r_line(line) {
            Some(res) => {
                if seen.insert(res.clone()) {
                    lines.push(res);
                }
            }
            None => debug!(line, "skipping R.txt line"),
        }
    }
    lines
}

/// Android 리소스 스캐너
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidResScanner;

impl ArtifactScanner for AndroidResScanner {
    fn name(&self) -> &'static str {
        "android_res"
    }

    fn scan(
        &self,
        archive: &mut JarArchive,
        ctx: &ScanContext<'_>,
    ) -> Result<Vec<Capability>, AnalyzerError> {
        let Some(content) = archive.read_entry_string(R_TXT_PATH)? else {
            return Ok(Vec::new());
        };
        let lines = parse_r_txt(&content);
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let package = read_manifest(archive)?.and_then(|m| m.package_name);
        let Some(package) = package else {
            warn!(
                artifact = %ctx.coordinates,
                "R.txt without manifest package, skipping resources"
            );
            return Ok(Vec::new());
        };

        debug!(
            artifact = %ctx.coordinates,
            resources = lines.len(),
            "found android resources"
        );
        Ok(vec![Capability::AndroidRes(AndroidResCapability {
            r_import: format!("{package}.R"),
            lines,
        })])
    }
}
