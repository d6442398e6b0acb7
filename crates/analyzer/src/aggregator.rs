//! 결과 집계 -- 좌표별 의존성 레코드와 분석 보고서
//!
//! 능력은 좌표를 직접 참조하지 않으므로, 같은 좌표로 들어온 아티팩트들의
//! 스캔 결과를 여기서 하나의 [`DependencyRecord`]로 합칩니다.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use depcap_core::capability::CapabilitySet;
use depcap_core::coordinates::Coordinates;

use crate::analyzer::{ArtifactScan, ScanFailure};

/// 의존성 하나에 대한 분석 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub coordinates: Coordinates,
    /// 이 좌표로 해석된 아티팩트 파일 (입력 순서)
    pub artifacts: Vec<PathBuf>,
    pub capabilities: CapabilitySet,
    pub failures: Vec<ScanFailure>,
    /// 빌드 스크립트에 직접 선언되었는지
    pub declared: bool,
    /// java platform 의존성인지
    pub is_platform: bool,
}

impl DependencyRecord {
    fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            artifacts: Vec::new(),
            capabilities: CapabilitySet::new(),
            failures: Vec::new(),
            declared: false,
            is_platform: false,
        }
    }
}

/// 보고서 요약 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub dependencies: usize,
    pub artifacts: usize,
    /// 능력 종류 레이블 → 그 능력을 가진 의존성 수
    pub capabilities: BTreeMap<String, usize>,
    pub failures: usize,
}

/// 분석 보고서
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub report_id: String,
    pub generated_at: SystemTime,
    /// 좌표 순서로 정렬된 레코드
    pub records: Vec<DependencyRecord>,
    pub summary: ReportSummary,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 좌표 식별자로 레코드를 찾습니다.
    pub fn record(&self, identifier: &str) -> Option<&DependencyRecord> {
        self.records
            .iter()
            .find(|r| r.coordinates.identifier() == identifier)
    }
}

/// 스캔 결과를 좌표별로 모읍니다.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: BTreeMap<Coordinates, DependencyRecord>,
    declared: BTreeSet<String>,
    platforms: BTreeMap<String, bool>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 선언된 의존성 식별자와 platform 표시를 지정합니다.
    pub fn with_declared(
        mut self,
        declared: BTreeSet<String>,
        platforms: BTreeMap<String, bool>,
    ) -> Self {
        self.declared = declared;
        self.platforms = platforms;
        self
    }

    /// 스캔 결과 하나를 더합니다. 같은 좌표의 능력은 합쳐집니다.
    pub fn add(&mut self, scan: ArtifactScan) {
        let record = self
            .records
            .entry(scan.coordinates.clone())
            .or_insert_with(|| DependencyRecord::new(scan.coordinates));

        if !record.artifacts.contains(&scan.file) {
            record.artifacts.push(scan.file);
        }
        record
            .capabilities
            .extend(scan.capabilities.iter().cloned());
        record.failures.extend(scan.failures);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 보고서를 만듭니다.
    pub fn finish(self) -> AnalysisReport {
        let mut summary = ReportSummary::default();
        let mut records = Vec::with_capacity(self.records.len());

        for (_, mut record) in self.records {
            let identifier = record.coordinates.identifier();
            record.declared = self.declared.contains(identifier);
            record.is_platform = self.platforms.get(identifier).copied().unwrap_or(false);

            summary.dependencies += 1;
            summary.artifacts += record.artifacts.len();
            summary.failures += record.failures.len();
            for capability in record.capabilities.iter() {
                *summary
                    .capabilities
                    .entry(capability.kind().label().to_owned())
                    .or_default() += 1;
            }
            records.push(record);
        }

        AnalysisReport {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: SystemTime::now(),
            records,
            summary,
        }
    }
}
