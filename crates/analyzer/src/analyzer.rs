//! 분석 오케스트레이터 -- 전체 분석 흐름 관리
//!
//! [`ArtifactAnalyzer`]는 그래프에서 아티팩트 작업을 만들고, 각 아카이브에 대해
//! 활성화된 스캐너를 실행한 뒤 결과를 [`Aggregator`]로 합칩니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! GraphExport --> resolver --> Vec<ArtifactJob>
//!                                   |
//!                      spawn_blocking (Semaphore 제한)
//!                                   |
//!                 AnalysisCache <--> ArtifactScanner x N
//!                                   |
//!                           Vec<ArtifactScan>
//!                                   |
//!                    Aggregator --> AnalysisReport
//! ```
//!
//! # 실패 격리
//!
//! 아카이브를 열지 못하거나 스캐너 하나가 실패해도 해당 아티팩트의
//! [`ScanFailure`]로 기록될 뿐 다른 아티팩트 분석은 계속됩니다. 식별자 해석
//! 실패만 전체 분석을 중단합니다.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use depcap_core::capability::CapabilitySet;
use depcap_core::coordinates::Coordinates;
use depcap_core::metrics as m;

use crate::aggregator::{AnalysisReport, Aggregator};
use crate::cache::AnalysisCache;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::graph::{ComponentId, GraphExport, ResolvedDependency};
use crate::resolver;
use crate::scanner::{ArchiveLimits, ArtifactScanner, JarArchive, ScanContext, default_scanners};

/// 아카이브를 열지 못했을 때 실패 레이블
const ARCHIVE_STAGE: &str = "archive";

/// 분석할 아티팩트 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactJob {
    pub coordinates: Coordinates,
    pub file: PathBuf,
}

/// 아티팩트 하나의 스캔 실패
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub artifact: PathBuf,
    /// 실패한 스캐너. 아카이브 자체를 열지 못했으면 `None`
    pub scanner: Option<String>,
    pub reason: String,
}

/// 아티팩트 하나의 스캔 결과
#[derive(Debug, Clone)]
pub struct ArtifactScan {
    pub coordinates: Coordinates,
    pub file: PathBuf,
    pub capabilities: Arc<CapabilitySet>,
    pub failures: Vec<ScanFailure>,
    /// 확장자가 맞지 않아 스캔하지 않음
    pub skipped: bool,
}

impl ArtifactScan {
    fn empty(coordinates: &Coordinates, file: &Path, skipped: bool) -> Self {
        Self {
            coordinates: coordinates.clone(),
            file: file.to_path_buf(),
            capabilities: Arc::new(CapabilitySet::new()),
            failures: Vec::new(),
            skipped,
        }
    }
}

/// 아티팩트 분석기
///
/// 스캐너 목록과 빌드 전체에서 공유하는 [`AnalysisCache`]를 가집니다.
/// `ArtifactAnalyzerBuilder`로 생성합니다.
pub struct ArtifactAnalyzer {
    config: AnalyzerConfig,
    scanners: Vec<Arc<dyn ArtifactScanner>>,
    cache: Arc<AnalysisCache>,
    /// 정렬된 스캐너 이름. 스캐너 구성이 다른 분석기끼리 캐시를 공유해도
    /// 서로의 능력 집합을 돌려받지 않도록 캐시 키에 붙입니다.
    cache_scope: String,
}

impl std::fmt::Debug for ArtifactAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactAnalyzer")
            .field("config", &self.config)
            .field("scanners", &self.scanner_names())
            .finish()
    }
}

impl ArtifactAnalyzer {
    pub fn builder() -> ArtifactAnalyzerBuilder {
        ArtifactAnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// 활성화된 스캐너 이름 (실행 순서)
    pub fn scanner_names(&self) -> Vec<&'static str> {
        self.scanners.iter().map(|s| s.name()).collect()
    }

    /// 그래프의 아티팩트마다 좌표를 해석해 작업 목록을 만듭니다.
    ///
    /// 아티팩트의 컴포넌트를 선택한 엣지가 있으면 엣지 기준으로 해석하므로
    /// composite 치환 정보가 유지됩니다. Gradle API 같은 opaque 컴포넌트는
    /// 작업에서 제외합니다.
    ///
    /// # Errors
    ///
    /// 지원하지 않는 식별자나 셀렉터를 만나면 `Resolve`
    pub fn plan(graph: &GraphExport) -> Result<Vec<ArtifactJob>, AnalyzerError> {
        let mut selected_by: HashMap<&ComponentId, &ResolvedDependency> = HashMap::new();
        for edge in &graph.edges {
            selected_by.entry(&edge.selected).or_insert(edge);
        }

        graph
            .artifacts
            .iter()
            .filter(|artifact| match &artifact.component {
                ComponentId::Opaque { display_name } => {
                    debug!(component = %display_name, "opaque component, skipping");
                    false
                }
                _ => true,
            })
            .map(|artifact| {
                let coordinates = match selected_by.get(&artifact.component) {
                    Some(edge) => resolver::resolve_edge(edge)?,
                    None => resolver::resolve_component(&artifact.component)?,
                };
                Ok(ArtifactJob {
                    coordinates,
                    file: artifact.file.clone(),
                })
            })
            .collect()
    }

    /// 아티팩트 하나를 스캔합니다 (blocking I/O).
    ///
    /// 캐시에 능력 집합이 있으면 아카이브를 열지 않습니다. 실패가 하나라도 있는
    /// 결과는 캐시하지 않습니다.
    pub fn analyze_artifact(&self, coordinates: &Coordinates, file: &Path) -> ArtifactScan {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.config.accepts_file(&file_name) {
            debug!(artifact = %coordinates, file = %file.display(), "not an archive, skipping");
            return ArtifactScan::empty(coordinates, file, true);
        }

        self.cache.record_archive(&file_name);
        let key = format!("{}|{}", self.cache_scope, file.display());
        if let Some(capabilities) = self.cache.capabilities().get(&key) {
            debug!(artifact = %coordinates, "capabilities served from cache");
            return ArtifactScan {
                capabilities,
                ..ArtifactScan::empty(coordinates, file, false)
            };
        }

        let started = Instant::now();
        let limits = ArchiveLimits {
            max_archive_size: self.config.max_archive_size,
            max_entry_size: self.config.max_entry_size,
        };
        let mut archive = match JarArchive::open(file, limits) {
            Ok(archive) => archive,
            Err(e) => {
                warn!(artifact = %coordinates, file = %file.display(), error = %e, "cannot open archive");
                metrics::counter!(m::SCAN_FAILURES_TOTAL, m::LABEL_SCANNER => ARCHIVE_STAGE)
                    .increment(1);
                let mut scan = ArtifactScan::empty(coordinates, file, false);
                scan.failures.push(ScanFailure {
                    artifact: file.to_path_buf(),
                    scanner: None,
                    reason: e.to_string(),
                });
                return scan;
            }
        };

        let ctx = ScanContext {
            coordinates,
            cache: &self.cache,
        };
        let mut capabilities = CapabilitySet::new();
        let mut failures = Vec::new();

        for scanner in &self.scanners {
            match scanner.scan(&mut archive, &ctx) {
                Ok(found) => capabilities.extend(found),
                Err(e) => {
                    warn!(
                        artifact = %coordinates,
                        scanner = scanner.name(),
                        error = %e,
                        "scanner failed, continuing without its capabilities"
                    );
                    metrics::counter!(m::SCAN_FAILURES_TOTAL, m::LABEL_SCANNER => scanner.name())
                        .increment(1);
                    failures.push(ScanFailure {
                        artifact: file.to_path_buf(),
                        scanner: Some(scanner.name().to_owned()),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let capabilities = Arc::new(capabilities);
        let capabilities = if failures.is_empty() {
            self.cache.capabilities().put_if_absent(key, capabilities)
        } else {
            capabilities
        };

        metrics::counter!(m::ARTIFACTS_SCANNED_TOTAL).increment(1);
        metrics::histogram!(m::SCAN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            artifact = %coordinates,
            capabilities = capabilities.len(),
            failures = failures.len(),
            "artifact scanned"
        );

        ArtifactScan {
            coordinates: coordinates.clone(),
            file: file.to_path_buf(),
            capabilities,
            failures,
            skipped: false,
        }
    }

    /// 작업 전체를 블로킹 스레드 풀에서 병렬로 스캔합니다.
    ///
    /// 동시 실행 수는 `max_concurrent_scans`로 제한됩니다. 결과는 작업 순서를
    /// 따릅니다.
    pub async fn analyze_all(
        self: &Arc<Self>,
        jobs: Vec<ArtifactJob>,
    ) -> Result<Vec<ArtifactScan>, AnalyzerError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_scans));
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| AnalyzerError::Join(format!("semaphore closed: {e}")))?;
            let analyzer = Arc::clone(self);
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                analyzer.analyze_artifact(&job.coordinates, &job.file)
            }));
        }

        let mut scans = Vec::with_capacity(handles.len());
        for handle in handles {
            let scan = handle
                .await
                .map_err(|e| AnalyzerError::Join(format!("spawn_blocking failed: {e}")))?;
            scans.push(scan);
        }
        Ok(scans)
    }

    /// 그래프 전체를 해석하고 스캔해 보고서를 만듭니다.
    pub async fn analyze_graph(
        self: &Arc<Self>,
        graph: &GraphExport,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let jobs = Self::plan(graph)?;
        let mut platforms = BTreeMap::new();
        let declared = resolver::declared_identifiers(&graph.declared, &mut platforms)?;

        info!(artifacts = jobs.len(), declared = declared.len(), "starting analysis");
        let scans = self.analyze_all(jobs).await?;

        let mut aggregator = Aggregator::new().with_declared(declared, platforms);
        for scan in scans {
            aggregator.add(scan);
        }
        let report = aggregator.finish();

        info!(
            dependencies = report.summary.dependencies,
            failures = report.summary.failures,
            "analysis completed"
        );
        Ok(report)
    }
}

/// [`ArtifactAnalyzer`] 빌더
pub struct ArtifactAnalyzerBuilder {
    config: AnalyzerConfig,
    scanners: Option<Vec<Arc<dyn ArtifactScanner>>>,
    cache: Option<Arc<AnalysisCache>>,
}

impl ArtifactAnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            scanners: None,
            cache: None,
        }
    }

    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// 스캐너 목록을 직접 지정합니다. 지정하지 않으면 기본 스캐너를 씁니다.
    pub fn scanners(mut self, scanners: Vec<Arc<dyn ArtifactScanner>>) -> Self {
        self.scanners = Some(scanners);
        self
    }

    /// 다른 분석기와 캐시를 공유합니다.
    pub fn cache(mut self, cache: Arc<AnalysisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 분석기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증에 실패하면 `Config`
    pub fn build(self) -> Result<ArtifactAnalyzer, AnalyzerError> {
        self.config.validate()?;

        let scanners: Vec<_> = self
            .scanners
            .unwrap_or_else(default_scanners)
            .into_iter()
            .filter(|s| self.config.scanner_enabled(s.name()))
            .collect();
        let mut names: Vec<_> = scanners.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        let cache_scope = names.join(",");
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(AnalysisCache::new(self.config.cache_bound())));

        info!(
            scanners = scanners.len(),
            cache_max_size = self.config.cache_max_size,
            "artifact analyzer built"
        );
        Ok(ArtifactAnalyzer {
            config: self.config,
            scanners,
            cache,
            cache_scope,
        })
    }
}

impl Default for ArtifactAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
