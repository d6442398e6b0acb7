//! depcap-analyzer -- 의존성 식별과 아티팩트 능력 분석
//!
//! 해석된 의존성 그래프를 받아 각 의존성의 정규 좌표를 만들고, 아티팩트
//! 아카이브(jar/aar)를 검사해 어떤 능력(클래스, 상수, 서비스 프로바이더,
//! 네이티브 라이브러리, Android 매니페스트 컴포넌트 등)을 제공하는지 분석합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`AnalyzerError`)
//! - [`config`]: Analyzer configuration (`AnalyzerConfig`, builder)
//! - [`graph`]: Graph input model (`GraphExport`, `ComponentId`, `Dependency`)
//! - [`resolver`]: Identity resolution (graph references → `Coordinates`)
//! - [`cache`]: Build-scoped analysis cache (`AnalysisCache`, `CacheRegion`)
//! - [`scanner`]: Archive scanners (`ArtifactScanner` trait and implementations)
//! - [`analyzer`]: Main orchestrator (`ArtifactAnalyzer`, `ArtifactAnalyzerBuilder`)
//! - [`aggregator`]: Per-dependency records and reports (`Aggregator`, `AnalysisReport`)
//!
//! # Architecture
//!
//! ```text
//! GraphExport --> resolver --> Coordinates
//!                                  |
//!            archive file --> ArtifactScanner x N <--> AnalysisCache
//!                                  |
//!                            CapabilitySet
//!                                  |
//!                 Aggregator --> AnalysisReport
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod scanner;

// --- Public API Re-exports ---

// Orchestrator
pub use analyzer::{ArtifactAnalyzer, ArtifactAnalyzerBuilder, ArtifactJob, ArtifactScan, ScanFailure};

// Aggregation
pub use aggregator::{Aggregator, AnalysisReport, DependencyRecord, ReportSummary};

// Configuration
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};

// Error
pub use error::AnalyzerError;

// Cache
pub use cache::{AnalysisCache, CacheRegion};

// Graph model
pub use graph::{
    ComponentId, ComponentSelector, Dependency, FileSet, GraphExport, ResolvedArtifact,
    ResolvedDependency, SelectionReason,
};

// Scanners
pub use scanner::{
    AndroidLinterScanner, AndroidManifestScanner, AndroidResScanner, AnnotationProcessorScanner,
    ArchiveLimits, ArtifactScanner, ClassFileScanner, ExplodedArchive, JarArchive,
    NativeLibScanner, ScanContext, ServiceLoaderScanner, default_scanners,
};
