//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `depcap_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(depcap_core::metrics::CACHE_HITS_TOTAL, depcap_core::metrics::LABEL_REGION => "archives")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 캐시 영역 레이블 키 (archives, capabilities, inline_members, procs)
pub const LABEL_REGION: &str = "region";

/// 스캐너 이름 레이블 키
pub const LABEL_SCANNER: &str = "scanner";

// ─── Analysis Cache 메트릭 ─────────────────────────────────────────

/// Cache: 조회 적중 수 (counter, label: region)
pub const CACHE_HITS_TOTAL: &str = "depcap_cache_hits_total";

/// Cache: 조회 실패 수 (counter, label: region)
pub const CACHE_MISSES_TOTAL: &str = "depcap_cache_misses_total";

/// Cache: 크기 제한으로 제거된 엔트리 수 (counter, label: region)
pub const CACHE_EVICTIONS_TOTAL: &str = "depcap_cache_evictions_total";

/// Cache: 경쟁 삽입에서 버려진 값의 수 (counter, label: region)
pub const CACHE_DISCARDED_WRITES_TOTAL: &str = "depcap_cache_discarded_writes_total";

// ─── Analyzer 메트릭 ───────────────────────────────────────────────

/// Analyzer: 스캔한 아티팩트 수 (counter)
pub const ARTIFACTS_SCANNED_TOTAL: &str = "depcap_artifacts_scanned_total";

/// Analyzer: 스캔 실패 수 (counter, label: scanner)
pub const SCAN_FAILURES_TOTAL: &str = "depcap_scan_failures_total";

/// Analyzer: 아티팩트 하나의 스캔 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "depcap_scan_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(CACHE_HITS_TOTAL, "Analysis cache lookups that found a value");
    describe_counter!(
        CACHE_MISSES_TOTAL,
        "Analysis cache lookups that found no value"
    );
    describe_counter!(
        CACHE_EVICTIONS_TOTAL,
        "Analysis cache entries removed to stay within the size bound"
    );
    describe_counter!(
        CACHE_DISCARDED_WRITES_TOTAL,
        "Racing cache inserts whose value was discarded (first writer wins)"
    );
    describe_counter!(
        ARTIFACTS_SCANNED_TOTAL,
        "Total number of artifacts opened and scanned"
    );
    describe_counter!(
        SCAN_FAILURES_TOTAL,
        "Per-artifact scan failures, by scanner"
    );
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        "Time to scan a single artifact with all scanners in seconds"
    );
}
