//! 분석 캐시 -- 빌드 호출 하나의 수명 동안 공유되는 메모이제이션 계층
//!
//! 같은 아티팩트를 여러 스캐너나 여러 분석 작업이 반복해서 여는 것을 막습니다.
//!
//! # 계약
//!
//! - [`CacheRegion::get`]: 계산을 유발하지 않는 비차단 조회
//! - [`CacheRegion::put_if_absent`]: 첫 번째 쓰기가 이깁니다. 경쟁에서 진 값은 버려지며
//!   에러가 아닙니다 (같은 키의 계산은 아티팩트 바이트의 순수 함수이므로 동등함)
//! - 영역마다 독립적으로 크기가 제한됩니다. 음수 설정은 무제한
//! - 캐시를 비우거나 끄더라도 분석 결과는 바뀌지 않고 비용만 바뀝니다
//!
//! # 동시성
//!
//! 항목은 샤딩된 [`DashMap`]에 저장되므로, 서로 다른 키에 대한 읽기가
//! 쓰기에 막히지 않습니다. 크기 제한이 있는 영역은 사용 순서를
//! [`parking_lot::Mutex`]로 감싼 [`LruCache`]에 따로 둡니다. 삽입, 축출, 비우기는
//! 모두 이 잠금 안에서 일어나므로 항목과 순서가 어긋나지 않습니다. 조회는 잠금을
//! 기다리지 않고 `try_lock`이 성공할 때만 최근 사용 순서를 갱신합니다.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use depcap_core::capability::{AnnotationProcessorCapability, CapabilitySet};
use depcap_core::metrics as m;

use crate::scanner::class_file::ExplodedArchive;

/// 영역 저장소
#[derive(Debug)]
enum Store<V> {
    Unbounded(DashMap<String, V>),
    Bounded {
        entries: DashMap<String, V>,
        order: Mutex<LruCache<String, ()>>,
    },
    /// 최대 크기 0: 아무것도 보관하지 않음
    Disabled,
}

/// 크기 제한이 있는 동시성 캐시 영역
///
/// 제한을 넘으면 가장 오래 사용되지 않은 항목이 축출됩니다.
#[derive(Debug)]
pub struct CacheRegion<V> {
    name: &'static str,
    max_size: Option<usize>,
    store: Store<V>,
}

impl<V: Clone> CacheRegion<V> {
    /// 새 영역을 만듭니다. `max_size`가 `None`이면 무제한입니다.
    pub fn new(name: &'static str, max_size: Option<usize>) -> Self {
        let store = match max_size {
            None => Store::Unbounded(DashMap::new()),
            Some(max) => match NonZeroUsize::new(max) {
                Some(cap) => Store::Bounded {
                    entries: DashMap::new(),
                    order: Mutex::new(LruCache::new(cap)),
                },
                None => Store::Disabled,
            },
        };
        Self {
            name,
            max_size,
            store,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// 캐시된 값을 조회합니다. 계산은 하지 않습니다.
    pub fn get(&self, key: &str) -> Option<V> {
        let found = match &self.store {
            Store::Unbounded(map) => map.get(key).map(|entry| entry.value().clone()),
            Store::Bounded { entries, order } => {
                let found = entries.get(key).map(|entry| entry.value().clone());
                // 쓰기 중이면 순서 갱신을 건너뜀
                if found.is_some() {
                    if let Some(mut order) = order.try_lock() {
                        order.promote(key);
                    }
                }
                found
            }
            Store::Disabled => None,
        };
        if found.is_some() {
            metrics::counter!(m::CACHE_HITS_TOTAL, m::LABEL_REGION => self.name).increment(1);
        } else {
            metrics::counter!(m::CACHE_MISSES_TOTAL, m::LABEL_REGION => self.name).increment(1);
        }
        found
    }

    /// 키가 비어 있을 때만 값을 넣고, 최종적으로 캐시에 있는 값을 반환합니다.
    ///
    /// 이미 값이 있으면 새 값은 버려지고 기존 값이 반환됩니다.
    pub fn put_if_absent(&self, key: impl Into<String>, value: V) -> V {
        let key = key.into();
        match &self.store {
            Store::Unbounded(map) => match map.entry(key) {
                Entry::Occupied(existing) => {
                    self.discarded(existing.key());
                    existing.get().clone()
                }
                Entry::Vacant(slot) => slot.insert(value).value().clone(),
            },
            Store::Bounded { entries, order } => {
                let mut order = order.lock();
                if let Some(existing) = entries.get(&key).map(|entry| entry.value().clone()) {
                    order.promote(&key);
                    self.discarded(&key);
                    return existing;
                }
                entries.insert(key.clone(), value.clone());
                if let Some((evicted, ())) = order.push(key, ()) {
                    entries.remove(&evicted);
                    metrics::counter!(m::CACHE_EVICTIONS_TOTAL, m::LABEL_REGION => self.name)
                        .increment(1);
                    trace!(region = self.name, key = %evicted, "evicted");
                }
                value
            }
            Store::Disabled => value,
        }
    }

    fn discarded(&self, key: &str) {
        metrics::counter!(m::CACHE_DISCARDED_WRITES_TOTAL, m::LABEL_REGION => self.name)
            .increment(1);
        trace!(region = self.name, key, "discarding racing cache write");
    }

    /// 캐시된 값이 있으면 반환하고, 없으면 계산해서 넣습니다.
    ///
    /// 계산은 잠금 밖에서 실행됩니다. 동시에 같은 키를 요청한 호출자들은 각자
    /// 계산할 수 있지만, 모두 처음 저장된 값을 돌려받습니다.
    pub fn get_or_insert_with<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.put_if_absent(key, value))
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(map) | Store::Bounded { entries: map, .. } => map.len(),
            Store::Disabled => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 모든 엔트리를 제거합니다.
    pub fn clear(&self) {
        match &self.store {
            Store::Unbounded(map) => map.clear(),
            Store::Bounded { entries, order } => {
                let mut order = order.lock();
                order.clear();
                entries.clear();
            }
            Store::Disabled => {}
        }
    }
}

/// 무제한 출현 횟수 카운터
#[derive(Debug, Default)]
struct Counter(DashMap<String, u64>);

impl Counter {
    fn increment(&self, key: &str) {
        if let Some(mut count) = self.0.get_mut(key) {
            *count += 1;
            return;
        }
        *self.0.entry(key.to_owned()).or_insert(0) += 1;
    }

    fn get(&self, key: &str) -> u64 {
        self.0.get(key).map_or(0, |c| *c)
    }

    fn snapshot(&self) -> BTreeMap<String, u64> {
        self.0
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

/// 빌드 호출 하나 동안 공유되는 분석 캐시
///
/// 한 번 생성해서 `Arc`로 모든 분석 작업에 전달합니다. 디스크에 저장되지 않습니다.
#[derive(Debug)]
pub struct AnalysisCache {
    /// 아카이브 이름 → 클래스 파일 분석 요약
    archives: CacheRegion<Arc<ExplodedArchive>>,
    /// 아티팩트 경로 → 전체 능력 모음
    capabilities: CacheRegion<Arc<CapabilitySet>>,
    /// 아카이브 이름 → 어노테이션 프로세서 (없으면 `None`)
    procs: CacheRegion<Option<Arc<AnnotationProcessorCapability>>>,
    archive_counts: Counter,
    class_counts: Counter,
}

impl AnalysisCache {
    /// 영역별 최대 크기를 지정해 캐시를 만듭니다. `None`이면 무제한입니다.
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            archives: CacheRegion::new("archives", max_size),
            capabilities: CacheRegion::new("capabilities", max_size),
            procs: CacheRegion::new("procs", max_size),
            archive_counts: Counter::default(),
            class_counts: Counter::default(),
        }
    }

    /// 무제한 캐시
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn archives(&self) -> &CacheRegion<Arc<ExplodedArchive>> {
        &self.archives
    }

    pub fn capabilities(&self) -> &CacheRegion<Arc<CapabilitySet>> {
        &self.capabilities
    }

    pub fn procs(&self) -> &CacheRegion<Option<Arc<AnnotationProcessorCapability>>> {
        &self.procs
    }

    /// 아카이브를 만날 때마다 호출합니다 (캐시 적중 여부와 무관).
    pub fn record_archive(&self, archive_name: &str) {
        self.archive_counts.increment(archive_name);
    }

    /// 클래스를 만날 때마다 호출합니다.
    pub fn record_class(&self, class_name: &str) {
        self.class_counts.increment(class_name);
    }

    pub fn archive_count(&self, archive_name: &str) -> u64 {
        self.archive_counts.get(archive_name)
    }

    pub fn class_count(&self, class_name: &str) -> u64 {
        self.class_counts.get(class_name)
    }

    /// 아카이브별 출현 횟수 스냅샷 (이름 순)
    pub fn archives_seen(&self) -> BTreeMap<String, u64> {
        self.archive_counts.snapshot()
    }

    /// 클래스별 출현 횟수 스냅샷 (이름 순)
    pub fn classes(&self) -> BTreeMap<String, u64> {
        self.class_counts.snapshot()
    }

    /// 모든 영역을 비웁니다. 카운터는 유지됩니다.
    pub fn clear(&self) {
        self.archives.clear();
        self.capabilities.clear();
        self.procs.clear();
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::unbounded()
    }
}
