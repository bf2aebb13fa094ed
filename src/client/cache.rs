//! 按键缓存查询结果，带过期判定和变更通知

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// 列表结果在这个时长内视为新鲜
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    Fresh(V),
    /// 过期或已失效，仍可在重新拉取期间展示
    Stale(V),
}

impl<V> CacheLookup<V> {
    pub fn into_value(self) -> V {
        match self {
            CacheLookup::Fresh(value) | CacheLookup::Stale(value) => value,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheLookup::Fresh(_))
    }
}

struct Entry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
}

pub struct QueryCache<K, V> {
    stale_time: Duration,
    entries: HashMap<K, Entry<V>>,
    // 每次写入或失效都递增，观察者据此重新读取
    generation: watch::Sender<u64>,
    // 只在 invalidate_all 时递增
    epoch: u64,
}

impl<K: Eq + Hash, V: Clone> QueryCache<K, V> {
    pub fn new(stale_time: Duration) -> Self {
        let (generation, _receiver) = watch::channel(0);
        Self {
            stale_time,
            entries: HashMap::new(),
            generation,
            epoch: 0,
        }
    }

    pub fn get(&self, key: &K) -> Option<CacheLookup<V>> {
        let entry = self.entries.get(key)?;
        let fresh = !entry.invalidated && entry.fetched_at.elapsed() < self.stale_time;
        let value = entry.value.clone();
        Some(if fresh {
            CacheLookup::Fresh(value)
        } else {
            CacheLookup::Stale(value)
        })
    }

    /// 失效计数；发起请求前读取，响应回来时交给 `insert_fetched`
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// 写入在 `started_epoch` 时发起的请求结果，同一个键后写覆盖先写；
    /// 请求期间发生过失效时，结果直接记为过期
    pub fn insert_fetched(&mut self, key: K, value: V, started_epoch: u64) {
        let invalidated = started_epoch != self.epoch;
        self.store(key, value, invalidated);
    }

    /// 所有条目标记为过期，数据保留
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.invalidated = true;
        }
        self.epoch += 1;
        self.bump();
    }

    fn store(&mut self, key: K, value: V, invalidated: bool) {
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                invalidated,
            },
        );
        self.bump();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    fn bump(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }
}

impl<K: Eq + Hash, V: Clone> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}
