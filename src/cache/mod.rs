// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

/// 缓存条目
struct CacheEntry {
    html: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(html: String, ttl: Duration) -> Self {
        Self {
            html,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 进程内页面缓存
///
/// 按URL缓存渲染后的HTML，带TTL过期。
/// 是否读写由运行配置的缓存模式决定，缓存本身不感知模式。
pub struct PageCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    stats: Mutex<CacheStats>,
}

impl PageCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// 获取缓存的HTML，过期条目按未命中处理并移除
    pub fn get(&self, url: &str) -> Option<String> {
        if let Some(entry) = self.entries.get(url) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(url);
                let mut stats = self.stats.lock().unwrap();
                stats.misses += 1;
                return None;
            }

            let html = entry.html.clone();
            drop(entry);
            let mut stats = self.stats.lock().unwrap();
            stats.hits += 1;
            debug!("Cache hit for url: {}", url);
            Some(html)
        } else {
            let mut stats = self.stats.lock().unwrap();
            stats.misses += 1;
            debug!("Cache miss for url: {}", url);
            None
        }
    }

    /// 写入缓存条目，覆盖同URL的旧条目
    pub fn store(&self, url: &str, html: &str) {
        self.entries.insert(
            url.to_string(),
            CacheEntry::new(html.to_string(), self.default_ttl),
        );

        let mut stats = self.stats.lock().unwrap();
        stats.stores += 1;
        debug!("Stored {} bytes in page cache for url: {}", html.len(), url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }
}
