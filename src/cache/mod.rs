use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::gateway::SearchResult;

/// 搜索结果缓存
///
/// 进程内的 TTL 键值缓存，键为清理后的搜索词（保留大小写，精确相等）。
/// 过期条目在读取时按不存在处理并顺手清除。
pub struct SearchCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

struct CacheEntry {
    inserted_at: Instant,
    results: Vec<SearchResult>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// 命中且未过期时返回缓存值
    pub fn get(&self, key: &str) -> Option<Vec<SearchResult>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.results.clone());
            }
        } else {
            return None;
        }

        // 已过期，清除后按未命中处理
        self.entries.remove(key);
        None
    }

    /// 无条件覆盖，TTL 从当前时刻重新计起
    pub fn put(&self, key: String, results: Vec<SearchResult>) {
        self.entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                results,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str) -> SearchResult {
        SearchResult {
            name: name.to_string(),
            platforms: vec!["PC".to_string()],
            image_ref: None,
        }
    }

    #[test]
    fn put_then_get_returns_value() {
        let cache = SearchCache::new(Duration::from_secs(60));
        cache.put("zelda".to_string(), vec![result("Zelda")]);

        let hit = cache.get("zelda").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "Zelda");
    }

    #[test]
    fn missing_key_returns_none() {
        let cache = SearchCache::new(Duration::from_secs(60));
        assert!(cache.get("mario").is_none());
    }

    #[test]
    fn keys_are_case_sensitive() {
        let cache = SearchCache::new(Duration::from_secs(60));
        cache.put("Zelda".to_string(), vec![result("Zelda")]);
        assert!(cache.get("zelda").is_none());
        assert!(cache.get("Zelda").is_some());
    }

    #[test]
    fn expired_entry_is_treated_as_absent() {
        let cache = SearchCache::new(Duration::from_millis(10));
        cache.put("zelda".to_string(), vec![result("Zelda")]);

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("zelda").is_none());
        // 过期读取后条目已被清除
        assert!(cache.entries.get("zelda").is_none());
    }

    #[test]
    fn put_overwrites_and_resets_ttl() {
        let cache = SearchCache::new(Duration::from_millis(50));
        cache.put("zelda".to_string(), vec![result("old")]);

        std::thread::sleep(Duration::from_millis(30));
        cache.put("zelda".to_string(), vec![result("new")]);

        std::thread::sleep(Duration::from_millis(30));
        // 距第二次写入仅 30ms，仍在 TTL 内
        let hit = cache.get("zelda").unwrap();
        assert_eq!(hit[0].name, "new");
    }
}
