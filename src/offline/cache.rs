//! Named response caches keyed by URL

use dashmap::DashMap;

use super::HttpResponse;

#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: DashMap<String, DashMap<String, HttpResponse>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the cache if missing
    pub fn open(&self, cache: &str) {
        self.caches.entry(cache.to_string()).or_default();
    }

    pub fn put(&self, cache: &str, url: &str, response: HttpResponse) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    /// First hit across every cache
    pub fn lookup(&self, url: &str) -> Option<HttpResponse> {
        self.caches
            .iter()
            .find_map(|cache| cache.value().get(url).map(|r| r.value().clone()))
    }

    pub fn get(&self, cache: &str, url: &str) -> Option<HttpResponse> {
        self.caches
            .get(cache)?
            .get(url)
            .map(|r| r.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }

    pub fn urls(&self, cache: &str) -> Vec<String> {
        let mut urls: Vec<String> = self
            .caches
            .get(cache)
            .map(|c| c.iter().map(|e| e.key().clone()).collect())
            .unwrap_or_default();
        urls.sort();
        urls
    }

    pub fn delete(&self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }

    pub fn clear(&self) {
        self.caches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_searches_all_caches() {
        let storage = CacheStorage::new();
        storage.open("a");
        storage.put("b", "/logo.png", HttpResponse::text(200, "png"));
        assert!(storage.lookup("/logo.png").is_some());
        assert!(storage.get("a", "/logo.png").is_none());
        assert_eq!(storage.names(), ["a", "b"]);
    }
}
