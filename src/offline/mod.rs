//! Offline Shell - cache-backed request interception
//!
//! ```text
//! request ──► RoutePolicy ──► Bypass        ──► not intercepted
//!                         ├─► AssetFirst    ──► cache ─► network ─► 503 text
//!                         └─► NetworkFirst  ──► network ─► cache ─► 503 json
//! ```
//!
//! Lifecycle: `install` pre-caches the static manifest, `activate` purges
//! caches outside the current version set. Control messages, push payloads
//! and background sync of queued requests round out the shell.

mod cache;
mod network;
mod policy;

pub use cache::CacheStorage;
pub use network::{HttpNetwork, Network};
pub use policy::{RoutePolicy, Strategy};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::OfflineConfig;
use crate::error::{Result, ShellError};

/// Background sync tag that replays queued requests
pub const SYNC_TAG: &str = "sync-data";

const OFFLINE_TEXT: &str = "Offline - Content not available";
const OFFLINE_MESSAGE: &str = "You are currently offline. Some features may be limited.";

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            body: None,
        }
    }

    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages / Notifications
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    SkipWaiting,
    ClearCache,
}

impl ControlMessage {
    /// Parse the `type` tag of a page message
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SKIP_WAITING" => Some(Self::SkipWaiting),
            "CLEAR_CACHE" => Some(Self::ClearCache),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Payload handed to the platform notification API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub renotify: bool,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub replayed: usize,
    pub failed: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Shell
// ─────────────────────────────────────────────────────────────────────────────

pub struct OfflineShell {
    config: OfflineConfig,
    policy: RoutePolicy,
    caches: CacheStorage,
    network: Arc<dyn Network>,
    pending: DashMap<String, HttpRequest>,
    skip_waiting: AtomicBool,
}

impl OfflineShell {
    pub fn new(config: OfflineConfig, network: Arc<dyn Network>) -> Self {
        Self {
            policy: RoutePolicy::from_config(&config),
            config,
            caches: CacheStorage::new(),
            network,
            pending: DashMap::new(),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn caches(&self) -> &CacheStorage {
        &self.caches
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn is_waiting_skipped(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Absolute URL for a manifest entry
    pub fn resolve(&self, path: &str) -> Result<String> {
        let origin = Url::parse(&self.config.origin).map_err(|e| ShellError::Config {
            reason: format!("invalid offline origin '{}': {}", self.config.origin, e),
        })?;
        origin
            .join(path)
            .map(|u| u.to_string())
            .map_err(|e| ShellError::Config {
                reason: format!("invalid asset path '{}': {}", path, e),
            })
    }

    /// Pre-cache every static asset; all or nothing.
    ///
    /// Returns the number of cached entries.
    pub async fn install(&self) -> Result<usize> {
        info!(version = %self.config.cache_version, "Installing offline shell");

        let mut fetched = Vec::with_capacity(self.config.static_assets.len());
        for path in &self.config.static_assets {
            let url = self.resolve(path)?;
            let response = self.network.fetch(&HttpRequest::get(url.as_str())).await?;
            if !response.is_ok() {
                return Err(ShellError::Offline { url });
            }
            fetched.push((url, response));
        }

        self.caches.open(&self.config.assets_cache);
        let count = fetched.len();
        for (url, response) in fetched {
            self.caches.put(&self.config.assets_cache, &url, response);
        }

        self.skip_waiting.store(true, Ordering::SeqCst);
        info!(count, "Static assets cached");
        Ok(count)
    }

    /// Delete caches outside the current version set; returns their names
    pub fn activate(&self) -> Vec<String> {
        let keep = [
            self.config.cache_version.as_str(),
            self.config.assets_cache.as_str(),
            self.config.runtime_cache.as_str(),
        ];

        let stale: Vec<String> = self
            .caches
            .names()
            .into_iter()
            .filter(|name| !keep.contains(&name.as_str()))
            .collect();

        for name in &stale {
            info!(cache = %name, "Deleting old cache");
            self.caches.delete(name);
        }
        stale
    }

    /// Serve a request. `None` means the shell does not intercept it.
    pub async fn fetch(&self, request: &HttpRequest) -> Option<HttpResponse> {
        match self.policy.classify(&request.method, &request.url) {
            Strategy::Bypass => None,
            Strategy::AssetFirst => Some(self.asset_first(request).await),
            Strategy::NetworkFirst => Some(self.network_first(request).await),
        }
    }

    async fn asset_first(&self, request: &HttpRequest) -> HttpResponse {
        if let Some(cached) = self.caches.lookup(&request.url) {
            debug!(url = %request.url, "Cache hit");
            return cached;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.caches
                        .put(&self.config.assets_cache, &request.url, response.clone());
                }
                response
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Fetch failed");
                HttpResponse::text(503, OFFLINE_TEXT)
            }
        }
    }

    async fn network_first(&self, request: &HttpRequest) -> HttpResponse {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.caches
                        .put(&self.config.runtime_cache, &request.url, response.clone());
                }
                response
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying cache");
                self.caches.lookup(&request.url).unwrap_or_else(|| {
                    HttpResponse::json(
                        503,
                        &json!({ "error": "Offline", "message": OFFLINE_MESSAGE }),
                    )
                })
            }
        }
    }

    pub fn handle_message(&self, message: ControlMessage) {
        info!(?message, "Control message");
        match message {
            ControlMessage::SkipWaiting => self.skip_waiting.store(true, Ordering::SeqCst),
            ControlMessage::ClearCache => self.caches.clear(),
        }
    }

    /// Notification for a push; `payload` becomes the body
    pub fn push(&self, payload: Option<&str>) -> Notification {
        let avatar =
            |size: u32| format!("https://ui-avatars.com/api/?name=K&background=1B4332&color=fff&size={}", size);
        Notification {
            title: "KhetGo".to_string(),
            body: payload
                .filter(|p| !p.is_empty())
                .unwrap_or("New update from KhetGo")
                .to_string(),
            icon: avatar(192),
            badge: avatar(72),
            vibrate: vec![200, 100, 200],
            tag: "khetgo-notification".to_string(),
            renotify: true,
            actions: vec![
                NotificationAction {
                    action: "open".to_string(),
                    title: "Open KhetGo".to_string(),
                },
                NotificationAction {
                    action: "close".to_string(),
                    title: "Close".to_string(),
                },
            ],
        }
    }

    /// Page to open for a notification click
    pub fn notification_click(&self, action: Option<&str>) -> Option<String> {
        (action == Some("open")).then(|| "/".to_string())
    }

    /// Queue a request for replay on the next background sync
    pub fn queue_pending(&self, request: HttpRequest) {
        debug!(url = %request.url, "Queued for background sync");
        self.pending.insert(request.url.clone(), request);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Replay queued requests; successful ones are dropped from the queue
    pub async fn sync(&self, tag: &str) -> SyncReport {
        let mut report = SyncReport::default();
        if tag != SYNC_TAG {
            return report;
        }

        let queued: Vec<HttpRequest> = self.pending.iter().map(|e| e.value().clone()).collect();
        for request in queued {
            match self.network.fetch(&request).await {
                Ok(_) => {
                    self.pending.remove(&request.url);
                    report.replayed += 1;
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Sync failed");
                    report.failed += 1;
                }
            }
        }

        info!(replayed = report.replayed, failed = report.failed, "Background sync");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_tags() {
        assert_eq!(
            ControlMessage::from_tag("SKIP_WAITING"),
            Some(ControlMessage::SkipWaiting)
        );
        assert_eq!(ControlMessage::from_tag("RELOAD"), None);
    }

    #[test]
    fn test_offline_json_body() {
        let r = HttpResponse::json(503, &json!({ "error": "Offline" }));
        assert_eq!(r.content_type.as_deref(), Some("application/json"));
        assert!(!r.is_ok());
    }
}
