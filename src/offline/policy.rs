//! Request routing: which cache strategy serves a request

use std::fmt;

use crate::config::OfflineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Not intercepted (non-GET)
    Bypass,
    /// Cache, then network; populates the assets cache
    AssetFirst,
    /// Network, then cache; populates the runtime cache
    NetworkFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bypass => write!(f, "bypass"),
            Self::AssetFirst => write!(f, "asset-first"),
            Self::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// URL-fragment rules from config
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    asset_first: Vec<String>,
    network_first: Vec<String>,
}

impl RoutePolicy {
    pub fn from_config(config: &OfflineConfig) -> Self {
        Self {
            asset_first: config.asset_first.clone(),
            network_first: config.network_first.clone(),
        }
    }

    pub fn classify(&self, method: &str, url: &str) -> Strategy {
        if !method.eq_ignore_ascii_case("GET") {
            return Strategy::Bypass;
        }
        if self.asset_first.iter().any(|p| url.contains(p.as_str())) {
            return Strategy::AssetFirst;
        }
        // Explicit API hosts and everything else share the same strategy
        Strategy::NetworkFirst
    }

    /// True when `url` matches one of the explicit network-first hosts
    pub fn is_api(&self, url: &str) -> bool {
        self.network_first.iter().any(|p| url.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RoutePolicy {
        RoutePolicy::from_config(&OfflineConfig::default())
    }

    #[test]
    fn test_non_get_bypasses() {
        assert_eq!(
            policy().classify("POST", "https://fonts.googleapis.com/css"),
            Strategy::Bypass
        );
    }

    #[test]
    fn test_cdn_and_fonts_are_asset_first() {
        let p = policy();
        assert_eq!(
            p.classify("GET", "https://fonts.gstatic.com/s/inter.woff2"),
            Strategy::AssetFirst
        );
        assert_eq!(
            p.classify("get", "https://cdnjs.cloudflare.com/ajax/libs/x.css"),
            Strategy::AssetFirst
        );
    }

    #[test]
    fn test_api_and_default_are_network_first() {
        let p = policy();
        let weather = "https://api.openweathermap.org/data/2.5/weather";
        assert_eq!(p.classify("GET", weather), Strategy::NetworkFirst);
        assert!(p.is_api(weather));
        assert_eq!(
            p.classify("GET", "http://localhost:5173/index.html"),
            Strategy::NetworkFirst
        );
        assert!(!p.is_api("http://localhost:5173/index.html"));
    }
}
