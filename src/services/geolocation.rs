//! Device location with a bounded wait and a configured fallback

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::GeolocationConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates>;
}

/// Always answers with one coordinate (headless hosts, tests)
pub struct FixedGeolocator {
    at: Coordinates,
}

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            at: Coordinates {
                latitude,
                longitude,
            },
        }
    }

    pub fn from_config(config: &GeolocationConfig) -> Self {
        Self::new(config.fallback_latitude, config.fallback_longitude)
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates> {
        Ok(self.at)
    }
}

/// Locate, bounded by `timeout_ms`; failures and timeouts yield the fallback
pub async fn locate_with_fallback(
    geolocator: &dyn Geolocator,
    config: &GeolocationConfig,
) -> Coordinates {
    let fallback = Coordinates {
        latitude: config.fallback_latitude,
        longitude: config.fallback_longitude,
    };

    match tokio::time::timeout(Duration::from_millis(config.timeout_ms), geolocator.locate()).await
    {
        Ok(Ok(at)) => at,
        Ok(Err(e)) => {
            warn!(error = %e, "Geolocation failed, using fallback");
            fallback
        }
        Err(_) => {
            warn!(timeout_ms = config.timeout_ms, "Geolocation timed out, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;

    struct Stuck;

    #[async_trait]
    impl Geolocator for Stuck {
        async fn locate(&self) -> Result<Coordinates> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            })
        }
    }

    struct Denied;

    #[async_trait]
    impl Geolocator for Denied {
        async fn locate(&self) -> Result<Coordinates> {
            Err(ShellError::FeatureUnavailable {
                feature: "Location".into(),
                reason: "permission denied".into(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_fallback() {
        let config = GeolocationConfig::default();
        let at = locate_with_fallback(&Stuck, &config).await;
        assert_eq!(at.latitude, config.fallback_latitude);
    }

    #[tokio::test]
    async fn test_error_uses_fallback() {
        let config = GeolocationConfig::default();
        let at = locate_with_fallback(&Denied, &config).await;
        assert_eq!(at.longitude, config.fallback_longitude);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let config = GeolocationConfig::default();
        let at = locate_with_fallback(&FixedGeolocator::new(18.52, 73.85), &config).await;
        assert_eq!(at.latitude, 18.52);
    }
}
