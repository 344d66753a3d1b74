//! Third-party feature clients: weather, AI advisory, geolocation
//!
//! Each is optional. A missing credential yields `None` at construction and
//! the shell renders the feature as unavailable.

pub mod advisory;
pub mod geolocation;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;

pub use advisory::GeminiAdvisor;
pub use geolocation::{locate_with_fallback, Coordinates, FixedGeolocator, Geolocator};
pub use weather::OpenWeatherClient;

use crate::config::{GeolocationConfig, ShellConfig};
use crate::error::Result;
use crate::state::WeatherSnapshot;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot>;
}

#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String>;
}

/// Feature clients wired from config
#[derive(Clone)]
pub struct Services {
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub advisory: Option<Arc<dyn AdvisoryProvider>>,
    pub geolocator: Arc<dyn Geolocator>,
    pub geolocation: GeolocationConfig,
}

impl Services {
    pub fn from_config(config: &ShellConfig) -> Self {
        let weather = OpenWeatherClient::from_config(&config.weather)
            .map(|c| Arc::new(c) as Arc<dyn WeatherProvider>);
        let advisory = GeminiAdvisor::from_config(&config.advisory)
            .map(|c| Arc::new(c) as Arc<dyn AdvisoryProvider>);

        Self {
            weather,
            advisory,
            geolocator: Arc::new(FixedGeolocator::from_config(&config.geolocation)),
            geolocation: config.geolocation.clone(),
        }
    }

    /// No third-party features at all
    pub fn disabled() -> Self {
        let geolocation = GeolocationConfig::default();
        Self {
            weather: None,
            advisory: None,
            geolocator: Arc::new(FixedGeolocator::from_config(&geolocation)),
            geolocation,
        }
    }

    pub fn with_weather(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(provider);
        self
    }

    pub fn with_advisory(mut self, provider: Arc<dyn AdvisoryProvider>) -> Self {
        self.advisory = Some(provider);
        self
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = geolocator;
        self
    }
}
