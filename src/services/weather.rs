//! OpenWeatherMap current-weather client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{Coordinates, WeatherProvider};
use crate::config::WeatherConfig;
use crate::error::{Result, ShellError};
use crate::state::WeatherSnapshot;

pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    name: String,
    main: MainBlock,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    /// m/s with metric units
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

impl OpenWeatherClient {
    /// `None` when no API key is configured
    pub fn from_config(config: &WeatherConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty())?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot> {
        let url = format!("{}/weather", self.base_url);
        debug!(lat = at.latitude, lon = at.longitude, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShellError::FeatureUnavailable {
                feature: "Weather".to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let body: CurrentResponse = response.json().await?;
        Ok(WeatherSnapshot {
            location: if body.name.is_empty() {
                "Your farm".to_string()
            } else {
                body.name
            },
            temperature_c: body.main.temp,
            humidity: body.main.humidity,
            wind_kph: body.wind.map(|w| w.speed * 3.6).unwrap_or(0.0),
            description: body
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_default(),
            fetched_at: Utc::now(),
        })
    }
}
