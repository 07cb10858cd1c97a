//! Weather Proxy
//!
//! Proxies OpenWeatherMap so mobile clients never hold the API key. Without
//! a configured key the client serves deterministic demo payloads (flagged
//! `_mock`) so the rest of the product works offline. Response caching is
//! the caller's concern.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Settings;

const OWM_BASE: &str = "https://api.openweathermap.org/data/2.5";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters accepted by both weather endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    /// `metric` or `imperial`
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_units() -> String {
    "metric".to_string()
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Upstream returned a non-success status.
    #[error("weather provider returned an error")]
    Upstream(u16),

    /// Upstream could not be reached in time.
    #[error("weather service unavailable")]
    Unreachable,
}

/// Outbound OpenWeatherMap client, or a demo stub when no key is set.
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.openweather_api_key.is_none() {
            tracing::info!("no weather API key configured, serving demo payloads");
        }
        Ok(WeatherClient {
            http: reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build()?,
            api_key: settings.openweather_api_key.clone(),
            base_url: OWM_BASE.to_string(),
        })
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    /// Current conditions at a location.
    pub async fn current(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        match &self.api_key {
            Some(key) => self.proxy("weather", key, query).await,
            None => Ok(mock_current(query.lat, query.lon)),
        }
    }

    /// 5-day / 3-hour forecast for a location.
    pub async fn forecast(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        match &self.api_key {
            Some(key) => self.proxy("forecast", key, query).await,
            None => Ok(mock_forecast(query.lat, query.lon)),
        }
    }

    async fn proxy(&self, path: &str, key: &str, query: &WeatherQuery) -> Result<Value, WeatherError> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .query(&[
                ("lat", query.lat.to_string()),
                ("lon", query.lon.to_string()),
                ("appid", key.to_string()),
                ("units", query.units.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("weather request failed: {}", e);
                WeatherError::Unreachable
            })?;

        if !response.status().is_success() {
            return Err(WeatherError::Upstream(response.status().as_u16()));
        }

        response.json().await.map_err(|e| {
            tracing::warn!("weather payload parse failed: {}", e);
            WeatherError::Unreachable
        })
    }
}

fn mock_current(lat: f64, lon: f64) -> Value {
    json!({
        "coord": { "lat": lat, "lon": lon },
        "weather": [
            { "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" }
        ],
        "main": {
            "temp": 28.5,
            "feels_like": 31.2,
            "temp_min": 26.0,
            "temp_max": 31.0,
            "pressure": 1012,
            "humidity": 65
        },
        "visibility": 10000,
        "wind": { "speed": 3.5, "deg": 180 },
        "clouds": { "all": 40 },
        "name": "Bengaluru",
        "sys": { "country": "IN" },
        "_mock": true
    })
}

fn mock_forecast(lat: f64, lon: f64) -> Value {
    json!({
        "city": { "name": "Bengaluru", "country": "IN", "coord": { "lat": lat, "lon": lon } },
        "cnt": 5,
        "list": [
            {
                "dt_txt": "2026-02-28 09:00:00",
                "main": { "temp": 27.0, "humidity": 60 },
                "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }]
            },
            {
                "dt_txt": "2026-02-28 15:00:00",
                "main": { "temp": 32.0, "humidity": 45 },
                "weather": [{ "main": "Clouds", "description": "few clouds", "icon": "02d" }]
            },
            {
                "dt_txt": "2026-03-01 09:00:00",
                "main": { "temp": 26.0, "humidity": 70 },
                "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }]
            },
            {
                "dt_txt": "2026-03-01 15:00:00",
                "main": { "temp": 29.0, "humidity": 55 },
                "weather": [{ "main": "Clouds", "description": "scattered clouds", "icon": "03d" }]
            },
            {
                "dt_txt": "2026-03-02 09:00:00",
                "main": { "temp": 28.0, "humidity": 58 },
                "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }]
            }
        ],
        "_mock": true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lat: f64, lon: f64) -> WeatherQuery {
        WeatherQuery {
            lat,
            lon,
            units: default_units(),
        }
    }

    #[tokio::test]
    async fn test_demo_current_echoes_coordinates() {
        let client = WeatherClient::new(&Settings::default()).unwrap();
        assert!(client.is_mock());

        let payload = client.current(&query(12.97, 77.59)).await.unwrap();
        assert_eq!(payload["_mock"], true);
        assert_eq!(payload["coord"]["lat"], 12.97);
        assert_eq!(payload["coord"]["lon"], 77.59);
    }

    #[tokio::test]
    async fn test_demo_forecast_has_entries() {
        let client = WeatherClient::new(&Settings::default()).unwrap();
        let payload = client.forecast(&query(12.97, 77.59)).await.unwrap();
        assert_eq!(payload["cnt"], 5);
        assert_eq!(payload["list"].as_array().unwrap().len(), 5);
    }
}
