use crate::domain::model::WeatherReport;
use crate::domain::ports::WeatherProvider;
use crate::utils::error::{Result, ScoreboardError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    name: String,
    main: MainReading,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: String,
}

/// Outcome of checking a key/location pair against OpenWeatherMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherCheck {
    Valid,
    MissingInput,
    InvalidKey,
    CityNotFound,
    Unreachable(String),
    Failed(String),
}

impl WeatherCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, WeatherCheck::Valid)
    }

    pub fn describe(&self) -> String {
        match self {
            WeatherCheck::Valid => "OpenWeatherMap API key and location validated".to_string(),
            WeatherCheck::MissingInput => "Location and API key are both required".to_string(),
            WeatherCheck::InvalidKey => "Invalid OpenWeatherMap API key".to_string(),
            WeatherCheck::CityNotFound => {
                "City not found, check the location spelling".to_string()
            }
            WeatherCheck::Unreachable(reason) => {
                format!("Could not reach OpenWeatherMap: {}", reason)
            }
            WeatherCheck::Failed(reason) => format!("Weather API check failed: {}", reason),
        }
    }
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn validate(&self, location: &str, api_key: &str) -> WeatherCheck {
        if location.trim().is_empty() || api_key.trim().is_empty() {
            return WeatherCheck::MissingInput;
        }

        tracing::info!("Testing OpenWeatherMap API for '{}'...", location);
        match self.current(location, api_key, "imperial").await {
            Ok(_) => WeatherCheck::Valid,
            Err(ScoreboardError::ApiStatusError { status: 401, .. }) => WeatherCheck::InvalidKey,
            Err(ScoreboardError::ApiStatusError { status: 404, .. }) => {
                WeatherCheck::CityNotFound
            }
            Err(ScoreboardError::ApiError(e)) if e.is_connect() || e.is_timeout() => {
                WeatherCheck::Unreachable(e.to_string())
            }
            Err(e) => WeatherCheck::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, location: &str, api_key: &str, units: &str) -> Result<WeatherReport> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", location), ("appid", api_key), ("units", units)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoreboardError::ApiStatusError {
                url,
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        // OpenWeatherMap sometimes reports errors in the body with a 200.
        if body.get("cod").and_then(|c| c.as_str()) == Some("404") {
            return Err(ScoreboardError::ApiStatusError { url, status: 404 });
        }

        let current: CurrentWeather = serde_json::from_value(body)?;
        let description = current
            .weather
            .first()
            .map(|c| c.description.clone())
            .unwrap_or_default();

        Ok(WeatherReport {
            location: if current.name.is_empty() {
                location.to_string()
            } else {
                current.name
            },
            temperature: current.main.temp,
            description,
            units: units.to_string(),
        })
    }
}

/// Last report plus when it was fetched, reused until `ttl` has passed.
#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entry: Option<(Instant, WeatherReport)>,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn fresh(&self) -> Option<&WeatherReport> {
        self.entry
            .as_ref()
            .filter(|(fetched, _)| fetched.elapsed() < self.ttl)
            .map(|(_, report)| report)
    }

    /// Last known report regardless of age.
    pub fn last(&self) -> Option<&WeatherReport> {
        self.entry.as_ref().map(|(_, report)| report)
    }

    pub fn store(&mut self, report: WeatherReport) {
        self.entry = Some((Instant::now(), report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> WeatherReport {
        WeatherReport {
            location: "London".to_string(),
            temperature: 18.4,
            description: "light rain".to_string(),
            units: "metric".to_string(),
        }
    }

    #[test]
    fn test_weather_cache_expires() {
        let mut cache = WeatherCache::new(Duration::from_millis(5));
        assert!(cache.fresh().is_none());

        cache.store(report());
        assert_eq!(cache.fresh(), Some(&report()));

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.fresh().is_none());
        assert_eq!(cache.last(), Some(&report()));
    }

    #[tokio::test]
    async fn test_validate_rejects_blank_input_without_a_request() {
        let client = WeatherClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(client.validate("", "key").await, WeatherCheck::MissingInput);
        assert_eq!(client.validate("Paris", " ").await, WeatherCheck::MissingInput);
    }

    #[test]
    fn test_temperature_label_uses_units() {
        assert_eq!(report().temperature_label(), "18°C");
    }
}
