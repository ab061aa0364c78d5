use crate::domain::model::WeatherReport;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Source of raw sports payloads, keyed the way ESPN paths are:
/// `{sport}/{league}`.
#[async_trait]
pub trait SportsApi: Send + Sync {
    /// Scoreboard for a league; `date` is `YYYYMMDD`, `None` means today.
    async fn scoreboard(&self, sport: &str, league: &str, date: Option<&str>) -> Result<Value>;

    async fn game(&self, sport: &str, league: &str, game_id: &str) -> Result<Value>;

    async fn teams(&self, sport: &str, league: &str, limit: u32) -> Result<Value>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str, api_key: &str, units: &str) -> Result<WeatherReport>;
}
