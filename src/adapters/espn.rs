use crate::adapters::cache::{CacheKey, FileCache};
use crate::config::ApiConfig;
use crate::domain::ports::SportsApi;
use crate::utils::error::{Result, ScoreboardError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct CatalogSport {
    pub name: &'static str,
    pub value: &'static str,
    pub leagues: &'static [(&'static str, &'static str)],
}

/// Sports and leagues known to work with the ESPN site API, as
/// `(display name, league id)`.
pub const CATALOG: &[CatalogSport] = &[
    CatalogSport {
        name: "Football",
        value: "football",
        leagues: &[
            ("NFL", "nfl"),
            ("College Football", "college-football"),
            ("UFL", "ufl"),
        ],
    },
    CatalogSport {
        name: "Baseball",
        value: "baseball",
        leagues: &[("MLB", "mlb"), ("College Baseball", "college-baseball")],
    },
    CatalogSport {
        name: "Hockey",
        value: "hockey",
        leagues: &[("NHL", "nhl")],
    },
    CatalogSport {
        name: "Basketball",
        value: "basketball",
        leagues: &[
            ("NBA", "nba"),
            ("College Basketball", "college-basketball"),
        ],
    },
    CatalogSport {
        name: "Soccer",
        value: "soccer",
        leagues: &[
            ("MLS", "usa.1"),
            ("Eng. Premier League", "eng.1"),
            ("Eng. League Championship", "eng.2"),
            ("Eng. League One", "eng.3"),
            ("Eng. League Two", "eng.4"),
            ("Spanish LALIGA", "esp.1"),
        ],
    },
];

/// Enforces a minimum gap between outgoing requests. Callers queue on the
/// mutex, so concurrent fetches are serialized too.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::info!("Applying rate limit, waiting for {:.2} seconds...", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheTtl {
    pub scoreboard: Duration,
    pub game: Duration,
    pub teams: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            scoreboard: Duration::from_secs(15),
            game: Duration::from_secs(15),
            teams: Duration::from_secs(86_400),
        }
    }
}

/// ESPN site API client with an on-disk response cache.
pub struct EspnClient {
    client: Client,
    base_url: String,
    cache: FileCache,
    limiter: RateLimiter,
    ttl: CacheTtl,
}

impl EspnClient {
    pub fn new(
        base_url: impl Into<String>,
        cache: FileCache,
        min_request_interval: Duration,
        ttl: CacheTtl,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        tracing::info!("ESPN API client initialized");
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
            limiter: RateLimiter::new(min_request_interval),
            ttl,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let cache = FileCache::new(PathBuf::from(&config.cache_dir))?;
        Self::new(
            &config.base_url,
            cache,
            Duration::from_millis(config.min_request_interval_ms),
            CacheTtl {
                scoreboard: Duration::from_secs(config.scoreboard_ttl_secs),
                game: Duration::from_secs(config.game_ttl_secs),
                teams: Duration::from_secs(config.teams_ttl_secs),
            },
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn fetch_json(
        &self,
        url: &str,
        params: &[(String, String)],
        cache_path: PathBuf,
        ttl: Duration,
    ) -> Result<Value> {
        if let Some(cached) = self.cache.load(&cache_path, ttl) {
            return Ok(cached);
        }

        self.limiter.wait().await;

        tracing::info!(url, ?params, "Fetching new data");
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(ScoreboardError::ApiStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let json: Value = response.json().await?;
        self.cache.save(&cache_path, &json);
        Ok(json)
    }
}

#[async_trait]
impl SportsApi for EspnClient {
    async fn scoreboard(&self, sport: &str, league: &str, date: Option<&str>) -> Result<Value> {
        let url = format!("{}/{}/{}/scoreboard", self.base_url, sport, league);
        let params: Vec<(String, String)> = date
            .map(|d| vec![("dates".to_string(), d.to_string())])
            .unwrap_or_default();
        let path = self.cache.path_for(&CacheKey::Url {
            url: &url,
            params: &params,
        });
        self.fetch_json(&url, &params, path, self.ttl.scoreboard).await
    }

    async fn game(&self, sport: &str, league: &str, game_id: &str) -> Result<Value> {
        let url = format!("{}/{}/{}/scoreboard/{}", self.base_url, sport, league, game_id);
        let path = self.cache.path_for(&CacheKey::Game { id: game_id });
        self.fetch_json(&url, &[], path, self.ttl.game).await
    }

    async fn teams(&self, sport: &str, league: &str, limit: u32) -> Result<Value> {
        let url = format!("{}/{}/{}/teams", self.base_url, sport, league);
        let params = vec![("limit".to_string(), limit.to_string())];
        let path = self.cache.path_for(&CacheKey::Teams {
            sport,
            league,
            params: &params,
        });
        self.fetch_json(&url, &params, path, self.ttl.teams).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamChoice {
    pub label: String,
    pub id: String,
}

/// Teams of `league` from a teams payload, labelled
/// `"Display Name (ABBR)"` and sorted by label.
pub fn team_choices(raw: &Value, league: &str) -> Vec<TeamChoice> {
    let leagues = raw
        .get("sports")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|sport| sport.get("leagues").and_then(Value::as_array))
        .flatten();

    let mut choices = Vec::new();
    for entry in leagues {
        let matches = [entry.get("id"), entry.get("slug")]
            .into_iter()
            .flatten()
            .any(|v| v.as_str() == Some(league));
        if !matches {
            continue;
        }

        for group in entry.get("teams").and_then(Value::as_array).into_iter().flatten() {
            let Some(team) = group.get("team") else {
                continue;
            };
            let Some(id) = team.get("id").and_then(Value::as_str) else {
                continue;
            };
            let name = team
                .get("displayName")
                .or_else(|| team.get("name"))
                .and_then(Value::as_str)
                .unwrap_or(id);
            let abbreviation = team
                .get("abbreviation")
                .and_then(Value::as_str)
                .unwrap_or("?");
            choices.push(TeamChoice {
                label: format!("{} ({})", name, abbreviation),
                id: id.to_string(),
            });
        }
        break;
    }

    choices.sort_by(|a, b| a.label.cmp(&b.label));
    choices
}
