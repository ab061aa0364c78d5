use crate::core::mode::Favorites;
use crate::domain::model::{Board, DisplayMode, LeagueKey};
use crate::utils::error::{Result, ScoreboardError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const ESPN_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Upper bound for the chained width or height of the matrix.
pub const MAX_CHAIN_PIXELS: u64 = 16_384;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub sports: BTreeMap<String, SportConfig>,
    pub refresh_intervals: RefreshIntervals,
    #[serde(alias = "display")]
    pub display_settings: DisplaySettings,
    pub display_modes: BTreeMap<String, ModeBoards>,
    pub custom_messages: Vec<CustomMessage>,
    pub weather: Option<WeatherConfig>,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console_level: String,
    pub file_level: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: "INFO".to_string(),
            file_level: "DEBUG".to_string(),
            file_path: "logs/application.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub leagues: Vec<LeagueConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub favorite_team_ids: Vec<String>,
}

/// Poll intervals in seconds. Aliases accept the key names written by
/// older setup runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshIntervals {
    pub in_progress_favorite_team: u64,
    #[serde(alias = "in_progress_all_games")]
    pub in_progress_other_games: u64,
    #[serde(alias = "pregame")]
    pub pre_game_post_game: u64,
    pub no_games: u64,
    pub error_backoff: u64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            in_progress_favorite_team: 30,
            in_progress_other_games: 60,
            pre_game_post_game: 300,
            no_games: 900,
            error_backoff: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub live_mode_enabled: bool,
    pub matrix_rows: u32,
    pub matrix_cols: u32,
    pub matrix_series: u32,
    pub matrix_parallel: u32,
    pub board_duration_sec: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            live_mode_enabled: true,
            matrix_rows: 32,
            matrix_cols: 64,
            matrix_series: 1,
            matrix_parallel: 1,
            board_duration_sec: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeBoards {
    #[serde(default)]
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMessage {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default = "default_message_duration")]
    pub duration_sec: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(
        default = "default_weather_refresh",
        deserialize_with = "u64_from_number_or_string"
    )]
    pub refresh_interval_sec: u64,
}

impl WeatherConfig {
    /// Key from the config file, else from `OPENWEATHER_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(WEATHER_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub weather_base_url: String,
    pub cache_dir: String,
    pub min_request_interval_ms: u64,
    pub scoreboard_ttl_secs: u64,
    pub game_ttl_secs: u64,
    pub teams_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: ESPN_BASE_URL.to_string(),
            weather_base_url: OPENWEATHER_BASE_URL.to_string(),
            cache_dir: "cache".to_string(),
            min_request_interval_ms: 2000,
            scoreboard_ttl_secs: 15,
            game_ttl_secs: 15,
            teams_ttl_secs: 86_400,
            timeout_secs: 10,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_units() -> String {
    "imperial".to_string()
}

fn default_message_duration() -> u64 {
    5
}

fn default_weather_refresh() -> u64 {
    600
}

/// `value` as it must appear between the quotes of a JSON string.
fn escape_json_fragment(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

fn u64_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl AppConfig {
    /// Load from a `.json` or `.toml` file, picked by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScoreboardError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        parsed.map_err(|e| {
            ScoreboardError::config(format!("could not parse {}: {}", path.display(), e))
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content, true)?;
        Ok(serde_json::from_str(&processed)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content, false)?;
        toml::from_str(&processed)
            .map_err(|e| ScoreboardError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left untouched. With `json_escape` the value is escaped for use
    /// inside a JSON string literal.
    fn substitute_env_vars(content: &str, json_escape: bool) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ScoreboardError::config(format!("bad placeholder pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) if json_escape => escape_json_fragment(&value),
                Ok(value) => value,
                Err(_) => format!("${{{}}}", var_name),
            }
        });

        Ok(result.to_string())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Enabled leagues with a non-empty id, in config order.
    pub fn enabled_leagues(&self) -> Vec<(LeagueKey, &LeagueConfig)> {
        self.sports
            .iter()
            .filter(|(_, sport)| sport.enabled)
            .flat_map(|(sport_name, sport)| {
                sport
                    .leagues
                    .iter()
                    .filter(|league| !league.id.trim().is_empty())
                    .map(move |league| (LeagueKey::new(sport_name, &league.id), league))
            })
            .collect()
    }

    pub fn favorites(&self) -> Favorites {
        let mut favorites = Favorites::default();
        for (key, league) in self.enabled_leagues() {
            favorites.insert(key, league.favorite_team_ids.clone());
        }
        favorites
    }

    pub fn boards_for(&self, mode: DisplayMode) -> &[Board] {
        self.display_modes
            .get(mode.as_str())
            .map(|mode_boards| mode_boards.boards.as_slice())
            .unwrap_or(&[])
    }

    /// Weather settings when the section is present and switched on.
    pub fn active_weather(&self) -> Option<&WeatherConfig> {
        self.weather.as_ref().filter(|weather| weather.enabled)
    }

    /// Configuration written by `nexus-setup init`.
    pub fn starter() -> Self {
        let mut sports = BTreeMap::new();
        sports.insert(
            "football".to_string(),
            SportConfig {
                enabled: true,
                leagues: vec![LeagueConfig {
                    id: "nfl".to_string(),
                    favorite_team_ids: Vec::new(),
                }],
            },
        );

        let modes: [(DisplayMode, &[Board]); 6] = [
            (DisplayMode::LiveFavorites, &[Board::LiveGameFavoriteTeam]),
            (DisplayMode::InProgressGames, &[Board::LiveGameAllSports]),
            (
                DisplayMode::PreGameScheduled,
                &[Board::GamePreviewFavorite, Board::GamePreviewAll, Board::Clock],
            ),
            (
                DisplayMode::PostGameFinishedFavorite,
                &[Board::FinalGameFavorite, Board::Clock],
            ),
            (
                DisplayMode::PostGameFinishedAll,
                &[Board::FinalGameAllSports, Board::Clock],
            ),
            (
                DisplayMode::NoGamesToday,
                &[Board::Clock, Board::Weather, Board::CustomMessage],
            ),
        ];
        let display_modes = modes
            .into_iter()
            .map(|(mode, boards)| {
                (
                    mode.as_str().to_string(),
                    ModeBoards {
                        boards: boards.to_vec(),
                    },
                )
            })
            .collect();

        Self {
            sports,
            display_modes,
            ..Self::default()
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_url("api.weather_base_url", &self.api.weather_base_url)?;
        validation::validate_path("api.cache_dir", &self.api.cache_dir)?;
        validation::validate_path("logging.file_path", &self.logging.file_path)?;

        let intervals = &self.refresh_intervals;
        for (field, value) in [
            ("refresh_intervals.in_progress_favorite_team", intervals.in_progress_favorite_team),
            ("refresh_intervals.in_progress_other_games", intervals.in_progress_other_games),
            ("refresh_intervals.pre_game_post_game", intervals.pre_game_post_game),
            ("refresh_intervals.no_games", intervals.no_games),
            ("refresh_intervals.error_backoff", intervals.error_backoff),
        ] {
            validation::validate_positive_number(field, value, 1)?;
        }

        let display = &self.display_settings;
        for (field, value) in [
            ("display_settings.matrix_rows", display.matrix_rows),
            ("display_settings.matrix_cols", display.matrix_cols),
            ("display_settings.matrix_series", display.matrix_series),
            ("display_settings.matrix_parallel", display.matrix_parallel),
        ] {
            validation::validate_positive_number(field, u64::from(value), 1)?;
        }
        for (field, panel, chain) in [
            ("display_settings.matrix_cols", display.matrix_cols, display.matrix_series),
            ("display_settings.matrix_rows", display.matrix_rows, display.matrix_parallel),
        ] {
            let pixels = u64::from(panel) * u64::from(chain);
            if pixels > MAX_CHAIN_PIXELS {
                return Err(ScoreboardError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: pixels.to_string(),
                    reason: format!("chained panels may span at most {} pixels", MAX_CHAIN_PIXELS),
                });
            }
        }

        for mode in self.display_modes.keys() {
            if let Err(reason) = mode.parse::<DisplayMode>() {
                return Err(ScoreboardError::InvalidConfigValueError {
                    field: "display_modes".to_string(),
                    value: mode.clone(),
                    reason,
                });
            }
        }

        if let Some(weather) = self.active_weather() {
            validation::validate_non_empty_string("weather.location", &weather.location)?;
            validation::validate_one_of(
                "weather.units",
                &weather.units,
                &["metric", "imperial", "standard"],
            )?;
            let key = weather.resolved_api_key();
            validation::validate_required_field("weather.api_key", &key)?;
            validation::validate_positive_number(
                "weather.refresh_interval_sec",
                weather.refresh_interval_sec,
                1,
            )?;
        }

        Ok(())
    }
}
