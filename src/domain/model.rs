use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sport {
    Football,
    Baseball,
    Hockey,
    Basketball,
    Soccer,
    Other(String),
}

impl Sport {
    pub fn as_str(&self) -> &str {
        match self {
            Sport::Football => "football",
            Sport::Baseball => "baseball",
            Sport::Hockey => "hockey",
            Sport::Basketball => "basketball",
            Sport::Soccer => "soccer",
            Sport::Other(name) => name,
        }
    }
}

impl From<&str> for Sport {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "football" => Sport::Football,
            "baseball" => Sport::Baseball,
            "hockey" => Sport::Hockey,
            "basketball" => Sport::Basketball,
            "soccer" => Sport::Soccer,
            other => Sport::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data feed: a league within a sport, e.g. `football/nfl`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeagueKey {
    pub sport: Sport,
    pub league: String,
}

impl LeagueKey {
    pub fn new(sport: &str, league: &str) -> Self {
        Self {
            sport: Sport::from(sport),
            league: league.to_string(),
        }
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.sport, self.league)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub abbreviation: String,
    pub logo: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Pre,
    InProgress,
    Final,
}

impl GameState {
    /// ESPN reports status both as a numeric type id and as a state word;
    /// the id wins when both are present.
    pub fn from_espn(type_id: Option<&str>, state: Option<&str>, completed: bool) -> Self {
        match type_id {
            Some("1") => return GameState::Pre,
            Some("2") => return GameState::InProgress,
            Some("3") => return GameState::Final,
            _ => {}
        }
        if completed {
            return GameState::Final;
        }
        match state {
            Some("in") | Some("in_progress") => GameState::InProgress,
            Some("post") => GameState::Final,
            _ => GameState::Pre,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    #[serde(skip)]
    pub league: Option<LeagueKey>,
    pub date: DateTime<Utc>,
    pub name: String,
    pub short_name: String,
    pub state: GameState,
    pub clock_seconds: f64,
    pub period: u32,
    pub display_clock: Option<String>,
    pub home: Team,
    pub away: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub event_link: Option<String>,
}

impl Game {
    pub fn is_final(&self) -> bool {
        self.state == GameState::Final
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == GameState::InProgress
    }

    pub fn is_pregame(&self) -> bool {
        self.state == GameState::Pre
    }

    pub fn sport(&self) -> Option<&Sport> {
        self.league.as_ref().map(|key| &key.sport)
    }

    pub fn involves_any(&self, team_ids: &[String]) -> bool {
        team_ids
            .iter()
            .any(|id| *id == self.home.id || *id == self.away.id)
    }

    /// Short status text: `Final`, the live period and clock, or the
    /// scheduled start time in `tz`.
    pub fn status_line<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self.state {
            GameState::Final => "Final".to_string(),
            GameState::InProgress => self.live_clock(),
            GameState::Pre => self
                .date
                .with_timezone(tz)
                .format("%-I:%M %p")
                .to_string(),
        }
    }

    fn live_clock(&self) -> String {
        let total = self.clock_seconds.max(0.0) as u64;
        let clock = format!("{}:{:02}", total / 60, total % 60);
        match self.sport() {
            Some(Sport::Hockey) => format!("P{} {}", self.period, clock),
            Some(Sport::Baseball) => format!("Inn {}", self.period),
            Some(Sport::Soccer) => self
                .display_clock
                .clone()
                .unwrap_or_else(|| format!("{}'", total / 60)),
            _ => format!("Q{} {}", self.period, clock),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} {} | {}",
            self.away.abbreviation,
            self.away_score,
            self.home.abbreviation,
            self.home_score,
            self.status_line(&Utc)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    LiveFavorites,
    InProgressGames,
    PreGameScheduled,
    PostGameFinishedFavorite,
    PostGameFinishedAll,
    #[default]
    NoGamesToday,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 6] = [
        DisplayMode::LiveFavorites,
        DisplayMode::InProgressGames,
        DisplayMode::PreGameScheduled,
        DisplayMode::PostGameFinishedFavorite,
        DisplayMode::PostGameFinishedAll,
        DisplayMode::NoGamesToday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::LiveFavorites => "live_favorites",
            DisplayMode::InProgressGames => "in_progress_games",
            DisplayMode::PreGameScheduled => "pre_game_scheduled",
            DisplayMode::PostGameFinishedFavorite => "post_game_finished_favorite",
            DisplayMode::PostGameFinishedAll => "post_game_finished_all",
            DisplayMode::NoGamesToday => "no_games_today",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown display mode '{}'", s))
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A screen layout the display rotates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    LiveGameFavoriteTeam,
    LiveGameAllSports,
    GamePreviewFavorite,
    GamePreviewAll,
    FinalGameFavorite,
    FinalGameAllSports,
    Clock,
    Weather,
    CustomMessage,
}

impl Board {
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::LiveGameFavoriteTeam => "live_game_favorite_team",
            Board::LiveGameAllSports => "live_game_all_sports",
            Board::GamePreviewFavorite => "game_preview_favorite",
            Board::GamePreviewAll => "game_preview_all",
            Board::FinalGameFavorite => "final_game_favorite",
            Board::FinalGameAllSports => "final_game_all_sports",
            Board::Clock => "clock",
            Board::Weather => "weather",
            Board::CustomMessage => "custom_message",
        }
    }

    pub fn favorites_only(&self) -> bool {
        matches!(
            self,
            Board::LiveGameFavoriteTeam | Board::GamePreviewFavorite | Board::FinalGameFavorite
        )
    }

    /// Game state shown by a game board, `None` for the non-game boards.
    pub fn game_state(&self) -> Option<GameState> {
        match self {
            Board::LiveGameFavoriteTeam | Board::LiveGameAllSports => Some(GameState::InProgress),
            Board::GamePreviewFavorite | Board::GamePreviewAll => Some(GameState::Pre),
            Board::FinalGameFavorite | Board::FinalGameAllSports => Some(GameState::Final),
            Board::Clock | Board::Weather | Board::CustomMessage => None,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub description: String,
    pub units: String,
}

impl WeatherReport {
    pub fn temperature_label(&self) -> String {
        let unit = match self.units.as_str() {
            "metric" => "C",
            "standard" => "K",
            _ => "F",
        };
        format!("{:.0}°{}", self.temperature, unit)
    }
}
