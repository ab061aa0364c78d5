use crate::adapters::weather::WeatherCache;
use crate::config::AppConfig;
use crate::core::mode::{determine_mode, refresh_interval, Favorites};
use crate::core::parser::parse_scoreboard;
use crate::display::{render_board, Display, Frame, FrameGeometry, RenderContext};
use crate::domain::model::{Board, DisplayMode, Game, LeagueKey, WeatherReport};
use crate::domain::ports::{SportsApi, WeatherProvider};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Summary of one fetch/decide/render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub mode: DisplayMode,
    pub boards: Vec<Board>,
    pub games: usize,
    pub frames: usize,
    pub refresh_interval: Duration,
}

pub struct Cycle {
    pub report: CycleReport,
    pub frames: Vec<Frame>,
}

/// Drives the scoreboard: polls every enabled league, decides the display
/// mode and feeds the boards for that mode to the display.
pub struct ScoreboardManager<A: SportsApi, W: WeatherProvider, D: Display> {
    config: AppConfig,
    api: A,
    weather: Option<W>,
    display: D,
    favorites: Favorites,
    geometry: FrameGeometry,
    date: Option<String>,
    monitor: SystemMonitor,
    current_mode: DisplayMode,
    games: BTreeMap<LeagueKey, Vec<Game>>,
    last_fetch: Option<DateTime<Local>>,
    weather_cache: WeatherCache,
}

impl<A: SportsApi, W: WeatherProvider, D: Display> ScoreboardManager<A, W, D> {
    pub fn new(config: AppConfig, api: A, weather: Option<W>, display: D) -> Self {
        let favorites = config.favorites();
        let geometry = FrameGeometry::from_settings(&config.display_settings);
        let weather_ttl = config
            .weather
            .as_ref()
            .map(|w| w.refresh_interval_sec)
            .unwrap_or(600);

        tracing::info!(
            leagues = config.enabled_leagues().len(),
            cols = geometry.cols,
            rows = geometry.rows,
            "Scoreboard manager initialized"
        );
        if favorites.is_empty() {
            tracing::debug!("No favorite teams configured");
        }

        Self {
            config,
            api,
            weather,
            display,
            favorites,
            geometry,
            date: None,
            monitor: SystemMonitor::default(),
            current_mode: DisplayMode::default(),
            games: BTreeMap::new(),
            last_fetch: None,
            weather_cache: WeatherCache::new(Duration::from_secs(weather_ttl)),
        }
    }

    /// Show the scoreboard of a fixed `YYYYMMDD` date instead of today.
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn current_mode(&self) -> DisplayMode {
        self.current_mode
    }

    pub fn last_fetch(&self) -> Option<DateTime<Local>> {
        self.last_fetch
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values().flatten()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Fetches and parses every enabled league. A league that fails is
    /// logged and left out; the previous data is replaced either way.
    pub async fn fetch_all(&mut self) -> usize {
        tracing::info!("Fetching all sport data...");
        let leagues: Vec<LeagueKey> = self
            .config
            .enabled_leagues()
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        let mut fetched = BTreeMap::new();
        for key in leagues {
            tracing::debug!(league = %key, "Fetching events");
            match self
                .api
                .scoreboard(key.sport.as_str(), &key.league, self.date.as_deref())
                .await
            {
                Ok(raw) => {
                    let games = parse_scoreboard(&raw, &key);
                    if games.is_empty() {
                        tracing::debug!(league = %key, "No events found");
                    } else {
                        tracing::debug!(league = %key, "Fetched {} events", games.len());
                        fetched.insert(key, games);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        league = %key,
                        retryable = e.is_retryable(),
                        "Error fetching events: {}",
                        e
                    );
                }
            }
        }

        let total = fetched.values().map(Vec::len).sum();
        self.games = fetched;
        self.last_fetch = Some(Local::now());
        tracing::info!("Finished fetching all sport data ({} games)", total);
        total
    }

    async fn weather_report(&mut self, boards: &[Board]) -> Option<WeatherReport> {
        if !boards.contains(&Board::Weather) {
            return None;
        }
        let settings = self.config.active_weather()?;
        if let Some(report) = self.weather_cache.fresh() {
            return Some(report.clone());
        }
        let Some(provider) = self.weather.as_ref() else {
            return self.weather_cache.last().cloned();
        };
        let Some(api_key) = settings.resolved_api_key() else {
            tracing::warn!("Weather board configured but no API key available");
            return None;
        };

        match provider
            .current(&settings.location, &api_key, &settings.units)
            .await
        {
            Ok(report) => {
                tracing::debug!(location = %report.location, "Weather refreshed");
                self.weather_cache.store(report.clone());
                Some(report)
            }
            Err(e) => {
                tracing::warn!("Could not refresh weather: {}", e);
                self.weather_cache.last().cloned()
            }
        }
    }

    fn render(&self, boards: &[Board], weather: Option<&WeatherReport>) -> Vec<Frame> {
        let games: Vec<Game> = self.games().cloned().collect();
        let ctx = RenderContext {
            geometry: self.geometry,
            games: &games,
            favorites: &self.favorites,
            weather,
            messages: &self.config.custom_messages,
            now: Local::now().fixed_offset(),
        };

        boards
            .iter()
            .flat_map(|board| {
                let frames = render_board(*board, &ctx);
                if frames.is_empty() {
                    tracing::debug!(board = %board, "Board has nothing to show");
                }
                frames
            })
            .collect()
    }

    /// Fetch, pick the mode and render its boards. Nothing is shown yet.
    pub async fn run_cycle(&mut self) -> Cycle {
        let games = self.fetch_all().await;

        let all_games: Vec<Game> = self.games().cloned().collect();
        self.current_mode = determine_mode(
            &all_games,
            &self.favorites,
            self.config.display_settings.live_mode_enabled,
        );
        tracing::info!("Current overall display mode: '{}'", self.current_mode);

        let boards = self.config.boards_for(self.current_mode).to_vec();
        if boards.is_empty() {
            tracing::warn!(
                "No display boards configured for mode '{}'. Displaying nothing.",
                self.current_mode
            );
        } else {
            tracing::debug!(
                "Boards selected for mode '{}': {:?}",
                self.current_mode,
                boards
            );
        }

        let weather = self.weather_report(&boards).await;
        let frames = self.render(&boards, weather.as_ref());

        let interval = refresh_interval(self.current_mode, &self.config.refresh_intervals);
        Cycle {
            report: CycleReport {
                mode: self.current_mode,
                boards,
                games,
                frames: frames.len(),
                refresh_interval: interval,
            },
            frames,
        }
    }

    /// One cycle with every frame shown once.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        let cycle = self.run_cycle().await;
        for frame in &cycle.frames {
            self.display.show(frame)?;
        }
        self.monitor.log_stats("cycle");
        Ok(cycle.report)
    }

    /// Rotates `frames` on the display until `window` has passed.
    async fn present(&mut self, frames: &[Frame], window: Duration) -> Result<()> {
        let deadline = Instant::now() + window;
        if frames.is_empty() {
            tokio::time::sleep_until(deadline).await;
            return Ok(());
        }

        let default_hold =
            Duration::from_secs(self.config.display_settings.board_duration_sec.max(1));
        for frame in frames.iter().cycle() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.display.show(frame)?;
            let hold = frame
                .hold
                .filter(|hold| !hold.is_zero())
                .unwrap_or(default_hold)
                .min(deadline - now);
            tokio::time::sleep(hold).await;
        }
        Ok(())
    }

    /// Runs until the surrounding task is dropped.
    pub async fn run(&mut self) {
        tracing::info!("Scoreboard main loop started");
        let backoff = Duration::from_secs(self.config.refresh_intervals.error_backoff);

        loop {
            let cycle = self.run_cycle().await;
            self.monitor.log_stats("cycle");
            tracing::info!(
                "Next data refresh in {} seconds (due to mode '{}')",
                cycle.report.refresh_interval.as_secs(),
                cycle.report.mode
            );

            if let Err(e) = self
                .present(&cycle.frames, cycle.report.refresh_interval)
                .await
            {
                tracing::error!("Display failed: {}", e);
                tracing::info!(
                    "Attempting to restart loop after {} seconds...",
                    backoff.as_secs()
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TerminalDisplay;
    use crate::utils::error::ScoreboardError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeApi {
        boards: HashMap<String, Value>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SportsApi for FakeApi {
        async fn scoreboard(&self, sport: &str, league: &str, _date: Option<&str>) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.boards
                .get(&format!("{}/{}", sport, league))
                .cloned()
                .ok_or_else(|| ScoreboardError::ApiStatusError {
                    url: format!("{}/{}", sport, league),
                    status: 500,
                })
        }

        async fn game(&self, _sport: &str, _league: &str, _game_id: &str) -> Result<Value> {
            Ok(json!({}))
        }

        async fn teams(&self, _sport: &str, _league: &str, _limit: u32) -> Result<Value> {
            Ok(json!({}))
        }
    }

    /// Fails the first `failures` frames it is asked to show.
    struct FlakyDisplay {
        failures: usize,
        shown: usize,
    }

    impl Display for FlakyDisplay {
        fn show(&mut self, frame: &Frame) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ScoreboardError::DisplayError {
                    message: format!("panel offline while drawing {}", frame.board),
                });
            }
            self.shown += 1;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingWeather {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherProvider for CountingWeather {
        async fn current(&self, location: &str, _key: &str, units: &str) -> Result<WeatherReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherReport {
                location: location.to_string(),
                temperature: 64.0,
                description: "overcast".to_string(),
                units: units.to_string(),
            })
        }
    }

    fn event(id: &str, type_id: &str, home_id: &str) -> Value {
        json!({
            "id": id,
            "date": "2025-10-19T17:00Z",
            "status": {"clock": 120, "period": 2, "type": {"id": type_id}},
            "competitions": [{"competitors": [
                {"homeAway": "home", "score": "14", "team": {"id": home_id, "name": "Home", "abbreviation": "HOM"}},
                {"homeAway": "away", "score": "7", "team": {"id": "50", "name": "Away", "abbreviation": "AWY"}}
            ]}]
        })
    }

    fn config() -> AppConfig {
        AppConfig::from_json_str(
            r#"{
                "sports": {
                    "football": {"leagues": [{"id": "nfl", "favorite_team_ids": ["12"]}]},
                    "hockey": {"leagues": [{"id": "nhl"}]}
                },
                "display_modes": {
                    "live_favorites": {"boards": ["live_game_favorite_team"]},
                    "in_progress_games": {"boards": ["live_game_all_sports"]},
                    "no_games_today": {"boards": ["clock", "weather", "custom_message"]}
                },
                "custom_messages": [{"id": "m", "text": "Go team"}],
                "weather": {"location": "Denver, CO, US", "api_key": "abc"}
            }"#,
        )
        .unwrap()
    }

    fn api(nfl_events: Vec<Value>) -> FakeApi {
        let mut boards = HashMap::new();
        boards.insert("football/nfl".to_string(), json!({ "events": nfl_events }));
        // hockey/nhl is missing on purpose: the fake answers 500.
        FakeApi {
            boards,
            calls: Arc::default(),
        }
    }

    #[tokio::test]
    async fn test_live_favorite_cycle_renders_favorite_board() {
        let mut manager = ScoreboardManager::new(
            config(),
            api(vec![event("1", "2", "12"), event("2", "2", "13")]),
            None::<CountingWeather>,
            TerminalDisplay::new(Vec::new()),
        );

        let report = manager.run_once().await.unwrap();
        assert_eq!(report.mode, DisplayMode::LiveFavorites);
        assert_eq!(report.games, 2);
        assert_eq!(report.boards, vec![Board::LiveGameFavoriteTeam]);
        assert_eq!(report.frames, 1);
        assert_eq!(report.refresh_interval, Duration::from_secs(30));
        assert!(manager.last_fetch().is_some());

        let drawn = String::from_utf8(manager.display().get_ref().clone()).unwrap();
        assert!(drawn.contains("HOM 14"));
        assert!(drawn.contains("Q2 2:00"));
    }

    #[tokio::test]
    async fn test_no_games_cycle_uses_weather_cache() {
        let weather = CountingWeather::default();
        let mut manager = ScoreboardManager::new(
            config(),
            api(vec![]),
            Some(weather.clone()),
            TerminalDisplay::new(Vec::new()),
        );

        let first = manager.run_once().await.unwrap();
        assert_eq!(first.mode, DisplayMode::NoGamesToday);
        assert_eq!(first.frames, 3);
        assert_eq!(first.refresh_interval, Duration::from_secs(900));

        manager.run_once().await.unwrap();
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mode_without_boards_renders_nothing() {
        let mut manager = ScoreboardManager::new(
            config(),
            api(vec![event("1", "3", "40")]),
            None::<CountingWeather>,
            TerminalDisplay::new(Vec::new()),
        );

        let report = manager.run_once().await.unwrap();
        assert_eq!(report.mode, DisplayMode::PostGameFinishedAll);
        assert!(report.boards.is_empty());
        assert_eq!(report.frames, 0);
        assert_eq!(manager.games().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_present_rotates_until_window_ends() {
        let mut manager = ScoreboardManager::new(
            config(),
            api(vec![event("1", "2", "20"), event("2", "2", "21")]),
            None::<CountingWeather>,
            TerminalDisplay::new(Vec::new()),
        );
        let cycle = manager.run_cycle().await;
        assert_eq!(cycle.frames.len(), 2);

        // Default hold is 10s: frames shown at 0s, 10s, 20s within 25s.
        manager
            .present(&cycle.frames, Duration::from_secs(25))
            .await
            .unwrap();
        let drawn = String::from_utf8(manager.display().get_ref().clone()).unwrap();
        assert_eq!(drawn.matches("+----------+").count(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_failure_waits_for_backoff_before_next_cycle() {
        let mut config = config();
        config.refresh_intervals.error_backoff = 45;
        let api = api(vec![event("1", "2", "12")]);
        let calls = api.calls.clone();
        let mut manager = ScoreboardManager::new(
            config,
            api,
            None::<CountingWeather>,
            FlakyDisplay {
                failures: 1,
                shown: 0,
            },
        );

        {
            let run = manager.run();
            tokio::pin!(run);

            // One cycle polls both configured leagues.
            assert!(tokio::time::timeout(Duration::from_secs(44), &mut run)
                .await
                .is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 2);

            assert!(tokio::time::timeout(Duration::from_secs(2), &mut run)
                .await
                .is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 4);
        }
        assert_eq!(manager.display().shown, 1);
    }
}
