use crate::config::RefreshIntervals;
use crate::domain::model::{DisplayMode, Game, LeagueKey};
use std::collections::HashMap;
use std::time::Duration;

/// Favorite team ids per league.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    by_league: HashMap<LeagueKey, Vec<String>>,
}

impl Favorites {
    pub fn insert(&mut self, league: LeagueKey, team_ids: Vec<String>) {
        self.by_league.entry(league).or_default().extend(team_ids);
    }

    pub fn is_empty(&self) -> bool {
        self.by_league.values().all(Vec::is_empty)
    }

    /// Team ids are only unique within a league, so the game's league
    /// decides which list applies.
    pub fn is_favorite_game(&self, game: &Game) -> bool {
        game.league
            .as_ref()
            .and_then(|league| self.by_league.get(league))
            .is_some_and(|ids| game.involves_any(ids))
    }
}

/// Picks what the board should be showing, most urgent first.
pub fn determine_mode(games: &[Game], favorites: &Favorites, live_mode_enabled: bool) -> DisplayMode {
    let mut live_favorite = false;
    let mut any_live = false;
    let mut any_pregame = false;
    let mut final_favorite = false;
    let mut any_final = false;

    for game in games {
        let favorite = favorites.is_favorite_game(game);
        if game.is_in_progress() {
            any_live = true;
            live_favorite |= favorite;
        } else if game.is_pregame() {
            any_pregame = true;
        } else if game.is_final() {
            any_final = true;
            final_favorite |= favorite;
        }
    }

    if live_mode_enabled && live_favorite {
        DisplayMode::LiveFavorites
    } else if any_live {
        DisplayMode::InProgressGames
    } else if any_pregame {
        DisplayMode::PreGameScheduled
    } else if final_favorite {
        DisplayMode::PostGameFinishedFavorite
    } else if any_final {
        DisplayMode::PostGameFinishedAll
    } else {
        DisplayMode::NoGamesToday
    }
}

pub fn refresh_interval(mode: DisplayMode, intervals: &RefreshIntervals) -> Duration {
    let seconds = match mode {
        DisplayMode::LiveFavorites => intervals.in_progress_favorite_team,
        DisplayMode::InProgressGames => intervals.in_progress_other_games,
        DisplayMode::PreGameScheduled
        | DisplayMode::PostGameFinishedFavorite
        | DisplayMode::PostGameFinishedAll => intervals.pre_game_post_game,
        DisplayMode::NoGamesToday => intervals.no_games,
    };
    Duration::from_secs(seconds)
}
