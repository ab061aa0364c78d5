use crate::config::CustomMessage;
use crate::core::mode::Favorites;
use crate::display::frame::{wrap, Frame, FrameGeometry};
use crate::domain::model::{Board, Game, GameState, WeatherReport};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// Everything a board may draw from during one cycle.
pub struct RenderContext<'a> {
    pub geometry: FrameGeometry,
    pub games: &'a [Game],
    pub favorites: &'a Favorites,
    pub weather: Option<&'a WeatherReport>,
    pub messages: &'a [CustomMessage],
    /// Wall-clock time in the display's time zone.
    pub now: DateTime<FixedOffset>,
}

pub fn render_board(board: Board, ctx: &RenderContext<'_>) -> Vec<Frame> {
    match board.game_state() {
        Some(state) => render_games(board, state, ctx),
        None => match board {
            Board::Clock => vec![render_clock(ctx)],
            Board::Weather => ctx.weather.map(|w| render_weather(w, ctx)).into_iter().collect(),
            Board::CustomMessage => ctx
                .messages
                .iter()
                .map(|message| render_message(message, ctx))
                .collect(),
            _ => Vec::new(),
        },
    }
}

fn render_games(board: Board, state: GameState, ctx: &RenderContext<'_>) -> Vec<Frame> {
    let mut games: Vec<&Game> = ctx
        .games
        .iter()
        .filter(|game| game.state == state)
        .filter(|game| !board.favorites_only() || ctx.favorites.is_favorite_game(game))
        .collect();
    games.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    games
        .into_iter()
        .map(|game| render_game(board, game, ctx))
        .collect()
}

fn league_label(game: &Game) -> String {
    game.league
        .as_ref()
        .map(|key| key.league.to_uppercase())
        .unwrap_or_default()
}

fn render_game(board: Board, game: &Game, ctx: &RenderContext<'_>) -> Frame {
    let tz = ctx.now.timezone();
    let mut frame = Frame::new(board, ctx.geometry);
    match game.state {
        GameState::Pre => {
            frame
                .push_line(&format!("{} @ {}", game.away.abbreviation, game.home.abbreviation))
                .push_line(&game.status_line(&tz))
                .push_line(&game.date.with_timezone(&tz).format("%b %-d").to_string())
                .push_line(&league_label(game));
        }
        GameState::InProgress | GameState::Final => {
            frame
                .push_line(&format!("{} {}", game.away.abbreviation, game.away_score))
                .push_line(&format!("{} {}", game.home.abbreviation, game.home_score))
                .push_line(&game.status_line(&tz))
                .push_line(&league_label(game));
        }
    }
    frame
}

fn render_clock(ctx: &RenderContext<'_>) -> Frame {
    let mut frame = Frame::new(Board::Clock, ctx.geometry);
    frame
        .push_line(&ctx.now.format("%-I:%M %p").to_string())
        .push_line(&ctx.now.format("%a %b %-d").to_string());
    frame
}

fn render_weather(weather: &WeatherReport, ctx: &RenderContext<'_>) -> Frame {
    let mut frame = Frame::new(Board::Weather, ctx.geometry);
    let city = weather.location.split(',').next().unwrap_or_default();
    frame
        .push_line(city)
        .push_line(&weather.temperature_label())
        .push_line(&weather.description);
    frame
}

fn render_message(message: &CustomMessage, ctx: &RenderContext<'_>) -> Frame {
    let mut frame = Frame::new(Board::CustomMessage, ctx.geometry)
        .with_hold(Duration::from_secs(message.duration_sec));
    for line in wrap(&message.text, ctx.geometry.cols) {
        frame.push_line(&line);
    }
    frame
}
