// Domain layer: scoreboard models and the ports the adapters implement.

pub mod model;
pub mod ports;

pub use model::{Board, DisplayMode, Game, GameState, LeagueKey, Sport, Team, WeatherReport};
pub use ports::{SportsApi, WeatherProvider};
